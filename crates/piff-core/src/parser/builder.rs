use std::iter::Peekable;
use std::vec;

use pest::iterators::Pair;

use super::{ParseError, Rule};
use crate::ast::{is_constant_name, Access, Literal, Node, NodeId, Quote, Span, Tree, Visibility};

type Result<T> = std::result::Result<T, ParseError>;

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_namespace
            | Rule::kw_use
            | Rule::kw_fn
            | Rule::kw_class
            | Rule::kw_extends
            | Rule::kw_implements
            | Rule::kw_interface
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_do
            | Rule::kw_for
            | Rule::kw_foreach
            | Rule::kw_as
            | Rule::kw_switch
            | Rule::kw_case
            | Rule::kw_default
            | Rule::kw_try
            | Rule::kw_catch
            | Rule::kw_finally
            | Rule::kw_throw
            | Rule::kw_return
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_new
            | Rule::EOI
    )
}

/// Span of a pair without the whitespace pest folds in after its last token
fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let span = pair.as_span();
    let (line, column) = span.start_pos().line_col();
    let text = pair.as_str();
    let trimmed = text.trim_end_matches([' ', '\t', '\r', '\n']);
    Span {
        start: span.start(),
        end: span.start() + trimmed.len(),
        line,
        column,
    }
}

/// Inner pairs of a rule with keyword tokens dropped
struct Children<'i> {
    pairs: Peekable<vec::IntoIter<Pair<'i, Rule>>>,
    span: Span,
    rule: Rule,
}

impl<'i> Children<'i> {
    fn of(pair: Pair<'i, Rule>) -> Self {
        let span = span_of(&pair);
        let rule = pair.as_rule();
        let pairs: Vec<_> = pair
            .into_inner()
            .filter(|p| !is_keyword(p.as_rule()))
            .collect();
        Self {
            pairs: pairs.into_iter().peekable(),
            span,
            rule,
        }
    }

    fn required(&mut self) -> Result<Pair<'i, Rule>> {
        self.pairs.next().ok_or_else(|| {
            ParseError::new(
                format!("incomplete {:?}", self.rule),
                self.span.line,
                self.span.column,
            )
        })
    }

    fn next_if(&mut self, rule: Rule) -> Option<Pair<'i, Rule>> {
        self.pairs.next_if(|p| p.as_rule() == rule)
    }

    fn peek(&mut self) -> Option<Rule> {
        self.pairs.peek().map(|p| p.as_rule())
    }
}

impl<'i> Iterator for Children<'i> {
    type Item = Pair<'i, Rule>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pairs.next()
    }
}

struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_abstract: bool,
}

pub(super) struct TreeBuilder<'s> {
    source: &'s str,
    tree: Tree,
}

impl<'s> TreeBuilder<'s> {
    pub(super) fn new(source: &'s str) -> Self {
        Self {
            source,
            tree: Tree::new(),
        }
    }

    pub(super) fn finish(self) -> Tree {
        self.tree
    }

    pub(super) fn program(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        let span = span_of(&pair);
        let body = self.statement_list(Children::of(pair).collect())?;
        Ok(self.tree.alloc(Node::Program { body }, span))
    }

    fn alloc(&mut self, node: Node, span: Span) -> NodeId {
        self.tree.alloc(node, span)
    }

    fn join(&self, left: NodeId, right: NodeId) -> Span {
        let (left, right) = (self.tree.span(left), self.tree.span(right));
        Span {
            end: right.end,
            ..left
        }
    }

    fn identifier(&mut self, pair: &Pair<'_, Rule>) -> NodeId {
        let name = pair.as_str().to_string();
        self.alloc(Node::Identifier { name }, span_of(pair))
    }

    fn variable(&mut self, pair: &Pair<'_, Rule>) -> NodeId {
        let name = pair.as_str().to_string();
        self.alloc(Node::Variable { name }, span_of(pair))
    }

    /// Statements of a program, block, class body or case. A gap holding a
    /// blank line becomes a `WhiteSpace` node; a comment with no line break
    /// before it trails the previous statement.
    fn statement_list(&mut self, pairs: Vec<Pair<'_, Rule>>) -> Result<Vec<NodeId>> {
        let mut out = Vec::with_capacity(pairs.len());
        let mut prev_end: Option<usize> = None;
        for pair in pairs {
            let span = span_of(&pair);
            let newlines = prev_end.map(|end| {
                self.source[end..span.start]
                    .chars()
                    .filter(|c| *c == '\n')
                    .count()
            });
            if newlines.unwrap_or(0) >= 2 {
                out.push(self.alloc(Node::WhiteSpace, span));
            }
            prev_end = Some(span.end);
            out.push(self.statement(pair, newlines == Some(0))?);
        }
        Ok(out)
    }

    fn statement(&mut self, pair: Pair<'_, Rule>, trailing: bool) -> Result<NodeId> {
        let span = span_of(&pair);
        let node = match pair.as_rule() {
            Rule::line_comment => Node::SingleLineComment {
                text: pair.as_str()[2..].to_string(),
                trailing,
            },
            Rule::block_comment => {
                let raw = pair.as_str();
                Node::MultiLineComment {
                    text: raw[2..raw.len() - 2].to_string(),
                }
            }
            Rule::namespace_decl => Node::NamespaceDeclaration {
                name: Children::of(pair).required()?.as_str().to_string(),
            },
            Rule::use_decl => Node::UseDeclaration {
                name: Children::of(pair).required()?.as_str().to_string(),
            },
            Rule::function_decl => {
                let mut children = Children::of(pair);
                let id = self.identifier(&children.required()?);
                let params = self.params(children.required()?)?;
                let body = self.function_body(children.required()?)?;
                Node::FunctionDeclaration { id, params, body }
            }
            Rule::class_decl => self.class(pair)?,
            Rule::interface_decl => self.interface(pair)?,
            Rule::method_decl => self.method(pair)?,
            Rule::field_decl => self.field(pair)?,
            Rule::interface_method => {
                let mut children = Children::of(pair);
                let id = self.identifier(&children.required()?);
                let params = self.params(children.required()?)?;
                Node::InterfaceMethodDeclaration { id, params }
            }
            Rule::if_stmt => {
                let mut children = Children::of(pair);
                let test = self.expression(children.required()?)?;
                let consequent = self.statement(children.required()?, false)?;
                let alternate = match children.next() {
                    Some(alt) => Some(self.statement(alt, false)?),
                    None => None,
                };
                Node::IfStatement {
                    test,
                    consequent,
                    alternate,
                }
            }
            Rule::while_stmt => {
                let mut children = Children::of(pair);
                let test = self.expression(children.required()?)?;
                let body = self.statement(children.required()?, false)?;
                Node::WhileStatement { test, body }
            }
            Rule::do_while_stmt => {
                let mut children = Children::of(pair);
                let body = self.statement(children.required()?, false)?;
                let test = self.expression(children.required()?)?;
                Node::DoWhileStatement { body, test }
            }
            Rule::for_stmt => {
                let mut children = Children::of(pair);
                let init = self.for_clause(children.required()?)?;
                let test = self.for_clause(children.required()?)?;
                let update = self.for_clause(children.required()?)?;
                let body = self.statement(children.required()?, false)?;
                Node::ForStatement {
                    init,
                    test,
                    update,
                    body,
                }
            }
            Rule::foreach_stmt => {
                let mut children = Children::of(pair);
                let collection = self.expression(children.required()?)?;
                let first = self.variable(&children.required()?);
                let (key, value) = match children.next_if(Rule::binding_name) {
                    Some(second) => (Some(first), self.variable(&second)),
                    None => (None, first),
                };
                let body = self.statement(children.required()?, false)?;
                Node::ForEachStatement {
                    collection,
                    key,
                    value,
                    body,
                }
            }
            Rule::switch_stmt => {
                let mut children = Children::of(pair);
                let discriminant = self.expression(children.required()?)?;
                let cases = children
                    .map(|case| self.switch_case(case))
                    .collect::<Result<_>>()?;
                Node::SwitchStatement {
                    discriminant,
                    cases,
                }
            }
            Rule::try_stmt => {
                let mut children = Children::of(pair);
                let block = self.statement(children.required()?, false)?;
                let mut handlers = Vec::new();
                let mut finalizer = None;
                for clause in children {
                    match clause.as_rule() {
                        Rule::catch_clause => {
                            let clause_span = span_of(&clause);
                            let mut parts = Children::of(clause);
                            let param_class = self.identifier(&parts.required()?);
                            let param = self.variable(&parts.required()?);
                            let body = self.statement(parts.required()?, false)?;
                            handlers.push(self.alloc(
                                Node::CatchClause {
                                    param_class,
                                    param,
                                    body,
                                },
                                clause_span,
                            ));
                        }
                        _ => {
                            let block = Children::of(clause).required()?;
                            finalizer = Some(self.statement(block, false)?);
                        }
                    }
                }
                Node::TryStatement {
                    block,
                    handlers,
                    finalizer,
                }
            }
            Rule::throw_stmt => Node::ThrowStatement {
                argument: self.expression(Children::of(pair).required()?)?,
            },
            Rule::return_stmt => {
                let argument = match Children::of(pair).next() {
                    Some(expr) => Some(self.expression(expr)?),
                    None => None,
                };
                Node::ReturnStatement { argument }
            }
            Rule::break_stmt => Node::BreakStatement,
            Rule::continue_stmt => Node::ContinueStatement,
            Rule::empty_stmt => Node::EmptyStatement,
            Rule::static_var => {
                let mut children = Children::of(pair);
                children.required()?;
                let left = self.variable(&children.required()?);
                let right = self.expression(children.required()?)?;
                let assignment = self.alloc(
                    Node::AssignmentExpression {
                        operator: "=".to_string(),
                        left,
                        right,
                        is_static: true,
                    },
                    span,
                );
                Node::ExpressionStatement {
                    expression: assignment,
                }
            }
            Rule::block => Node::BlockStatement {
                body: self.statement_list(Children::of(pair).collect())?,
            },
            Rule::expression_stmt => Node::ExpressionStatement {
                expression: self.expression(Children::of(pair).required()?)?,
            },
            rule => {
                return Err(ParseError::new(
                    format!("unexpected {rule:?} in statement position"),
                    span.line,
                    span.column,
                ))
            }
        };
        Ok(self.alloc(node, span))
    }

    fn function_body(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        match pair.as_rule() {
            Rule::block => self.statement(pair, false),
            _ => self.expression(pair),
        }
    }

    fn params(&mut self, pair: Pair<'_, Rule>) -> Result<Vec<NodeId>> {
        Children::of(pair)
            .map(|param| {
                let span = span_of(&param);
                let mut children = Children::of(param);
                let kind = match children.next_if(Rule::param_type) {
                    Some(kind) => Some(self.identifier(&Children::of(kind).required()?)),
                    None => None,
                };
                let id = self.variable(&children.required()?);
                let default = match children.next() {
                    Some(expr) => Some(self.expression(expr)?),
                    None => None,
                };
                Ok(self.alloc(Node::FormalParameter { kind, id, default }, span))
            })
            .collect()
    }

    fn for_clause(&mut self, pair: Pair<'_, Rule>) -> Result<Option<NodeId>> {
        let span = span_of(&pair);
        let mut expressions = Children::of(pair)
            .map(|expr| self.expression(expr))
            .collect::<Result<Vec<_>>>()?;
        Ok(match expressions.len() {
            0 => None,
            1 => expressions.pop(),
            _ => Some(self.alloc(Node::SequenceExpression { expressions }, span)),
        })
    }

    fn switch_case(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        let span = span_of(&pair);
        let mut children = Children::of(pair);
        let label = children.required()?;
        let test = match label.as_rule() {
            Rule::case_test => Some(self.expression(Children::of(label).required()?)?),
            _ => None,
        };
        let consequent = self.statement_list(children.collect())?;
        Ok(self.alloc(Node::SwitchCase { test, consequent }, span))
    }

    fn modifiers(children: &mut Children<'_>) -> Modifiers {
        let mut modifiers = Modifiers {
            visibility: None,
            is_static: false,
            is_abstract: false,
        };
        while let Some(rule) = children.peek() {
            match rule {
                Rule::visibility => {
                    modifiers.visibility = children.next().map(|p| match p.as_str() {
                        "private" => Visibility::Private,
                        "protected" => Visibility::Protected,
                        _ => Visibility::Public,
                    });
                }
                Rule::static_flag => {
                    children.next();
                    modifiers.is_static = true;
                }
                Rule::abstract_flag => {
                    children.next();
                    modifiers.is_abstract = true;
                }
                _ => break,
            }
        }
        modifiers
    }

    fn class(&mut self, pair: Pair<'_, Rule>) -> Result<Node> {
        let mut children = Children::of(pair);
        let is_abstract = children.next_if(Rule::abstract_flag).is_some();
        let id = self.identifier(&children.required()?);
        let mut extends = None;
        let mut implements = Vec::new();
        let mut body = Vec::new();
        for part in children {
            match part.as_rule() {
                Rule::extends_clause => {
                    extends = Some(self.identifier(&Children::of(part).required()?));
                }
                Rule::implements_clause => {
                    for name in Children::of(part) {
                        implements.push(self.identifier(&name));
                    }
                }
                _ => body = self.statement_list(Children::of(part).collect())?,
            }
        }
        Ok(Node::ClassDeclaration {
            id,
            is_abstract,
            extends,
            implements,
            body,
        })
    }

    fn interface(&mut self, pair: Pair<'_, Rule>) -> Result<Node> {
        let mut children = Children::of(pair);
        let id = self.identifier(&children.required()?);
        let mut extends = Vec::new();
        let mut body = Vec::new();
        for part in children {
            match part.as_rule() {
                Rule::interface_extends => {
                    for name in Children::of(part) {
                        extends.push(self.identifier(&name));
                    }
                }
                _ => body = self.statement_list(Children::of(part).collect())?,
            }
        }
        Ok(Node::InterfaceDeclaration { id, extends, body })
    }

    fn method(&mut self, pair: Pair<'_, Rule>) -> Result<Node> {
        let mut children = Children::of(pair);
        let modifiers = Self::modifiers(&mut children);
        let id = self.identifier(&children.required()?);
        let params = self.params(children.required()?)?;
        let body = match children.next() {
            Some(block) => Some(self.statement(block, false)?),
            None => None,
        };
        Ok(Node::MethodDeclaration {
            id,
            visibility: modifiers.visibility,
            is_static: modifiers.is_static,
            is_abstract: modifiers.is_abstract,
            params,
            body,
        })
    }

    /// `B = 1` declares a class constant, anything else a property
    fn field(&mut self, pair: Pair<'_, Rule>) -> Result<Node> {
        let mut children = Children::of(pair);
        let modifiers = Self::modifiers(&mut children);
        let name = children.required()?;
        let value = match children.next() {
            Some(expr) => Some(self.expression(expr)?),
            None => None,
        };
        match value {
            Some(value) if !modifiers.is_static && is_constant_name(name.as_str()) => {
                Ok(Node::ClassConstDeclaration {
                    id: self.identifier(&name),
                    visibility: modifiers.visibility,
                    value,
                })
            }
            value => Ok(Node::PropertyDeclaration {
                id: self.variable(&name),
                visibility: modifiers.visibility,
                is_static: modifiers.is_static,
                value,
            }),
        }
    }

    fn expression(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        let span = span_of(&pair);
        match pair.as_rule() {
            Rule::expression => {
                let mut children = Children::of(pair);
                let left = self.expression(children.required()?)?;
                let Some(operator) = children.next() else {
                    return Ok(left);
                };
                self.check_assignable(left)?;
                let right = self.expression(children.required()?)?;
                Ok(self.alloc(
                    Node::AssignmentExpression {
                        operator: operator.as_str().to_string(),
                        left,
                        right,
                        is_static: false,
                    },
                    span,
                ))
            }
            Rule::pipe_expr => self.fold(pair, |_, object, property| Node::MemberExpression {
                object,
                property: Some(property),
                access: Access::Pipe,
                arguments: None,
            }),
            Rule::logical_or | Rule::logical_and => {
                self.fold(pair, |operator, left, right| Node::LogicalExpression {
                    operator,
                    left,
                    right,
                })
            }
            Rule::equality | Rule::relational | Rule::additive | Rule::multiplicative => {
                self.fold(pair, |operator, left, right| Node::BinaryExpression {
                    operator,
                    left,
                    right,
                    concat: false,
                })
            }
            Rule::conditional => {
                let mut children = Children::of(pair);
                let test = self.expression(children.required()?)?;
                let Some(consequent) = children.next() else {
                    return Ok(test);
                };
                let consequent = self.expression(consequent)?;
                let alternate = self.expression(children.required()?)?;
                Ok(self.alloc(
                    Node::ConditionalExpression {
                        test,
                        consequent,
                        alternate,
                    },
                    span,
                ))
            }
            Rule::unary => {
                let mut children = Children::of(pair);
                let first = children.required()?;
                if first.as_rule() != Rule::prefix_op {
                    return self.expression(first);
                }
                let operator = first.as_str().to_string();
                let argument = self.expression(children.required()?)?;
                let node = match operator.as_str() {
                    "++" | "--" => Node::UpdateExpression {
                        operator,
                        prefix: true,
                        argument,
                    },
                    _ => Node::UnaryExpression { operator, argument },
                };
                Ok(self.alloc(node, span))
            }
            Rule::postfix_expr => self.postfix(pair),
            _ => self.primary(pair),
        }
    }

    fn fold(
        &mut self,
        pair: Pair<'_, Rule>,
        make: impl Fn(String, NodeId, NodeId) -> Node,
    ) -> Result<NodeId> {
        let mut children = Children::of(pair);
        let mut left = self.expression(children.required()?)?;
        while let Some(operator) = children.next() {
            let right = self.expression(children.required()?)?;
            let span = self.join(left, right);
            left = self.alloc(make(operator.as_str().to_string(), left, right), span);
        }
        Ok(left)
    }

    fn check_assignable(&self, target: NodeId) -> Result<()> {
        let assignable = match self.tree.get(self.tree.unparen(target)) {
            Node::Variable { .. } | Node::ObjectExpression { .. } => true,
            Node::MemberExpression {
                access, arguments, ..
            } => *access != Access::Pipe && arguments.is_none(),
            _ => false,
        };
        if assignable {
            Ok(())
        } else {
            let span = self.tree.span(target);
            Err(ParseError::new(
                format!("cannot assign to {}", self.tree.kind(target)),
                span.line,
                span.column,
            ))
        }
    }

    fn postfix(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        let start = span_of(&pair);
        let mut children = Children::of(pair);
        let primary = children.required()?;
        let called = children.peek() == Some(Rule::call_args);
        let scoped = children.peek() == Some(Rule::static_access);

        let mut current = match primary.as_rule() {
            Rule::qualified_name if called || scoped => self.identifier(&primary),
            Rule::qualified_name => self.variable(&primary),
            Rule::sigil if called && !primary.as_str().trim_start_matches('@').is_empty() => {
                let raw = primary.as_str();
                let name = raw.trim_start_matches('@');
                let prefix = &raw[..raw.len() - name.len()];
                let sigil_span = span_of(&primary);
                let object = self.alloc(
                    Node::Variable {
                        name: prefix.to_string(),
                    },
                    sigil_span,
                );
                let property = self.alloc(
                    Node::Identifier {
                        name: name.to_string(),
                    },
                    sigil_span,
                );
                let args = children.required()?;
                let arguments = self.arguments(args)?;
                let access = if prefix == "@@" {
                    Access::Static
                } else {
                    Access::Property
                };
                self.alloc(
                    Node::MemberExpression {
                        object,
                        property: Some(property),
                        access,
                        arguments: Some(arguments),
                    },
                    sigil_span,
                )
            }
            _ => self.expression(primary)?,
        };

        for suffix in children {
            let span = Span {
                end: span_of(&suffix).end,
                ..self.tree.span(current)
            };
            let node = match suffix.as_rule() {
                Rule::call_args => Node::CallExpression {
                    callee: current,
                    arguments: self.arguments(suffix)?,
                    parent_method: None,
                },
                Rule::member_access | Rule::static_access => {
                    let access = if suffix.as_rule() == Rule::static_access {
                        Access::Static
                    } else {
                        Access::Property
                    };
                    let mut parts = Children::of(suffix);
                    let property = self.identifier(&parts.required()?);
                    let arguments = match parts.next() {
                        Some(args) => Some(self.arguments(args)?),
                        None => None,
                    };
                    Node::MemberExpression {
                        object: current,
                        property: Some(property),
                        access,
                        arguments,
                    }
                }
                Rule::index_access => {
                    let property = match Children::of(suffix).next() {
                        Some(expr) => Some(self.expression(expr)?),
                        None => None,
                    };
                    Node::MemberExpression {
                        object: current,
                        property,
                        access: Access::Index,
                        arguments: None,
                    }
                }
                Rule::update_op => Node::UpdateExpression {
                    operator: suffix.as_str().to_string(),
                    prefix: false,
                    argument: current,
                },
                rule => {
                    return Err(ParseError::new(
                        format!("unexpected {rule:?} after expression"),
                        start.line,
                        start.column,
                    ))
                }
            };
            current = self.alloc(node, span);
        }
        Ok(current)
    }

    fn arguments(&mut self, pair: Pair<'_, Rule>) -> Result<Vec<NodeId>> {
        Children::of(pair)
            .map(|expr| self.expression(expr))
            .collect()
    }

    fn primary(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        let span = span_of(&pair);
        let node = match pair.as_rule() {
            Rule::number => Node::Literal {
                value: Literal::Number(pair.as_str().to_string()),
            },
            Rule::boolean => Node::Literal {
                value: Literal::Boolean(pair.as_str() == "true"),
            },
            Rule::null => Node::Literal {
                value: Literal::Null,
            },
            Rule::sq_string => {
                let raw = pair.as_str();
                Node::Literal {
                    value: Literal::String {
                        value: raw[1..raw.len() - 1].to_string(),
                        quote: Quote::Single,
                    },
                }
            }
            Rule::dq_string => self.double_quoted(pair)?,
            Rule::array_literal => {
                let properties = Children::of(pair)
                    .map(|item| self.array_item(item))
                    .collect::<Result<_>>()?;
                Node::ObjectExpression { properties }
            }
            Rule::paren_expr => Node::ParenthesizedExpression {
                expression: self.expression(Children::of(pair).required()?)?,
            },
            Rule::function_expr => {
                let mut children = Children::of(pair);
                let params = self.params(children.required()?)?;
                let body = self.function_body(children.required()?)?;
                Node::FunctionExpression { params, body }
            }
            Rule::new_expr => {
                let mut children = Children::of(pair);
                let callee = self.identifier(&children.required()?);
                let arguments = match children.next() {
                    Some(args) => self.arguments(args)?,
                    None => Vec::new(),
                };
                Node::NewExpression { callee, arguments }
            }
            Rule::sigil | Rule::dollar_name | Rule::qualified_name => Node::Variable {
                name: pair.as_str().to_string(),
            },
            rule => {
                return Err(ParseError::new(
                    format!("unexpected {rule:?} in expression"),
                    span.line,
                    span.column,
                ))
            }
        };
        Ok(self.alloc(node, span))
    }

    /// Without interpolation a double-quoted string is a plain literal
    fn double_quoted(&mut self, pair: Pair<'_, Rule>) -> Result<Node> {
        let raw = pair.as_str();
        let segments: Vec<_> = pair.clone().into_inner().collect();
        if segments.iter().all(|s| s.as_rule() == Rule::dq_text) {
            return Ok(Node::Literal {
                value: Literal::String {
                    value: raw[1..raw.len() - 1].to_string(),
                    quote: Quote::Double,
                },
            });
        }
        let mut parts = Vec::with_capacity(segments.len());
        for segment in segments {
            let part = match segment.as_rule() {
                Rule::interpolation => self.expression(Children::of(segment).required()?)?,
                _ => self.alloc(
                    Node::Literal {
                        value: Literal::String {
                            value: segment.as_str().to_string(),
                            quote: Quote::Double,
                        },
                    },
                    span_of(&segment),
                ),
            };
            parts.push(part);
        }
        Ok(Node::StringExpression { parts })
    }

    /// `[a: 1]` keys a bare name as an identifier, `[$a: 1]` as a variable
    fn array_item(&mut self, pair: Pair<'_, Rule>) -> Result<NodeId> {
        let span = span_of(&pair);
        let mut children = Children::of(pair);
        let first = children.required()?;
        let (key, value) = match first.as_rule() {
            Rule::array_key => {
                let key = self.expression(Children::of(first).required()?)?;
                if let Node::Variable { name } = self.tree.get(key) {
                    if !name.starts_with(['$', '@']) {
                        let name = name.clone();
                        self.tree.replace(key, Node::Identifier { name });
                    }
                }
                (Some(key), self.expression(children.required()?)?)
            }
            _ => (None, self.expression(first)?),
        };
        Ok(self.alloc(Node::Property { key, value }, span))
    }
}
