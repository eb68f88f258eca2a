//! PHP code generation.
//!
//! [`PhpGenerator`] walks a desugared and analysed tree and describes the
//! PHP program as a [`Fragment`]; [`crate::layout::render`] turns that into
//! text. Parentheses are added wherever PHP would otherwise group an
//! operand differently than the Piff tree does.


use std::collections::HashSet;

use tracing::warn;

use crate::analysis::Captures;
use crate::ast::{dump, is_constant_name, variable_key, Access, Literal, Node, NodeId, NodeKind};
use crate::ast::{Tree, Visibility};
use crate::layout::{group, join, list, Fragment, Token};

/// Variables PHP always spells with a `$`, whatever their case
const SUPERGLOBALS: &[&str] = &[
    "GLOBALS", "_SERVER", "_REQUEST", "_POST", "_GET", "_FILES", "_ENV", "_COOKIE", "_SESSION",
];

// PHP binding strength, loosest first
const SEQUENCE: u8 = 0;
const ASSIGN: u8 = 2;
const TERNARY: u8 = 3;
const AND: u8 = 6;
const EQUALITY: u8 = 10;
const RELATIONAL: u8 = 11;
const CONCAT: u8 = 12;
const ADDITIVE: u8 = 14;
const MULTIPLICATIVE: u8 = 15;
const UNARY: u8 = 16;
const INSTANCEOF: u8 = 17;
const UPDATE: u8 = 18;
const ATOM: u8 = 20;

/// PHP spelling of a program variable
pub fn variable_name(name: &str) -> String {
    if name.starts_with('$') {
        return name.to_string();
    }
    if SUPERGLOBALS.contains(&name) {
        return format!("${name}");
    }
    if is_constant_name(name) || name == "self" || name == "parent" {
        return name.to_string();
    }
    format!("${name}")
}

fn binary_precedence(operator: &str, concat: bool) -> u8 {
    if concat {
        return CONCAT;
    }
    match operator {
        "*" | "/" | "%" => MULTIPLICATIVE,
        "<" | "<=" | ">" | ">=" => RELATIONAL,
        "==" | "!=" | "===" | "!==" => EQUALITY,
        "instanceof" => INSTANCEOF,
        _ => ADDITIVE,
    }
}

fn word(text: impl Into<String>) -> Fragment {
    Token::word(text).into()
}

fn parens(inner: Fragment) -> Fragment {
    list("(", vec![inner], ")")
}

pub struct PhpGenerator<'a> {
    tree: &'a Tree,
    captures: &'a Captures,
    unsupported: HashSet<NodeKind>,
}

impl<'a> PhpGenerator<'a> {
    pub fn new(tree: &'a Tree, captures: &'a Captures) -> Self {
        Self {
            tree,
            captures,
            unsupported: HashSet::new(),
        }
    }

    /// Kinds that were emitted as raw dumps so far
    pub fn unsupported_kinds(&self) -> &HashSet<NodeKind> {
        &self.unsupported
    }

    pub fn generate(&mut self, root: NodeId) -> Fragment {
        self.node(root)
    }

    fn precedence(&self, id: NodeId) -> u8 {
        match &self.tree[id] {
            Node::SequenceExpression { .. } => SEQUENCE,
            Node::AssignmentExpression { .. } => ASSIGN,
            Node::ConditionalExpression { .. } => TERNARY,
            Node::LogicalExpression { operator, .. } if operator == "||" => TERNARY,
            Node::LogicalExpression { .. } => AND,
            Node::BinaryExpression {
                operator, concat, ..
            } => binary_precedence(operator, *concat),
            Node::UnaryExpression { .. } => UNARY,
            Node::UpdateExpression { .. } => UPDATE,
            Node::StringExpression { parts } if parts.len() > 1 => CONCAT,
            _ => ATOM,
        }
    }

    /// `id` in a position that needs at least `min` binding strength
    fn operand(&mut self, id: NodeId, min: u8) -> Fragment {
        let fragment = self.node(id);
        if self.precedence(id) < min {
            parens(fragment)
        } else {
            fragment
        }
    }

    /// Callee or object of an access: closures and `new` need parentheses
    fn target(&mut self, id: NodeId) -> Fragment {
        match self.tree[id] {
            Node::FunctionExpression { .. } | Node::NewExpression { .. } => {
                let fragment = self.node(id);
                parens(fragment)
            }
            _ => self.operand(id, ATOM),
        }
    }

    fn nodes(&mut self, ids: &[NodeId]) -> Vec<Fragment> {
        ids.iter().map(|id| self.node(*id)).collect()
    }

    fn statements(&mut self, ids: &[NodeId]) -> Fragment {
        let mut out = Vec::with_capacity(ids.len() * 2);
        for id in ids {
            out.push(self.node(*id));
            out.push(Token::Newline.into());
        }
        Fragment::Group(out)
    }

    fn block(&mut self, body: &[NodeId]) -> Fragment {
        group![Token::BlockOpen, self.statements(body), Token::BlockClose]
    }

    /// Body of a control statement, braced even when written without braces
    fn body(&mut self, id: NodeId) -> Fragment {
        match &self.tree[id] {
            Node::BlockStatement { body } => self.block(body),
            Node::EmptyStatement => group![Token::BlockOpen, Token::BlockClose],
            _ => self.block(&[id]),
        }
    }

    /// Block body, or `{ return expr; }` for an expression body
    fn function_body(&mut self, id: NodeId) -> Fragment {
        match &self.tree[id] {
            Node::BlockStatement { body } => self.block(body),
            _ => group![
                Token::BlockOpen,
                word("return"),
                Token::Space,
                self.node(id),
                Token::Semi,
                Token::BlockClose,
            ],
        }
    }

    fn params(&mut self, params: &[NodeId]) -> Fragment {
        let params = self.nodes(params);
        list("(", params, ")")
    }

    fn arguments(&mut self, arguments: &[NodeId]) -> Fragment {
        let arguments = self.nodes(arguments);
        list("(", arguments, ")")
    }

    fn visibility(visibility: Option<Visibility>) -> Fragment {
        word(visibility.unwrap_or(Visibility::Public).as_str())
    }

    fn name(&self, id: NodeId) -> String {
        self.tree.name(id).unwrap_or_default().to_string()
    }

    fn unsupported(&mut self, id: NodeId) -> Fragment {
        let kind = self.tree.kind(id);
        if self.unsupported.insert(kind) {
            warn!(%kind, node = %id, "no PHP form for node, emitting a dump");
        }
        word(dump::raw(self.tree, id))
    }

    fn node(&mut self, id: NodeId) -> Fragment {
        let tree = self.tree;
        match &tree[id] {
            Node::Program { body } => self.statements(body),
            Node::NamespaceDeclaration { name } => {
                group![word("namespace"), Token::Space, word(name.as_str()), Token::Semi]
            }
            Node::UseDeclaration { name } => {
                group![word("use"), Token::Space, word(name.as_str()), Token::Semi]
            }
            Node::FunctionDeclaration { id, params, body } => group![
                word("function"),
                Token::Space,
                self.node(*id),
                self.params(params),
                self.function_body(*body),
            ],
            Node::ClassDeclaration {
                id,
                is_abstract,
                extends,
                implements,
                body,
            } => group![
                is_abstract.then(|| group![word("abstract"), Token::Space]),
                word("class"),
                Token::Space,
                self.node(*id),
                extends.map(|parent| group![
                    Token::Space,
                    word("extends"),
                    Token::Space,
                    self.node(parent)
                ]),
                (!implements.is_empty()).then(|| {
                    let names = self.nodes(implements);
                    group![
                        Token::Space,
                        word("implements"),
                        Token::Space,
                        join(names, Token::Comma)
                    ]
                }),
                Token::Space,
                self.block(body),
            ],
            Node::InterfaceDeclaration { id, extends, body } => group![
                word("interface"),
                Token::Space,
                self.node(*id),
                (!extends.is_empty()).then(|| {
                    let names = self.nodes(extends);
                    group![
                        Token::Space,
                        word("extends"),
                        Token::Space,
                        join(names, Token::Comma)
                    ]
                }),
                Token::Space,
                self.block(body),
            ],
            Node::MethodDeclaration {
                id,
                visibility,
                is_static,
                is_abstract,
                params,
                body,
            } => group![
                Self::visibility(*visibility),
                is_abstract.then(|| group![Token::Space, word("abstract")]),
                is_static.then(|| group![Token::Space, word("static")]),
                Token::Space,
                word("function"),
                Token::Space,
                self.node(*id),
                self.params(params),
                match body {
                    Some(body) => self.function_body(*body),
                    None => Token::Semi.into(),
                },
            ],
            Node::InterfaceMethodDeclaration { id, params } => group![
                word("public"),
                Token::Space,
                word("function"),
                Token::Space,
                self.node(*id),
                self.params(params),
                Token::Semi,
            ],
            Node::PropertyDeclaration {
                id,
                visibility,
                is_static,
                value,
            } => group![
                Self::visibility(*visibility),
                Token::Space,
                is_static.then(|| group![word("static"), Token::Space]),
                word(format!("${}", variable_key(&self.name(*id)))),
                value.map(|value| group![Token::op("="), self.node(value)]),
                Token::Semi,
            ],
            Node::ClassConstDeclaration {
                id,
                visibility,
                value,
            } => group![
                visibility.map(|v| group![word(v.as_str()), Token::Space]),
                word("const"),
                Token::Space,
                self.node(*id),
                Token::op("="),
                self.node(*value),
                Token::Semi,
            ],
            Node::FormalParameter { kind, id, default } => group![
                kind.map(|kind| group![self.node(kind), Token::Space]),
                self.node(*id),
                default.map(|default| group![Token::op("="), self.node(default)]),
            ],
            Node::BlockStatement { body } => self.block(body),
            Node::ExpressionStatement { expression } => {
                group![self.node(*expression), Token::Semi]
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => group![
                word("if"),
                parens(self.node(*test)),
                self.body(*consequent),
                alternate.map(|alternate| {
                    let rest = match tree[alternate] {
                        Node::IfStatement { .. } => self.node(alternate),
                        _ => self.body(alternate),
                    };
                    group![word("else"), Token::Space, rest]
                }),
            ],
            Node::WhileStatement { test, body } => {
                group![word("while"), parens(self.node(*test)), self.body(*body)]
            }
            Node::DoWhileStatement { body, test } => group![
                word("do"),
                Token::Space,
                self.body(*body),
                word("while"),
                parens(self.node(*test)),
                Token::Semi,
            ],
            Node::ForStatement {
                init,
                test,
                update,
                body,
            } => group![
                word("for"),
                Token::ListOpen("("),
                init.map(|init| self.node(init)),
                word(";"),
                test.map(|test| group![Token::Space, self.node(test)]),
                word(";"),
                update.map(|update| group![Token::Space, self.node(update)]),
                Token::ListClose(")"),
                self.body(*body),
            ],
            Node::ForEachStatement {
                collection,
                key,
                value,
                body,
            } => group![
                word("foreach"),
                Token::ListOpen("("),
                self.node(*collection),
                Token::Space,
                word("as"),
                Token::Space,
                key.map(|key| group![self.node(key), Token::op("=>")]),
                self.node(*value),
                Token::ListClose(")"),
                self.body(*body),
            ],
            Node::SwitchStatement {
                discriminant,
                cases,
            } => group![
                word("switch"),
                parens(self.node(*discriminant)),
                Token::BlockOpen,
                self.statements(cases),
                Token::BlockClose,
            ],
            Node::SwitchCase { test, consequent } => group![
                match test {
                    Some(test) => group![word("case"), Token::Space, self.node(*test), Token::Colon],
                    None => group![word("default"), Token::Colon],
                },
                self.statements(consequent),
            ],
            Node::TryStatement {
                block,
                handlers,
                finalizer,
            } => group![
                word("try"),
                Token::Space,
                self.body(*block),
                Fragment::Group(self.nodes(handlers)),
                finalizer.map(|finalizer| group![
                    word("finally"),
                    Token::Space,
                    self.body(finalizer)
                ]),
            ],
            Node::CatchClause {
                param_class,
                param,
                body,
            } => group![
                word("catch"),
                parens(group![self.node(*param_class), Token::Space, self.node(*param)]),
                self.body(*body),
            ],
            Node::ThrowStatement { argument } => {
                group![word("throw"), Token::Space, self.node(*argument), Token::Semi]
            }
            Node::ReturnStatement { argument } => group![
                word("return"),
                argument.map(|argument| group![Token::Space, self.node(argument)]),
                Token::Semi,
            ],
            Node::BreakStatement => group![word("break"), Token::Semi],
            Node::ContinueStatement => group![word("continue"), Token::Semi],
            Node::EmptyStatement => Fragment::empty(),
            Node::WhiteSpace => Token::BlankLine.into(),
            Node::SingleLineComment { text, trailing } => {
                let comment = format!("//{text}");
                if *trailing {
                    Token::TrailingComment(comment).into()
                } else {
                    group![word(comment), Token::Newline]
                }
            }
            Node::MultiLineComment { text } => group![word(format!("/*{text}*/")), Token::Newline],

            Node::FunctionExpression { params, body } => {
                let used: Vec<Fragment> = self
                    .captures
                    .used(id)
                    .iter()
                    .map(|name| word(format!("${name}")))
                    .collect();
                group![
                    word("function"),
                    self.params(params),
                    (!used.is_empty()).then(|| group![
                        Token::Space,
                        word("use"),
                        Token::Space,
                        list("(", used, ")")
                    ]),
                    self.function_body(*body),
                ]
            }
            Node::AssignmentExpression {
                operator,
                left,
                right,
                is_static,
            } => group![
                is_static.then(|| group![word("static"), Token::Space]),
                self.node(*left),
                Token::op(operator.as_str()),
                self.operand(*right, ASSIGN),
            ],
            Node::SequenceExpression { expressions } => {
                let expressions = self.nodes(expressions);
                join(expressions, Token::Comma)
            }
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => group![
                self.operand(*test, TERNARY + 1),
                Token::op("?"),
                self.node(*consequent),
                Token::op(":"),
                self.operand(*alternate, TERNARY + 1),
            ],
            Node::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let precedence = self.precedence(id);
                let operator = if operator == "||" { "?:" } else { operator.as_str() };
                group![
                    self.operand(*left, precedence),
                    Token::op(operator),
                    self.operand(*right, precedence + 1),
                ]
            }
            Node::BinaryExpression {
                operator,
                left,
                right,
                concat,
            } => {
                let precedence = self.precedence(id);
                let operator = if *concat { "." } else { operator.as_str() };
                group![
                    self.operand(*left, precedence),
                    Token::op(operator),
                    self.operand(*right, precedence + 1),
                ]
            }
            Node::UnaryExpression { operator, argument } => {
                group![word(operator.as_str()), self.operand(*argument, UNARY + 1)]
            }
            Node::UpdateExpression {
                operator,
                prefix: true,
                argument,
            } => group![word(operator.as_str()), self.target(*argument)],
            Node::UpdateExpression {
                operator, argument, ..
            } => group![self.target(*argument), word(operator.as_str())],
            Node::CallExpression {
                callee,
                arguments,
                parent_method,
            } => {
                let callee = match parent_method {
                    Some(method) => word(format!("parent::{method}")),
                    None => self.target(*callee),
                };
                group![callee, self.arguments(arguments)]
            }
            Node::NewExpression { callee, arguments } => group![
                word("new"),
                Token::Space,
                self.node(*callee),
                self.arguments(arguments),
            ],
            Node::MemberExpression {
                object,
                property,
                access,
                arguments,
            } => self.member(id, *object, *property, *access, arguments.as_deref()),
            Node::ObjectExpression { properties } => {
                let properties = self.nodes(properties);
                list("[", properties, "]")
            }
            Node::Property { key, value } => group![
                key.map(|key| group![self.node(key), Token::op("=>")]),
                self.node(*value),
            ],
            Node::ParenthesizedExpression { expression } => parens(self.node(*expression)),
            Node::StringExpression { parts } => {
                let parts = parts
                    .iter()
                    .map(|part| self.operand(*part, UNARY))
                    .collect();
                join(parts, Token::op("."))
            }
            Node::Literal { value } => word(match value {
                Literal::Number(number) => number.clone(),
                Literal::String { value, quote } => {
                    let quote = quote.as_char();
                    format!("{quote}{value}{quote}")
                }
                Literal::Boolean(value) => value.to_string(),
                Literal::Null => "null".to_string(),
            }),
            Node::Identifier { name } if name == "MUTE" => word("@"),
            Node::Identifier { name } => word(name.as_str()),
            Node::Variable { name } if name.starts_with('@') => self.unsupported(id),
            Node::Variable { name } => word(variable_name(name)),
        }
    }

    fn member(
        &mut self,
        id: NodeId,
        object: NodeId,
        property: Option<NodeId>,
        access: Access,
        arguments: Option<&[NodeId]>,
    ) -> Fragment {
        let call = arguments.map(|arguments| self.arguments(arguments));
        match access {
            Access::Pipe => self.unsupported(id),
            Access::Index => group![
                self.target(object),
                Token::ListOpen("["),
                property.map(|property| self.node(property)),
                Token::ListClose("]"),
                call,
            ],
            Access::Property => {
                let property = property.map(|property| self.node(property));
                group![self.target(object), word("->"), property, call]
            }
            Access::Static => {
                let name = property.map(|property| self.name(property)).unwrap_or_default();
                // Uppercase-first names are class constants, the rest static properties
                let constant = name.starts_with(|c: char| c.is_ascii_uppercase() || c == '$');
                let name = if call.is_some() || constant {
                    name
                } else {
                    format!("${name}")
                };
                group![self.target(object), word("::"), word(name), call]
            }
        }
    }
}
