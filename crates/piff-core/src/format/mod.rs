//! Piff pretty-printer.
//!
//! Re-emits a freshly parsed, undesugared tree as Piff tokens and lays them
//! out with the same engine as the PHP generator. Statements end at line
//! breaks; a `;` is kept only where the next statement would otherwise
//! continue the previous one, as in `a; (b)` or `x = a; -b`.


use tracing::debug;

use crate::ast::{Access, Literal, Node, NodeId, Tree, Visibility};
use crate::layout::{self, group, join, list, Fragment, Token};
use crate::parser::parse;
use crate::PiffConfig;

fn word(text: impl Into<String>) -> Fragment {
    Token::word(text).into()
}

fn parens(inner: Fragment) -> Fragment {
    list("(", vec![inner], ")")
}

/// Whether a statement printed as `fragment` would be read as the tail of
/// the statement before it when only a line break separates them
fn continues_statement(fragment: &Fragment) -> bool {
    match fragment.first_token() {
        Some(Token::ListOpen(open)) => matches!(*open, "(" | "["),
        Some(Token::Word(text)) => text.starts_with(['-', '+']),
        _ => false,
    }
}

pub struct PiffPrinter<'a> {
    tree: &'a Tree,
}

impl<'a> PiffPrinter<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    pub fn print(&self, root: NodeId) -> Fragment {
        self.node(root)
    }

    fn nodes(&self, ids: &[NodeId]) -> Vec<Fragment> {
        ids.iter().map(|id| self.node(*id)).collect()
    }

    fn statements(&self, ids: &[NodeId]) -> Fragment {
        let printed = self.nodes(ids);
        let mut terminated = vec![false; ids.len()];
        let mut previous: Option<usize> = None;
        for (i, id) in ids.iter().enumerate() {
            match &self.tree[*id] {
                Node::WhiteSpace => continue,
                Node::SingleLineComment { .. } | Node::MultiLineComment { .. } => {
                    previous = None;
                    continue;
                }
                _ => {}
            }
            if let Some(p) = previous {
                terminated[p] = continues_statement(&printed[i]);
            }
            previous = Some(i);
        }

        let mut out = Vec::with_capacity(ids.len() * 2);
        for (fragment, semi) in printed.into_iter().zip(terminated) {
            out.push(fragment);
            let end = if semi { Token::Semi } else { Token::Newline };
            out.push(end.into());
        }
        Fragment::Group(out)
    }

    fn block(&self, body: &[NodeId]) -> Fragment {
        group![Token::BlockOpen, self.statements(body), Token::BlockClose]
    }

    fn is_block(&self, id: NodeId) -> bool {
        matches!(self.tree[id], Node::BlockStatement { .. })
    }

    /// Body of a control statement as written: a block, `;`, or one statement
    fn body(&self, id: NodeId) -> Fragment {
        match &self.tree[id] {
            Node::BlockStatement { body } => group![Token::Space, self.block(body)],
            Node::EmptyStatement => word(";"),
            _ => group![Token::Space, self.node(id)],
        }
    }

    /// Separator before a keyword that follows a body (`else`, `while`)
    fn after_body(&self, id: NodeId) -> Fragment {
        if self.is_block(id) {
            Fragment::empty()
        } else {
            Token::Space.into()
        }
    }

    fn function_body(&self, id: NodeId) -> Fragment {
        match &self.tree[id] {
            Node::BlockStatement { body } => self.block(body),
            _ => group![Token::Space, self.node(id)],
        }
    }

    fn params(&self, params: &[NodeId]) -> Fragment {
        list("(", self.nodes(params), ")")
    }

    fn modifiers(
        &self,
        visibility: Option<Visibility>,
        is_abstract: bool,
        is_static: bool,
    ) -> Fragment {
        group![
            visibility.map(|v| group![word(v.as_str()), Token::Space]),
            is_abstract.then(|| group![word("abstract"), Token::Space]),
            is_static.then(|| group![word("static"), Token::Space]),
        ]
    }

    fn node(&self, id: NodeId) -> Fragment {
        let tree = self.tree;
        match &tree[id] {
            Node::Program { body } => self.statements(body),
            Node::NamespaceDeclaration { name } => {
                group![word("namespace"), Token::Space, word(name.as_str())]
            }
            Node::UseDeclaration { name } => group![word("use"), Token::Space, word(name.as_str())],
            Node::FunctionDeclaration { id, params, body } => group![
                word("fn"),
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
                (!implements.is_empty()).then(|| group![
                    Token::Space,
                    word("implements"),
                    Token::Space,
                    join(self.nodes(implements), Token::Comma)
                ]),
                Token::Space,
                self.block(body),
            ],
            Node::InterfaceDeclaration { id, extends, body } => group![
                word("interface"),
                Token::Space,
                self.node(*id),
                (!extends.is_empty()).then(|| group![
                    Token::Space,
                    word("extends"),
                    Token::Space,
                    join(self.nodes(extends), Token::Comma)
                ]),
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
                self.modifiers(*visibility, *is_abstract, *is_static),
                self.node(*id),
                self.params(params),
                body.map(|body| self.block_of(body)),
            ],
            Node::InterfaceMethodDeclaration { id, params } => {
                group![self.node(*id), self.params(params)]
            }
            Node::PropertyDeclaration {
                id,
                visibility,
                is_static,
                value,
            } => group![
                self.modifiers(*visibility, false, *is_static),
                self.node(*id),
                value.map(|value| group![Token::op("="), self.node(value)]),
            ],
            Node::ClassConstDeclaration {
                id,
                visibility,
                value,
            } => group![
                self.modifiers(*visibility, false, false),
                self.node(*id),
                Token::op("="),
                self.node(*value),
            ],
            Node::FormalParameter { kind, id, default } => group![
                kind.map(|kind| group![self.node(kind), Token::Space]),
                self.node(*id),
                default.map(|default| group![Token::op("="), self.node(default)]),
            ],
            Node::BlockStatement { body } => self.block(body),
            Node::ExpressionStatement { expression } => self.node(*expression),
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => group![
                word("if"),
                parens(self.node(*test)),
                self.body(*consequent),
                alternate.map(|alternate| group![
                    self.after_body(*consequent),
                    word("else"),
                    self.body(alternate),
                ]),
            ],
            Node::WhileStatement { test, body } => {
                group![word("while"), parens(self.node(*test)), self.body(*body)]
            }
            Node::DoWhileStatement { body, test } => group![
                word("do"),
                Token::Space,
                self.body(*body),
                self.after_body(*body),
                word("while"),
                parens(self.node(*test)),
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
                self.block_of(*block),
                Fragment::Group(self.nodes(handlers)),
                finalizer.map(|finalizer| group![
                    word("finally"),
                    Token::Space,
                    self.block_of(finalizer)
                ]),
            ],
            Node::CatchClause {
                param_class,
                param,
                body,
            } => group![
                word("catch"),
                parens(group![self.node(*param_class), Token::Space, self.node(*param)]),
                self.block_of(*body),
            ],
            Node::ThrowStatement { argument } => {
                group![word("throw"), Token::Space, self.node(*argument)]
            }
            Node::ReturnStatement { argument } => group![
                word("return"),
                argument.map(|argument| group![Token::Space, self.node(argument)]),
            ],
            Node::BreakStatement => word("break"),
            Node::ContinueStatement => word("continue"),
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
                group![word("fn"), self.params(params), self.function_body(*body)]
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
                self.node(*right),
            ],
            Node::SequenceExpression { expressions } => join(self.nodes(expressions), Token::Comma),
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => group![
                self.node(*test),
                Token::op("?"),
                self.node(*consequent),
                Token::op(":"),
                self.node(*alternate),
            ],
            Node::LogicalExpression {
                operator,
                left,
                right,
            }
            | Node::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => group![
                self.node(*left),
                Token::op(operator.as_str()),
                self.node(*right)
            ],
            Node::UnaryExpression { operator, argument } => {
                group![word(operator.as_str()), self.node(*argument)]
            }
            Node::UpdateExpression {
                operator,
                prefix: true,
                argument,
            } => group![word(operator.as_str()), self.node(*argument)],
            Node::UpdateExpression {
                operator, argument, ..
            } => group![self.node(*argument), word(operator.as_str())],
            Node::CallExpression {
                callee, arguments, ..
            } => group![self.node(*callee), list("(", self.nodes(arguments), ")")],
            Node::NewExpression { callee, arguments } => group![
                word("new"),
                Token::Space,
                self.node(*callee),
                list("(", self.nodes(arguments), ")"),
            ],
            Node::MemberExpression {
                object,
                property,
                access,
                arguments,
            } => self.member(*object, *property, *access, arguments.as_deref()),
            Node::ObjectExpression { properties } => list("[", self.nodes(properties), "]"),
            Node::Property { key, value } => group![
                key.map(|key| group![self.node(key), word(":"), Token::Space]),
                self.node(*value),
            ],
            Node::ParenthesizedExpression { expression } => parens(self.node(*expression)),
            Node::StringExpression { parts } => self.interpolated(parts),
            Node::Literal { value } => word(match value {
                Literal::Number(number) => number.clone(),
                Literal::String { value, quote } => {
                    let quote = quote.as_char();
                    format!("{quote}{value}{quote}")
                }
                Literal::Boolean(value) => value.to_string(),
                Literal::Null => "null".to_string(),
            }),
            Node::Identifier { name } | Node::Variable { name } => word(name.as_str()),
        }
    }

    /// A block node printed without the leading space a body gets
    fn block_of(&self, id: NodeId) -> Fragment {
        match &self.tree[id] {
            Node::BlockStatement { body } => self.block(body),
            _ => self.node(id),
        }
    }

    fn member(
        &self,
        object: NodeId,
        property: Option<NodeId>,
        access: Access,
        arguments: Option<&[NodeId]>,
    ) -> Fragment {
        let call = arguments.map(|arguments| list("(", self.nodes(arguments), ")"));
        let property = property.map(|property| self.node(property));
        let sigil = match &self.tree[object] {
            Node::Variable { name } if name == "@" || name == "@@" => Some(name.as_str()),
            _ => None,
        };
        match (access, sigil) {
            (Access::Property, Some("@")) | (Access::Static, Some("@@")) => {
                group![word(sigil.unwrap_or_default()), property, call]
            }
            (Access::Property, _) => group![self.node(object), word("."), property, call],
            (Access::Static, _) => group![self.node(object), word("::"), property, call],
            (Access::Index, _) => group![
                self.node(object),
                Token::ListOpen("["),
                property,
                Token::ListClose("]"),
                call,
            ],
            (Access::Pipe, _) => group![self.node(object), Token::op("|>"), property],
        }
    }

    /// `"text{expr}text"`: literal segments are kept raw
    fn interpolated(&self, parts: &[NodeId]) -> Fragment {
        let mut out = vec![word("\"")];
        for part in parts {
            match &self.tree[*part] {
                Node::Literal {
                    value: Literal::String { value, .. },
                } => out.push(word(value.as_str())),
                _ => out.push(group![word("{"), self.node(*part), word("}")]),
            }
        }
        out.push(word("\""));
        Fragment::Group(out)
    }
}

/// Pretty-print Piff source. Text that does not parse is returned unchanged.
pub fn format_with(source: &str, config: &PiffConfig) -> String {
    match parse(source) {
        Ok(parsed) => {
            let fragment = PiffPrinter::new(&parsed.tree).print(parsed.root);
            layout::render(fragment, config)
        }
        Err(err) => {
            debug!(%err, "not formatting unparsable source");
            source.to_string()
        }
    }
}
