// Piff syntax tree
// Nodes live in an arena owned by `Tree` and are addressed by `NodeId`.
// Rewrites overwrite a slot in place (`Tree::graft`), so a parent that holds
// the handle of a rewritten child sees the new node without being touched.

pub mod dump;


use std::fmt;
use std::ops::Index;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Stable handle to a node stored in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a node in the source text. `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// How a `MemberExpression` reaches its property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    /// `a.b`
    Property,
    /// `a[b]`, or `a[]` when there is no property
    Index,
    /// `A::b`
    Static,
    /// `a |> b(_)`, removed by the compose pass
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    /// Numbers keep their source spelling (`0x1F`, `1.50`)
    Number(String),
    /// String contents are kept raw, escapes included
    String { value: String, quote: Quote },
    Boolean(bool),
    Null,
}

macro_rules! node_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Discriminant of a [`Node`], used for diagnostics and dumps
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum NodeKind {
            $($kind),*
        }

        impl NodeKind {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind)),*
                }
            }
        }
    };
}

node_kinds!(
    Program,
    NamespaceDeclaration,
    UseDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    MethodDeclaration,
    InterfaceMethodDeclaration,
    PropertyDeclaration,
    ClassConstDeclaration,
    FormalParameter,
    BlockStatement,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForEachStatement,
    SwitchStatement,
    SwitchCase,
    TryStatement,
    CatchClause,
    ThrowStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
    WhiteSpace,
    SingleLineComment,
    MultiLineComment,
    FunctionExpression,
    AssignmentExpression,
    SequenceExpression,
    ConditionalExpression,
    LogicalExpression,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    ObjectExpression,
    Property,
    ParenthesizedExpression,
    StringExpression,
    Literal,
    Identifier,
    Variable,
);

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Program {
        body: Vec<NodeId>,
    },

    // Declarations
    NamespaceDeclaration {
        name: String,
    },
    UseDeclaration {
        name: String,
    },
    /// `fn name(params) body`; the body is a block or a single expression
    FunctionDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
    },
    ClassDeclaration {
        id: NodeId,
        is_abstract: bool,
        extends: Option<NodeId>,
        implements: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    InterfaceDeclaration {
        id: NodeId,
        extends: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    /// Abstract methods have no body
    MethodDeclaration {
        id: NodeId,
        visibility: Option<Visibility>,
        is_static: bool,
        is_abstract: bool,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    InterfaceMethodDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
    },
    PropertyDeclaration {
        id: NodeId,
        visibility: Option<Visibility>,
        is_static: bool,
        value: Option<NodeId>,
    },
    ClassConstDeclaration {
        id: NodeId,
        visibility: Option<Visibility>,
        value: NodeId,
    },
    /// `kind id = default`, e.g. `array items = []`
    FormalParameter {
        kind: Option<NodeId>,
        id: NodeId,
        default: Option<NodeId>,
    },

    // Statements
    BlockStatement {
        body: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        body: NodeId,
        test: NodeId,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForEachStatement {
        collection: NodeId,
        key: Option<NodeId>,
        value: NodeId,
        body: NodeId,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    /// `default:` has no test
    SwitchCase {
        test: Option<NodeId>,
        consequent: Vec<NodeId>,
    },
    TryStatement {
        block: NodeId,
        handlers: Vec<NodeId>,
        finalizer: Option<NodeId>,
    },
    CatchClause {
        param_class: NodeId,
        param: NodeId,
        body: NodeId,
    },
    ThrowStatement {
        argument: NodeId,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
    /// A blank line between two statements or members
    WhiteSpace,
    /// `// text`; trailing comments sit on the line of the previous statement
    SingleLineComment {
        text: String,
        trailing: bool,
    },
    MultiLineComment {
        text: String,
    },

    // Expressions
    FunctionExpression {
        params: Vec<NodeId>,
        body: NodeId,
    },
    /// `static x = 1` sets `is_static`
    AssignmentExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
        is_static: bool,
    },
    SequenceExpression {
        expressions: Vec<NodeId>,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    LogicalExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    /// `concat` is set by the string concatenation pass
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
        concat: bool,
    },
    UnaryExpression {
        operator: String,
        argument: NodeId,
    },
    UpdateExpression {
        operator: String,
        prefix: bool,
        argument: NodeId,
    },
    /// `parent_method` is set by the parent call pass on `parent(...)` calls
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
        parent_method: Option<String>,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    /// `arguments` is present when the member is called as a method
    MemberExpression {
        object: NodeId,
        property: Option<NodeId>,
        access: Access,
        arguments: Option<Vec<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    Property {
        key: Option<NodeId>,
        value: NodeId,
    },
    ParenthesizedExpression {
        expression: NodeId,
    },
    /// Interpolated string; literal segments are double-quoted `Literal`s
    StringExpression {
        parts: Vec<NodeId>,
    },
    Literal {
        value: Literal,
    },
    /// A name in non-variable position: function, class, property or type
    Identifier {
        name: String,
    },
    /// A program variable, spelled as written (`$a`, `a`, `@a`, `@@`)
    Variable {
        name: String,
    },
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program { .. } => NodeKind::Program,
            Node::NamespaceDeclaration { .. } => NodeKind::NamespaceDeclaration,
            Node::UseDeclaration { .. } => NodeKind::UseDeclaration,
            Node::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
            Node::ClassDeclaration { .. } => NodeKind::ClassDeclaration,
            Node::InterfaceDeclaration { .. } => NodeKind::InterfaceDeclaration,
            Node::MethodDeclaration { .. } => NodeKind::MethodDeclaration,
            Node::InterfaceMethodDeclaration { .. } => NodeKind::InterfaceMethodDeclaration,
            Node::PropertyDeclaration { .. } => NodeKind::PropertyDeclaration,
            Node::ClassConstDeclaration { .. } => NodeKind::ClassConstDeclaration,
            Node::FormalParameter { .. } => NodeKind::FormalParameter,
            Node::BlockStatement { .. } => NodeKind::BlockStatement,
            Node::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            Node::IfStatement { .. } => NodeKind::IfStatement,
            Node::WhileStatement { .. } => NodeKind::WhileStatement,
            Node::DoWhileStatement { .. } => NodeKind::DoWhileStatement,
            Node::ForStatement { .. } => NodeKind::ForStatement,
            Node::ForEachStatement { .. } => NodeKind::ForEachStatement,
            Node::SwitchStatement { .. } => NodeKind::SwitchStatement,
            Node::SwitchCase { .. } => NodeKind::SwitchCase,
            Node::TryStatement { .. } => NodeKind::TryStatement,
            Node::CatchClause { .. } => NodeKind::CatchClause,
            Node::ThrowStatement { .. } => NodeKind::ThrowStatement,
            Node::ReturnStatement { .. } => NodeKind::ReturnStatement,
            Node::BreakStatement => NodeKind::BreakStatement,
            Node::ContinueStatement => NodeKind::ContinueStatement,
            Node::EmptyStatement => NodeKind::EmptyStatement,
            Node::WhiteSpace => NodeKind::WhiteSpace,
            Node::SingleLineComment { .. } => NodeKind::SingleLineComment,
            Node::MultiLineComment { .. } => NodeKind::MultiLineComment,
            Node::FunctionExpression { .. } => NodeKind::FunctionExpression,
            Node::AssignmentExpression { .. } => NodeKind::AssignmentExpression,
            Node::SequenceExpression { .. } => NodeKind::SequenceExpression,
            Node::ConditionalExpression { .. } => NodeKind::ConditionalExpression,
            Node::LogicalExpression { .. } => NodeKind::LogicalExpression,
            Node::BinaryExpression { .. } => NodeKind::BinaryExpression,
            Node::UnaryExpression { .. } => NodeKind::UnaryExpression,
            Node::UpdateExpression { .. } => NodeKind::UpdateExpression,
            Node::CallExpression { .. } => NodeKind::CallExpression,
            Node::NewExpression { .. } => NodeKind::NewExpression,
            Node::MemberExpression { .. } => NodeKind::MemberExpression,
            Node::ObjectExpression { .. } => NodeKind::ObjectExpression,
            Node::Property { .. } => NodeKind::Property,
            Node::ParenthesizedExpression { .. } => NodeKind::ParenthesizedExpression,
            Node::StringExpression { .. } => NodeKind::StringExpression,
            Node::Literal { .. } => NodeKind::Literal,
            Node::Identifier { .. } => NodeKind::Identifier,
            Node::Variable { .. } => NodeKind::Variable,
        }
    }

    /// Child handles in field order. Optional children are included when
    /// present and lists are flattened in order; scalar fields never appear.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Node::Program { body } | Node::BlockStatement { body } => out.extend(body),
            Node::NamespaceDeclaration { .. }
            | Node::UseDeclaration { .. }
            | Node::BreakStatement
            | Node::ContinueStatement
            | Node::EmptyStatement
            | Node::WhiteSpace
            | Node::SingleLineComment { .. }
            | Node::MultiLineComment { .. }
            | Node::Literal { .. }
            | Node::Identifier { .. }
            | Node::Variable { .. } => {}
            Node::FunctionDeclaration { id, params, body } => {
                out.push(*id);
                out.extend(params);
                out.push(*body);
            }
            Node::ClassDeclaration {
                id,
                extends,
                implements,
                body,
                ..
            } => {
                out.push(*id);
                out.extend(extends);
                out.extend(implements);
                out.extend(body);
            }
            Node::InterfaceDeclaration { id, extends, body } => {
                out.push(*id);
                out.extend(extends);
                out.extend(body);
            }
            Node::MethodDeclaration {
                id, params, body, ..
            } => {
                out.push(*id);
                out.extend(params);
                out.extend(body);
            }
            Node::InterfaceMethodDeclaration { id, params } => {
                out.push(*id);
                out.extend(params);
            }
            Node::PropertyDeclaration { id, value, .. } => {
                out.push(*id);
                out.extend(value);
            }
            Node::ClassConstDeclaration { id, value, .. } => {
                out.push(*id);
                out.push(*value);
            }
            Node::FormalParameter { kind, id, default } => {
                out.extend(kind);
                out.push(*id);
                out.extend(default);
            }
            Node::ExpressionStatement { expression }
            | Node::ParenthesizedExpression { expression } => out.push(*expression),
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.extend(alternate);
            }
            Node::WhileStatement { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            Node::DoWhileStatement { body, test } => {
                out.push(*body);
                out.push(*test);
            }
            Node::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                out.extend(init);
                out.extend(test);
                out.extend(update);
                out.push(*body);
            }
            Node::ForEachStatement {
                collection,
                key,
                value,
                body,
            } => {
                out.push(*collection);
                out.extend(key);
                out.push(*value);
                out.push(*body);
            }
            Node::SwitchStatement {
                discriminant,
                cases,
            } => {
                out.push(*discriminant);
                out.extend(cases);
            }
            Node::SwitchCase { test, consequent } => {
                out.extend(test);
                out.extend(consequent);
            }
            Node::TryStatement {
                block,
                handlers,
                finalizer,
            } => {
                out.push(*block);
                out.extend(handlers);
                out.extend(finalizer);
            }
            Node::CatchClause {
                param_class,
                param,
                body,
            } => {
                out.push(*param_class);
                out.push(*param);
                out.push(*body);
            }
            Node::ThrowStatement { argument } => out.push(*argument),
            Node::ReturnStatement { argument } => out.extend(argument),
            Node::FunctionExpression { params, body } => {
                out.extend(params);
                out.push(*body);
            }
            Node::AssignmentExpression { left, right, .. }
            | Node::LogicalExpression { left, right, .. }
            | Node::BinaryExpression { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            Node::SequenceExpression { expressions } => out.extend(expressions),
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            Node::UnaryExpression { argument, .. } | Node::UpdateExpression { argument, .. } => {
                out.push(*argument)
            }
            Node::CallExpression {
                callee, arguments, ..
            }
            | Node::NewExpression { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments);
            }
            Node::MemberExpression {
                object,
                property,
                arguments,
                ..
            } => {
                out.push(*object);
                out.extend(property);
                if let Some(arguments) = arguments {
                    out.extend(arguments);
                }
            }
            Node::ObjectExpression { properties } => out.extend(properties),
            Node::Property { key, value } => {
                out.extend(key);
                out.push(*value);
            }
            Node::StringExpression { parts } => out.extend(parts),
        }
        out
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            Node::FunctionDeclaration { .. }
                | Node::MethodDeclaration { .. }
                | Node::FunctionExpression { .. }
        )
    }

    /// Parameters of a function-like node
    pub fn params(&self) -> &[NodeId] {
        match self {
            Node::FunctionDeclaration { params, .. }
            | Node::MethodDeclaration { params, .. }
            | Node::InterfaceMethodDeclaration { params, .. }
            | Node::FunctionExpression { params, .. } => params,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Slot {
    node: Node,
    span: Span,
}

/// Arena of nodes for one compilation unit
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node, span: Span) -> NodeId {
        self.slots.push(Slot { node, span });
        NodeId(self.slots.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every allocated handle, including slots no longer reachable from a root
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.slots.len()).map(NodeId)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.slots[id.0].node
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.slots[id.0].node
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.slots[id.0].span
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).children()
    }

    /// Replace the contents of `target` with a copy of `source`'s fields.
    /// `target` keeps its handle and span; child handles become shared with
    /// `source`, which callers leave unreachable.
    pub fn graft(&mut self, target: NodeId, source: NodeId) {
        if target == source {
            return;
        }
        let node = self.slots[source.0].node.clone();
        self.slots[target.0].node = node;
    }

    /// Overwrite `target` with a freshly built node, keeping its handle
    pub fn replace(&mut self, target: NodeId, node: Node) {
        self.slots[target.0].node = node;
    }

    /// Name carried by an `Identifier` or `Variable`
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.get(id) {
            Node::Identifier { name } | Node::Variable { name } => Some(name),
            _ => None,
        }
    }

    /// Follow parentheses down to the wrapped expression
    pub fn unparen(&self, mut id: NodeId) -> NodeId {
        while let Node::ParenthesizedExpression { expression } = self.get(id) {
            id = *expression;
        }
        id
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.get(id)
    }
}

/// Strip the optional `$` sigil so `$a` and `a` name the same variable
pub fn variable_key(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

/// `FOO`, `__DIR__`, `E_ALL`: names emitted without a `$`
pub fn is_constant_name(name: &str) -> bool {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape =
        SHAPE.get_or_init(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("literal pattern"));
    shape.is_match(name) && name.chars().any(|c| c.is_ascii_uppercase())
}
