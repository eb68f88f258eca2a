use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{Access, Literal, Node, NodeKind, Quote};
use crate::parser::parse;

/// Compact rendering of the shapes these passes produce
fn render(tree: &Tree, id: NodeId) -> String {
    let list = |ids: &[NodeId]| {
        ids.iter()
            .map(|id| render(tree, *id))
            .collect::<Vec<_>>()
            .join(", ")
    };
    match &tree[id] {
        Node::Program { body } | Node::BlockStatement { body } => body
            .iter()
            .map(|s| render(tree, *s))
            .collect::<Vec<_>>()
            .join("; "),
        Node::ClassDeclaration { body, .. } => body
            .iter()
            .map(|s| render(tree, *s))
            .collect::<Vec<_>>()
            .join("; "),
        Node::MethodDeclaration { body, .. } => body.map(|b| render(tree, b)).unwrap_or_default(),
        Node::ExpressionStatement { expression } => render(tree, *expression),
        Node::FunctionExpression { body, .. } => format!("fn {{ {} }}", render(tree, *body)),
        Node::CallExpression {
            callee, arguments, ..
        } => format!("{}({})", render(tree, *callee), list(arguments)),
        Node::MemberExpression {
            object,
            property,
            access,
            arguments,
        } => {
            let object = render(tree, *object);
            let property = property.map(|p| render(tree, p)).unwrap_or_default();
            let member = match access {
                Access::Property => format!("{object}->{property}"),
                Access::Static => format!("{object}::{property}"),
                Access::Index => format!("{object}[{property}]"),
                Access::Pipe => format!("{object} |> {property}"),
            };
            match arguments {
                Some(arguments) => format!("{member}({})", list(arguments)),
                None => member,
            }
        }
        Node::AssignmentExpression { left, right, .. } => {
            format!("{} = {}", render(tree, *left), render(tree, *right))
        }
        Node::BinaryExpression {
            operator,
            left,
            right,
            concat,
        } => format!(
            "{} {} {}",
            render(tree, *left),
            if *concat { "." } else { operator.as_str() },
            render(tree, *right)
        ),
        Node::ParenthesizedExpression { expression } => format!("({})", render(tree, *expression)),
        Node::Identifier { name } | Node::Variable { name } => name.clone(),
        Node::Literal {
            value: Literal::Number(number),
        } => number.clone(),
        Node::Literal {
            value: Literal::String { value, quote },
        } => format!("{q}{value}{q}", q = quote.as_char()),
        other => other.kind().to_string(),
    }
}

fn desugared(source: &str) -> String {
    let mut parsed = parse(source).unwrap();
    desugar(&mut parsed.tree, parsed.root).unwrap();
    parent_call::run(&mut parsed.tree, parsed.root);
    render(&parsed.tree, parsed.root)
}

fn compose_error(source: &str) -> ComposeError {
    let mut parsed = parse(source).unwrap();
    compose::run(&mut parsed.tree, parsed.root).unwrap_err()
}

#[test]
fn test_compose_chain() {
    assert_eq!(desugared("a |> b(_) |> c(_) |> d(_)"), "d(c(b(a)))");
}

#[test]
fn test_compose_with_other_arguments() {
    assert_eq!(desugared("list |> map(_, f)"), "map(list, f)");
}

#[test]
fn test_compose_nested_in_argument() {
    assert_eq!(desugared("x |> f(y |> g(_), _)"), "f(g(y), x)");
}

#[test]
fn test_compose_into_method_call() {
    assert_eq!(desugared("a |> b.c(_)"), "b->c(a)");
}

#[test]
fn test_compose_without_placeholder_fails() {
    let err = compose_error("a |> b");
    assert!(matches!(
        err,
        ComposeError::MissingPlaceholder {
            target: NodeKind::Variable,
            ..
        }
    ));
}

#[test]
fn test_compose_with_two_placeholders_fails() {
    let err = compose_error("\na |> b(_, _)");
    match err {
        ComposeError::RepeatedPlaceholder { uses, span, .. } => {
            assert_eq!(uses, 2);
            assert_eq!(span.line, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_placeholder_outside_composition_is_a_variable() {
    assert_eq!(desugared("f(_)"), "f(_)");
}

#[test]
fn test_sigils_in_method() {
    assert_eq!(
        desugared("class A { t() { @x = @; @@y = @@; @go(1); @@make() } }"),
        "this->x = this; self::y = self; this->go(1); self::make()"
    );
}

#[test]
fn test_sigil_in_closure_injects_alias() {
    assert_eq!(
        desugared("class A { A() { f = fn () { print(@t) } } }"),
        "that = this; f = fn { print(that->t) }"
    );
}

#[test]
fn test_static_sigil_in_closure_needs_no_alias() {
    assert_eq!(
        desugared("class A { a() { f = fn () { @@count } } }"),
        "f = fn { self::count }"
    );
}

#[test]
fn test_alias_is_per_method() {
    assert_eq!(
        desugared("class A { a() { fn () { @x } } b() { @y } }"),
        "that = this; fn { that->x }; this->y"
    );
}

#[test]
fn test_top_level_closure_uses_alias_without_injection() {
    assert_eq!(desugared("f = fn () { @x }"), "f = fn { that->x }");
    assert_eq!(
        desugared("f = fn () { @x }\nclass A { a() { @y } }"),
        "f = fn { that->x }; this->y"
    );
}

#[test]
fn test_bare_array_keys_become_strings() {
    let mut parsed = parse("[a: 1]").unwrap();
    desugar(&mut parsed.tree, parsed.root).unwrap();
    let keys: Vec<_> = parsed
        .tree
        .ids()
        .filter_map(|id| match parsed.tree[id] {
            Node::Property { key: Some(key), .. } => Some(parsed.tree[key].clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        keys,
        vec![Node::Literal {
            value: Literal::String {
                value: "a".to_string(),
                quote: Quote::Double,
            }
        }]
    );
}

#[test]
fn test_concat_propagates_up_the_chain() {
    assert_eq!(desugared("1 + \"2\" + 3"), "1 . \"2\" . 3");
}

#[test]
fn test_parenthesized_arithmetic_stays_arithmetic() {
    assert_eq!(desugared("\"1\" + (2 + 3)"), "\"1\" . (2 + 3)");
}

#[test]
fn test_concat_seen_through_parentheses() {
    assert_eq!(desugared("(a + 'x') + b"), "(a . 'x') . b");
}

#[test]
fn test_interpolated_string_marks_concat() {
    assert_eq!(desugared("a + \"{b}\""), "a . StringExpression");
}

#[test]
fn test_numeric_addition_untouched() {
    assert_eq!(desugared("a + b - c"), "a + b - c");
}

#[test]
fn test_parent_call_targets() {
    let mut parsed = parse("class A { A() { parent() } t() { parent(1) } }").unwrap();
    parent_call::run(&mut parsed.tree, parsed.root);
    let targets: Vec<_> = parsed
        .tree
        .ids()
        .filter_map(|id| match &parsed.tree[id] {
            Node::CallExpression { parent_method, .. } => parent_method.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec!["__construct".to_string(), "t".to_string()]);
}

#[test]
fn test_parent_outside_method_is_left_alone() {
    let mut parsed = parse("parent()").unwrap();
    parent_call::run(&mut parsed.tree, parsed.root);
    assert!(parsed.tree.ids().all(|id| !matches!(
        parsed.tree[id],
        Node::CallExpression {
            parent_method: Some(_),
            ..
        }
    )));
}
