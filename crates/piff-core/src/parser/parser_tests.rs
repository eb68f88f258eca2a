use pretty_assertions::assert_eq;

use super::*;
use crate::ast::dump::type_tree;
use crate::ast::{Access, Literal, Node, Quote};

fn kinds(source: &str) -> Vec<String> {
    let parsed = parse(source).unwrap();
    type_tree(&parsed.tree, parsed.root)
}

fn body(parsed: &Parsed) -> Vec<NodeId> {
    match &parsed.tree[parsed.root] {
        Node::Program { body } => body.clone(),
        other => panic!("expected a program, got {other:?}"),
    }
}

fn expression(parsed: &Parsed, index: usize) -> NodeId {
    match parsed.tree[body(parsed)[index]] {
        Node::ExpressionStatement { expression } => expression,
        ref other => panic!("expected an expression statement, got {other:?}"),
    }
}

#[test]
fn test_parse_assignment() {
    assert_eq!(
        kinds("a = 1"),
        vec![
            "Program",
            "  ExpressionStatement",
            "    AssignmentExpression",
            "      Variable",
            "      Literal",
        ]
    );
}

#[test]
fn test_statements_split_on_newlines_and_semicolons() {
    let parsed = parse("a = 1; b = 2\nc()").unwrap();
    assert_eq!(body(&parsed).len(), 3);
}

#[test]
fn test_blank_line_becomes_whitespace_node() {
    assert_eq!(
        kinds("a()\n\nb()"),
        vec![
            "Program",
            "  ExpressionStatement",
            "    CallExpression",
            "      Identifier",
            "  WhiteSpace",
            "  ExpressionStatement",
            "    CallExpression",
            "      Identifier",
        ]
    );
}

#[test]
fn test_trailing_comment_detection() {
    let parsed = parse("a() // same line\n// own line").unwrap();
    let statements = body(&parsed);
    assert_eq!(
        parsed.tree[statements[1]],
        Node::SingleLineComment {
            text: " same line".to_string(),
            trailing: true,
        }
    );
    assert_eq!(
        parsed.tree[statements[2]],
        Node::SingleLineComment {
            text: " own line".to_string(),
            trailing: false,
        }
    );
}

#[test]
fn test_keyword_prefix_is_a_name() {
    let parsed = parse("returnValue = 1\nreturn returnValue").unwrap();
    let statements = body(&parsed);
    assert_eq!(parsed.tree.kind(statements[0]).as_str(), "ExpressionStatement");
    assert_eq!(parsed.tree.kind(statements[1]).as_str(), "ReturnStatement");
}

#[test]
fn test_pipe_is_left_associative() {
    assert_eq!(
        kinds("a |> b(_) |> c(_)"),
        vec![
            "Program",
            "  ExpressionStatement",
            "    MemberExpression",
            "      MemberExpression",
            "        Variable",
            "        CallExpression",
            "          Identifier",
            "          Variable",
            "      CallExpression",
            "        Identifier",
            "        Variable",
        ]
    );
}

#[test]
fn test_sigil_call_is_a_method_call() {
    let parsed = parse("@t(1)").unwrap();
    let member = expression(&parsed, 0);
    let Node::MemberExpression {
        object,
        property,
        access,
        arguments,
    } = &parsed.tree[member]
    else {
        panic!("expected a member expression");
    };
    assert_eq!(parsed.tree.name(*object), Some("@"));
    assert_eq!(property.and_then(|p| parsed.tree.name(p)), Some("t"));
    assert_eq!(*access, Access::Property);
    assert_eq!(arguments.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_static_sigil_call() {
    let parsed = parse("@@make()").unwrap();
    let member = expression(&parsed, 0);
    assert!(matches!(
        parsed.tree[member],
        Node::MemberExpression {
            access: Access::Static,
            arguments: Some(_),
            ..
        }
    ));
}

#[test]
fn test_bare_sigils_are_variables() {
    let parsed = parse("@x\n@@\n@").unwrap();
    let names: Vec<_> = (0..3)
        .map(|i| parsed.tree.name(expression(&parsed, i)).map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec![
            Some("@x".to_string()),
            Some("@@".to_string()),
            Some("@".to_string())
        ]
    );
}

#[test]
fn test_static_access_uses_identifier_object() {
    let parsed = parse("A::b()").unwrap();
    let member = expression(&parsed, 0);
    let Node::MemberExpression { object, .. } = parsed.tree[member] else {
        panic!("expected a member expression");
    };
    assert_eq!(parsed.tree.kind(object).as_str(), "Identifier");
}

#[test]
fn test_interpolated_string() {
    assert_eq!(
        kinds(r#""a{b}c""#),
        vec![
            "Program",
            "  ExpressionStatement",
            "    StringExpression",
            "      Literal",
            "      Variable",
            "      Literal",
        ]
    );
}

#[test]
fn test_plain_strings_keep_quote_style() {
    let parsed = parse("'a'\n\"b\"").unwrap();
    assert_eq!(
        parsed.tree[expression(&parsed, 0)],
        Node::Literal {
            value: Literal::String {
                value: "a".to_string(),
                quote: Quote::Single,
            }
        }
    );
    assert_eq!(
        parsed.tree[expression(&parsed, 1)],
        Node::Literal {
            value: Literal::String {
                value: "b".to_string(),
                quote: Quote::Double,
            }
        }
    );
}

#[test]
fn test_array_keys() {
    assert_eq!(
        kinds("[a: 1, 'b': 2, 3]"),
        vec![
            "Program",
            "  ExpressionStatement",
            "    ObjectExpression",
            "      Property",
            "        Identifier",
            "        Literal",
            "      Property",
            "        Literal",
            "        Literal",
            "      Property",
            "        Literal",
        ]
    );
}

#[test]
fn test_class_members() {
    assert_eq!(
        kinds("abstract class A extends B implements C {\n  X = 1\n  private static y = 2\n  abstract f()\n  g(array a = []) { @y }\n}"),
        vec![
            "Program",
            "  ClassDeclaration",
            "    Identifier",
            "    Identifier",
            "    Identifier",
            "    ClassConstDeclaration",
            "      Identifier",
            "      Literal",
            "    PropertyDeclaration",
            "      Variable",
            "      Literal",
            "    MethodDeclaration",
            "      Identifier",
            "    MethodDeclaration",
            "      Identifier",
            "      FormalParameter",
            "        Identifier",
            "        Variable",
            "        ObjectExpression",
            "      BlockStatement",
            "        ExpressionStatement",
            "          Variable",
        ]
    );
}

#[test]
fn test_interface() {
    assert_eq!(
        kinds("interface I extends J { A = 1; a(x) }"),
        vec![
            "Program",
            "  InterfaceDeclaration",
            "    Identifier",
            "    Identifier",
            "    ClassConstDeclaration",
            "      Identifier",
            "      Literal",
            "    InterfaceMethodDeclaration",
            "      Identifier",
            "      FormalParameter",
            "        Variable",
        ]
    );
}

#[test]
fn test_control_flow() {
    assert_eq!(
        kinds("if (a) b() else { c() }\nforeach (xs as k => v) {}\nfor (i = 0; i < 3; i++) {}"),
        vec![
            "Program",
            "  IfStatement",
            "    Variable",
            "    ExpressionStatement",
            "      CallExpression",
            "        Identifier",
            "    BlockStatement",
            "      ExpressionStatement",
            "        CallExpression",
            "          Identifier",
            "  ForEachStatement",
            "    Variable",
            "    Variable",
            "    Variable",
            "    BlockStatement",
            "  ForStatement",
            "    AssignmentExpression",
            "      Variable",
            "      Literal",
            "    BinaryExpression",
            "      Variable",
            "      Literal",
            "    UpdateExpression",
            "      Variable",
            "    BlockStatement",
        ]
    );
}

#[test]
fn test_switch_and_try() {
    assert_eq!(
        kinds("switch (a) { case 1: b() break\n default: c() }\ntry { a() } catch (E e) { b() } finally { c() }"),
        vec![
            "Program",
            "  SwitchStatement",
            "    Variable",
            "    SwitchCase",
            "      Literal",
            "      ExpressionStatement",
            "        CallExpression",
            "          Identifier",
            "      BreakStatement",
            "    SwitchCase",
            "      ExpressionStatement",
            "        CallExpression",
            "          Identifier",
            "  TryStatement",
            "    BlockStatement",
            "      ExpressionStatement",
            "        CallExpression",
            "          Identifier",
            "    CatchClause",
            "      Identifier",
            "      Variable",
            "      BlockStatement",
            "        ExpressionStatement",
            "          CallExpression",
            "            Identifier",
            "    BlockStatement",
            "      ExpressionStatement",
            "        CallExpression",
            "          Identifier",
        ]
    );
}

#[test]
fn test_expression_bodied_function() {
    assert_eq!(
        kinds("fn twice(x) x * 2"),
        vec![
            "Program",
            "  FunctionDeclaration",
            "    Identifier",
            "    FormalParameter",
            "      Variable",
            "    BinaryExpression",
            "      Variable",
            "      Literal",
        ]
    );
}

#[test]
fn test_static_variable() {
    let parsed = parse("fn f() { static count = 0 }").unwrap();
    let found = parsed.tree.ids().any(|id| {
        matches!(
            parsed.tree[id],
            Node::AssignmentExpression {
                is_static: true,
                ..
            }
        )
    });
    assert!(found);
}

#[test]
fn test_precedence() {
    assert_eq!(
        kinds("a = b || c && d == e + f * g"),
        vec![
            "Program",
            "  ExpressionStatement",
            "    AssignmentExpression",
            "      Variable",
            "      LogicalExpression",
            "        Variable",
            "        LogicalExpression",
            "          Variable",
            "          BinaryExpression",
            "            Variable",
            "            BinaryExpression",
            "              Variable",
            "              BinaryExpression",
            "                Variable",
            "                Variable",
        ]
    );
}

#[test]
fn test_syntax_error_position() {
    let err = parse("a = 1\nb = )").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 5);
}

#[test]
fn test_invalid_assignment_target() {
    let err = parse("1 = 2").unwrap_err();
    assert!(err.message.contains("cannot assign to Literal"));
}

#[test]
fn test_snippet_points_at_column() {
    let err = ParseError::new("boom", 2, 3);
    assert_eq!(err.snippet("ab\ncdef"), "2 | cdef\n      ^");
}

#[test]
fn test_statement_spans_stop_at_their_last_token() {
    let parsed = parse("a()\n\nb()").unwrap();
    let statements = body(&parsed);
    assert_eq!(parsed.tree.span(statements[0]).end, 3);
    assert_eq!(parsed.tree.kind(statements[1]).as_str(), "WhiteSpace");
}

#[test]
fn test_own_line_comment_after_expression_is_not_trailing() {
    let parsed = parse("x = a\n// note\nb").unwrap();
    let statements = body(&parsed);
    assert_eq!(
        parsed.tree[statements[1]],
        Node::SingleLineComment {
            text: " note".to_string(),
            trailing: false,
        }
    );
}
