use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{Node, NodeId};
use crate::parser::{parse, Parsed};
use crate::passes::desugar;

fn prepared(source: &str) -> Parsed {
    let mut parsed = parse(source).unwrap();
    desugar(&mut parsed.tree, parsed.root).unwrap();
    parsed
}

fn program_needs(source: &str) -> Vec<(String, bool)> {
    let parsed = prepared(source);
    let needs = Needs::compute(&parsed.tree, parsed.root);
    needs
        .get(parsed.root)
        .map(|map| map.iter().map(|(k, v)| (k.clone(), *v)).collect())
        .unwrap_or_default()
}

fn closures(parsed: &Parsed) -> Vec<NodeId> {
    parsed
        .tree
        .ids()
        .filter(|id| matches!(parsed.tree[*id], Node::FunctionExpression { .. }))
        .collect()
}

/// Capture lists of every closure, in source order
fn captures(source: &str) -> Vec<Vec<String>> {
    let parsed = prepared(source);
    let needs = Needs::compute(&parsed.tree, parsed.root);
    let captures = Captures::compute(&parsed.tree, parsed.root, &needs);
    let mut ids = closures(&parsed);
    ids.sort_by_key(|id| parsed.tree.span(*id).start);
    ids.into_iter()
        .map(|id| captures.used(id).to_vec())
        .collect()
}

fn owned(pairs: &[(&str, bool)]) -> Vec<(String, bool)> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_needs_of_empty_program() {
    assert_eq!(program_needs(""), owned(&[]));
}

#[test]
fn test_function_names_are_not_needs() {
    assert_eq!(program_needs("print(\"Hello\")"), owned(&[]));
}

#[test]
fn test_assignment_binds_target() {
    assert_eq!(program_needs("x = 10"), owned(&[("x", true)]));
}

#[test]
fn test_function_hides_parameters() {
    assert_eq!(
        program_needs("test = fn(x) { print (x) }"),
        owned(&[("test", true)])
    );
}

#[test]
fn test_reference_then_binding_is_bound() {
    assert_eq!(
        program_needs("print(a)\na = 1\nprint(b)"),
        owned(&[("a", true), ("b", false)])
    );
}

#[test]
fn test_dollar_spelling_is_the_same_variable() {
    assert_eq!(program_needs("$b = 1\nprint(b)"), owned(&[("b", true)]));
}

#[test]
fn test_member_assignment_binds_only_the_root() {
    assert_eq!(
        program_needs("a[i].b = 1"),
        owned(&[("a", true), ("i", false)])
    );
}

#[test]
fn test_foreach_binds_key_and_value() {
    assert_eq!(
        program_needs("foreach (items as k => v) { print(k, v, extra) }"),
        owned(&[("k", true), ("v", true), ("items", false), ("extra", false)])
    );
}

#[test]
fn test_class_needs_nothing() {
    assert_eq!(program_needs("class A { x = y\n t() { z } }"), owned(&[]));
}

#[test]
fn test_closure_captures_outer_binding() {
    assert_eq!(
        captures("b = 1; x = fn(a) { return a + b }"),
        vec![vec!["b".to_string()]]
    );
}

#[test]
fn test_closure_ignores_its_own_locals() {
    assert_eq!(
        captures("x = 10; test = fn () { z = 20\nprint(x) }"),
        vec![vec!["x".to_string()]]
    );
}

#[test]
fn test_nested_closures_propagate_captures() {
    assert_eq!(
        captures("x = 10\ntest = fn () {\n z = 20\n y = fn () {\n print(x)\n print(z)\n }\n}"),
        vec![
            vec!["x".to_string()],
            vec!["x".to_string(), "z".to_string()]
        ]
    );
}

#[test]
fn test_dynamic_property_name_is_captured() {
    assert_eq!(
        captures("$b = \"a\"; a = 1; f = fn () { return a.$b() }"),
        vec![vec!["a".to_string(), "b".to_string()]]
    );
    assert_eq!(
        captures("b = 1; f = fn (o) { return o.b }"),
        vec![Vec::<String>::new()]
    );
}

#[test]
fn test_unbound_names_are_not_captured() {
    assert_eq!(captures("f = fn () { print(nowhere) }"), vec![Vec::<String>::new()]);
}

#[test]
fn test_closure_captures_outer_instance_alias() {
    assert_eq!(
        captures("class A { a() { f = fn () { print(@t) } } }"),
        vec![vec!["that".to_string()]]
    );
}

#[test]
fn test_parameters_are_in_scope_of_inner_closures() {
    assert_eq!(
        captures("fn outer(a) { return fn () { return a } }"),
        vec![vec!["a".to_string()]]
    );
}

#[test]
fn test_scope_lists_bound_names() {
    let parsed = prepared("x = 1\nfn f(a) { y = 2 }");
    let needs = Needs::compute(&parsed.tree, parsed.root);
    let captures = Captures::compute(&parsed.tree, parsed.root, &needs);
    assert_eq!(captures.scope(parsed.root), ["x".to_string()]);
}
