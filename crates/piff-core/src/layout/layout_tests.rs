use pretty_assertions::assert_eq;

use super::*;

fn word(text: &str) -> Token {
    Token::word(text)
}

fn layout(fragment: Fragment) -> String {
    render(fragment, &PiffConfig::default())
}

#[test]
fn test_statements_end_lines() {
    let out = layout(group![
        word("$a"),
        Token::op("="),
        word("1"),
        Token::Semi,
        word("f"),
        list("(", vec![], ")"),
        Token::Semi,
    ]);
    assert_eq!(out, "$a = 1;\nf();\n");
}

#[test]
fn test_repeated_terminators_are_dropped() {
    let out = layout(group![word("a"), Token::Semi, Token::Semi, word("b"), Token::Semi]);
    assert_eq!(out, "a;\nb;\n");
}

#[test]
fn test_blocks_indent_and_continue() {
    let out = layout(group![
        word("if"),
        list("(", vec![word("$a").into()], ")"),
        Token::BlockOpen,
        word("b"),
        list("(", vec![], ")"),
        Token::Semi,
        Token::BlockClose,
        word("else"),
        Token::Space,
        Token::BlockOpen,
        word("c"),
        list("(", vec![], ")"),
        Token::Semi,
        Token::BlockClose,
    ]);
    assert_eq!(out, "if ($a) {\n  b();\n} else {\n  c();\n}\n");
}

#[test]
fn test_empty_block_stays_on_one_line() {
    let out = layout(group![
        word("function"),
        Token::Space,
        word("f"),
        list("(", vec![], ")"),
        Token::BlockOpen,
        Token::Newline,
        Token::BlockClose,
    ]);
    assert_eq!(out, "function f() {}\n");
}

#[test]
fn test_closure_keeps_its_terminator() {
    let out = layout(group![
        word("$f"),
        Token::op("="),
        word("function"),
        list("(", vec![], ")"),
        Token::BlockOpen,
        Token::BlockClose,
        Token::Semi,
    ]);
    assert_eq!(out, "$f = function () {};\n");
}

#[test]
fn test_wide_list_breaks_per_element() {
    let config = PiffConfig {
        max_line_width: 20,
        ..PiffConfig::default()
    };
    let out = render(
        group![
            word("f"),
            list(
                "(",
                vec![word("aaaaaaaaaa").into(), word("bbbbbbbbbb").into()],
                ")"
            ),
            Token::Semi,
        ],
        &config,
    );
    assert_eq!(out, "f(\n  aaaaaaaaaa,\n  bbbbbbbbbb\n);\n");
}

#[test]
fn test_list_with_block_breaks_when_it_has_two_elements() {
    let closure = group![
        word("function"),
        list("(", vec![word("$x").into()], ")"),
        Token::BlockOpen,
        word("return"),
        Token::Space,
        word("$x"),
        Token::Semi,
        Token::BlockClose,
    ];
    let out = layout(group![
        word("array_map"),
        list("(", vec![closure.clone(), word("$xs").into()], ")"),
        Token::Semi,
    ]);
    assert_eq!(out, "array_map(\n  function ($x) {\n    return $x;\n  },\n  $xs\n);\n");

    let hugged = layout(group![word("f"), list("(", vec![closure], ")"), Token::Semi]);
    assert_eq!(hugged, "f(function ($x) {\n  return $x;\n});\n");
}

#[test]
fn test_trailing_comment_joins_previous_line() {
    let out = layout(group![
        word("$a"),
        Token::Semi,
        Token::TrailingComment("// note".to_string()),
        word("$b"),
        Token::Semi,
    ]);
    assert_eq!(out, "$a; // note\n$b;\n");
}

#[test]
fn test_blank_lines_collapse_to_one() {
    let out = layout(group![
        word("$a"),
        Token::Semi,
        Token::BlankLine,
        Token::BlankLine,
        Token::Newline,
        word("$b"),
        Token::Semi,
    ]);
    assert_eq!(out, "$a;\n\n$b;\n");
}

#[test]
fn test_case_labels_end_lines() {
    let out = layout(group![
        word("case"),
        Token::Space,
        word("1"),
        Token::Colon,
        word("break"),
        Token::Semi,
    ]);
    assert_eq!(out, "case 1:\nbreak;\n");
}

#[test]
fn test_empty_input_renders_nothing() {
    assert_eq!(layout(Fragment::empty()), "");
    assert_eq!(layout(group![Token::Newline, Token::BlankLine]), "");
}

#[test]
fn test_word_contents_pass_through() {
    let out = layout(group![word("$s = \"a   \n\n\n\nb\""), Token::Semi]);
    assert_eq!(out, "$s = \"a   \n\n\n\nb\";\n");
}

#[test]
fn test_separator_space_dropped_at_line_end() {
    let out = layout(group![word("$a"), Token::op("="), Token::Newline, word("1"), Token::Semi]);
    assert_eq!(out, "$a =\n1;\n");
}

#[test]
fn test_comma_before_list_close_is_dropped() {
    let out = layout(group![
        word("f"),
        Token::ListOpen("("),
        word("a"),
        Token::Comma,
        Token::ListClose(")"),
        Token::Semi,
    ]);
    assert_eq!(out, "f(a);\n");
}
