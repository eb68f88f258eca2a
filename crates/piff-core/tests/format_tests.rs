use piff_core::{format, format_with, transpile, PiffConfig};
use pretty_assertions::assert_eq;

const FUNCTIONS: &str = r#"fn hello(){print("Hello, World!")}
hello()
fn add(a,b)  a+b

x1=10
test=fn(){return x1}
print(add(1,2))
"#;

const OO: &str = r#"fn println(msg) { print(msg + "\n") }

class Root {}

class Test extends Root implements Serializable {
  sum = 0
  static val = 10
  add10() {
    x = fn () { println("anonymous functions work in methods too") }
    x()
    return @add(10)
  }
  private priv(a, b) { println("here?") }
  add(n) { return @sum += n }
  static blah() { println("static blah") }
  blah2() { @@blah() }
}

t = new Test()
t.add10()
"#;

const CONTROL_FLOW: &str = r#"// loops
for (i = 0; i < 10; i++) { println(i) }
foreach (items as key => item) {
  if (item > 2) continue
  total += item
}
while (x < 10) x++
switch (mode) {
  case "a":
    run()
    break
  default:
    stop()
}
try { risky() } catch (Exception e) { println(e.getMessage()) }
"#;

#[test]
fn test_functions_program_is_normalized() {
    assert_eq!(
        format(FUNCTIONS),
        "fn hello() {\n  print(\"Hello, World!\")\n}\nhello()\nfn add(a, b) a + b\n\nx1 = 10\ntest = fn () {\n  return x1\n}\nprint(add(1, 2))\n"
    );
}

#[test]
fn test_formatting_is_idempotent_on_programs() {
    for source in [FUNCTIONS, OO, CONTROL_FLOW] {
        let once = format(source);
        assert_eq!(format(&once), once);
    }
}

#[test]
fn test_formatting_does_not_change_compiled_output() {
    for source in [FUNCTIONS, OO, CONTROL_FLOW] {
        assert_eq!(
            transpile(&format(source)).unwrap(),
            transpile(source).unwrap()
        );
    }
}

#[test]
fn test_output_ends_with_one_newline() {
    for source in [FUNCTIONS, OO, CONTROL_FLOW] {
        let formatted = format(source);
        assert!(formatted.ends_with('\n'));
        assert!(!formatted.ends_with("\n\n"));
    }
}

#[test]
fn test_narrow_width_breaks_argument_lists() {
    let config = PiffConfig {
        max_line_width: 16,
        ..PiffConfig::default()
    };
    assert_eq!(
        format_with("call(first, second, third)", &config),
        "call(\n  first,\n  second,\n  third\n)\n"
    );
}

#[test]
fn test_invalid_source_passes_through() {
    let broken = "class {\n  oops(\n";
    assert_eq!(format(broken), broken);
}

#[test]
fn test_statement_boundaries_survive_formatting() {
    for source in ["a; (b)", "x = a; -b", "x = 1; +y", "f(); [1, 2]", "a; (b)\n\nc; -d"] {
        let once = format(source);
        assert_eq!(
            transpile(&once).unwrap(),
            transpile(source).unwrap(),
            "source: {source:?}"
        );
        assert_eq!(format(&once), once, "source: {source:?}");
    }
}

#[test]
fn test_multi_line_literal_survives_formatting() {
    let source = "s = \"a   \nb\"\n/* keep   \n   this */\n";
    assert_eq!(format(source), source);
    assert_eq!(
        transpile(&format(source)).unwrap(),
        "$s = \"a   \nb\";\n/* keep   \n   this */\n"
    );
}
