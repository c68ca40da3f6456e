//! Table-driven parser tests.
//!
//! Statements are parsed inside a wrapper circuit and compared through
//! their debug rendering; error cases check the error category, message
//! and where it points.

use booleang_core::dsl::{parse, Lexer, Parser, Statement, ANONYMOUS_FILE};
use booleang_core::{ParseError, ParseErrorKind};
use rstest::rstest;

fn parse_body(body: &str) -> Result<Vec<Statement>, ParseError> {
    let source = format!("circuit main {{\n{}\n}}", body);
    parse(&source, "case.bl").map(|mut program| program.circuits.remove(0).statements)
}

#[rstest]
#[case::call("add (a, b) -> (c);", "<call add (a, b) -> (c)>")]
#[case::call_no_outputs("show (%bits);", "<call show (%bits) -> ()>")]
#[case::call_empty_inputs("reset () -> (%word);", "<call reset () -> (%word)>")]
#[case::call_trailing_comma("add (a, b,) -> (c,);", "<call add (a, b) -> (c)>")]
#[case::macro_stmt("%num (a0, a1, a2, a3);", "<macro num (a0, a1, a2, a3)>")]
#[case::pipe_ident("a -> b;", "<pipe (a) -> (b)>")]
#[case::pipe_bits("(0, 1) -> (x, y);", "<pipe (<bit 0>, <bit 1>) -> (x, y)>")]
#[case::pipe_prefix("¬a -> a;", "<pipe (¬a) -> (a)>")]
#[case::pipe_macro("%in ⊻ %key -> (%out);", "<pipe ((%in ⊻ %key)) -> (%out)>")]
#[case::right_nesting("a & b | c -> q;", "<pipe ((a & (b | c))) -> (q)>")]
#[case::grouping("(a & b) | c -> q;", "<pipe (((a & b) | c)) -> (q)>")]
#[case::nested_group("f ((a ∨ b) ∧ !c);", "<call f (((a ∨ b) ∧ !c)) -> ()>")]
#[case::clock("clock 10 ms { a -> b; }", "<clock 10ms () [<pipe (a) -> (b)>]>")]
#[case::clock_counter("clock 1 s %t { !a -> a; }", "<clock 1s (t) [<pipe (!a) -> (a)>]>")]
#[case::clock_minutes("clock 3m {}", "<clock 3m () []>")]
#[case::clock_float_integral("clock 2.0 h {}", "<clock 2h () []>")]
#[case::clock_exact_nanos("clock 9007199254740993 ns {}", "<clock 9007199254740993ns () []>")]
#[case::grouped_single_input("(a) & b -> c;", "<pipe ((a & b)) -> (c)>")]
fn parses_statement(#[case] body: &str, #[case] expected: &str) {
    let statements = parse_body(body).unwrap();
    assert_eq!(statements.len(), 1, "expected one statement in {:?}", statements);
    assert_eq!(statements[0].to_string(), expected);
}

#[rstest]
#[case::missing_close_paren("add (a, b -> (c);", ParseErrorKind::Structural, "expected ), got ->", (2, 11))]
#[case::missing_semi("a -> b", ParseErrorKind::Structural, "expected ;, got }", (3, 1))]
#[case::bad_bit("(0, 7) -> (a, b);", ParseErrorKind::Semantic, "a bit literal must be 0 or 1, got 7", (2, 5))]
#[case::fractional_delay("clock 0.5 s {}", ParseErrorKind::Semantic, "clock delay must be a whole, non-negative number, got 0.5", (2, 7))]
#[case::unknown_unit("clock 5 weeks {}", ParseErrorKind::Semantic, "unknown time unit `weeks`, expected one of ns, ms, s, m, h", (2, 9))]
#[case::missing_param("(a) -> (b, ,);", ParseErrorKind::Structural, "unexpected token ',' where a parameter was expected", (2, 12))]
#[case::macro_param_without_name("%m (a, %);", ParseErrorKind::Structural, "expected identifier, got )", (2, 9))]
#[case::bad_statement_start("-> a;", ParseErrorKind::Structural, "unexpected token '->' at the start of a statement", (2, 1))]
#[case::bad_expression("f (;);", ParseErrorKind::Structural, "unexpected token ';' in expression", (2, 4))]
#[case::one_element_list_then_infix("(a,) & b -> c;", ParseErrorKind::Structural, "expected ->, got infix", (2, 6))]
#[case::illegal_char("a -> b; @", ParseErrorKind::Lexical, "illegal token found: `@`", (2, 9))]
fn rejects_statement(
    #[case] body: &str,
    #[case] kind: ParseErrorKind,
    #[case] message: &str,
    #[case] at: (usize, usize),
) {
    let err = parse_body(body).unwrap_err();
    assert_eq!(err.kind, kind);
    assert_eq!(err.message, message);
    assert_eq!((err.range.start.line, err.range.start.col), at);
    assert_eq!(&*err.range.start.file, "case.bl");
}

#[test]
fn program_name_defaults_to_unnamed() {
    let program = parse("circuit main {}", "p.bl").unwrap();
    assert_eq!(program.name, "unnamed");

    let program = parse("name: 'counter';\ncircuit main {}", "p.bl").unwrap();
    assert_eq!(program.name, "counter");
}

#[test]
fn empty_source_is_an_empty_program() {
    let program = parse("# just a comment\n", "p.bl").unwrap();
    assert!(program.circuits.is_empty());
    assert!(program.includes.is_empty());
}

#[test]
fn full_program_renders() {
    let source = r#"
        name: "adder";
        include name "std";

        circuit half_add (a, b) -> (sum, carry) {
            a ⊻ b -> sum;
            a ∧ b -> carry;
        }

        circuit main {
            clock 500 ms %tick {
                half_add (n0, 1) -> (n0, c);
            }
        }
    "#;

    let program = parse(source, "adder.bl").unwrap();
    assert_eq!(
        program.to_string(),
        "{adder, includes [name:\"std\"]\n\
         half_add (a, b) -> (sum, carry) {<pipe ((a ⊻ b)) -> (sum)>; <pipe ((a ∧ b)) -> (carry)>}\n\
         main () -> () {<clock 500ms (tick) [<call half_add (n0, <bit 1>) -> (n0, c)>]>}}"
    );
}

#[test]
fn every_error_is_kept_on_the_parser() {
    let source = "circuit main { a -> b; $ }\n";
    let mut parser = Parser::new(Lexer::new(source, "all.bl"));

    let first = parser.parse().unwrap_err();
    let all = parser.errors();

    assert_eq!(first, all[0]);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].kind, ParseErrorKind::Lexical);
    assert_eq!(all[1].message, "unexpected token 'illegal' at the start of a statement");
}

#[test]
fn unnamed_source_uses_placeholder_file() {
    let err = parse("circuit main { a -> b }", "").unwrap_err();
    assert_eq!(&*err.range.start.file, ANONYMOUS_FILE);
    assert_eq!(
        err.to_string(),
        "{* Parse Error @ [<input> 1:23-1:23] *} expected ;, got }"
    );
}

#[test]
fn error_display_matches_cli_format() {
    let err = parse("circuit main { a -> b }", "main.bl").unwrap_err();
    assert_eq!(
        err.to_string(),
        "{* Parse Error @ [main.bl 1:23-1:23] *} expected ;, got }"
    );
}
