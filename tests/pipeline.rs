//! End-to-end pipeline tests driving inline source through lex -> parse -> typecheck -> print /
//! emit, in the style of the teacher's one-scenario-per-test `tests/*.rs` files -- but calling the
//! library's public functions directly instead of shelling out to a built binary (SPEC_FULL.md
//! §10.4), since this harness never invokes the Rust toolchain.

use jplc::codegen::c::emit_c;
use jplc::lexer::lex_all;
use jplc::parser::parse_program;
use jplc::printer::print_program;
use jplc::typechecker::typecheck_program;

#[test]
fn lexes_a_show_command_into_expected_tokens() {
    let tokens = lex_all("show 3+4\n").unwrap();
    let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(rendered.first().unwrap(), "SHOW 'show'");
    assert!(rendered.contains(&"OP '+'".to_string()));
    assert_eq!(rendered.last().unwrap(), "END_OF_FILE");
}

#[test]
fn shows_a_simple_arithmetic_expression() {
    let program = parse_program("show 3+4\n").unwrap();
    let (typed, _) = typecheck_program(&program).unwrap();
    assert_eq!(
        print_program(&typed),
        "(ShowCmd (BinopExpr (IntType) (IntExpr (IntType) 3) + (IntExpr (IntType) 4)))"
    );
}

#[test]
fn array_loop_over_two_axes_resolves_to_rank_two_array() {
    let program = parse_program("let m = array[i:3,j:2] i*10+j\nshow m\n").unwrap();
    let (typed, _) = typecheck_program(&program).unwrap();
    let output = print_program(&typed);
    assert!(output.contains("ArrayLoopExpr (ArrayType (IntType) 2)"));
}

#[test]
fn sum_loop_sums_an_axis() {
    let program = parse_program("show sum[i:5] i\n").unwrap();
    let (typed, _) = typecheck_program(&program).unwrap();
    assert!(print_program(&typed).contains("SumLoopExpr (IntType)"));
}

#[test]
fn array_index_with_too_many_indices_is_a_type_error() {
    let program = parse_program("let v = array[i:3] i\nshow v[0,0]\n").unwrap();
    let err = typecheck_program(&program).unwrap_err();
    assert!(err.message.contains("rank") || err.message.to_lowercase().contains("index"));
}

#[test]
fn redeclaring_the_rgba_struct_is_a_type_error() {
    let program = parse_program("struct rgba {\n  r : float\n}\n").unwrap();
    let err = typecheck_program(&program).unwrap_err();
    assert!(err.message.contains("rgba"));
}

#[test]
fn duplicate_struct_field_is_a_type_error() {
    let program = parse_program("struct pair {\n  x : int\n  x : int\n}\n").unwrap();
    let err = typecheck_program(&program).unwrap_err();
    assert!(err.message.to_lowercase().contains("field"));
}

#[test]
fn function_without_return_is_a_type_error_when_return_type_is_not_void() {
    let program = parse_program("fn f() : int {\n  let x = 3\n}\n").unwrap();
    let err = typecheck_program(&program).unwrap_err();
    assert!(err.message.to_lowercase().contains("return"));
}

#[test]
fn fn_with_int_and_float_params_typechecks_and_calls() {
    let src = "fn f(a : int, b : float) : float {\n  return b + to_float(a)\n}\nshow f(3, 1.5)\n";
    let program = parse_program(src).unwrap();
    let (typed, _) = typecheck_program(&program).unwrap();
    assert!(print_program(&typed).contains("(CallExpr (FloatType) f"));
}

#[test]
fn emit_c_produces_a_jpl_main_entry_point() {
    let program = parse_program("show 3+4\n").unwrap();
    let (typed, ctx) = typecheck_program(&program).unwrap();
    let c_src = emit_c(&typed, &ctx);
    assert!(c_src.contains("void jpl_main(struct args"));
    assert!(c_src.contains("_show("));
}

#[test]
fn undeclared_variable_reports_a_compile_error_with_a_source_offset() {
    let program = parse_program("show undeclared_name\n").unwrap();
    let err = typecheck_program(&program).unwrap_err();
    let rendered = err.render("test.jpl", b"show undeclared_name\n");
    assert!(rendered.starts_with("Compilation failed: test.jpl["));
}
