use pretty_assertions::assert_eq;
use primitive_types::U256;
use yul_core::Dialect;
use yul_interpreter::{execute, InterpreterError, InterpreterOptions, MachineState, Termination};
use yul_parser::parse_block;

fn run_with(source: &str, options: InterpreterOptions) -> Result<(Termination, MachineState), InterpreterError> {
    let dialect = Dialect::evm();
    let code = parse_block(source).unwrap();
    execute(&dialect, &code, options)
}

fn run(source: &str) -> (Termination, MachineState) {
    run_with(source, InterpreterOptions::default()).unwrap()
}

fn slot(state: &MachineState, key: u64) -> U256 {
    state.sload(U256::from(key))
}

#[test]
fn test_arithmetic_and_storage() {
    let (termination, state) = run("{ let x := add(1, 2) sstore(0, mul(x, 3)) sstore(1, sub(0, 1)) }");
    assert_eq!(termination, Termination::Finished);
    assert_eq!(slot(&state, 0), U256::from(9));
    assert_eq!(slot(&state, 1), U256::MAX);
}

#[test]
fn test_function_calls_and_multiple_returns() {
    let (_, state) = run(
        "{ let a, b := swap(1, 2) sstore(a, b) function swap(x, y) -> p, q { p := y q := x } }",
    );
    assert_eq!(slot(&state, 2), U256::from(1));
}

#[test]
fn test_functions_are_visible_before_definition() {
    let (_, state) = run("{ sstore(0, f()) function f() -> r { r := 42 } }");
    assert_eq!(slot(&state, 0), U256::from(42));
}

#[test]
fn test_for_loop_with_break_and_continue() {
    let source = "{
        let total := 0
        for { let i := 0 } lt(i, 10) { i := add(i, 1) } {
            if eq(i, 3) { continue }
            if eq(i, 6) { break }
            total := add(total, i)
        }
        sstore(0, total)
    }";
    let (_, state) = run(source);
    // 0 + 1 + 2 + 4 + 5
    assert_eq!(slot(&state, 0), U256::from(12));
}

#[test]
fn test_switch_selects_case_or_default() {
    let source = "{
        for { let i := 0 } lt(i, 3) { i := add(i, 1) } {
            switch i
            case 0 { sstore(i, 10) }
            case 1 { sstore(i, 11) }
            default { sstore(i, 99) }
        }
    }";
    let (_, state) = run(source);
    assert_eq!(slot(&state, 0), U256::from(10));
    assert_eq!(slot(&state, 1), U256::from(11));
    assert_eq!(slot(&state, 2), U256::from(99));
}

#[test]
fn test_leave_exits_function() {
    let (_, state) = run(
        "{ sstore(0, f(1)) sstore(1, f(0)) function f(a) -> r { r := 5 if a { leave } r := 7 } }",
    );
    assert_eq!(slot(&state, 0), U256::from(5));
    assert_eq!(slot(&state, 1), U256::from(7));
}

#[test]
fn test_arguments_evaluated_left_to_right() {
    let (_, state) = run(
        "{ sstore(0, f(bump(), bump())) function bump() -> r { r := add(sload(9), 1) sstore(9, r) } function f(a, b) -> r { r := sub(mul(a, 10), b) } }",
    );
    assert_eq!(slot(&state, 0), U256::from(8));
}

#[test]
fn test_memory_and_return_data() {
    let (termination, _) = run("{ mstore(0, 0x2a) return(31, 1) }");
    assert_eq!(termination, Termination::Returned(vec![0x2a]));
}

#[test]
fn test_revert_halts_execution() {
    let (termination, state) = run("{ sstore(0, 1) revert(0, 0) sstore(1, 1) }");
    assert_eq!(termination, Termination::Reverted(Vec::new()));
    assert_eq!(slot(&state, 0), U256::from(1));
    assert_eq!(slot(&state, 1), U256::zero());
}

#[test]
fn test_calldata_is_readable() {
    let mut calldata = vec![0u8; 32];
    calldata[31] = 7;
    let options = InterpreterOptions {
        calldata,
        ..InterpreterOptions::default()
    };
    let (_, state) = run_with("{ sstore(calldatasize(), calldataload(0)) }", options).unwrap();
    assert_eq!(slot(&state, 32), U256::from(7));
}

#[test]
fn test_logs_are_recorded() {
    let (_, state) = run("{ mstore(0, 1) log1(0, 32, 5) }");
    assert_eq!(state.logs().len(), 1);
    assert_eq!(state.logs()[0].topics, vec![U256::from(5)]);
    assert_eq!(state.logs()[0].data.len(), 32);
}

#[test]
fn test_infinite_loop_hits_step_limit() {
    let options = InterpreterOptions {
        max_steps: 1_000,
        ..InterpreterOptions::default()
    };
    let error = run_with("{ for { } 1 { } { } }", options).unwrap_err();
    assert_eq!(error, InterpreterError::StepLimitExceeded(1_000));
}

#[test]
fn test_unbounded_recursion_overflows() {
    let options = InterpreterOptions {
        max_call_depth: 32,
        ..InterpreterOptions::default()
    };
    let error = run_with("{ pop(f(1)) function f(a) -> r { r := f(a) } }", options).unwrap_err();
    assert_eq!(error, InterpreterError::StackOverflow(32));
}

#[test]
fn test_functions_cannot_see_caller_variables() {
    let error = run_with("{ let x := 1 f() function f() { sstore(0, x) } }", InterpreterOptions::default())
        .unwrap_err();
    assert!(matches!(error, InterpreterError::NameError(_)));
}

#[test]
fn test_object_construction_builtins_are_unsupported() {
    let error = run_with("{ pop(create(0, 0, 0)) }", InterpreterOptions::default()).unwrap_err();
    assert!(matches!(error, InterpreterError::UnsupportedBuiltin(_)));
}
