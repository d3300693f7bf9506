use super::*;
use crate::cost::CostWeights;
use crate::passes::inline::NoEarlyExit;
use pretty_assertions::assert_eq;
use yul_parser::parse_block;

fn run_with(source: &str, settings: InlinerSettings) -> Result<(Block, InlinerStats)> {
    let dialect = Dialect::evm();
    let weights = CostWeights::default();
    let mut code = parse_block(source).unwrap();
    let mut dispenser = NameDispenser::for_block(&dialect, &code);
    let estimator = CostEstimator::new(&dialect, &weights);
    let driver = InlinerDriver::new(
        &dialect,
        &settings,
        estimator,
        &NoEarlyExit,
        &mut dispenser,
        &code,
    )?;
    let stats = driver.run(&mut code)?;

    let measured = CostEstimator::new(&dialect, &weights).block_size(&code);
    assert_eq!(measured.get(), stats.final_size, "guard out of sync with program size");
    Ok((code, stats))
}

fn run(source: &str) -> (Block, InlinerStats) {
    run_with(source, InlinerSettings::default()).unwrap()
}

fn is_internal(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<yul_core::Error>()
        .map(yul_core::Error::is_internal)
        .unwrap_or(false)
}

#[test]
fn test_single_use_declaration() {
    let (code, stats) = run("{ let x := f(2) function f(a) -> b { b := add(a, 1) } }");
    let expected = "{
    let b_1 := 0
    {
        b_1 := add(2, 1)
    }
    let x := b_1
    function f(a) -> b {
        b := add(a, 1)
    }
}";
    assert_eq!(code.to_string(), expected);
    assert_eq!(stats.inlined, 1);
    assert_eq!(stats.inlined_single_use, 1);
    assert_eq!(stats.final_size, 13);
}

#[test]
fn test_expression_statement_call() {
    let (code, stats) = run("{ f(7) function f(a) { sstore(a, a) } }");
    let expected = "{
    {
        sstore(7, 7)
    }
    function f(a) {
        sstore(a, a)
    }
}";
    assert_eq!(code.to_string(), expected);
    assert_eq!(stats.inlined, 1);
}

#[test]
fn test_multiple_return_values_are_split() {
    let (code, stats) = run(
        "{ let x, y := g() x, y := g() function g() -> a, b { a := 1 b := 2 } }",
    );
    let printed = code.to_string();
    assert_eq!(stats.inlined, 2);
    assert!(printed.contains("let x := a_1\n    let y := b_2"));
    assert!(printed.contains("x := a_3\n    y := b_4"));
}

#[test]
fn test_earlier_effectful_argument_is_hoisted() {
    let (code, stats) = run("{ sstore(mload(0), f(1)) function f(a) -> b { b := a } }");
    let expected = "{
    let expr_2 := mload(0)
    let b_1 := 0
    {
        b_1 := 1
    }
    sstore(expr_2, b_1)
    function f(a) -> b {
        b := a
    }
}";
    assert_eq!(code.to_string(), expected);
    assert_eq!(stats.hoisted_arguments, 1);
    assert_eq!(stats.final_size, 13);
}

#[test]
fn test_movable_earlier_argument_stays() {
    let (code, stats) = run("{ sstore(add(x, 1), f(1)) function f(a) -> b { b := a } }");
    assert_eq!(stats.hoisted_arguments, 0);
    assert!(code.to_string().contains("sstore(add(x, 1), b_1)"));
}

#[test]
fn test_for_condition_is_not_inlined() {
    let source = "{ for { } f(1) { } { } function f(a) -> b { b := a } }";
    let (code, stats) = run(source);
    assert_eq!(stats.inlined, 0);
    assert_eq!(code, parse_block(source).unwrap());
}

#[test]
fn test_calls_in_loop_bodies_are_inlined() {
    let (code, stats) = run(
        "{ for { let i := 0 } lt(i, 3) { i := add(i, 1) } { sstore(i, f(i)) } function f(a) -> b { b := mul(a, 2) } }",
    );
    assert_eq!(stats.inlined, 1);
    assert!(code.to_string().contains("b_1 := mul(i, 2)"));
}

#[test]
fn test_leave_is_ineligible() {
    let (_, stats) = run("{ let x := f(1) function f(a) -> b { if a { leave } b := 2 } }");
    assert_eq!(stats.inlined, 0);
    assert_eq!(stats.skipped(SkipReason::Ineligible), 1);
}

#[test]
fn test_self_recursion_terminates() {
    let (_, stats) = run("{ let x := f(3) function f(a) -> b { b := f(a) } }");
    assert_eq!(stats.inlined, 0);
    assert_eq!(stats.skipped(SkipReason::TooLarge), 1);
    assert_eq!(stats.skipped(SkipReason::RecursionDepth), 1);
}

#[test]
fn test_mutual_recursion_terminates() {
    let (code, stats) = run(
        "{ let x := f(3) function f(a) -> b { b := g(a) } function g(c) -> d { d := f(c) } }",
    );
    // g is called once, so its body is copied into f; the copy's call back
    // into f is cut off by the recursion bound.
    assert_eq!(stats.inlined, 1);
    assert_eq!(stats.skipped(SkipReason::RecursionDepth), 1);
    assert_eq!(stats.skipped(SkipReason::TooLarge), 2);
    assert!(code.to_string().contains("d_1 := f(a)"));
}

#[test]
fn test_calls_inside_functions() {
    let (code, stats) = run(
        "{ sstore(0, g(1)) function g(a) -> r { r := f(a) } function f(x) -> y { y := mul(x, 2) } }",
    );
    // g into the main code, then f into that copy and into g itself
    assert_eq!(stats.inlined, 3);
    let printed = code.to_string();
    assert!(!printed.contains("g(1)"));
    assert!(!printed.contains(":= f("));
}

#[test]
fn test_closed_guard_blocks_everything() {
    let settings = InlinerSettings {
        global_size_threshold: 0,
        ..InlinerSettings::default()
    };
    let (_, stats) = run_with("{ let x := f(2) function f(a) -> b { b := a } }", settings).unwrap();
    assert_eq!(stats.inlined, 0);
    assert_eq!(stats.skipped(SkipReason::GuardClosed), 1);
    assert!(stats.guard_tripped);
}

#[test]
fn test_large_multi_use_function_is_kept() {
    let (_, stats) = run(
        "{ let x := f(1) let y := f(2) function f(a) -> b { b := add(mload(a), add(mload(add(a, 32)), add(mload(add(a, 64)), mload(add(a, 96))))) } }",
    );
    assert_eq!(stats.inlined, 0);
    assert_eq!(stats.skipped(SkipReason::TooLarge), 2);
}

const WIDE_CALLEE: &str = "function f(a, b) -> r {
    let t := add(a, b)
    t := mul(t, t)
    sstore(t, a)
    mstore(b, t)
    r := add(t, sload(a))
}";

#[test]
fn test_single_use_ignores_size_budget() {
    let dialect = Dialect::evm();
    let weights = CostWeights::default();
    let estimator = CostEstimator::new(&dialect, &weights);
    let definition = parse_block(&format!("{{ {} }}", WIDE_CALLEE)).unwrap();
    let callee = definition.functions().next().unwrap();
    let call = FunctionCall::new("f", vec![Expression::number("1"), Expression::number("2")]);
    let budget = estimator
        .call_size(&call)
        .saturating_mul(InlinerSettings::default().per_site_size_multiplier);
    assert!(estimator.block_size(&callee.body) > budget);

    let (code, stats) = run(&format!("{{ sstore(0, f(1, 2)) {} }}", WIDE_CALLEE));
    assert_eq!(stats.inlined, 1);
    assert_eq!(stats.inlined_single_use, 1);
    assert_eq!(stats.skipped(SkipReason::TooLarge), 0);
    assert!(!code.to_string().contains("f(1, 2)"));

    let (code, stats) = run(&format!(
        "{{ sstore(0, f(1, 2)) sstore(1, f(3, 4)) {} }}",
        WIDE_CALLEE
    ));
    assert_eq!(stats.inlined, 0);
    assert_eq!(stats.skipped(SkipReason::TooLarge), 2);
    assert!(code.to_string().contains("f(1, 2)"));
}

#[test]
fn test_unknown_function_is_internal_error() {
    let error = run_with("{ pop(h()) function f() {} }", InlinerSettings::default()).unwrap_err();
    assert!(is_internal(&error));
}

#[test]
fn test_nested_definition_is_internal_error() {
    let error = run_with(
        "{ function f() { function g() {} } }",
        InlinerSettings::default(),
    )
    .unwrap_err();
    assert!(is_internal(&error));
}
