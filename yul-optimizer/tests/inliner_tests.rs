//! End-to-end tests for the inlining pipeline

use pretty_assertions::assert_eq;
use primitive_types::U256;
use std::collections::BTreeMap;
use yul_core::ast::{Block, FunctionCall, FunctionDefinition, Statement};
use yul_core::visitor::{walk_statement, Visitor};
use yul_core::Dialect;
use yul_interpreter::{execute, InterpreterOptions};
use yul_optimizer::{
    CostEstimator, CostWeights, InlinerSettings, OptimizationPipeline, OptimiserSettings, SkipReason,
};
use yul_parser::parse_block;

fn nested_calls(depth: usize) -> String {
    let mut expr = "2".to_string();
    for _ in 0..depth {
        expr = format!("f({})", expr);
    }
    format!("{{ sstore(0, {}) function f(a) -> b {{ b := sload(mload(a)) }} }}", expr)
}

fn optimize(source: &str, settings: OptimiserSettings) -> (Block, OptimizationPipeline) {
    let dialect = Dialect::evm();
    let mut code = parse_block(source).unwrap();
    let mut pipeline = OptimizationPipeline::new(settings).unwrap();
    pipeline.optimize_block(&dialect, &mut code).unwrap();
    (code, pipeline)
}

fn with_threshold(threshold: u64) -> OptimiserSettings {
    OptimiserSettings {
        inliner: InlinerSettings {
            global_size_threshold: threshold,
            ..InlinerSettings::default()
        },
        ..OptimiserSettings::default()
    }
}

/// Runs the source before and after optimisation and requires identical
/// outcomes.
fn assert_equivalent(source: &str, settings: OptimiserSettings) -> Block {
    let dialect = Dialect::evm();
    let original = parse_block(source).unwrap();
    let (optimized, _) = optimize(source, settings);
    let before = execute(&dialect, &original, InterpreterOptions::default());
    let after = execute(&dialect, &optimized, InterpreterOptions::default());
    assert_eq!(before, after, "behaviour changed:\n{}", optimized);
    optimized
}

#[derive(Default)]
struct Census {
    calls: BTreeMap<String, usize>,
    declared: Vec<String>,
    functions: Vec<String>,
}

impl Census {
    fn of(block: &Block) -> Self {
        let mut census = Census::default();
        census.visit_block(block);
        census
    }

    fn calls_to(&self, name: &str) -> usize {
        self.calls.get(name).copied().unwrap_or(0)
    }
}

impl Visitor for Census {
    fn visit_statement(&mut self, statement: &Statement) {
        if let Statement::VariableDeclaration { variables, .. } = statement {
            self.declared.extend(variables.iter().map(|v| v.name.clone()));
        }
        walk_statement(self, statement);
    }

    fn visit_function_definition(&mut self, function: &FunctionDefinition) {
        self.functions.push(function.name.clone());
        self.declared.push(function.name.clone());
        self.declared
            .extend(function.parameters.iter().chain(&function.return_variables).map(|v| v.name.clone()));
        self.visit_block(&function.body);
    }

    fn visit_function_call(&mut self, call: &FunctionCall) {
        *self.calls.entry(call.function_name.clone()).or_insert(0) += 1;
        for argument in &call.arguments {
            self.visit_expression(argument);
        }
    }
}

#[test]
fn test_growth_guard_stops_deep_nesting() {
    let source = nested_calls(19);
    let (code, pipeline) = optimize(&source, with_threshold(100));
    let stats = &pipeline.stats().inliner;

    assert_eq!(pipeline.stats().size_before, 84);
    assert_eq!(stats.inlined, 9);
    assert_eq!(stats.final_size, 102);
    assert!(stats.guard_tripped);
    assert_eq!(stats.skipped(SkipReason::GuardClosed), 10);

    let census = Census::of(&code);
    assert_eq!(census.calls_to("f"), 10);
    assert_eq!(census.functions, vec!["f".to_string()]);
}

#[test]
fn test_rerun_after_guard_tripped_inlines_nothing() {
    let dialect = Dialect::evm();
    let (mut code, mut pipeline) = optimize(&nested_calls(19), with_threshold(100));
    assert!(pipeline.stats().inliner.guard_tripped);
    let first = code.clone();

    pipeline.optimize_block(&dialect, &mut code).unwrap();
    let stats = &pipeline.stats().inliner;
    assert_eq!(stats.inlined, 0);
    assert_eq!(stats.skipped(SkipReason::GuardClosed), 10);
    assert_eq!(code, first);
}

#[test]
fn test_default_threshold_inlines_deep_nesting() {
    let source = nested_calls(19);
    let (code, pipeline) = optimize(&source, OptimiserSettings::default());
    let stats = pipeline.stats();

    assert_eq!(stats.inliner.inlined, 19);
    assert!(!stats.inliner.guard_tripped);
    assert_eq!(stats.functions_pruned, 1);
    let census = Census::of(&code);
    assert_eq!(census.calls_to("f"), 0);
    assert!(census.functions.is_empty());
}

#[test]
fn test_deep_nesting_preserves_behaviour() {
    let source = nested_calls(19).replacen("{ sstore", "{ mstore(2, 3) sstore(3, 2) sstore", 1);
    assert_equivalent(&source, with_threshold(100));
    assert_equivalent(&source, OptimiserSettings::default());
}

#[test]
fn test_guard_matches_measured_size() {
    let dialect = Dialect::evm();
    let weights = CostWeights::default();
    let source = "{
        sstore(0, g(mload(0), f(1)))
        let x, y := h(2)
        pop(g(x, y))
        function f(a) -> b { b := add(a, sload(a)) }
        function g(a, b) -> c { c := mul(f(a), b) }
        function h(a) -> p, q { p := a q := f(a) }
    }";
    let settings = OptimiserSettings {
        optimiser_steps: "hi".to_string(),
        ..OptimiserSettings::default()
    };
    let (code, pipeline) = optimize(source, settings);
    let measured = CostEstimator::new(&dialect, &weights).block_size(&code);
    assert!(pipeline.stats().inliner.inlined > 0);
    assert_eq!(pipeline.stats().inliner.final_size, measured.get());
}

#[test]
fn test_single_use_functions_disappear() {
    let source = "{
        sstore(0, outer(7))
        function outer(a) -> r { r := inner(add(a, 1)) }
        function inner(b) -> s { s := mul(b, b) }
    }";
    let code = assert_equivalent(source, OptimiserSettings::default());
    let census = Census::of(&code);
    assert!(census.functions.is_empty(), "left over functions in\n{}", code);
    assert_eq!(census.calls_to("outer") + census.calls_to("inner"), 0);
}

#[test]
fn test_single_use_inlining_is_lossless() {
    let source = "{
        sstore(0, f(1, 2))
        function f(a, b) -> r {
            let t := add(a, b)
            t := mul(t, t)
            sstore(t, a)
            mstore(b, t)
            r := add(t, sload(a))
        }
    }";
    let code = assert_equivalent(source, OptimiserSettings::default());
    let (_, pipeline) = optimize(source, OptimiserSettings::default());
    let stats = pipeline.stats();
    assert_eq!(stats.inliner.inlined, 1);
    assert_eq!(stats.inliner.inlined_single_use, 1);
    assert_eq!(stats.functions_pruned, 1);
    assert!(
        stats.size_after <= stats.size_before + CostWeights::default().call_overhead,
        "size grew from {} to {}",
        stats.size_before,
        stats.size_after
    );
    assert!(Census::of(&code).functions.is_empty());
}

#[test]
fn test_second_call_site_falls_back_to_size_budget() {
    let source = "{
        sstore(0, f(1, 2))
        sstore(1, f(3, 4))
        function f(a, b) -> r {
            let t := add(a, b)
            t := mul(t, t)
            sstore(t, a)
            mstore(b, t)
            r := add(t, sload(a))
        }
    }";
    let (code, pipeline) = optimize(source, OptimiserSettings::default());
    let inliner = &pipeline.stats().inliner;
    assert_eq!(inliner.inlined, 0);
    assert_eq!(inliner.skipped(SkipReason::TooLarge), 2);
    assert_eq!(Census::of(&code).calls_to("f"), 2);
}

#[test]
fn test_rerun_is_stable() {
    let dialect = Dialect::evm();
    let source = "{
        sstore(0, outer(7))
        function outer(a) -> r { r := inner(add(a, 1)) }
        function inner(b) -> s { s := mul(b, b) }
    }";
    let (mut code, mut pipeline) = optimize(source, OptimiserSettings::default());
    let first = code.clone();
    pipeline.optimize_block(&dialect, &mut code).unwrap();
    assert_eq!(code, first);
    assert_eq!(pipeline.stats().inliner.inlined, 0);
}

#[test]
fn test_declared_names_stay_unique() {
    let source = "{
        let a := f(1)
        let b := f(a)
        sstore(g(a), g(b))
        function f(a) -> b { let t := add(a, 1) b := mul(t, t) }
        function g(a) -> b { b := f(f(a)) }
    }";
    let code = assert_equivalent(source, OptimiserSettings::default());
    let census = Census::of(&code);
    let mut seen = std::collections::BTreeSet::new();
    for name in &census.declared {
        assert!(seen.insert(name.clone()), "{} declared twice in\n{}", name, code);
    }
}

#[test]
fn test_effectful_unused_argument_runs_once_in_order() {
    let source = "{
        sstore(bump(), f(bump()))
        function f(x) -> r { r := 7 }
        function bump() -> s { s := add(sload(9), 1) sstore(9, s) }
    }";
    let dialect = Dialect::evm();
    let code = assert_equivalent(source, OptimiserSettings::default());
    let (_, state) = execute(&dialect, &code, InterpreterOptions::default()).unwrap();
    assert_eq!(state.sload(U256::from(9)), U256::from(2));
    assert_eq!(state.sload(U256::from(1)), U256::from(7));
}

#[test]
fn test_hoisting_preserves_argument_order() {
    let source = "{
        mstore(0, 3)
        sstore(mload(0), f(4))
        sstore(add(mload(0), 1), f(mload(0)))
        function f(a) -> b { mstore(0, a) b := a }
    }";
    assert_equivalent(source, OptimiserSettings::default());
}

#[test]
fn test_recursive_functions_terminate() {
    let source = "{
        sstore(0, f(5))
        sstore(1, even(4))
        function f(n) -> r { if n { r := add(f(sub(n, 1)), 1) } }
        function even(n) -> r { r := 1 if n { r := odd(sub(n, 1)) } }
        function odd(n) -> r { if n { r := even(sub(n, 1)) } }
    }";
    let code = assert_equivalent(source, OptimiserSettings::default());
    let census = Census::of(&code);
    assert!(census.calls_to("f") > 0);
}

#[test]
fn test_control_flow_is_preserved() {
    let source = "{
        let total := 0
        for { let i := 0 } lt(i, 5) { i := add(i, 1) } {
            switch mod(i, 2)
            case 0 { total := add(total, twice(i)) }
            default { if gt(i, 2) { break } }
        }
        sstore(0, total)
        function twice(a) -> r { r := add(a, a) }
    }";
    assert_equivalent(source, OptimiserSettings::default());
}

#[test]
fn test_functions_with_leave_are_kept() {
    let source = "{
        sstore(0, f(0))
        sstore(1, f(1))
        function f(a) -> r { r := 3 if a { leave } r := 4 }
    }";
    let code = assert_equivalent(source, OptimiserSettings::default());
    assert_eq!(Census::of(&code).calls_to("f"), 2);
}
