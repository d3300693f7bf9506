use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yul_core::Dialect;
use yul_interpreter::{execute, InterpreterOptions};
use yul_parser::parse_block;

const LOOP: &str = "{
    let total := 0
    for { let i := 0 } lt(i, 1000) { i := add(i, 1) } {
        total := add(total, mul(i, i))
    }
    sstore(0, total)
}";

const CALLS: &str = "{
    for { let i := 0 } lt(i, 200) { i := add(i, 1) } {
        sstore(i, fib(10))
    }
    function fib(n) -> r {
        r := n
        if gt(n, 1) { r := add(fib(sub(n, 1)), fib(sub(n, 2))) }
    }
}";

fn interpreter_benchmarks(c: &mut Criterion) {
    let dialect = Dialect::evm();
    let mut group = c.benchmark_group("interpreter");

    for (name, source) in [("loop", LOOP), ("calls", CALLS)] {
        let code = parse_block(source).unwrap();
        let options = InterpreterOptions {
            max_steps: 10_000_000,
            ..InterpreterOptions::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| execute(&dialect, black_box(&code), options.clone()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, interpreter_benchmarks);
criterion_main!(benches);
