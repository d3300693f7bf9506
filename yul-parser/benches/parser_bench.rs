use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use yul_parser::parse;

const SIMPLE_BLOCK: &str = "{ let x := add(1, 2) sstore(0, x) }";

const OBJECT_TREE: &str = r#"
object "Token" {
    code {
        datacopy(0, dataoffset("Runtime"), datasize("Runtime"))
        return(0, datasize("Runtime"))
    }
    object "Runtime" {
        code {
            function balance_of(owner) -> b { b := sload(owner) }
            function transfer(to, amount) {
                let from := caller()
                let have := balance_of(from)
                if lt(have, amount) { revert(0, 0) }
                sstore(from, sub(have, amount))
                sstore(to, add(balance_of(to), amount))
            }
            switch shr(224, calldataload(0))
            case 0xa9059cbb { transfer(calldataload(4), calldataload(36)) }
            default { revert(0, 0) }
        }
    }
}
"#;

fn nested_calls(depth: usize) -> String {
    let mut expr = "2".to_string();
    for _ in 0..depth {
        expr = format!("f({})", expr);
    }
    format!("{{ let x := {} function f(a) -> b {{ b := sload(mload(a)) }} }}", expr)
}

fn parser_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    group.throughput(Throughput::Bytes(SIMPLE_BLOCK.len() as u64));
    group.bench_function("simple_block", |b| {
        b.iter(|| {
            let _ = black_box(parse(black_box(SIMPLE_BLOCK)));
        });
    });

    group.throughput(Throughput::Bytes(OBJECT_TREE.len() as u64));
    group.bench_function("object_tree", |b| {
        b.iter(|| {
            let _ = black_box(parse(black_box(OBJECT_TREE)));
        });
    });

    let nested = nested_calls(200);
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("nested_calls_200", |b| {
        b.iter(|| {
            let _ = black_box(parse(black_box(&nested)));
        });
    });

    group.finish();
}

criterion_group!(benches, parser_benchmarks);
criterion_main!(benches);
