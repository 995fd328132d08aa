//! Call-tree construction benchmarks.
//!
//! # Running
//! ```bash
//! cargo bench --package chainlens-evm
//! ```

use alloy_primitives::{Bytes, U256};
use chainlens_core::trace::{CallKind, CallTrace};
use chainlens_evm::trace_graph;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ─── Trace factory ────────────────────────────────────────────────────────────

fn make_trace(path: Vec<usize>) -> CallTrace {
    CallTrace {
        kind: CallKind::Call,
        from: "0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7".into(),
        to: "0x60781c2586d68229fde47564546784ab3faca982".into(),
        value: U256::ZERO,
        input: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
        output: Bytes::new(),
        gas_used: 21_000,
        trace_address: path,
        error: None,
    }
}

/// A complete tree with `fanout` children per node down to `depth`, returned
/// in reverse pre-order so every descendant precedes its ancestors.
fn make_tree(fanout: usize, depth: usize) -> Vec<CallTrace> {
    let mut out = vec![make_trace(Vec::new())];
    let mut frontier = vec![Vec::new()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for i in 0..fanout {
                let mut path: Vec<usize> = parent.clone();
                path.push(i);
                out.push(make_trace(path.clone()));
                next.push(path);
            }
        }
        frontier = next;
    }
    out.reverse();
    out
}

/// Fisher-Yates with a fixed-seed LCG, so every run measures the same order.
fn shuffle(traces: &mut [CallTrace], mut seed: u64) {
    for i in (1..traces.len()).rev() {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        let j = (seed >> 33) as usize % (i + 1);
        traces.swap(i, j);
    }
}

// ─── Benchmarks ───────────────────────────────────────────────────────────────

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_graph_build");

    for &(fanout, depth) in &[(2usize, 4usize), (4, 4), (8, 3), (2, 10)] {
        let reversed = make_tree(fanout, depth);
        let mut shuffled = reversed.clone();
        shuffle(&mut shuffled, 0x5eed);
        group.throughput(Throughput::Elements(reversed.len() as u64));

        for (order, traces) in [("reversed", &reversed), ("shuffled", &shuffled)] {
            group.bench_with_input(
                BenchmarkId::new(order, format!("{fanout}x{depth}")),
                traces,
                |b, traces| b.iter(|| trace_graph::build(traces.clone())),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
