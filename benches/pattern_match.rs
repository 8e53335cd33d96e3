//! Benchmarks for pattern matching and forward chaining.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use noema::Engine;
use noema::atom::{AtomId, LinkKind, NodeKind};
use noema::infer::{ForwardInput, InferenceParams, StrategyInput};
use noema::pattern::Pattern;
use noema::pattern::matcher::PatternMatcher;
use noema::rules::RuleSet;
use noema::store::AtomStore;
use noema::truth::TruthValue;

/// A store with `n` concepts chained by inheritance links.
fn chain_store(n: usize) -> (AtomStore, Vec<AtomId>) {
    let store = AtomStore::new();
    let nodes: Vec<AtomId> = (0..n)
        .map(|i| {
            store
                .add_node(NodeKind::Concept, format!("c{i}"), TruthValue::CERTAIN)
                .unwrap()
        })
        .collect();
    let links = nodes
        .windows(2)
        .map(|w| {
            store
                .add_link(
                    LinkKind::Inheritance,
                    vec![w[0], w[1]],
                    TruthValue::new(1.0, 0.9).unwrap(),
                )
                .unwrap()
        })
        .collect();
    (store, links)
}

fn bench_match_variable_pattern(c: &mut Criterion) {
    let (store, _) = chain_store(1000);
    let pattern: Pattern = "(Inheritance $x $y)".parse().unwrap();

    c.bench_function("match_variable_1k_links", |bench| {
        let matcher = PatternMatcher::new(&store);
        bench.iter(|| black_box(matcher.matches(&pattern, 100)))
    });
}

fn bench_match_ground_pattern(c: &mut Criterion) {
    let (store, _) = chain_store(1000);
    let pattern: Pattern = "(Inheritance (Concept \"c500\") (Concept \"c501\"))"
        .parse()
        .unwrap();

    c.bench_function("match_ground_1k_links", |bench| {
        let matcher = PatternMatcher::new(&store);
        bench.iter(|| black_box(matcher.matches(&pattern, 10)))
    });
}

fn bench_forward_chain(c: &mut Criterion) {
    let engine = Engine::new();
    let mut nodes = Vec::new();
    for i in 0..20 {
        nodes.push(
            engine
                .add_concept(format!("n{i}"), TruthValue::CERTAIN)
                .unwrap(),
        );
    }
    let links: Vec<AtomId> = nodes
        .windows(2)
        .map(|w| {
            engine
                .add_link(
                    LinkKind::Inheritance,
                    vec![w[0], w[1]],
                    TruthValue::new(1.0, 0.9).unwrap(),
                )
                .unwrap()
        })
        .collect();
    let params = InferenceParams::default()
        .with_threshold(0.0)
        .with_max_results(1000);

    c.bench_function("forward_chain_20_node_taxonomy", |bench| {
        bench.iter(|| {
            black_box(
                engine
                    .infer_with(
                        &params,
                        &StrategyInput::Forward(ForwardInput {
                            premises: links.clone(),
                            rules: RuleSet::builtin(),
                        }),
                    )
                    .unwrap(),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_match_variable_pattern,
    bench_match_ground_pattern,
    bench_forward_chain
);
criterion_main!(benches);
