//! Criterion benchmarks for sylva-tree: induction, pruning and classification.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sylva_tree::{Attribute, Dataset, Pruning, Schema, TreeConfig, Value};

fn make_classification(n_samples: usize, n_features: usize, n_classes: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut attributes: Vec<Attribute> = (0..n_features)
        .map(|f| Attribute::continuous(format!("f{f}")))
        .collect();
    attributes.push(Attribute::categorical(
        "class",
        (0..n_classes).map(|c| format!("c{c}")),
    ));
    let schema = Schema::new(attributes, n_features).unwrap();

    let mut data = Dataset::new(schema);
    for i in 0..n_samples {
        let class = i % n_classes;
        let mut row: Vec<Value> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                Value::Number(base + rng.r#gen::<f64>() * 0.5)
            })
            .collect();
        row.push(Value::Category(class));
        data.push(row).unwrap();
    }
    data
}

fn bench_fit_j48(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = TreeConfig::j48();

    c.bench_function("j48_fit_500x20_5class", |b| {
        b.iter(|| cfg.fit(&data).unwrap());
    });
}

fn bench_fit_id3(c: &mut Criterion) {
    // Global discretization followed by multiway induction.
    let data = make_classification(500, 20, 5, 42);
    let cfg = TreeConfig::id3();

    c.bench_function("id3_fit_500x20_5class", |b| {
        b.iter(|| cfg.fit(&data).unwrap());
    });
}

fn bench_prune(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 7);
    let tree = TreeConfig::j48()
        .with_pruning(Pruning::None)
        .fit(&data)
        .unwrap();

    c.bench_function("j48_prune_500x20", |b| {
        b.iter(|| tree.clone().prune());
    });
}

fn bench_classify_batch(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let tree = TreeConfig::j48().fit(&data).unwrap();

    c.bench_function("j48_classify_batch_500x20", |b| {
        b.iter(|| tree.classify_batch(data.records()));
    });
}

criterion_group!(
    benches,
    bench_fit_j48,
    bench_fit_id3,
    bench_prune,
    bench_classify_batch
);
criterion_main!(benches);
