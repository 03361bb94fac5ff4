//! Criterion benchmarks for allergen-rf: forest training and batch prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use allergen_rf::ForestConfig;

fn make_classification(n_samples: usize, n_features: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % 2;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 } else { 0.0 };
                base + rng.r#gen::<f64>()
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn bench_forest_train(c: &mut Criterion) {
    let (features, labels) = make_classification(1000, 10, 42);
    let config = ForestConfig::new(200).unwrap();

    c.bench_function("forest_train_1000x10_200trees", |b| {
        b.iter(|| config.fit(&features, &labels).unwrap());
    });
}

fn bench_forest_predict_batch(c: &mut Criterion) {
    let (features, labels) = make_classification(1000, 10, 42);
    let forest = ForestConfig::new(200).unwrap().fit(&features, &labels).unwrap();

    c.bench_function("forest_predict_batch_1000x10_200trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_forest_train, bench_forest_predict_batch);
criterion_main!(benches);
