//! Accuracy regression tests for allergen-rf.
//!
//! Guard against algorithmic changes that degrade classification quality on
//! a deterministic synthetic binary dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use allergen_rf::{ForestConfig, evaluate};

/// 400 samples, 10 features, 2 classes.
///
/// Features 0-2 carry the label (class * 2.0 + noise in [0, 1.5]); the rest
/// are noise in [0, 1.5]. Even rows train, odd rows test.
fn make_classification() -> (Vec<Vec<f64>>, Vec<usize>, Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut train = (Vec::new(), Vec::new());
    let mut test = (Vec::new(), Vec::new());
    for i in 0..400 {
        let class = (i / 2) % 2;
        let row: Vec<f64> = (0..10)
            .map(|f| {
                let base = if f < 3 { class as f64 * 2.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 1.5
            })
            .collect();
        let target = if i % 2 == 0 { &mut train } else { &mut test };
        target.0.push(row);
        target.1.push(class);
    }
    (train.0, train.1, test.0, test.1)
}

#[test]
fn held_out_accuracy_above_threshold() {
    let (train_x, train_y, test_x, test_y) = make_classification();
    let forest = ForestConfig::new(100).unwrap().with_seed(42).fit(&train_x, &train_y).unwrap();
    let report = evaluate(&forest, &test_x, &test_y).unwrap();

    assert!(report.accuracy > 0.9, "held-out accuracy {} <= 0.9", report.accuracy);
    for class in &report.classes {
        assert!(class.f1 > 0.85, "class {} f1 {} <= 0.85", class.class, class.f1);
    }
}

#[test]
fn identical_runs_report_identical_accuracy() {
    let (train_x, train_y, test_x, test_y) = make_classification();
    let config = ForestConfig::new(40).unwrap().with_seed(7);

    let first = evaluate(&config.fit(&train_x, &train_y).unwrap(), &test_x, &test_y).unwrap();
    let second = evaluate(&config.fit(&train_x, &train_y).unwrap(), &test_x, &test_y).unwrap();

    assert_eq!(first.accuracy, second.accuracy);
    assert_eq!(first.confusion_matrix, second.confusion_matrix);
}

#[test]
fn training_accuracy_near_perfect() {
    let (train_x, train_y, _, _) = make_classification();
    let forest = ForestConfig::new(100).unwrap().with_seed(42).fit(&train_x, &train_y).unwrap();
    let report = evaluate(&forest, &train_x, &train_y).unwrap();
    assert!(report.accuracy > 0.97, "training accuracy {} <= 0.97", report.accuracy);
}
