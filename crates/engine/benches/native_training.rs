use boostlab_engine::{BoostingEngine, InfoField, NativeEngine};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic(rows: usize, cols: usize) -> (Vec<f32>, Vec<f32>) {
    let features: Vec<f32> = (0..rows * cols)
        .map(|i| ((i * 7919) % 1000) as f32 / 100.0)
        .collect();
    let labels = features.chunks(cols).map(|r| r.iter().sum()).collect();
    (features, labels)
}

fn bench_training_round(c: &mut Criterion) {
    let engine = NativeEngine::new();
    let (features, labels) = synthetic(500, 8);
    let mut train = engine
        .matrix_from_dense(&features, 500, 8, f32::NAN)
        .expect("matrix");
    engine
        .set_float_info(&mut train, InfoField::Label, &labels)
        .expect("labels");

    c.bench_function("native_update_one_iter_500x8", |b| {
        b.iter(|| {
            let mut booster = engine.create_booster(&[&train]).expect("booster");
            engine.set_param(&mut booster, "max_depth", "3").expect("param");
            engine
                .update_one_iter(&mut booster, 0, black_box(&train))
                .expect("update");
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let engine = NativeEngine::new();
    let (features, labels) = synthetic(500, 8);
    let mut train = engine
        .matrix_from_dense(&features, 500, 8, f32::NAN)
        .expect("matrix");
    engine
        .set_float_info(&mut train, InfoField::Label, &labels)
        .expect("labels");
    let mut booster = engine.create_booster(&[&train]).expect("booster");
    for i in 0..10 {
        engine.update_one_iter(&mut booster, i, &train).expect("update");
    }

    c.bench_function("native_predict_500x8_10_rounds", |b| {
        b.iter(|| engine.predict(&booster, black_box(&train)).expect("predict"))
    });
}

criterion_group!(benches, bench_training_round, bench_predict);
criterion_main!(benches);
