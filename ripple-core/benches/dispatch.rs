//! Dispatch and effect throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ripple_core::deps;
use ripple_core::effect::EffectRecord;
use ripple_core::form::{form_reducer, update_name, FormState};
use ripple_core::store::ReducerStore;

fn dispatch_with_listeners(c: &mut Criterion) {
    let store = ReducerStore::new(FormState::default(), form_reducer);
    let _subs: Vec<_> = (0..8)
        .map(|_| {
            store.subscribe(|state: &FormState| {
                black_box(state.name.len());
            })
        })
        .collect();

    c.bench_function("dispatch_8_listeners", |b| {
        b.iter(|| store.dispatch(black_box(update_name("Ann"))))
    });
}

fn effect_skip(c: &mut Criterion) {
    let mut record = EffectRecord::new();
    let _ = record.run(|| None, Some(deps!["ann", 1, true]));

    c.bench_function("effect_unchanged_deps", |b| {
        b.iter(|| record.run(|| None, Some(deps![black_box("ann"), 1, true])))
    });
}

criterion_group!(benches, dispatch_with_listeners, effect_skip);
criterion_main!(benches);
