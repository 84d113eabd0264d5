#![allow(clippy::expect_used)]

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use inferadb_common_keystore::{GenerateOptions, KeyParams, KeyStore, OkpParams, RawJwk};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn public_key(kid: String) -> RawJwk {
    let mut raw = RawJwk::new(KeyParams::Okp(OkpParams {
        crv: "Ed25519".to_owned(),
        x: "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo".to_owned(),
        d: None,
    }));
    raw.kid = Some(kid);
    raw.alg = Some("EdDSA".to_owned());
    raw
}

/// Creates a store holding `count` public Ed25519 keys `k00000000..count`.
fn populated_store(count: usize) -> KeyStore {
    let mut store = KeyStore::new();
    for i in 0..count {
        store.add(&public_key(format!("k{i:08}"))).expect("populate add failed");
    }
    store
}

// ---------------------------------------------------------------------------
// 1. rotation
// ---------------------------------------------------------------------------

fn rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation");

    for &count in &[1usize, 16, 1024] {
        let mut store = populated_store(count);
        group.bench_with_input(BenchmarkId::new("next_unkeyed", count), &count, |b, _| {
            b.iter(|| store.get(None).expect("store is not empty"));
        });

        let mut store = populated_store(count);
        let kid = format!("k{:08}", count / 2);
        group.bench_with_input(BenchmarkId::new("next_by_kid", count), &count, |b, _| {
            b.iter(|| store.get(Some(kid.as_str())).expect("kid is stored"));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. ingestion
// ---------------------------------------------------------------------------

fn ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");

    for &count in &[16usize, 1024] {
        group.bench_with_input(BenchmarkId::new("add_replace", count), &count, |b, &count| {
            b.iter_batched(
                || (populated_store(count), public_key(format!("k{:08}", count / 2))),
                |(mut store, key)| store.add(&key).expect("add failed"),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 3. export
// ---------------------------------------------------------------------------

fn export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    for &count in &[16usize, 1024] {
        let store = populated_store(count);
        group.bench_with_input(BenchmarkId::new("public_set", count), &count, |b, _| {
            b.iter(|| store.to_jwk_set(false));
        });
        group.bench_with_input(BenchmarkId::new("private_set", count), &count, |b, _| {
            b.iter(|| store.to_jwk_set(true));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 4. generation
// ---------------------------------------------------------------------------

fn generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.sample_size(10);

    for alg in ["ES256", "EdDSA"] {
        group.bench_function(alg, |b| {
            let mut store = KeyStore::new();
            b.iter(|| store.generate(alg, GenerateOptions::default()).expect("generate failed"));
        });
    }

    group.bench_function("EdDSA_Ed448", |b| {
        let mut store = KeyStore::new();
        let options = GenerateOptions::builder().crv("Ed448").build();
        b.iter(|| store.generate("EdDSA", options.clone()).expect("generate failed"));
    });

    group.finish();
}

criterion_group!(benches, rotation, ingestion, export, generation);
criterion_main!(benches);
