//! # Sollytch Client Benchmarks
//!
//! Hot paths on the client side of every ledger call:
//!
//! | Crate | Path |
//! |-------|------|
//! | sl-01 Identity Store | P-256 prehash signing |
//! | sl-04 Response Codec | payload decode |
//! | sl-05 Record Encoder | 21-feature CSV encoding |
//! | sl-06 Content Addressing | SHA-512 digest of uploads |
//! | sl-07 Partial Update | dotted-path edit |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use serde_json::json;
use sl_01_identity_store::Signer;
use sl_03_transaction_gateway::HashAlgorithm;
use sl_04_response_codec::decode;
use sl_05_record_encoder::encode_features;
use sl_06_content_addressing::digest;
use sl_07_partial_update::{apply_field_update, coerce_value};
use std::time::Duration;

// ============================================================================
// SL-01: Signing
// ============================================================================

fn bench_proposal_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sl-01-signing");
    group.measurement_time(Duration::from_secs(5));

    let signer = Signer::generate();
    let proposal = vec![0x5au8; 2048];

    for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Sha3_256] {
        group.bench_with_input(BenchmarkId::new("hash_and_sign", algorithm), &algorithm, |b, algorithm| {
            b.iter(|| {
                let prehash = algorithm.digest(black_box(&proposal));
                black_box(signer.sign(&prehash).is_ok())
            })
        });
    }

    group.finish();
}

// ============================================================================
// SL-04: Response decoding
// ============================================================================

fn bench_response_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("sl-04-decode");

    for size in [1usize, 50, 500] {
        let records: Vec<_> = (0..size)
            .map(|i| json!({"test_id": format!("T-{i}"), "cassette_lot": "L1", "sample_pH": 7.1, "version": 0}))
            .collect();
        let payload = serde_json::to_vec(&records).unwrap_or_default();

        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::new("records", size), &payload, |b, payload| {
            b.iter(|| black_box(decode(payload).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// SL-05: Feature encoding
// ============================================================================

fn bench_feature_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("sl-05-encode");

    let sparse = json!({"test_id": "T-1", "cassette_lot": "L1"});
    let dense = json!({
        "test_id": "T-1",
        "cassette_lot": "L1",
        "sample_pH": 7.2,
        "sample_turbidity": 3.5,
        "sample_conductivity": 410,
        "sample_temp_C": 24.5,
        "reader_temp_C": 25,
        "humidity_pct": 61.5,
        "controle_interno_result": "valid",
        "lat": -23.5,
        "lon": -46.6
    });

    group.bench_function("sparse_record", |b| b.iter(|| black_box(encode_features(&sparse).is_ok())));
    group.bench_function("dense_record", |b| b.iter(|| black_box(encode_features(&dense).is_ok())));

    group.finish();
}

// ============================================================================
// SL-06: Content digests
// ============================================================================

fn bench_content_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("sl-06-digest");
    group.measurement_time(Duration::from_secs(10));

    let mut rng = rand::thread_rng();
    for size in [4 * 1024usize, 256 * 1024, 1024 * 1024] {
        let data: Vec<u8> = (0..size).map(|_| rng.gen()).collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("sha512", size), &data, |b, data| {
            b.iter(|| black_box(digest(data)))
        });
    }

    group.finish();
}

// ============================================================================
// SL-07: Field patches
// ============================================================================

fn bench_field_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("sl-07-patch");

    let record = json!({
        "test_id": "T-1",
        "readings": {"line_c": {"intensity": 10}, "line_t": {"intensity": 4}},
        "images": [{"hash": "ab"}, {"hash": "cd"}]
    });

    group.bench_function("top_level", |b| {
        b.iter(|| {
            let mut target = record.clone();
            black_box(apply_field_update(&mut target, "test_id", coerce_value("T-2")).is_ok())
        })
    });
    group.bench_function("nested", |b| {
        b.iter(|| {
            let mut target = record.clone();
            black_box(apply_field_update(&mut target, "readings.line_c.intensity", coerce_value("12.5")).is_ok())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_proposal_signing,
    bench_response_decode,
    bench_feature_encoding,
    bench_content_digest,
    bench_field_patch,
);
criterion_main!(benches);
