// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec hot-path benchmarks: header stamping and optional-field scans.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use seqbus::codec::{header, tlv, OptionalCache};

fn bench_header_stamp(c: &mut Criterion) {
    let mut buf = [0u8; 64];
    c.bench_function("header_stamp", |b| {
        b.iter(|| {
            header::set_application_id(&mut buf, black_box(7)).unwrap();
            header::set_application_sequence_number(&mut buf, black_box(42)).unwrap();
            header::set_timestamp(&mut buf, black_box(1_700_000_000_000_000_000)).unwrap();
            black_box(&buf);
        });
    });
}

fn bench_optional_scan(c: &mut Criterion) {
    let mut buf = vec![0u8; 256];
    let mut at = header::HEADER_SIZE;
    for id in 1..=8u8 {
        at += tlv::write_tlv(&mut buf, at, id, &[id; 12]).unwrap();
    }
    buf.truncate(at);

    c.bench_function("optional_first_access", |b| {
        b.iter(|| {
            let mut cache = OptionalCache::new();
            let found = cache
                .find(black_box(&buf), header::HEADER_SIZE, black_box(8))
                .unwrap();
            black_box(found);
        });
    });

    c.bench_function("optional_cached_access", |b| {
        let mut cache = OptionalCache::new();
        cache.find(&buf, header::HEADER_SIZE, 8).unwrap();
        b.iter(|| {
            let found = cache
                .find(black_box(&buf), header::HEADER_SIZE, black_box(3))
                .unwrap();
            black_box(found);
        });
    });
}

criterion_group!(benches, bench_header_stamp, bench_optional_scan);
criterion_main!(benches);
