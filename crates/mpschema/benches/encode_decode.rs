// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode / decode throughput for a mixed schema.
//!
//! Covers scalar fields, a 256-element list, a 32-entry map and a
//! timestamp going through the serializer registry.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mpschema::{
    CustomKind, FieldDescriptor, SchemaDefinition, SchemaType, SerializerRegistry, TypeSchema,
    ValueKind,
};
use std::sync::Arc;

fn telemetry_schema() -> Arc<TypeSchema> {
    TypeSchema::builder("Telemetry")
        .field(FieldDescriptor::scalar("source", 0, ValueKind::String).expect("source"))
        .field(FieldDescriptor::scalar("seq", 1, ValueKind::Uint64).expect("seq"))
        .field(FieldDescriptor::custom("at", 2, CustomKind::TIMESTAMP))
        .field(FieldDescriptor::list("samples", 3, ValueKind::Float64).expect("samples"))
        .field(
            FieldDescriptor::map("labels", 4, ValueKind::String, ValueKind::Int32)
                .expect("labels"),
        )
        .build()
        .expect("schema")
}

fn populated(schema: &Arc<TypeSchema>, samples: usize) -> SchemaDefinition {
    let mut def = SchemaDefinition::new(schema);
    def.set_value(0, "bench/telemetry").expect("source");
    def.set_value(1, 42u64).expect("seq");
    def.set_value(2, Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap())
        .expect("at");
    def.set_list(3, (0..samples).map(|i| i as f64 * 0.5))
        .expect("samples");
    def.set_map(4, (0..32).map(|i| (format!("label-{i}"), i)))
        .expect("labels");
    def
}

fn bench_encode(c: &mut Criterion) {
    let registry = SerializerRegistry::default();
    let schema = telemetry_schema();
    let mut group = c.benchmark_group("encode");

    for samples in [0usize, 256, 4096] {
        let mut def = populated(&schema, samples);
        let size = def.encode(&registry).expect("encode").len();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &samples, |b, _| {
            b.iter(|| black_box(def.encode(&registry).expect("encode")));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let registry = SerializerRegistry::default();
    let schema = telemetry_schema();
    let mut group = c.benchmark_group("decode");

    for samples in [0usize, 256, 4096] {
        let bytes = populated(&schema, samples)
            .encode(&registry)
            .expect("encode");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &bytes, |b, bytes| {
            b.iter(|| {
                let mut def = SchemaDefinition::new(&schema);
                def.merge_from(black_box(bytes), &registry).expect("decode");
                def
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
