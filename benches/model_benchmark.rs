//! Benchmarks for schema introspection and content traversal.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic schema descriptions and content trees.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagedom::schema::{AuxTypeDecl, TypeDecl};
use pagedom::{
    ContentKind, Document, FormatModel, IntrospectOptions, IterFilter, SchemaDescription,
};
use std::sync::Arc;

/// Creates a schema with a base type and `type_count` derived types.
fn create_test_schema(type_count: usize) -> SchemaDescription {
    let mut desc = SchemaDescription::new("bench").with_type(
        TypeDecl::new("RegionType")
            .attribute("id", "ID")
            .attribute("custom", "string")
            .attribute("comments", "string"),
    );
    for i in 0..type_count {
        desc = desc.with_type(
            TypeDecl::new(format!("Region{}Type", i))
                .extends("RegionType")
                .attribute("orientation", "float")
                .attribute("kind", "KindSimpleType")
                .attribute("level", "LevelSimpleType"),
        );
    }
    desc.with_aux_type(AuxTypeDecl::new("KindSimpleType", "string").with_values(["a", "b", "c"]))
        .with_aux_type(AuxTypeDecl::new("LevelSimpleType", "int").with_range(0, 10))
}

/// Creates a document with `region_count` text regions of two lines of four words.
fn create_test_document(region_count: usize) -> Document {
    let model = FormatModel::from_description(&SchemaDescription::new("bench"), IntrospectOptions::default())
        .expect("empty schema");
    let mut doc = Document::new(Arc::new(model), "bench.png", 1000, 1000);
    for _ in 0..region_count {
        let region = doc.create_node(ContentKind::TextRegion, None).expect("region");
        for _ in 0..2 {
            let line = doc
                .create_node(ContentKind::TextLine, Some(region.as_str()))
                .expect("line");
            for _ in 0..4 {
                doc.create_node(ContentKind::Word, Some(line.as_str()))
                    .expect("word");
            }
        }
    }
    doc
}

/// Benchmark introspection at various schema sizes.
fn bench_introspection(c: &mut Criterion) {
    let mut group = c.benchmark_group("introspection");

    for type_count in [10, 50, 200].iter() {
        let desc = create_test_schema(*type_count);

        group.bench_function(format!("{}_types", type_count), |b| {
            b.iter(|| {
                FormatModel::from_description(black_box(&desc), IntrospectOptions::default())
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark filtered and unfiltered traversal.
fn bench_iteration(c: &mut Criterion) {
    let doc = create_test_document(200);

    c.bench_function("iterate_all", |b| {
        b.iter(|| black_box(&doc).iter().count());
    });

    c.bench_function("iterate_words", |b| {
        b.iter(|| {
            black_box(&doc)
                .iter_filtered(IterFilter::kind(ContentKind::Word))
                .count()
        });
    });
}

/// Benchmark template instantiation.
fn bench_instantiate(c: &mut Criterion) {
    let model = FormatModel::from_description(&create_test_schema(10), IntrospectOptions::default())
        .unwrap();

    c.bench_function("instantiate_template", |b| {
        b.iter(|| model.instantiate(black_box("Region5Type")));
    });
}

criterion_group!(
    benches,
    bench_introspection,
    bench_iteration,
    bench_instantiate,
);
criterion_main!(benches);
