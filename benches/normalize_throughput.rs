//! Normalization throughput benchmarks
//!
//! Measures a full normalization run with varying:
//! - Section counts (10, 100, 1000), each contributing a TOC item and an id
//! - Live table sizes (10, 100, 1000 fetched rows)
//!
//! Run benchmarks: `cargo bench --bench normalize_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use docprep::{DocumentPreprocessor, InMemoryRowProvider};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// A document with one heading, one paragraph and one back-reference per
/// section, and a TOC with section headers up front.
fn generate_document(sections: usize) -> Value {
    let mut content = vec![json!({ "toc": { "title": "Index", "showSectionHeaders": true } })];
    for i in 0..sections {
        let title = format!("{} Section {}", (b'A' + (i % 26) as u8) as char, i);
        content.push(json!({ "text": title, "id": format!("s{}", i), "tocItem": true, "outline": 1 }));
        content.push(json!(["Body text for the section.", { "text": "", "pageReference": format!("s{}", i) }]));
    }
    Value::Array(content)
}

fn benchmark_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_sections");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let preprocessor = DocumentPreprocessor::default();

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        let document = generate_document(count);

        group.bench_with_input(BenchmarkId::new("sections", count), &count, |b, _| {
            b.iter(|| {
                rt.block_on(preprocessor.preprocess(document.clone()))
                    .expect("Normalization failed")
            });
        });
    }
    group.finish();
}

fn benchmark_live_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_live_table");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");

    for rows in [10, 100, 1000] {
        let provider = InMemoryRowProvider::new();
        let data = (0..rows)
            .map(|i| json!({ "sku": format!("SKU-{}", i), "qty": i }))
            .collect();
        provider.add("stock", data).expect("Failed to register rows");
        let preprocessor = DocumentPreprocessor::builder()
            .with_row_provider(Arc::new(provider))
            .build();
        let document = json!({
            "table": { "headerRows": 1, "body": [["SKU", "Qty"]] },
            "data": { "query": "stock", "columns": [{ "text": "sku", "bold": true }, "qty"] }
        });

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, _| {
            b.iter(|| {
                rt.block_on(preprocessor.preprocess(document.clone()))
                    .expect("Normalization failed")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_sections, benchmark_live_tables);
criterion_main!(benches);
