//! Benchmarks for decoding upstream depth responses

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rate_service::source::parse_depth;
use rate_service::Quote;

fn create_depth_body(levels: usize) -> Vec<u8> {
    let asks: Vec<String> = (0..levels)
        .map(|i| {
            format!(
                r#"{{"price":"{}.{:02}","volume":"1500.0","amount":"139050.0"}}"#,
                92 + i,
                i % 100
            )
        })
        .collect();
    let bids: Vec<String> = (0..levels)
        .map(|i| {
            format!(
                r#"{{"price":"{}.{:02}","volume":"1200.0","amount":"110400.0"}}"#,
                91 - (i % 90),
                i % 100
            )
        })
        .collect();

    format!(
        r#"{{"timestamp":1700000000,"asks":[{}],"bids":[{}]}}"#,
        asks.join(","),
        bids.join(",")
    )
    .into_bytes()
}

fn benchmark_parse_depth(c: &mut Criterion) {
    let small = create_depth_body(1);
    let full = create_depth_body(100);

    c.bench_function("parse_depth_1_level", |b| {
        b.iter(|| {
            black_box(parse_depth(black_box(&small)).unwrap());
        })
    });

    c.bench_function("parse_depth_100_levels", |b| {
        b.iter(|| {
            black_box(parse_depth(black_box(&full)).unwrap());
        })
    });
}

fn benchmark_quote_new(c: &mut Criterion) {
    c.bench_function("quote_from_unix", |b| {
        b.iter(|| {
            let quote = Quote::from_unix(black_box("92.10"), black_box("91.80"), 1_700_000_000);
            black_box(quote.unwrap());
        })
    });
}

criterion_group!(benches, benchmark_parse_depth, benchmark_quote_new);
criterion_main!(benches);
