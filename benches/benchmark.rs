//! Performance benchmarks for rs-recipe-miner.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Analyzer pass and squashing over a synthetic product grid
//! - Full multi-tier discovery at increasing list sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rs_recipe_miner::analyzer::{analyze, squash::squash};
use rs_recipe_miner::{discover, Options};

fn product_grid(items: usize) -> String {
    let cards: String = (1..=items)
        .map(|i| {
            format!(
                r#"<div class="card">
                    <a class="thumb" href="/p/{i}"><img src="/img/{i}.jpg"></a>
                    <h2 class="name">Product {i}</h2>
                    <span class="price">{price} €</span>
                    <time datetime="2024-03-{day:02}">March {day}</time>
                </div>"#,
                price = i * 7 % 100,
                day = i % 28 + 1
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Catalog</title></head>
<body>
    <nav><a href="/">Home</a><a href="/catalog">Catalog</a></nav>
    <main><div class="grid">{cards}</div></main>
    <div class="pages"><a href="?page=1">1</a><a href="?page=2">2</a><a href="?page=2" aria-label="Next">Next</a></div>
    <footer><p>Copyright 2024</p></footer>
</body>
</html>"#
    )
}

fn bench_analyze_and_squash(c: &mut Criterion) {
    let html = product_grid(40);
    let options = Options::default();

    c.bench_function("analyze", |b| {
        b.iter(|| analyze(black_box(&html), black_box(&options)));
    });

    let analysis = analyze(&html, &options);
    c.bench_function("squash", |b| {
        b.iter(|| squash(black_box(analysis.locations.clone()), 10));
    });
}

fn bench_discover(c: &mut Criterion) {
    let options = Options {
        url: Some("https://shop.example.com/catalog".to_string()),
        ..Options::default()
    };

    let mut group = c.benchmark_group("discover");
    for items in [10, 50, 200] {
        let html = product_grid(items);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &html, |b, html| {
            b.iter(|| discover(black_box(html), black_box(&options)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analyze_and_squash, bench_discover);
criterion_main!(benches);
