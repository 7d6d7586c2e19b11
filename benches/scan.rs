use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mdembed::embed::scan;

fn typical_note() -> String {
    let mut note = String::new();
    for i in 0..200 {
        note.push_str(&format!(
            "## Section {i}\n\nSome prose with a [link](https://example.com/{i}).\n\
             ![[attachments/figure-{i}.png]]\n![Chart {i}](img/chart-{i}.jpeg)\n\n"
        ));
    }
    note
}

fn bench_scan(c: &mut Criterion) {
    let note = typical_note();
    c.bench_function("scan_typical_note", |b| b.iter(|| scan(black_box(&note))));

    let unterminated = format!("![[{}", "[".repeat(100_000));
    c.bench_function("scan_unterminated_brackets", |b| {
        b.iter(|| scan(black_box(&unterminated)))
    });

    let openers = "![".repeat(50_000);
    c.bench_function("scan_repeated_openers", |b| {
        b.iter(|| scan(black_box(&openers)))
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
