use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrgen::render::{preview_text, rasterize, rasterize_image};
use qrgen::{encode, ErrorCorrectionLevel};

fn bench_encode_small(c: &mut Criterion) {
    c.bench_function("encode_hello_medium", |b| {
        b.iter(|| encode(black_box("HELLO"), ErrorCorrectionLevel::Medium))
    });
}

fn bench_encode_url(c: &mut Criterion) {
    let url = "https://github.com/yourusername/some-repository?tab=readme";
    c.bench_function("encode_url_high", |b| {
        b.iter(|| encode(black_box(url), ErrorCorrectionLevel::High))
    });
}

fn bench_encode_version_40(c: &mut Criterion) {
    let text = "a".repeat(2953);
    c.bench_function("encode_v40_low", |b| {
        b.iter(|| encode(black_box(&text), ErrorCorrectionLevel::Low))
    });
}

fn bench_rasterize(c: &mut Criterion) {
    let qr = encode("https://example.com", ErrorCorrectionLevel::Medium).unwrap();
    c.bench_function("rasterize_image_512", |b| {
        b.iter(|| rasterize_image(black_box(&qr), 512))
    });
    c.bench_function("rasterize_png_512", |b| b.iter(|| rasterize(black_box(&qr), 512)));
    c.bench_function("preview_text", |b| b.iter(|| preview_text(black_box(&qr), 15)));
}

criterion_group!(
    benches,
    bench_encode_small,
    bench_encode_url,
    bench_encode_version_40,
    bench_rasterize
);
criterion_main!(benches);
