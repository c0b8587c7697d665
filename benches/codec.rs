use criterion::{criterion_group, criterion_main, Criterion};

use docuwire::content::Content;
use docuwire::model::attachment::Attachment;

fn payload() -> Vec<u8> {
    (0u8..=255).cycle().take(256 * 1024).collect()
}

fn bench_marshal_inline(c: &mut Criterion) {
    let bytes = payload();

    c.bench_function("marshal_inline_256k", |b| {
        b.iter(|| {
            let mut att = Attachment::new(
                "blob.bin",
                "application/octet-stream",
                Content::from_bytes(bytes.clone()),
            );
            let mut out = Vec::with_capacity(bytes.len() * 2);
            att.to_json_writer(&mut out).unwrap();
            out.len()
        })
    });
}

fn bench_unmarshal_inline(c: &mut Criterion) {
    let bytes = payload();
    let mut att = Attachment::new(
        "blob.bin",
        "application/octet-stream",
        Content::from_bytes(bytes),
    );
    let json = att.to_json_string().unwrap();

    c.bench_function("unmarshal_inline_256k", |b| {
        b.iter(|| {
            let mut att = Attachment::from_json_str(&json).unwrap();
            att.content.as_mut().unwrap().read_all().unwrap().len()
        })
    });
}

criterion_group!(benches, bench_marshal_inline, bench_unmarshal_inline);
criterion_main!(benches);
