use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use retxt::{TranscodeOptions, Transcoder, charmap, legacy, unicode};

fn bench_transcode(c: &mut Criterion) {
    let latin = "Grüße aus Köln, ça va très bien. ".repeat(2048);
    let mixed = "Hello 世界, こんにちは! ".repeat(2048);
    let ebcdic: Vec<u8> = (0..64 * 1024).map(|i| 0xC1 + (i % 9) as u8).collect();
    let transcoder = Transcoder::new(TranscodeOptions::default());

    let mut group = c.benchmark_group("transcode");

    group.throughput(Throughput::Bytes(latin.len() as u64));
    group.bench_function("utf8_to_windows_1252", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(latin.len());
            transcoder
                .transcode(black_box(latin.as_bytes()), &mut out, &unicode::UTF_8, &legacy::WINDOWS_1252)
                .unwrap();
            out
        })
    });
    group.bench_function("utf8_to_latin1_table", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(latin.len());
            transcoder
                .transcode(black_box(latin.as_bytes()), &mut out, &unicode::UTF_8, &charmap::ISO_8859_1)
                .unwrap();
            out
        })
    });

    group.throughput(Throughput::Bytes(mixed.len() as u64));
    group.bench_function("utf8_to_utf16le", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(mixed.len() * 2);
            transcoder
                .transcode(black_box(mixed.as_bytes()), &mut out, &unicode::UTF_8, &unicode::UTF_16_LE)
                .unwrap();
            out
        })
    });
    group.bench_function("utf8_to_shift_jis", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(mixed.len());
            transcoder
                .transcode(black_box(mixed.as_bytes()), &mut out, &unicode::UTF_8, &legacy::SHIFT_JIS)
                .unwrap();
            out
        })
    });

    group.throughput(Throughput::Bytes(ebcdic.len() as u64));
    group.bench_function("ebcdic_037_to_utf8", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(ebcdic.len());
            transcoder
                .transcode(black_box(&ebcdic[..]), &mut out, &charmap::IBM_037, &unicode::UTF_8)
                .unwrap();
            out
        })
    });

    group.finish();
}

criterion_group!(benches, bench_transcode);
criterion_main!(benches);
