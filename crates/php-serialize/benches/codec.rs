//! Benchmarks for the PHP serialize codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use php_serialize::{dumps, loads, PhpValue};

fn decode_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_scalars");

    for (name, data) in [
        ("null", &b"N;"[..]),
        ("bool", &b"b:1;"[..]),
        ("int", &b"i:1234567890;"[..]),
        ("float", &b"d:3.141592653589793;"[..]),
    ] {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| loads(black_box(data))));
    }

    group.finish();
}

fn decode_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_strings");

    for (name, len) in [("short_5b", 5), ("medium_100b", 100), ("large_10kb", 10_000), ("huge_1mb", 1_000_000)] {
        let data = format!("s:{}:\"{}\";", len, "x".repeat(len));
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| loads(black_box(data))));
    }

    group.finish();
}

fn int_pairs(count: usize) -> String {
    let items: String = (0..count).map(|i| format!("i:{};i:{};", i, i * 2)).collect();
    format!("a:{}:{{{}}}", count, items)
}

fn decode_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_arrays");

    let empty = b"a:0:{}";
    group.throughput(Throughput::Bytes(empty.len() as u64));
    group.bench_function("empty", |b| b.iter(|| loads(black_box(empty))));

    for (name, count) in [("small_10", 10), ("medium_100", 100), ("large_1000", 1000)] {
        let data = int_pairs(count);
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| loads(black_box(data))));
    }

    // Associative array with string keys
    let assoc: String = {
        let items: String = (0..100)
            .map(|i| {
                let key = format!("key_{}", i);
                format!("s:{}:\"{}\";i:{};", key.len(), key, i)
            })
            .collect();
        format!("a:100:{{{}}}", items)
    };
    let assoc = assoc.as_bytes();
    group.throughput(Throughput::Bytes(assoc.len() as u64));
    group.bench_function("assoc_100", |b| b.iter(|| loads(black_box(assoc))));

    group.finish();
}

fn decode_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_nested");

    for depth in [10, 50] {
        let mut data = String::from("s:4:\"leaf\";");
        for i in 0..depth {
            let key = format!("k{}", i % 10);
            data = format!("a:1:{{s:{}:\"{}\";{}}}", key.len(), key, data);
        }
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("depth_{}", depth), |b| b.iter(|| loads(black_box(data))));
    }

    group.finish();
}

fn form_data() -> &'static [u8] {
    br#"a:3:{s:6:"fields";a:3:{i:0;a:3:{s:4:"type";s:4:"text";s:5:"label";s:4:"Name";s:8:"required";b:1;}i:1;a:3:{s:4:"type";s:5:"email";s:5:"label";s:5:"Email";s:8:"required";b:1;}i:2;a:3:{s:4:"type";s:8:"textarea";s:5:"label";s:7:"Message";s:8:"required";b:0;}}s:8:"settings";a:2:{s:11:"submit_text";s:6:"Submit";s:15:"success_message";s:10:"Thank you!";}s:11:"permissions";a:3:{i:0;s:4:"read";i:1;s:5:"write";i:2;s:6:"delete";}}"#
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let form = loads(form_data()).unwrap();
    group.throughput(Throughput::Bytes(form_data().len() as u64));
    group.bench_function("form_data", |b| b.iter(|| dumps(black_box(&form))));

    let list = PhpValue::list((0..1000).map(|i| PhpValue::Int(i * 2)));
    group.bench_function("list_1000", |b| b.iter(|| dumps(black_box(&list))));

    let text = PhpValue::from("é".repeat(5_000));
    group.bench_function("text_10kb", |b| b.iter(|| dumps(black_box(&text))));

    group.finish();
}

fn round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");

    group.throughput(Throughput::Bytes(form_data().len() as u64));
    group.bench_function("form_data", |b| {
        b.iter(|| {
            let value = loads(black_box(form_data())).unwrap();
            dumps(&value).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    decode_scalars,
    decode_strings,
    decode_arrays,
    decode_nested,
    encode,
    round_trip,
);

criterion_main!(benches);
