//! Benchmark suite for sprite container decoding and encoding
//!
//! This benchmark measures container parsing, frame assembly and the classic
//! writer on synthetic sprites.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use isospr_benches::{
	brotli_compress, generate_classic_sprite, generate_frames, generate_mobile_sprite, sizes,
};
use isospr_types::file::{decode_classic, decode_mobile, encode_classic};
use std::hint::black_box;

/// Benchmark classic parsing alone; tiles stay encoded until rendered
fn bench_classic_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("classic_decode");

	for (name, (count, width, height)) in
		[("small", sizes::SMALL), ("medium", sizes::MEDIUM), ("large", sizes::LARGE)]
	{
		let data = generate_classic_sprite(count, width, height);
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| black_box(decode_classic(black_box(data))));
		});
	}

	group.finish();
}

/// Benchmark decoding plus assembly of every frame
fn bench_classic_render(c: &mut Criterion) {
	let mut group = c.benchmark_group("classic_render");

	for (name, (count, width, height)) in [("small", sizes::SMALL), ("medium", sizes::MEDIUM)] {
		let data = generate_classic_sprite(count, width, height);
		group.throughput(Throughput::Elements((count as u64) * u64::from(width * height)));
		group.bench_with_input(BenchmarkId::new("render_all", name), &data, |b, data| {
			b.iter(|| {
				let sprite = decode_classic(black_box(data));
				black_box(sprite.map(|s| s.render_all()))
			});
		});
	}

	group.finish();
}

/// Benchmark the mobile reader with and without the Brotli layer
fn bench_mobile_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("mobile_decode");

	let raw = generate_mobile_sprite(16, 256);
	let compressed = brotli_compress(&raw);

	group.throughput(Throughput::Bytes(raw.len() as u64));
	group.bench_function("raw", |b| {
		b.iter(|| black_box(decode_mobile(black_box(&raw))));
	});
	group.bench_function("brotli", |b| {
		b.iter(|| black_box(decode_mobile(black_box(&compressed))));
	});

	group.finish();
}

/// Benchmark tiling, deduplication and serialization
fn bench_classic_encode(c: &mut Criterion) {
	let mut group = c.benchmark_group("classic_encode");

	let (count, width, height) = sizes::MEDIUM;
	let frames = generate_frames(count, width, height);
	group.throughput(Throughput::Elements(count as u64));
	group.bench_function("encode_medium", |b| {
		b.iter(|| black_box(encode_classic(black_box(&frames), &[])));
	});

	group.finish();
}

criterion_group!(
	benches,
	bench_classic_decode,
	bench_classic_render,
	bench_mobile_decode,
	bench_classic_encode
);
criterion_main!(benches);
