//! Benchmarks for the noise generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::noise::{highpass_coefficient, NoiseBus};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut bus = NoiseBus::with_seed(7);

        group.bench_with_input(BenchmarkId::new("white", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = bus.white();
                }
                black_box(&buffer);
            })
        });

        group.bench_with_input(BenchmarkId::new("pink", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = bus.pink();
                }
                black_box(&buffer);
            })
        });

        group.bench_with_input(BenchmarkId::new("brown", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = bus.brown();
                }
                black_box(&buffer);
            })
        });

        // All three colours plus the highpass, the per-sample voice cost
        let alpha = highpass_coefficient(120.0, 48_000.0);
        group.bench_with_input(BenchmarkId::new("mixed_hpf", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    let x = 0.3 * bus.white() + 0.3 * bus.pink() + 0.3 * bus.brown();
                    *out = bus.highpass(x, black_box(alpha));
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
