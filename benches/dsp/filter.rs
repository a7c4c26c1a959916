//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::filter::{modulated_cutoff, SVFilter};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let filters = [
            ("lowpass", SVFilter::lowpass(1000.0)),
            ("highpass", SVFilter::highpass(1000.0)),
            ("bandpass", SVFilter::bandpass(1000.0)),
        ];
        for (name, mut filter) in filters {
            filter.prepare(48_000.0);
            filter.set_resonance(0.7);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }

        // Cutoff recomputed every sample, as a voice with a filter envelope does
        let mut filter = SVFilter::lowpass(1000.0);
        filter.prepare(48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                let len = buffer.len() as f32;
                for (i, sample) in buffer.iter_mut().enumerate() {
                    filter.set_cutoff(modulated_cutoff(1000.0, 0.8, i as f32 / len));
                    *sample = filter.process_sample(*sample);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
