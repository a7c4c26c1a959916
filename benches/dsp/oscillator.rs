//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::{
    noise::NoiseBus,
    oscillator::{OscillatorUnit, SubOscillator, SubWaveform},
    Waveform,
};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut noise = NoiseBus::with_seed(1);

        for waveform in Waveform::ALL {
            let mut osc = OscillatorUnit::new();
            osc.prepare(48_000.0);
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    for out in buffer.iter_mut() {
                        *out = osc.next_sample(black_box(waveform), 440.0, 0.5, &mut noise);
                    }
                    black_box(&buffer);
                })
            });
        }

        // Sub-oscillator square, one octave down
        let mut sub = SubOscillator::new();
        sub.prepare(48_000.0);
        group.bench_with_input(BenchmarkId::new("sub", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = sub.next_sample(black_box(SubWaveform::Square), 220.0);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
