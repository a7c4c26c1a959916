//! Benchmarks for the per-voice LFO bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::lfo::{LfoBank, LfoRates};

use crate::BLOCK_SIZES;

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    for &size in BLOCK_SIZES {
        let mut bank = LfoBank::new();
        bank.prepare(48_000.0);
        bank.set_rates(&LfoRates {
            lfo1: 5.0,
            lfo2: 0.8,
            pwm: [1.2, 0.8, 0.6],
        });

        group.bench_with_input(BenchmarkId::new("bank", size), &size, |b, &n| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for _ in 0..n {
                    let frame = bank.next_frame();
                    acc += frame.lfo1 + frame.lfo2 + frame.pwm[0];
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
