//! Benchmarks for the voice pool.
//!
//! Chords of increasing size on an eight-voice engine, including the
//! message drain and meter update done every block.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{synth::message::NoMessages, EngineConfig, ParamSnapshot, PolySynth};

use crate::BLOCK_SIZES;

const CHORD: [u8; 8] = [48, 52, 55, 59, 60, 64, 67, 71];

pub fn bench_poly(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/poly");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for notes in [1usize, 4, 8] {
            let config = EngineConfig::new()
                .with_sample_rate(48_000.0)
                .with_voice_count(8);
            let mut synth = PolySynth::new(config, Arc::new(ParamSnapshot::new()), NoMessages)
                .expect("engine config is valid");
            for &note in &CHORD[..notes] {
                synth.note_on(note, 100);
            }

            let id = BenchmarkId::new(format!("{notes}_voices"), size);
            group.bench_with_input(id, &size, |b, _| {
                b.iter(|| {
                    let mut outs: [&mut [f32]; 2] = [&mut left, &mut right];
                    synth.render_block(black_box(&mut outs));
                })
            });
        }
    }

    group.finish();
}
