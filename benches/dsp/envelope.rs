//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::envelope::Envelope;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn prepared(attack: f32, decay: f32, sustain: f32, release: f32) -> Envelope {
    let mut env = Envelope::adsr(attack, decay, sustain, release);
    env.prepare(SAMPLE_RATE);
    env
}

/// Gate the envelope and run it far enough to settle on sustain.
fn held(env: &mut Envelope) {
    env.note_on();
    for _ in 0..200 {
        env.next_sample();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut env = prepared(0.1, 0.1, 0.7, 0.3);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        let mut env = prepared(0.001, 0.001, 0.7, 0.3);
        held(&mut env);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        // Gate flips every block: half a block of release, then a re-attack
        // from wherever the release left off.
        let mut env = prepared(0.002, 0.002, 0.7, 0.05);
        held(&mut env);
        let half = size / 2;
        group.bench_with_input(BenchmarkId::new("retrigger_from_release", size), &size, |b, _| {
            b.iter(|| {
                env.note_off();
                env.render(black_box(&mut buffer[..half]));
                env.note_on();
                env.render(black_box(&mut buffer[half..]));
            })
        });

        // The voice pushes the current knob values into both envelopes at
        // the start of every block.
        let mut amp = prepared(0.01, 0.2, 0.6, 0.3);
        let mut filter = prepared(0.05, 0.4, 0.2, 0.5);
        held(&mut amp);
        held(&mut filter);
        let mut tick = 0u32;
        group.bench_with_input(BenchmarkId::new("set_parameters_per_block", size), &size, |b, _| {
            b.iter(|| {
                tick = tick.wrapping_add(1);
                let wobble = (tick % 16) as f32 * 0.001;
                amp.set_parameters(0.01 + wobble, 0.2, 0.6, 0.3);
                filter.set_parameters(0.05, 0.4 + wobble, 0.2, 0.5);
                for sample in buffer.iter_mut() {
                    *sample = amp.next_sample() * filter.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
