//! Benchmarks for complete voices.
//!
//! One `SynthVoice` rendering stereo blocks under progressively heavier
//! patches: the default, every modulation routing, and the noise path.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{
    dsp::{LfoTarget, Waveform},
    synth::NotePitch,
    ParamId, ParamSnapshot, SynthVoice,
};

use crate::BLOCK_SIZES;

fn voice(params: Arc<ParamSnapshot>) -> SynthVoice {
    let mut voice = SynthVoice::new(params, 0);
    voice.prepare(48_000.0, 512, 2);
    voice.start_note(NotePitch::Midi(45), 0.8); // A2, typical bass note
    voice
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    // === DEFAULT PATCH ===
    // Three oscillators with unison, sub on, no noise
    let default_params = Arc::new(ParamSnapshot::new());

    // === MODULATED ===
    // Filter envelope plus both LFOs on pitch and cutoff
    let modulated = Arc::new(ParamSnapshot::new());
    modulated.set(ParamId::FilterAmount, 0.8);
    modulated.set(ParamId::LfoTarget, LfoTarget::Pitch.index() as f32);
    modulated.set(ParamId::Lfo2Target, LfoTarget::Cutoff.index() as f32);
    modulated.set(ParamId::Osc3Wave, Waveform::Pulse.index() as f32);

    // === NOISE ===
    // All three noise colours through the highpass
    let noisy = Arc::new(ParamSnapshot::new());
    noisy.set(ParamId::MixNoiseW, 0.3);
    noisy.set(ParamId::MixNoiseP, 0.3);
    noisy.set(ParamId::MixNoiseB, 0.3);
    noisy.set(ParamId::NoiseHpfOn, 1.0);

    let patches = [
        ("default", default_params),
        ("modulated", modulated),
        ("noise", noisy),
    ];

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for (name, params) in &patches {
            let mut voice = voice(params.clone());
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, &n| {
                b.iter(|| {
                    let mut outs: [&mut [f32]; 2] = [&mut left, &mut right];
                    voice.render(black_box(&mut outs), 0, n);
                })
            });
        }
    }

    group.finish();
}
