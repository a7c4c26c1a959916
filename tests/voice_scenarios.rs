//! End-to-end checks on rendered voice output, measured in the frequency
//! domain with rustfft.

use std::sync::Arc;

use rustfft::{num_complex::Complex, FftPlanner};
use saavy_synth::{
    dsp::{FilterType, LfoTarget, Waveform},
    synth::{NotePitch, VoiceState},
    ParamId, ParamSnapshot, SynthVoice,
};

const SAMPLE_RATE: f32 = 44_100.0;
const BLOCK: usize = 512;

/// One oscillator slot at full level, everything else silent or neutral.
fn single_osc_patch(waveform: Waveform) -> Arc<ParamSnapshot> {
    let params = ParamSnapshot::new();
    params.set(ParamId::Osc1Wave, waveform.index() as f32);
    params.set(ParamId::Mix1, 1.0);
    params.set(ParamId::Mix2, 0.0);
    params.set(ParamId::Mix3, 0.0);
    params.set(ParamId::UniOn, 0.0);
    params.set(ParamId::SubOn, 0.0);
    params.set(ParamId::StereoSpread, 0.0);
    params.set(ParamId::LfoDepth, 0.0);
    params.set(ParamId::Lfo2Depth, 0.0);
    for id in [ParamId::PwmDepth1, ParamId::PwmDepth2, ParamId::PwmDepth3] {
        params.set(id, 0.0);
    }
    params.set(ParamId::FilterAmount, 0.0);
    params.set(ParamId::Cutoff, 20_000.0);
    params.set(ParamId::Gain, 0.0);
    Arc::new(params)
}

fn prepared_voice(params: Arc<ParamSnapshot>) -> SynthVoice {
    let mut voice = SynthVoice::new(params, 0);
    voice.prepare(SAMPLE_RATE, BLOCK, 2);
    voice
}

/// Render `n` samples in `BLOCK`-sized chunks and return the left channel.
fn render(voice: &mut SynthVoice, n: usize) -> Vec<f32> {
    let mut left = vec![0.0f32; n];
    let mut right = vec![0.0f32; n];
    let mut start = 0;
    while start < n {
        let len = BLOCK.min(n - start);
        let mut outs: [&mut [f32]; 2] = [&mut left, &mut right];
        voice.render(&mut outs, start, len);
        start += len;
    }
    left
}

/// Hann-windowed magnitude spectrum; bin spacing is SAMPLE_RATE / len.
fn magnitudes(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    let fft = FftPlanner::new().plan_fft_forward(n);
    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let w = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos());
            Complex::new(x * w, 0.0)
        })
        .collect();
    fft.process(&mut buffer);
    buffer[..n / 2].iter().map(|c| c.norm()).collect()
}

fn band_power_db(spectrum: &[f32], lo_hz: f32, hi_hz: f32, bin_hz: f32) -> f32 {
    let lo = (lo_hz / bin_hz) as usize;
    let hi = (hi_hz / bin_hz) as usize;
    let bins = &spectrum[lo..=hi];
    let mean = bins.iter().map(|m| m * m).sum::<f32>() / bins.len() as f32;
    10.0 * mean.max(1e-20).log10()
}

#[test]
fn sine_note_has_expected_pitch_and_sustain() {
    let params = single_osc_patch(Waveform::Sine);
    params.set(ParamId::Attack, 0.01);
    params.set(ParamId::Decay, 0.12);
    params.set(ParamId::Sustain, 0.8);
    params.set(ParamId::Release, 0.25);

    let mut voice = prepared_voice(params);
    voice.start_note(NotePitch::Hz(440.0), 1.0);

    // 0.13 s of attack plus decay lands exactly on the plateau
    let sustain_at = (0.13f32 * SAMPLE_RATE).ceil() as usize;
    assert_eq!(sustain_at, 5733);
    let mut signal = render(&mut voice, sustain_at);
    assert!((voice.envelope_level() - 0.8).abs() < 1e-5);

    signal.extend(render(&mut voice, SAMPLE_RATE as usize - sustain_at));
    assert_eq!(signal.len(), 44_100);

    let spectrum = magnitudes(&signal);
    let (peak_bin, _) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .expect("spectrum is not empty");
    // One-second window: one bin per hertz
    assert!((peak_bin as f32 - 440.0).abs() <= 1.0, "peak at {peak_bin} Hz");
    assert!(signal.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn unison_splits_saw_into_two_half_level_partials() {
    let settle = 1_000;
    let n = SAMPLE_RATE as usize;

    let render_saw = |unison: bool| {
        let params = single_osc_patch(Waveform::SawUp);
        params.set(ParamId::Attack, 0.001);
        params.set(ParamId::Decay, 0.001);
        params.set(ParamId::Sustain, 1.0);
        params.set(ParamId::UniOn, if unison { 1.0 } else { 0.0 });
        params.set(ParamId::UniDetune, 12.0);

        let mut voice = prepared_voice(params);
        voice.start_note(NotePitch::Hz(440.0), 1.0);
        render(&mut voice, settle);
        magnitudes(&render(&mut voice, n))
    };

    let single = render_saw(false);
    let doubled = render_saw(true);

    let companion_hz = 440.0 * 2.0f32.powf(12.0 / 1200.0);
    let companion_bin = companion_hz.round() as usize;
    assert_eq!(companion_bin, 443);

    // The undetuned copy stays at 440 Hz with half the level
    let main_ratio = doubled[440] / single[440];
    assert!((0.4..0.6).contains(&main_ratio), "main ratio {main_ratio}");

    // The companion sits 12 cents up, also at half level
    let companion_ratio = doubled[companion_bin] / single[440];
    assert!(
        (0.4..0.6).contains(&companion_ratio),
        "companion ratio {companion_ratio}"
    );
    assert!(single[companion_bin] < 0.05 * single[440]);
}

#[test]
fn unison_companion_sits_below_pitch_on_the_middle_oscillator() {
    let render_slot = |slot: usize| {
        let params = single_osc_patch(Waveform::Sine);
        params.set(ParamId::Mix1, 0.0);
        let (wave, mix) = [
            (ParamId::Osc1Wave, ParamId::Mix1),
            (ParamId::Osc2Wave, ParamId::Mix2),
            (ParamId::Osc3Wave, ParamId::Mix3),
        ][slot];
        params.set(wave, Waveform::Sine.index() as f32);
        params.set(mix, 1.0);
        params.set(ParamId::Attack, 0.001);
        params.set(ParamId::Decay, 0.001);
        params.set(ParamId::Sustain, 1.0);
        params.set(ParamId::UniOn, 1.0);
        params.set(ParamId::UniDetune, 50.0);

        let mut voice = prepared_voice(params);
        voice.start_note(NotePitch::Hz(440.0), 1.0);
        render(&mut voice, 1_000);
        magnitudes(&render(&mut voice, SAMPLE_RATE as usize))
    };

    // 50 cents either side of 440 Hz: 427.5 Hz and 452.9 Hz
    let below = |spectrum: &[f32]| band_power_db(spectrum, 425.0, 430.0, 1.0);
    let above = |spectrum: &[f32]| band_power_db(spectrum, 450.0, 455.0, 1.0);

    for slot in [0, 2] {
        let spectrum = render_slot(slot);
        assert!(
            above(&spectrum) - below(&spectrum) > 20.0,
            "osc{} companion should be detuned up",
            slot + 1
        );
    }

    let spectrum = render_slot(1);
    assert!(
        below(&spectrum) - above(&spectrum) > 20.0,
        "osc2 companion should be detuned down"
    );
}

/// Frequency of each cycle, measured between interpolated rising zero
/// crossings.
fn cycle_frequencies(signal: &[f32]) -> Vec<f32> {
    let crossings: Vec<f32> = signal
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] <= 0.0 && w[1] > 0.0)
        .map(|(i, w)| i as f32 + w[0] / (w[0] - w[1]))
        .collect();
    crossings
        .windows(2)
        .map(|pair| SAMPLE_RATE / (pair[1] - pair[0]))
        .collect()
}

#[test]
fn lfo1_pitch_swing_is_twice_lfo2_at_equal_depth() {
    let swing = |lfo2: bool| {
        let params = single_osc_patch(Waveform::Sine);
        params.set(ParamId::Attack, 0.001);
        params.set(ParamId::Decay, 0.001);
        params.set(ParamId::Sustain, 1.0);
        let (target, depth, rate) = if lfo2 {
            (ParamId::Lfo2Target, ParamId::Lfo2Depth, ParamId::Lfo2Rate)
        } else {
            (ParamId::LfoTarget, ParamId::LfoDepth, ParamId::LfoRate)
        };
        params.set(target, LfoTarget::Pitch.index() as f32);
        params.set(depth, 1.0);
        params.set(rate, 4.0);

        let mut voice = prepared_voice(params);
        voice.start_note(NotePitch::Hz(440.0), 1.0);
        render(&mut voice, 1_000);
        let freqs = cycle_frequencies(&render(&mut voice, SAMPLE_RATE as usize));
        let hi = freqs.iter().copied().fold(f32::MIN, f32::max);
        let lo = freqs.iter().copied().fold(f32::MAX, f32::min);
        assert!(lo < 440.0 && hi > 440.0);
        hi - lo
    };

    let lfo1 = swing(false);
    let lfo2 = swing(true);

    // Depth 1 on LFO1 is a tenth of a semitone: about 440 ± 2.5 Hz
    assert!((4.0..6.5).contains(&lfo1), "lfo1 swing {lfo1} Hz");
    let ratio = lfo1 / lfo2;
    assert!((1.8..2.2).contains(&ratio), "lfo1/lfo2 swing ratio {ratio}");
}

#[test]
fn lowpass_attenuates_noise_above_cutoff() {
    let params = single_osc_patch(Waveform::Sine);
    params.set(ParamId::Mix1, 0.0);
    params.set(ParamId::MixNoiseW, 1.0);
    params.set(ParamId::FilterType, FilterType::LowPass.index() as f32);
    params.set(ParamId::Cutoff, 1_000.0);
    params.set(ParamId::Resonance, 0.7);
    params.set(ParamId::Attack, 0.001);
    params.set(ParamId::Decay, 0.001);
    params.set(ParamId::Sustain, 1.0);

    let mut voice = prepared_voice(params);
    voice.start_note(NotePitch::Hz(440.0), 1.0);
    render(&mut voice, 1_000);

    let n = 32_768;
    let spectrum = magnitudes(&render(&mut voice, n));
    let bin_hz = SAMPLE_RATE / n as f32;

    let passband = band_power_db(&spectrum, 100.0, 600.0, bin_hz);
    let stopband = band_power_db(&spectrum, 3_800.0, 4_200.0, bin_hz);
    assert!(
        passband - stopband >= 10.0,
        "only {:.1} dB of attenuation",
        passband - stopband
    );
}

#[test]
fn released_voice_decays_then_returns_to_pool() {
    let params = single_osc_patch(Waveform::Sine);
    params.set(ParamId::Attack, 0.001);
    params.set(ParamId::Decay, 0.001);
    params.set(ParamId::Sustain, 0.8);
    params.set(ParamId::Release, 0.05);
    params.set(ParamId::FilterRelease, 0.05);

    let mut voice = prepared_voice(params);
    voice.start_note(NotePitch::Midi(69), 1.0);
    render(&mut voice, 4_096);
    assert_eq!(voice.state(), VoiceState::Active);

    voice.stop_note(true);
    assert_eq!(voice.state(), VoiceState::Releasing);
    assert!(voice.is_active());

    // 50 ms of release is 2205 samples; the tail is still audible early on
    let early = render(&mut voice, BLOCK);
    assert!(voice.is_active());
    assert!(early.iter().any(|s| s.abs() > 1e-3));

    let mut blocks = 0;
    let mut last = early;
    while voice.is_active() {
        last = render(&mut voice, BLOCK);
        blocks += 1;
        assert!(blocks < 20, "voice never finished releasing");
    }

    assert!(voice.is_free());
    assert!(last.iter().rev().take(16).all(|s| s.abs() < 1e-2));

    // A free voice adds nothing and can take a new note
    assert!(render(&mut voice, BLOCK).iter().all(|&s| s == 0.0));
    voice.start_note(NotePitch::Midi(72), 1.0);
    assert_eq!(voice.state(), VoiceState::Active);
    assert_eq!(voice.note(), Some(72));
}
