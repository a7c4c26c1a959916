use std::sync::Arc;

use crate::{
    dsp::{
        envelope::Envelope,
        filter::{modulated_cutoff, FilterType, SVFilter},
        gain::{db_to_gain, stereo_pan},
        lfo::{
            amp_factor, cutoff_ratio, pitch_ratio, pwm_offset, LfoBank, LfoRates, LfoTarget,
            LFO1_PITCH_SCALE, LFO2_PITCH_SCALE,
        },
        noise::{highpass_coefficient, NoiseBus},
        oscillator::{OscillatorUnit, SubOctave, SubOscillator, SubWaveform, Waveform},
    },
    io::converter::midi_note_to_freq,
    params::{ParamId, ParamSnapshot},
    synth::message::PITCH_WHEEL_CENTER,
};

/*
Voice Signal Flow
=================

    LFO1, LFO2 ──────────────┐ pitch / amp / cutoff / pwm
    PWM LFO 1..3 ──┐         │
                   ▼         ▼
    OSC1 ─┬─ unison ─× mix1 ─┐
    OSC2 ─┼─ unison ─× mix2 ─┤
    OSC3 ─┴─ unison ─× mix3 ─┤
    SUB ────────────× level ─┼─→ dry ─┬─→ SVF L ─× amp × panL × gain ─→ out[0]
    NOISE (W/P/B, HPF) ──────┘        └─→ SVF R ─× amp × panR × gain ─→ out[1]
                                           ▲
                              filter env ──┘

Every oscillator slot owns two `OscillatorUnit`s: the main one and its unison
companion. Unison detunes the companion up by `uniDetune` cents for slots 1
and 3 and down for slot 2, then averages the pair.

Both filters receive the same dry signal, cutoff and Q. Only their internal
state is separate.

Parameters are read from the shared snapshot once per `render` call. The
LFOs, envelopes and filter cutoff move every sample.
*/

/// Lowest pulse width the voice hands to an oscillator.
pub const MIN_PULSE_WIDTH: f32 = 0.05;
/// Highest pulse width the voice hands to an oscillator.
pub const MAX_PULSE_WIDTH: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelopes in release phase
}

/// What to play: a MIDI note number or a raw frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotePitch {
    Midi(u8),
    Hz(f32),
}

impl NotePitch {
    pub fn frequency(self) -> f32 {
        match self {
            NotePitch::Midi(note) => midi_note_to_freq(note),
            NotePitch::Hz(hz) => hz,
        }
    }

    pub fn note(self) -> Option<u8> {
        match self {
            NotePitch::Midi(note) => Some(note),
            NotePitch::Hz(_) => None,
        }
    }
}

impl From<u8> for NotePitch {
    fn from(note: u8) -> Self {
        NotePitch::Midi(note)
    }
}

impl From<f32> for NotePitch {
    fn from(hz: f32) -> Self {
        NotePitch::Hz(hz)
    }
}

/// Everything the render loop reads from the snapshot, taken once per block.
#[derive(Debug, Clone, Copy)]
struct BlockParams {
    waves: [Waveform; 3],
    mix: [f32; 3],
    detune: [f32; 3],
    spread: f32,
    unison: bool,
    unison_cents: f32,

    pulse_width: [f32; 3],
    pwm_depth: [f32; 3],

    sub_on: bool,
    sub_wave: SubWaveform,
    sub_octave: SubOctave,
    sub_level: f32,

    noise_mix: [f32; 3],
    noise_hpf_on: bool,
    noise_hpf_hz: f32,

    amp_adsr: [f32; 4],
    filter_adsr: [f32; 4],
    filter_type: FilterType,
    cutoff: f32,
    resonance: f32,
    filter_amount: f32,

    lfo_rates: LfoRates,
    lfo1_depth: f32,
    lfo1_target: LfoTarget,
    lfo2_depth: f32,
    lfo2_target: LfoTarget,

    gain_db: f32,
}

impl BlockParams {
    fn read(p: &ParamSnapshot) -> Self {
        use ParamId as P;

        Self {
            waves: [
                Waveform::from_index(p.choice(P::Osc1Wave)),
                Waveform::from_index(p.choice(P::Osc2Wave)),
                Waveform::from_index(p.choice(P::Osc3Wave)),
            ],
            mix: [p.get(P::Mix1), p.get(P::Mix2), p.get(P::Mix3)],
            detune: [p.get(P::Detune1), p.get(P::Detune2), p.get(P::Detune3)],
            spread: p.get(P::StereoSpread),
            unison: p.flag(P::UniOn),
            unison_cents: p.get(P::UniDetune),

            pulse_width: [p.get(P::Pwm1), p.get(P::Pwm2), p.get(P::Pwm3)],
            pwm_depth: [p.get(P::PwmDepth1), p.get(P::PwmDepth2), p.get(P::PwmDepth3)],

            sub_on: p.flag(P::SubOn),
            sub_wave: SubWaveform::from_index(p.choice(P::SubWave)),
            sub_octave: SubOctave::from_index(p.choice(P::SubOct)),
            sub_level: p.get(P::SubLevel),

            noise_mix: [p.get(P::MixNoiseW), p.get(P::MixNoiseP), p.get(P::MixNoiseB)],
            noise_hpf_on: p.flag(P::NoiseHpfOn),
            noise_hpf_hz: p.get(P::NoiseHpf),

            amp_adsr: [p.get(P::Attack), p.get(P::Decay), p.get(P::Sustain), p.get(P::Release)],
            filter_adsr: [
                p.get(P::FilterAttack),
                p.get(P::FilterDecay),
                p.get(P::FilterSustain),
                p.get(P::FilterRelease),
            ],
            filter_type: FilterType::from_index(p.choice(P::FilterType)),
            cutoff: p.get(P::Cutoff),
            resonance: p.get(P::Resonance),
            filter_amount: p.get(P::FilterAmount),

            lfo_rates: LfoRates {
                lfo1: p.get(P::LfoRate),
                lfo2: p.get(P::Lfo2Rate),
                pwm: [p.get(P::PwmRate1), p.get(P::PwmRate2), p.get(P::PwmRate3)],
            },
            lfo1_depth: p.get(P::LfoDepth),
            lfo1_target: LfoTarget::from_index(p.choice(P::LfoTarget)),
            lfo2_depth: p.get(P::Lfo2Depth),
            lfo2_target: LfoTarget::from_index(p.choice(P::Lfo2Target)),

            gain_db: p.get(P::Gain),
        }
    }
}

/// One complete subtractive voice: three oscillator slots with unison, a
/// sub-oscillator, noise, two envelopes, five LFOs and a stereo filter.
pub struct SynthVoice {
    params: Arc<ParamSnapshot>,
    slot: usize,

    state: VoiceState,
    note: Option<u8>,
    base_freq: f32,
    velocity: f32,
    pitch_bend: f32, // semitones
    channel_pressure: f32,
    aftertouch: f32,
    age: u64,

    sample_rate: f32,
    max_block_size: usize,
    channels: usize,
    prepared: bool,

    oscillators: [[OscillatorUnit; 2]; 3],
    sub: SubOscillator,
    noise: NoiseBus,
    amp_env: Envelope,
    filter_env: Envelope,
    lfos: LfoBank,
    filters: [SVFilter; 2],
}

impl SynthVoice {
    /// `slot` seeds the noise generator so voices decorrelate.
    pub fn new(params: Arc<ParamSnapshot>, slot: usize) -> Self {
        Self {
            params,
            slot,

            state: VoiceState::Free,
            note: None,
            base_freq: 0.0,
            velocity: 0.0,
            pitch_bend: 0.0,
            channel_pressure: 0.0,
            aftertouch: 0.0,
            age: 0,

            sample_rate: 0.0,
            max_block_size: 0,
            channels: 0,
            prepared: false,

            oscillators: Default::default(),
            sub: SubOscillator::new(),
            noise: NoiseBus::with_seed(slot as u64),
            amp_env: Envelope::new(),
            filter_env: Envelope::new(),
            lfos: LfoBank::new(),
            filters: [SVFilter::new(FilterType::LowPass), SVFilter::new(FilterType::LowPass)],
        }
    }

    /// Set the stream format. Resets every phase, envelope and filter, and
    /// frees the voice.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, channels: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.channels = channels.max(1);

        let sr = sample_rate as f64;
        for slot in &mut self.oscillators {
            for unit in slot.iter_mut() {
                unit.prepare(sr);
            }
        }
        self.sub.prepare(sr);
        self.noise.reset();
        self.lfos.prepare(sr);
        for filter in &mut self.filters {
            filter.prepare(sample_rate);
        }
        self.amp_env.prepare(sample_rate);
        self.filter_env.prepare(sample_rate);
        self.amp_env.reset();
        self.filter_env.reset();
        self.free();

        self.prepared = true;
        tracing::debug!(
            slot = self.slot,
            sample_rate,
            max_block_size,
            channels = self.channels,
            "voice prepared"
        );
    }

    /// Trigger both envelopes. Pitch bend and pressure start from neutral.
    pub fn start_note(&mut self, pitch: NotePitch, velocity: f32) {
        self.note = pitch.note();
        self.base_freq = pitch.frequency();
        self.velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };
        self.pitch_bend = 0.0;
        self.channel_pressure = 0.0;
        self.aftertouch = 0.0;
        self.age = 0;
        self.state = VoiceState::Active;

        // Pick up the current envelope shape before the attack snapshot
        let p = BlockParams::read(&self.params);
        let [a, d, s, r] = p.amp_adsr;
        self.amp_env.set_parameters(a, d, s, r);
        let [a, d, s, r] = p.filter_adsr;
        self.filter_env.set_parameters(a, d, s, r);

        self.amp_env.note_on();
        self.filter_env.note_on();
    }

    /// Release the note. With `allow_tail` the envelopes run their release
    /// and the voice frees itself once both are idle; without it the voice
    /// goes silent and free right away.
    pub fn stop_note(&mut self, allow_tail: bool) {
        if self.state == VoiceState::Free {
            return;
        }

        self.amp_env.note_off();
        self.filter_env.note_off();

        if !allow_tail || !self.amp_env.is_active() {
            self.amp_env.reset();
            self.filter_env.reset();
            self.free();
        } else {
            self.state = VoiceState::Releasing;
        }
    }

    /// Pitch offset in semitones.
    pub fn pitch_bend(&mut self, semitones: f32) {
        self.pitch_bend = if semitones.is_finite() { semitones } else { 0.0 };
    }

    /// Raw 14-bit wheel value, scaled by the `bendRange` parameter.
    pub fn pitch_wheel(&mut self, value: u16) {
        let range = self.params.get(ParamId::BendRange);
        let norm = (value as f32 - PITCH_WHEEL_CENTER as f32) / PITCH_WHEEL_CENTER as f32;
        self.pitch_bend(norm * range);
    }

    pub fn channel_pressure(&mut self, value: f32) {
        self.channel_pressure = value.clamp(0.0, 1.0);
    }

    pub fn aftertouch(&mut self, value: f32) {
        self.aftertouch = value.clamp(0.0, 1.0);
    }

    /// Add `n` samples starting at `start` into every channel of `outputs`.
    ///
    /// Channel 0 receives the left signal, every further channel the right.
    /// Does nothing while the voice is free or when `n == 0`.
    pub fn render(&mut self, outputs: &mut [&mut [f32]], start: usize, n: usize) {
        if n == 0 || !self.is_active() {
            return;
        }
        debug_assert!(self.prepared, "SynthVoice::render called before prepare");

        let len = outputs.iter().map(|ch| ch.len()).min().unwrap_or(0);
        let end = start.saturating_add(n).min(len);
        if start >= end {
            return;
        }

        let p = BlockParams::read(&self.params);
        let [a, d, s, r] = p.amp_adsr;
        self.amp_env.set_parameters(a, d, s, r);
        let [a, d, s, r] = p.filter_adsr;
        self.filter_env.set_parameters(a, d, s, r);
        self.lfos.set_rates(&p.lfo_rates);
        for filter in &mut self.filters {
            filter.set_filter_type(p.filter_type);
            filter.set_resonance(p.resonance);
        }

        let max_freq = self.sample_rate * 0.45;
        let bend_ratio = 2.0_f32.powf(self.pitch_bend / 12.0);
        let slot_freq: [f32; 3] =
            std::array::from_fn(|k| self.base_freq * bend_ratio * 2.0_f32.powf(p.detune[k] / 12.0));
        let unison_up = 2.0_f32.powf(p.unison_cents / 1200.0);
        let unison_ratio = [unison_up, 1.0 / unison_up, unison_up];
        let sub_freq = self.base_freq * p.sub_octave.ratio();
        let hp_alpha = highpass_coefficient(p.noise_hpf_hz, self.sample_rate);
        let (pan_l, pan_r) = stereo_pan(p.spread);
        let gain = db_to_gain(p.gain_db);

        for i in start..end {
            let lfo = self.lfos.next_frame();

            let mut pitch_mod = 1.0;
            let mut amp_mod = 1.0;
            let mut cutoff_mod = 1.0;
            let mut pw_shift = 0.0;
            for (target, depth, value, pitch_scale) in [
                (p.lfo1_target, p.lfo1_depth, lfo.lfo1, LFO1_PITCH_SCALE),
                (p.lfo2_target, p.lfo2_depth, lfo.lfo2, LFO2_PITCH_SCALE),
            ] {
                match target {
                    LfoTarget::None => {}
                    LfoTarget::Pitch => pitch_mod *= pitch_ratio(pitch_scale, depth, value),
                    LfoTarget::Amp => amp_mod *= amp_factor(depth, value),
                    LfoTarget::Cutoff => cutoff_mod *= cutoff_ratio(depth, value),
                    LfoTarget::Pwm => pw_shift += pwm_offset(depth, value),
                }
            }

            let mut dry = 0.0;
            for k in 0..3 {
                let freq = (slot_freq[k] * pitch_mod).min(max_freq);
                let pw = (p.pulse_width[k] + p.pwm_depth[k] * lfo.pwm[k] + pw_shift)
                    .clamp(MIN_PULSE_WIDTH, MAX_PULSE_WIDTH);

                let [main, companion] = &mut self.oscillators[k];
                let mut s = main.next_sample(p.waves[k], freq, pw, &mut self.noise);
                if p.unison {
                    let detuned = (freq * unison_ratio[k]).min(max_freq);
                    s = 0.5 * (s + companion.next_sample(p.waves[k], detuned, pw, &mut self.noise));
                }
                dry += p.mix[k] * s;
            }

            if p.sub_on {
                dry += p.sub_level * self.sub.next_sample(p.sub_wave, sub_freq);
            }

            let mut noise = p.noise_mix[0] * self.noise.white()
                + p.noise_mix[1] * self.noise.pink()
                + p.noise_mix[2] * self.noise.brown();
            if p.noise_hpf_on {
                noise = self.noise.highpass(noise, hp_alpha);
            }
            dry += noise;

            let amp = self.amp_env.next_sample() * amp_mod;

            let env_f = self.filter_env.next_sample();
            let cutoff = modulated_cutoff(p.cutoff * cutoff_mod, p.filter_amount, env_f);
            let [filter_l, filter_r] = &mut self.filters;
            filter_l.set_cutoff(cutoff);
            filter_r.set_cutoff(cutoff);

            let l = filter_l.process_sample(dry) * amp * pan_l * gain;
            let r = filter_r.process_sample(dry) * amp * pan_r * gain;

            for (ch, out) in outputs.iter_mut().enumerate() {
                out[i] += if ch == 0 { l } else { r };
            }
        }

        self.age = self.age.saturating_add((end - start) as u64);

        if self.state == VoiceState::Releasing
            && !self.amp_env.is_active()
            && !self.filter_env.is_active()
        {
            self.free();
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// MIDI note being played, if the note was started from one.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn frequency(&self) -> f32 {
        self.base_freq
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn current_pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    pub fn pressure(&self) -> f32 {
        self.channel_pressure
    }

    pub fn aftertouch_level(&self) -> f32 {
        self.aftertouch
    }

    pub fn envelope_level(&self) -> f32 {
        self.amp_env.level()
    }

    pub fn filter_envelope_level(&self) -> f32 {
        self.filter_env.level()
    }

    /// Samples rendered since the note started.
    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }
}
