use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::noise::NoiseBus;

/*
Band-limited Oscillators
========================

A naive sawtooth (`2 * phase - 1`) jumps from +1 to -1 in a single sample.
That step contains energy at every frequency, and everything above Nyquist
folds back down into the audible band as inharmonic "aliasing" tones. The
higher the note, the worse it gets.

Vocabulary
----------

  phase       Position inside one cycle, in [0, 1). Advanced by `increment`
              every sample and wrapped back into range.

  increment   frequency / sample_rate. Also called `dt`: the fraction of a
              cycle covered by one sample.

  BLEP        Band-Limited stEP. A smoothed step that replaces the hard
              discontinuity of a naive waveform.

  PolyBLEP    A cheap polynomial approximation of the BLEP residual. Only
              the two samples either side of a discontinuity are touched.


The PolyBLEP Correction
-----------------------

    t < dt          (just after the wrap)   x = t/dt       2x - x² - 1
    t > 1 - dt      (just before the wrap)  x = (t-1)/dt   x² + 2x + 1
    elsewhere                                              0

The residual is subtracted from the naive waveform at every downward step
(saw) and added/subtracted at the rising/falling edges of a pulse.

    naive saw     ╱│╱│╱│         corrected   ╱╲╱╲╱╲  (rounded corners
                 ╱ │ │ │                               at the wrap only)


Frequency Limits
----------------

Every primitive clamps its frequency to [0, 0.45 × sample_rate]. Negative
frequencies would run the phase backwards and break the wrap invariant;
frequencies near Nyquist leave no room for the correction to work.


Waveform Table
--------------

    id  name       method
    0   Sine       sin(2π·phase)
    1   Saw+       PolyBLEP rising saw
    2   Pulse      PolyBLEP pulse, width-modulated
    3   Triangle   (2/π)·asin(sin)
    4   Noise      white noise from the voice's noise bus
    5   Saw-       PolyBLEP falling saw
    6   Fold       tanh(2·sin)
    7   Half-sine  rectified sine remapped to [-1, 1]
*/

/// Highest frequency an oscillator will run at, as a fraction of the sample rate.
pub const MAX_FREQUENCY_RATIO: f64 = 0.45;

/// Soft-clip drive used when a pulse has rounded edges.
pub const PULSE_EDGE_DRIVE: f32 = 1.5;

/// PolyBLEP (Polynomial Band-Limited Step) residual.
///
/// `t` is the phase [0, 1), `dt` is the phase increment per sample.
#[inline]
pub fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}

#[inline]
fn clamp_frequency(frequency: f64, sample_rate: f64) -> f64 {
    if frequency.is_nan() {
        return 0.0;
    }
    frequency.clamp(0.0, sample_rate * MAX_FREQUENCY_RATIO)
}

/// Phase accumulator shared by every oscillator primitive.
#[derive(Debug, Clone)]
struct Phasor {
    phase: f64,
    increment: f64,
    frequency: f64,
    sample_rate: f64,
}

impl Phasor {
    fn new() -> Self {
        Self {
            phase: 0.0,
            increment: 0.0,
            frequency: 0.0,
            sample_rate: 44_100.0,
        }
    }

    fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.increment = 0.0;
        self.frequency = 0.0;
    }

    fn set_frequency(&mut self, frequency: f64) {
        self.frequency = clamp_frequency(frequency, self.sample_rate);
        self.increment = self.frequency / self.sample_rate;
    }

    /// Advance one sample and return the new phase.
    #[inline]
    fn advance(&mut self) -> f64 {
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.phase
    }
}

/// Plain sinusoid; the building block for sine, triangle, fold and half-sine.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    phasor: Phasor,
}

impl SineOscillator {
    pub fn new() -> Self {
        Self {
            phasor: Phasor::new(),
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.phasor.prepare(sample_rate);
    }

    pub fn reset(&mut self) {
        self.phasor.reset();
    }

    /// Re-seed the phase without touching the frequency.
    pub fn force_reset(&mut self) {
        self.phasor.phase = 0.0;
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.phasor.set_frequency(frequency);
    }

    pub fn frequency(&self) -> f64 {
        self.phasor.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phasor.phase
    }

    /// Output at the current phase, then advance.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let sample = (TAU * self.phasor.phase).sin() as f32;
        self.phasor.advance();
        sample
    }
}

impl Default for SineOscillator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SawDirection {
    Up,
    Down,
}

/// Alias-reduced sawtooth, rising or falling.
#[derive(Debug, Clone)]
pub struct SawOscillator {
    phasor: Phasor,
    direction: SawDirection,
}

impl SawOscillator {
    pub fn new() -> Self {
        Self {
            phasor: Phasor::new(),
            direction: SawDirection::Up,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.phasor.prepare(sample_rate);
    }

    pub fn reset(&mut self) {
        self.phasor.reset();
    }

    pub fn force_reset(&mut self) {
        self.phasor.phase = 0.0;
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.phasor.set_frequency(frequency);
    }

    pub fn set_direction(&mut self, direction: SawDirection) {
        self.direction = direction;
    }

    pub fn frequency(&self) -> f64 {
        self.phasor.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phasor.phase
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let phase = self.phasor.advance();
        let dt = self.phasor.increment;
        // The falling saw steps upward at the wrap, so the residual flips sign.
        let x = match self.direction {
            SawDirection::Up => (2.0 * phase - 1.0) - poly_blep(phase, dt),
            SawDirection::Down => (1.0 - 2.0 * phase) + poly_blep(phase, dt),
        };
        x as f32
    }
}

impl Default for SawOscillator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulse wave built from two band-limited edges.
///
/// Rising edge at phase 0, falling edge at phase = pulse width.
#[derive(Debug, Clone)]
pub struct PulseOscillator {
    phasor: Phasor,
    pulse_width: f64,
    rounded_edges: bool,
}

impl PulseOscillator {
    pub fn new() -> Self {
        Self {
            phasor: Phasor::new(),
            pulse_width: 0.5,
            rounded_edges: true,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.phasor.prepare(sample_rate);
    }

    pub fn reset(&mut self) {
        self.phasor.reset();
    }

    pub fn force_reset(&mut self) {
        self.phasor.phase = 0.0;
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.phasor.set_frequency(frequency);
    }

    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = (pulse_width as f64).clamp(0.01, 0.99);
    }

    pub fn set_rounded_edges(&mut self, rounded: bool) {
        self.rounded_edges = rounded;
    }

    pub fn frequency(&self) -> f64 {
        self.phasor.frequency
    }

    pub fn pulse_width(&self) -> f32 {
        self.pulse_width as f32
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let phase = self.phasor.advance();
        let dt = self.phasor.increment;

        let mut x = if phase < self.pulse_width { 1.0 } else { -1.0 };
        x += poly_blep(phase, dt);

        let mut falling = phase - self.pulse_width;
        if falling < 0.0 {
            falling += 1.0;
        }
        x -= poly_blep(falling, dt);

        let x = x as f32;
        if self.rounded_edges {
            (x * PULSE_EDGE_DRIVE).tanh()
        } else {
            x
        }
    }
}

impl Default for PulseOscillator {
    fn default() -> Self {
        Self::new()
    }
}

/// Waveform selector for the three main oscillator slots.
///
/// Discriminants match the host's choice indices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    SawUp,
    Pulse,
    Triangle,
    Noise,
    SawDown,
    Fold,
    HalfSine,
}

impl Waveform {
    pub const ALL: [Waveform; 8] = [
        Waveform::Sine,
        Waveform::SawUp,
        Waveform::Pulse,
        Waveform::Triangle,
        Waveform::Noise,
        Waveform::SawDown,
        Waveform::Fold,
        Waveform::HalfSine,
    ];

    /// Unknown indices fall back to a sine.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(Waveform::Sine)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::SawUp => "Saw+",
            Waveform::Pulse => "Pulse",
            Waveform::Triangle => "Tri",
            Waveform::Noise => "Noise",
            Waveform::SawDown => "Saw-",
            Waveform::Fold => "Fold",
            Waveform::HalfSine => "HalfS",
        }
    }
}

/// Triangle derived from a sine sample: (2/π)·asin(sin(phase)).
#[inline]
pub fn triangle_from_sine(sine: f32) -> f32 {
    std::f32::consts::FRAC_2_PI * sine.clamp(-1.0, 1.0).asin()
}

/// Soft wavefolding of a sine sample.
#[inline]
pub fn fold_from_sine(sine: f32) -> f32 {
    (2.0 * sine).tanh()
}

/// Positive half of the sine, stretched back to the full [-1, 1] span.
#[inline]
pub fn half_sine_from_sine(sine: f32) -> f32 {
    (2.0 * sine.max(0.0) - 1.0).clamp(-1.0, 1.0)
}

/// One oscillator slot: every primitive a waveform may need, dispatched by
/// [`Waveform`].
///
/// Each primitive keeps its own phase, so switching waveform mid-note picks up
/// wherever that primitive left off.
#[derive(Debug, Clone, Default)]
pub struct OscillatorUnit {
    sine: SineOscillator,
    saw: SawOscillator,
    pulse: PulseOscillator,
}

impl OscillatorUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sine.prepare(sample_rate);
        self.saw.prepare(sample_rate);
        self.pulse.prepare(sample_rate);
    }

    pub fn reset(&mut self) {
        self.sine.reset();
        self.saw.reset();
        self.pulse.reset();
    }

    /// Re-seed every phase to zero (synchronized starts).
    pub fn force_reset(&mut self) {
        self.sine.force_reset();
        self.saw.force_reset();
        self.pulse.force_reset();
    }

    #[inline]
    pub fn next_sample(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        pulse_width: f32,
        noise: &mut NoiseBus,
    ) -> f32 {
        match waveform {
            Waveform::Sine => self.sine_at(frequency),
            Waveform::SawUp => self.saw_at(SawDirection::Up, frequency),
            Waveform::SawDown => self.saw_at(SawDirection::Down, frequency),
            Waveform::Pulse => {
                self.pulse.set_frequency(frequency as f64);
                self.pulse.set_pulse_width(pulse_width);
                self.pulse.next_sample()
            }
            Waveform::Triangle => triangle_from_sine(self.sine_at(frequency)),
            Waveform::Noise => noise.white(),
            Waveform::Fold => fold_from_sine(self.sine_at(frequency)),
            Waveform::HalfSine => half_sine_from_sine(self.sine_at(frequency)),
        }
    }

    #[inline]
    fn sine_at(&mut self, frequency: f32) -> f32 {
        self.sine.set_frequency(frequency as f64);
        self.sine.next_sample()
    }

    #[inline]
    fn saw_at(&mut self, direction: SawDirection, frequency: f32) -> f32 {
        self.saw.set_direction(direction);
        self.saw.set_frequency(frequency as f64);
        self.saw.next_sample()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubWaveform {
    Sine,
    Pulse,
    Triangle,
}

impl SubWaveform {
    /// 0 = sine, 1 = pulse, anything else = triangle.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => SubWaveform::Sine,
            1 => SubWaveform::Pulse,
            _ => SubWaveform::Triangle,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubOctave {
    One,
    Two,
}

impl SubOctave {
    /// 0 = one octave down, anything else = two.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            SubOctave::One
        } else {
            SubOctave::Two
        }
    }

    /// Frequency multiplier relative to the note.
    pub fn ratio(self) -> f32 {
        match self {
            SubOctave::One => 0.5,
            SubOctave::Two => 0.25,
        }
    }
}

/// Sub-oscillator: sine, square (fixed 50% pulse) or triangle below the note.
#[derive(Debug, Clone)]
pub struct SubOscillator {
    sine: SineOscillator,
    triangle: SineOscillator,
    pulse: PulseOscillator,
}

impl SubOscillator {
    pub fn new() -> Self {
        let mut pulse = PulseOscillator::new();
        pulse.set_pulse_width(0.5);
        Self {
            sine: SineOscillator::new(),
            triangle: SineOscillator::new(),
            pulse,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sine.prepare(sample_rate);
        self.triangle.prepare(sample_rate);
        self.pulse.prepare(sample_rate);
    }

    pub fn reset(&mut self) {
        self.sine.reset();
        self.triangle.reset();
        self.pulse.reset();
    }

    #[inline]
    pub fn next_sample(&mut self, waveform: SubWaveform, frequency: f32) -> f32 {
        match waveform {
            SubWaveform::Sine => {
                self.sine.set_frequency(frequency as f64);
                self.sine.next_sample()
            }
            SubWaveform::Pulse => {
                self.pulse.set_frequency(frequency as f64);
                self.pulse.next_sample()
            }
            SubWaveform::Triangle => {
                self.triangle.set_frequency(frequency as f64);
                triangle_from_sine(self.triangle.next_sample())
            }
        }
    }
}

impl Default for SubOscillator {
    fn default() -> Self {
        Self::new()
    }
}
