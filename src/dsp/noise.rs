//! Noise sources (white, pink, brown) and a one-pole high-pass helper.

/*
Noise Colours
=============

  white   Uniform random values in [-1, 1]. Flat spectrum.

  pink    Here: a one-pole low-pass of white noise (coefficient 0.98).
          Tilts the spectrum downward. This is a cheap approximation, not
          a -3 dB/octave pink filter.

  brown   A leaky random walk: each sample adds 0.02 × white to the
          previous value. Hard-clamped to [-1, 1] so it can't drift away.

Every colour draws a fresh white sample, so calling `pink()` or `brown()`
also advances the generator.


High-pass Helper
----------------

    y[n] = α · (y[n-1] + x[n] - x[n-1])

with α derived from a target frequency as α = f / (f + sample_rate). This is
a rough one-pole mapping; its -3 dB point does not land on `f`. It reliably
removes DC and rumble, which is all it is used for.
*/

use rand::Rng;
use rand_pcg::Pcg32;

const PINK_COEFF: f32 = 0.98;
const BROWN_STEP: f32 = 0.02;
const HIGHPASS_MAX_ALPHA: f32 = 0.999;

const NOISE_STATE: u64 = 420;
const NOISE_STREAM: u64 = 1337;

/// Coefficient for [`NoiseBus::highpass`] from a target frequency.
#[inline]
pub fn highpass_coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let denom = cutoff_hz + sample_rate;
    if denom <= 0.0 {
        return 0.0;
    }
    (cutoff_hz / denom).clamp(0.0, HIGHPASS_MAX_ALPHA)
}

/// Per-voice noise generator with its filter memories.
#[derive(Debug, Clone)]
pub struct NoiseBus {
    rng: Pcg32,
    pink_state: f32,
    brown_state: f32,
    hp_x: f32,
    hp_y: f32,
}

impl NoiseBus {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Each seed selects an independent PCG stream.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::new(NOISE_STATE, NOISE_STREAM.wrapping_add(seed)),
            pink_state: 0.0,
            brown_state: 0.0,
            hp_x: 0.0,
            hp_y: 0.0,
        }
    }

    /// Clear filter memories. The random stream keeps going.
    pub fn reset(&mut self) {
        self.pink_state = 0.0;
        self.brown_state = 0.0;
        self.hp_x = 0.0;
        self.hp_y = 0.0;
    }

    #[inline]
    pub fn white(&mut self) -> f32 {
        self.rng.gen::<f32>() * 2.0 - 1.0
    }

    #[inline]
    pub fn pink(&mut self) -> f32 {
        let white = self.white();
        self.pink_state = PINK_COEFF * self.pink_state + (1.0 - PINK_COEFF) * white;
        self.pink_state
    }

    #[inline]
    pub fn brown(&mut self) -> f32 {
        let white = self.white();
        self.brown_state = (self.brown_state + BROWN_STEP * white).clamp(-1.0, 1.0);
        self.brown_state
    }

    #[inline]
    pub fn highpass(&mut self, x: f32, alpha: f32) -> f32 {
        let y = alpha * (self.hp_y + x - self.hp_x);
        self.hp_x = x;
        self.hp_y = y;
        y
    }
}

impl Default for NoiseBus {
    fn default() -> Self {
        Self::new()
    }
}
