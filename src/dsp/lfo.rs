//! Low Frequency Oscillator (LFO) bank and modulation routing math.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::SineOscillator;

/*
Low Frequency Modulators
========================

Each voice owns five free-running sine LFOs:

  lfo1, lfo2    general purpose, routed to a target (pitch, amp, cutoff, PWM)
  pwm[0..3]     one per main oscillator, wobbling its pulse width

They are never reset on note-on. Two voices playing at once sit at
different points of their LFO cycles, which is what keeps a chord from
sounding like one voice copied three times. Only `prepare` (a sample-rate
change) puts them back to phase zero.


Routing Math
------------

  Pitch    ratio = 2^(scale · depth · lfo / 12)
           scale is 0.1 for LFO1 and 0.05 for LFO2. LFO1 is twice as
           sensitive as LFO2 at the same depth setting.

  Amp      gain  = clamp(1 + depth · 0.5 · lfo, 0, 2)

  Cutoff   ratio = 2^(depth · lfo)          (up to ±1 octave)

  PWM      width += 0.25 · depth · lfo      (before the width clamp)
*/

/// Pitch-modulation sensitivity of LFO1.
pub const LFO1_PITCH_SCALE: f32 = 0.1;
/// Pitch-modulation sensitivity of LFO2.
pub const LFO2_PITCH_SCALE: f32 = 0.05;

const PWM_TARGET_SCALE: f32 = 0.25;

/// Where a general-purpose LFO is routed. Discriminants match the host's
/// choice indices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoTarget {
    None,
    Pitch,
    Amp,
    Cutoff,
    Pwm,
}

impl LfoTarget {
    pub const ALL: [LfoTarget; 5] = [
        LfoTarget::None,
        LfoTarget::Pitch,
        LfoTarget::Amp,
        LfoTarget::Cutoff,
        LfoTarget::Pwm,
    ];

    /// Unknown indices route nowhere.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(LfoTarget::None)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LfoTarget::None => "Off",
            LfoTarget::Pitch => "Pitch",
            LfoTarget::Amp => "Amp",
            LfoTarget::Cutoff => "Cutoff",
            LfoTarget::Pwm => "PWM",
        }
    }
}

/// Frequency multiplier for an LFO routed to pitch.
#[inline]
pub fn pitch_ratio(scale: f32, depth: f32, lfo: f32) -> f32 {
    2.0_f32.powf(scale * depth * lfo / 12.0)
}

/// Gain multiplier for an LFO routed to amplitude.
#[inline]
pub fn amp_factor(depth: f32, lfo: f32) -> f32 {
    (1.0 + depth * 0.5 * lfo).clamp(0.0, 2.0)
}

/// Cutoff multiplier for an LFO routed to the filter.
#[inline]
pub fn cutoff_ratio(depth: f32, lfo: f32) -> f32 {
    2.0_f32.powf(depth * lfo)
}

/// Pulse-width offset for an LFO routed to PWM.
#[inline]
pub fn pwm_offset(depth: f32, lfo: f32) -> f32 {
    PWM_TARGET_SCALE * depth * lfo
}

/// A free-running sine LFO.
#[derive(Debug, Clone, Default)]
pub struct Lfo {
    osc: SineOscillator,
}

impl Lfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.osc.prepare(sample_rate);
    }

    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.osc.set_frequency(frequency_hz as f64);
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency() as f32
    }

    pub fn phase(&self) -> f64 {
        self.osc.phase()
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.osc.next_sample()
    }
}

/// One sample's worth of LFO outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LfoFrame {
    pub lfo1: f32,
    pub lfo2: f32,
    pub pwm: [f32; 3],
}

/// Rates for every LFO in a bank, in Hz.
#[derive(Debug, Clone, Copy)]
pub struct LfoRates {
    pub lfo1: f32,
    pub lfo2: f32,
    pub pwm: [f32; 3],
}

#[derive(Debug, Clone, Default)]
pub struct LfoBank {
    pub lfo1: Lfo,
    pub lfo2: Lfo,
    pub pwm: [Lfo; 3],
}

impl LfoBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sample rate and puts every LFO back to phase zero.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.lfo1.prepare(sample_rate);
        self.lfo2.prepare(sample_rate);
        for lfo in &mut self.pwm {
            lfo.prepare(sample_rate);
        }
    }

    pub fn set_rates(&mut self, rates: &LfoRates) {
        self.lfo1.set_frequency(rates.lfo1);
        self.lfo2.set_frequency(rates.lfo2);
        for (lfo, &rate) in self.pwm.iter_mut().zip(rates.pwm.iter()) {
            lfo.set_frequency(rate);
        }
    }

    /// Advance all five LFOs by one sample.
    #[inline]
    pub fn next_frame(&mut self) -> LfoFrame {
        LfoFrame {
            lfo1: self.lfo1.next_sample(),
            lfo2: self.lfo2.next_sample(),
            pwm: [
                self.pwm[0].next_sample(),
                self.pwm[1].next_sample(),
                self.pwm[2].next_sample(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lfo_output_range() {
        let mut bank = LfoBank::new();
        bank.prepare(48_000.0);
        bank.set_rates(&LfoRates {
            lfo1: 5.0,
            lfo2: 0.8,
            pwm: [1.2, 0.8, 0.6],
        });

        for _ in 0..48_000 {
            let frame = bank.next_frame();
            for v in [frame.lfo1, frame.lfo2, frame.pwm[0], frame.pwm[1], frame.pwm[2]] {
                assert!((-1.0..=1.0).contains(&v), "LFO sample {v} out of range");
            }
        }
    }

    #[test]
    fn lfos_in_a_bank_run_independently() {
        let mut bank = LfoBank::new();
        bank.prepare(1_000.0);
        bank.set_rates(&LfoRates {
            lfo1: 10.0,
            lfo2: 1.0,
            pwm: [1.0; 3],
        });

        // Quarter cycle of lfo1
        for _ in 0..26 {
            bank.next_frame();
        }
        assert!((bank.lfo1.phase() - 0.26).abs() < 1e-6);
        assert!((bank.lfo2.phase() - 0.026).abs() < 1e-6);
    }

    #[test]
    fn lfo1_pitch_is_twice_as_sensitive_as_lfo2() {
        let depth = 0.8;
        let lfo = 1.0;
        let semis1 = 12.0 * pitch_ratio(LFO1_PITCH_SCALE, depth, lfo).log2();
        let semis2 = 12.0 * pitch_ratio(LFO2_PITCH_SCALE, depth, lfo).log2();
        assert!((semis1 - 2.0 * semis2).abs() < 1e-5);
    }

    #[test]
    fn amp_factor_is_clamped() {
        assert_eq!(amp_factor(0.0, 1.0), 1.0);
        assert!((amp_factor(1.0, 1.0) - 1.5).abs() < 1e-6);
        assert!((amp_factor(1.0, -1.0) - 0.5).abs() < 1e-6);
        assert_eq!(amp_factor(10.0, -1.0), 0.0);
        assert_eq!(amp_factor(10.0, 1.0), 2.0);
    }

    #[test]
    fn zero_depth_is_neutral() {
        assert_eq!(pitch_ratio(LFO1_PITCH_SCALE, 0.0, 1.0), 1.0);
        assert_eq!(cutoff_ratio(0.0, -1.0), 1.0);
        assert_eq!(pwm_offset(0.0, 1.0), 0.0);
    }

    #[test]
    fn target_from_index() {
        assert_eq!(LfoTarget::from_index(1), LfoTarget::Pitch);
        assert_eq!(LfoTarget::from_index(2), LfoTarget::Amp);
        assert_eq!(LfoTarget::from_index(99), LfoTarget::None);
    }
}
