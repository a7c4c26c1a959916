use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

Linear attack/decay/sustain/release envelope. Each voice owns two: one
shaping amplitude, one sweeping the filter cutoff.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release. A state machine
              governs transitions.

  gate        The note on/off signal. Gate high (note_on) enters Attack from
              wherever the level currently is. Gate low (note_off) enters
              Release from wherever the level currently is.

  ramp        A stage that moves linearly between two levels over a fixed
              number of samples.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)


Counting Samples, Not Accumulating Increments
---------------------------------------------

Every ramp snapshots its start level and a sample count when it begins,
then interpolates:

    level = start + (target - start) × elapsed / total

Adding a float increment every sample drifts; counting lands exactly on the
target after `total` samples. A stage of `t` seconds at 44.1 kHz therefore
takes exactly round(t × 44100) samples.

  Attack    rate is 1 / attack_time. From a non-zero level only the
            remaining distance is covered, so the ramp is shorter.
  Decay     1.0 → sustain over decay_time.
  Release   current level → 0 over release_time.

All times are floored at 1 ms, so there is never a division by zero.


The State Machine
-----------------

    ┌──────┐  note_on   ┌────────┐  level=1   ┌───────┐  level=S  ┌─────────┐
    │ Idle │ ─────────→ │ Attack │ ─────────→ │ Decay │ ────────→ │ Sustain │
    └──────┘            └────────┘            └───────┘           └─────────┘
        ↑                    │ note_off           │ note_off          │ note_off
        │   level=0     ┌─────────┐ ←─────────────┘                   │
        └────────────── │ Release │ ←─────────────────────────────────┘
                        └─────────┘
                             │ note_on: back to Attack from the current level

Retriggering never snaps the level back to zero. A note that arrives while
the previous one is still releasing picks up from the current level, which
keeps the output free of clicks.
*/

/// The current stage of the envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,
    sample_rate: f32,

    stage: EnvelopeState,
    level: f32,

    // Ramp bookkeeping, snapshotted when a stage begins
    stage_start_level: f32,
    stage_total_samples: u32,
    stage_elapsed_samples: u32,
}

#[inline]
fn samples_for(seconds: f32, sample_rate: f32) -> u32 {
    (seconds * sample_rate).round().max(1.0) as u32
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: MIN_TIME,
            decay_time: MIN_TIME,
            sustain_level: 0.0,
            release_time: MIN_TIME,
            sample_rate: 44_100.0,

            stage: EnvelopeState::Idle,
            level: 0.0,
            stage_start_level: 0.0,
            stage_total_samples: 1,
            stage_elapsed_samples: 0,
        };
        env.set_parameters(attack, decay, sustain, release);
        env
    }

    /// Set the rate that stage times are counted in. Takes effect from the
    /// next stage.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Update the stage times and sustain level.
    ///
    /// A ramp already in progress keeps its sample count; the new times take
    /// effect from the next stage. The sustain level applies immediately.
    pub fn set_parameters(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(MIN_TIME);
        self.decay_time = decay.max(MIN_TIME);
        self.sustain_level = if sustain.is_nan() {
            0.0
        } else {
            sustain.clamp(0.0, 1.0)
        };
        self.release_time = release.max(MIN_TIME);
    }

    /// Gate high: ramp to 1.0 from the current level.
    pub fn note_on(&mut self) {
        let remaining = 1.0 - self.level;
        self.stage_start_level = self.level;
        self.stage_total_samples = samples_for(self.attack_time * remaining, self.sample_rate);
        self.stage_elapsed_samples = 0;
        self.stage = EnvelopeState::Attack;
    }

    /// Gate low: ramp to 0.0 from the current level.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.stage_start_level = self.level;
        self.stage_total_samples = samples_for(self.release_time, self.sample_rate);
        self.stage_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let progress = self.advance_ramp();
                self.level = self.stage_start_level + (1.0 - self.stage_start_level) * progress;

                if self.ramp_finished() {
                    self.level = 1.0;
                    self.stage_start_level = 1.0;
                    self.stage_total_samples = samples_for(self.decay_time, self.sample_rate);
                    self.stage_elapsed_samples = 0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let progress = self.advance_ramp();
                let target = self.sustain_level;
                self.level = self.stage_start_level + (target - self.stage_start_level) * progress;

                if self.ramp_finished() {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress = self.advance_ramp();
                self.level = (self.stage_start_level * (1.0 - progress)).max(0.0);

                if self.ramp_finished() {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    #[inline]
    fn advance_ramp(&mut self) -> f32 {
        self.stage_elapsed_samples = self.stage_elapsed_samples.saturating_add(1);
        self.stage_elapsed_samples as f32 / self.stage_total_samples as f32
    }

    #[inline]
    fn ramp_finished(&self) -> bool {
        self.stage_elapsed_samples >= self.stage_total_samples
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.stage_start_level = 0.0;
        self.stage_total_samples = 1;
        self.stage_elapsed_samples = 0;
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
