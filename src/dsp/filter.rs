use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
State Variable Filter
=====================

One integrator core, three simultaneous outputs:

| mode       | passes          | rejects          |
| ---------- | --------------- | ---------------- |
| low-pass   | below cutoff    | above cutoff     |
| band-pass  | around cutoff   | far either side  |
| high-pass  | above cutoff    | below cutoff     |

Topology-preserving transform (TPT) form, per sample:

    g  = tan(π · fc / sr)
    k  = 1 / Q
    h  = 1 / (1 + g·(g + k))

    v3 = x - ic2
    v1 = h · (ic1 + g·v3)          band-pass
    v2 = ic2 + g·v1                low-pass
    hp = x - k·v1 - v2             high-pass

    ic1 = 2·v1 - ic1
    ic2 = 2·v2 - ic2

The filter is unconditionally stable for any g > 0, k > 0, which makes the
cutoff safe to sweep every sample.

Limits
------

  cutoff      [20, 20000] Hz, and below 0.49 × sample_rate so tan() stays
              finite at low sample rates.
  resonance   Q in [0.1, 10]. Q = 0.707 is the flattest low-pass.

Envelope Modulation
-------------------

    cutoff_eff = clamp(cutoff · 2^(amount · (env - 0.5)), 20, 20000)

The envelope is centred on 0.5: a half-open envelope leaves the cutoff alone,
a closed one pulls it down by amount/2 octaves, a fully open one pushes it up
by the same.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 10.0;

const MAX_CUTOFF_RATIO: f32 = 0.49;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    BandPass,
    HighPass,
}

impl FilterType {
    /// 0 = low-pass, 1 = band-pass, anything else = high-pass.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => FilterType::LowPass,
            1 => FilterType::BandPass,
            _ => FilterType::HighPass,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterType::LowPass => "LP",
            FilterType::BandPass => "BP",
            FilterType::HighPass => "HP",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

impl FilterOutputs {
    #[inline]
    pub fn select(&self, filter_type: FilterType) -> f32 {
        match filter_type {
            FilterType::LowPass => self.lowpass,
            FilterType::BandPass => self.bandpass,
            FilterType::HighPass => self.highpass,
        }
    }
}

/// Clamp a cutoff to the audible range and safely below Nyquist.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    if cutoff_hz.is_nan() {
        return MIN_CUTOFF_HZ;
    }
    let ceiling = MAX_CUTOFF_HZ.min(sample_rate * MAX_CUTOFF_RATIO);
    cutoff_hz.clamp(MIN_CUTOFF_HZ, ceiling.max(MIN_CUTOFF_HZ))
}

#[inline]
pub fn clamp_q(q: f32) -> f32 {
    if q.is_nan() {
        return MIN_Q;
    }
    q.clamp(MIN_Q, MAX_Q)
}

/// TPT coefficients `(g, k)` for a cutoff and Q. Inputs are clamped first.
#[inline]
pub fn coefficients(cutoff_hz: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let fc = clamp_cutoff(cutoff_hz, sample_rate);
    let g = (PI * fc / sample_rate).tan();
    let k = 1.0 / clamp_q(q);
    (g, k)
}

/// Cutoff swept by an envelope, re-centred on env = 0.5.
#[inline]
pub fn modulated_cutoff(base_hz: f32, amount: f32, env: f32) -> f32 {
    (base_hz * 2.0_f32.powf(amount * (env - 0.5))).clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    resonance: f32,
    filter_type: FilterType,
    sample_rate: f32,

    g: f32,
    k: f32,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1_000.0,
            resonance: 0.707,
            filter_type,
            sample_rate: 44_100.0,
            g: 0.0,
            k: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        let mut filter = Self::new(FilterType::LowPass);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        let mut filter = Self::new(FilterType::HighPass);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        let mut filter = Self::new(FilterType::BandPass);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    /// Set the sample rate and clear the integrators.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
        self.set_cutoff(self.cutoff_hz);
    }

    #[inline]
    fn update_coefficients(&mut self) {
        let (g, k) = coefficients(self.cutoff_hz, self.resonance, self.sample_rate);
        self.g = g;
        self.k = k;
    }

    /// One step of the TPT core with explicit coefficients.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    /// Filter one sample with the stored cutoff, Q and mode.
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let (k, g) = (self.k, self.g);
        self.next_sample(sample, k, g).select(self.filter_type)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = clamp_cutoff(cutoff, self.sample_rate);
        self.update_coefficients();
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = clamp_q(resonance);
        self.update_coefficients();
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

impl Default for SVFilter {
    fn default() -> Self {
        Self::new(FilterType::LowPass)
    }
}
