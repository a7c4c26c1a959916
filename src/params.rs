//! Lock-free parameter snapshot shared between the control thread and the
//! audio thread.

/*
Parameter Snapshot
==================

Every recognised control is a variant of `ParamId`, carrying a host key
("cutoff", "osc1Wave", ...) and a `ParamRange`. Values live in a fixed
array of `AtomicU32` holding `f32` bit patterns:

    UI / host thread                     audio thread
    ----------------                     ------------
    snapshot.set(Cutoff, 800.0)   ──→    snapshot.get(Cutoff)
         store(Relaxed)                       load(Relaxed)

Each key is independently atomic. A render block that reads `cutoff` and
then `resonance` may see a new cutoff with an old resonance. Audio controls
are continuous and independently settable, so per-key freshness is all the
voice needs; nothing here pretends to be a transaction.

Value Encoding
--------------

  Float    plain value inside [min, max]
  Choice   integer index stored as a float (0.0, 1.0, 2.0, ...)
  Toggle   0.0 = off, 1.0 = on; anything above 0.5 reads as on

`set` clamps into the range. Unknown string keys are ignored, never a fault.
*/

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    Choice,
    Toggle,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub kind: ParamKind,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(kind: ParamKind, min: f32, max: f32, default: f32) -> Self {
        Self {
            kind,
            min,
            max,
            default,
        }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

macro_rules! define_params {
    ($( $variant:ident => $key:literal, $kind:ident, $min:expr, $max:expr, $default:expr; )*) => {
        /// Every control the voice reads, keyed by its host identifier.
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ParamId {
            $( $variant, )*
        }

        impl ParamId {
            pub const ALL: &'static [ParamId] = &[ $( ParamId::$variant, )* ];
            pub const COUNT: usize = Self::ALL.len();

            /// Host identifier, e.g. `"osc1Wave"`.
            pub fn key(self) -> &'static str {
                match self {
                    $( ParamId::$variant => $key, )*
                }
            }

            pub fn from_key(key: &str) -> Option<ParamId> {
                match key {
                    $( $key => Some(ParamId::$variant), )*
                    _ => None,
                }
            }

            pub fn range(self) -> ParamRange {
                match self {
                    $( ParamId::$variant => ParamRange::new(ParamKind::$kind, $min, $max, $default), )*
                }
            }
        }
    };
}

define_params! {
    Osc1Wave     => "osc1Wave",     Choice, 0.0, 7.0, 1.0;
    Osc2Wave     => "osc2Wave",     Choice, 0.0, 7.0, 2.0;
    Osc3Wave     => "osc3Wave",     Choice, 0.0, 7.0, 0.0;
    Mix1         => "mix1",         Float, 0.0, 1.0, 0.7;
    Mix2         => "mix2",         Float, 0.0, 1.0, 0.6;
    Mix3         => "mix3",         Float, 0.0, 1.0, 0.2;
    Detune1      => "detune1",      Float, -24.0, 24.0, 0.0;
    Detune2      => "detune2",      Float, -24.0, 24.0, 0.0;
    Detune3      => "detune3",      Float, -24.0, 24.0, 0.0;
    StereoSpread => "stereoSpread", Float, 0.0, 1.0, 0.2;

    UniOn        => "uniOn",        Toggle, 0.0, 1.0, 1.0;
    UniDetune    => "uniDetune",    Float, 0.0, 50.0, 12.0;

    Pwm1         => "pwm1",         Float, 0.05, 0.95, 0.5;
    Pwm2         => "pwm2",         Float, 0.05, 0.95, 0.5;
    Pwm3         => "pwm3",         Float, 0.05, 0.95, 0.5;
    PwmDepth1    => "pwmDepth1",    Float, 0.0, 1.0, 0.3;
    PwmDepth2    => "pwmDepth2",    Float, 0.0, 1.0, 0.3;
    PwmDepth3    => "pwmDepth3",    Float, 0.0, 1.0, 0.3;
    PwmRate1     => "pwmRate1",     Float, 0.05, 10.0, 1.2;
    PwmRate2     => "pwmRate2",     Float, 0.05, 10.0, 0.8;
    PwmRate3     => "pwmRate3",     Float, 0.05, 10.0, 0.6;

    SubOn        => "subOn",        Toggle, 0.0, 1.0, 1.0;
    SubWave      => "subWave",      Choice, 0.0, 2.0, 1.0;
    SubOct       => "subOct",       Choice, 0.0, 1.0, 1.0;
    SubLevel     => "subLevel",     Float, 0.0, 1.0, 0.35;

    MixNoiseW    => "mixNoiseW",    Float, 0.0, 1.0, 0.0;
    MixNoiseP    => "mixNoiseP",    Float, 0.0, 1.0, 0.0;
    MixNoiseB    => "mixNoiseB",    Float, 0.0, 1.0, 0.0;
    NoiseHpfOn   => "noiseHPFOn",   Toggle, 0.0, 1.0, 0.0;
    NoiseHpf     => "noiseHPF",     Float, 20.0, 2_000.0, 120.0;

    Attack       => "attack",       Float, 0.001, 3.0, 0.01;
    Decay        => "decay",        Float, 0.001, 3.0, 0.12;
    Sustain      => "sustain",      Float, 0.0, 1.0, 0.8;
    Release      => "release",      Float, 0.001, 4.0, 0.25;

    FilterType   => "filterType",   Choice, 0.0, 2.0, 0.0;
    Cutoff       => "cutoff",       Float, 20.0, 20_000.0, 12_000.0;
    Resonance    => "resonance",    Float, 0.1, 10.0, 0.7;
    FilterAttack  => "fAttack",     Float, 0.001, 3.0, 0.01;
    FilterDecay   => "fDecay",      Float, 0.001, 3.0, 0.12;
    FilterSustain => "fSustain",    Float, 0.0, 1.0, 0.0;
    FilterRelease => "fRelease",    Float, 0.001, 4.0, 0.25;
    FilterAmount  => "fAmount",     Float, 0.0, 1.0, 0.0;

    LfoRate      => "lfoRate",      Float, 0.05, 20.0, 5.0;
    LfoDepth     => "lfoDepth",     Float, 0.0, 1.0, 0.3;
    LfoTarget    => "lfoTarget",    Choice, 0.0, 4.0, 0.0;
    Lfo2Rate     => "lfo2Rate",     Float, 0.05, 20.0, 0.8;
    Lfo2Depth    => "lfo2Depth",    Float, 0.0, 1.0, 0.2;
    Lfo2Target   => "lfo2Target",   Choice, 0.0, 4.0, 0.0;

    Gain         => "gain",         Float, -24.0, 6.0, -6.0;
    BendRange    => "bendRange",    Float, 1.0, 48.0, 48.0;
}

impl ParamId {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fixed table of atomically stored parameter values.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct ParamSnapshot {
    values: [AtomicU32; ParamId::COUNT],
}

impl ParamSnapshot {
    /// A snapshot holding every parameter's default.
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| {
                AtomicU32::new(ParamId::ALL[i].range().default.to_bits())
            }),
        }
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Store a value, clamped into the parameter's range. NaN is ignored.
    /// Returns the value now held.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        if value.is_nan() {
            return self.get(id);
        }
        let clamped = id.range().clamp(value);
        self.values[id.index()].store(clamped.to_bits(), Ordering::Relaxed);
        clamped
    }

    /// Look up by host key. Unknown keys read as absent.
    pub fn get_key(&self, key: &str) -> Option<f32> {
        ParamId::from_key(key).map(|id| self.get(id))
    }

    /// Store by host key. Returns `false` for unknown keys.
    pub fn set_key(&self, key: &str, value: f32) -> bool {
        match ParamId::from_key(key) {
            Some(id) => {
                self.set(id, value);
                true
            }
            None => false,
        }
    }

    /// Choice index, rounded to the nearest integer.
    #[inline]
    pub fn choice(&self, id: ParamId) -> usize {
        self.get(id).round().max(0.0) as usize
    }

    #[inline]
    pub fn flag(&self, id: ParamId) -> bool {
        self.get(id) > 0.5
    }

    /// Nudge a value by `delta`, clamped. Returns the new value.
    pub fn nudge(&self, id: ParamId, delta: f32) -> f32 {
        self.set(id, self.get(id) + delta)
    }

    pub fn reset_to_defaults(&self) {
        for &id in ParamId::ALL {
            self.values[id.index()].store(id.range().default.to_bits(), Ordering::Relaxed);
        }
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParamSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(ParamId::ALL.iter().map(|&id| (id.key(), self.get(id))))
            .finish()
    }
}
