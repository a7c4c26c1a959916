//! Low-level DSP primitives used by the synth voice.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math so the voice can layer on routing and modulation.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Decibel conversion and stereo panning.
pub mod gain;
/// Free-running LFOs and modulation routing math.
pub mod lfo;
/// White, pink and brown noise plus a one-pole high-pass.
pub mod noise;
/// Band-limited oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
pub use filter::FilterType;
pub use lfo::LfoTarget;
pub use oscillator::Waveform;
