pub mod config; // Engine construction settings
pub mod dsp;
pub mod io;
pub mod params; // Lock-free parameter snapshot
pub mod synth; // Voice management and polyphony

pub use config::{ConfigError, EngineConfig};
pub use params::{ParamId, ParamSnapshot};
pub use synth::{PolySynth, SynthVoice};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 0.001;
