// Purpose: Voice management, polyphony, control messages
// This layer sits above the dsp primitives and owns the voice pool

pub mod message;
pub mod poly;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use poly::PolySynth;
pub use voice::{NotePitch, SynthVoice, VoiceState};
