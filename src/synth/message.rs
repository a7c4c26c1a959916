#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control events sent from the UI/MIDI thread to the audio thread.
///
/// Velocities and pressures are raw 7-bit MIDI values; the pitch wheel is the
/// raw 14-bit value centred on 8192.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    PitchWheel { value: u16 },
    ChannelPressure { value: u8 },
    Aftertouch { note: u8, value: u8 },
    AllNotesOff,
}

/// Centre position of the 14-bit pitch wheel.
pub const PITCH_WHEEL_CENTER: u16 = 8192;

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// A receiver that never yields anything, for driving a synth directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}
