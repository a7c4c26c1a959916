//! Shared state types for UI communication
//!
//! Everything here crosses the audio thread boundary, so it stays `Copy`.

/// Engine snapshot pushed from the audio callback once per device buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineStatus {
    /// Voices currently sounding (attack through release)
    pub active_voices: usize,
    /// Smoothed output peak
    pub meter: f32,
}

/// A note the UI is holding, with the frame count left before it is released.
///
/// Terminals report key presses but not releases, so held notes time out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeldNote {
    pub note: u8,
    pub frames_left: u16,
}

impl HeldNote {
    pub fn new(note: u8, frames: u16) -> Self {
        Self {
            note,
            frames_left: frames,
        }
    }

    /// Count down one UI frame. Returns true once the note should be released.
    pub fn tick(&mut self) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.frames_left == 0
    }
}
