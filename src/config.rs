//! Engine construction settings.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_BLOCK_SIZE;

/// Lowest sample rate the engine accepts.
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
/// Highest sample rate the engine accepts.
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;
/// Upper bound on the voice pool.
pub const MAX_VOICES: usize = 64;

/// Everything fixed at engine construction time.
///
/// Changing the sample rate means building (or re-preparing) the engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block `render` will ever be asked for.
    pub max_block_size: usize,
    /// Output channels. 1 = mono (left only), 2+ = stereo.
    pub channels: usize,
    /// Size of the fixed voice pool.
    pub voice_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_block_size: 512,
            channels: 2,
            voice_count: 8,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_voice_count(mut self, voice_count: usize) -> Self {
        self.voice_count = voice_count;
        self
    }

    /// Check every field, logging and returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            Err(ConfigError::SampleRate(self.sample_rate))
        } else if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            Err(ConfigError::BlockSize(self.max_block_size))
        } else if self.channels == 0 {
            Err(ConfigError::Channels(self.channels))
        } else if self.voice_count == 0 || self.voice_count > MAX_VOICES {
            Err(ConfigError::VoiceCount(self.voice_count))
        } else {
            Ok(())
        };

        if let Err(err) = &result {
            tracing::warn!(%err, "rejected engine config");
        }
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    SampleRate(f32),
    BlockSize(usize),
    Channels(usize),
    VoiceCount(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SampleRate(sr) => write!(
                f,
                "sample rate {sr} Hz outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}"
            ),
            ConfigError::BlockSize(n) => {
                write!(f, "block size {n} outside 1..={MAX_BLOCK_SIZE}")
            }
            ConfigError::Channels(n) => write!(f, "channel count {n} must be at least 1"),
            ConfigError::VoiceCount(n) => {
                write!(f, "voice count {n} outside 1..={MAX_VOICES}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
