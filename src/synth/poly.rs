use std::sync::Arc;

use crate::{
    config::{ConfigError, EngineConfig},
    dsp::gain::peak,
    params::ParamSnapshot,
    synth::{
        message::{MessageReceiver, SynthMessage, PITCH_WHEEL_CENTER},
        voice::{NotePitch, SynthVoice, VoiceState},
    },
};

const METER_DECAY: f32 = 0.9;

/// Fixed pool of voices driven by a message queue.
///
/// The pool is built once from [`EngineConfig`]; nothing is allocated while
/// rendering.
pub struct PolySynth<R: MessageReceiver> {
    voices: Vec<SynthVoice>,
    rx: R,
    params: Arc<ParamSnapshot>,
    config: EngineConfig,
    pitch_wheel: u16,
    meter: f32,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(
        config: EngineConfig,
        params: Arc<ParamSnapshot>,
        rx: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let voices = (0..config.voice_count)
            .map(|slot| {
                let mut voice = SynthVoice::new(params.clone(), slot);
                voice.prepare(config.sample_rate, config.max_block_size, config.channels);
                voice
            })
            .collect();

        tracing::info!(
            voices = config.voice_count,
            sample_rate = config.sample_rate,
            channels = config.channels,
            "poly synth ready"
        );

        Ok(Self {
            voices,
            rx,
            params,
            config,
            pitch_wheel: PITCH_WHEEL_CENTER,
            meter: 0.0,
        })
    }

    /// Re-prepare every voice for a new sample rate. All notes are dropped.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<(), ConfigError> {
        let config = self.config.with_sample_rate(sample_rate);
        config.validate()?;
        self.config = config;
        for voice in &mut self.voices {
            voice.prepare(config.sample_rate, config.max_block_size, config.channels);
        }
        Ok(())
    }

    /// Clear `outputs`, apply queued messages, then sum every active voice in.
    pub fn render_block(&mut self, outputs: &mut [&mut [f32]]) {
        for channel in outputs.iter_mut() {
            channel.fill(0.0);
        }

        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }

        let n = outputs.iter().map(|ch| ch.len()).min().unwrap_or(0);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render(outputs, 0, n);
            }
        }

        let block_peak = outputs.iter().map(|ch| peak(ch)).fold(0.0f32, f32::max);
        self.meter = METER_DECAY * self.meter + (1.0 - METER_DECAY) * block_peak;
    }

    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { velocity: 0, note } => self.note_off(note),
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note, .. } => self.note_off(note),
            SynthMessage::PitchWheel { value } => {
                self.pitch_wheel = value;
                for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
                    voice.pitch_wheel(value);
                }
            }
            SynthMessage::ChannelPressure { value } => {
                let pressure = value as f32 / 127.0;
                for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
                    voice.channel_pressure(pressure);
                }
            }
            SynthMessage::Aftertouch { note, value } => {
                let amount = value as f32 / 127.0;
                for voice in self.voices.iter_mut().filter(|v| v.note() == Some(note)) {
                    voice.aftertouch(amount);
                }
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let wheel = self.pitch_wheel;
        let idx = self.allocate_voice(note);
        let voice = &mut self.voices[idx];
        voice.start_note(NotePitch::Midi(note), velocity as f32 / 127.0);
        if wheel != PITCH_WHEEL_CENTER {
            voice.pitch_wheel(wheel);
        }
    }

    pub fn note_off(&mut self, note: u8) {
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.state() == VoiceState::Active && v.note() == Some(note))
        {
            voice.stop_note(true);
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.stop_note(true);
        }
    }

    /// Same note already sounding, else a free voice, else the oldest
    /// releasing voice, else the oldest voice.
    fn allocate_voice(&mut self, note: u8) -> usize {
        if let Some(idx) = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.note() == Some(note))
        {
            return idx;
        }

        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return idx;
        }

        let oldest = |state: Option<VoiceState>| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| state.map_or(true, |s| v.state() == s))
                .max_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        };

        oldest(Some(VoiceState::Releasing))
            .or_else(|| oldest(None))
            .unwrap_or(0)
    }

    /// Smoothed output peak, updated once per block.
    pub fn meter(&self) -> f32 {
        self.meter
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn voices(&self) -> &[SynthVoice] {
        &self.voices
    }

    pub fn params(&self) -> &Arc<ParamSnapshot> {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
