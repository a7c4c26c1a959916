//! TUI module for saavy
//!
//! Plays notes from the computer keyboard and shows the engine output.

mod panel;
pub mod state;
mod spectrum;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use saavy_synth::{synth::SynthMessage, ParamSnapshot};
use std::{sync::Arc, time::Duration};

pub use state::{EngineStatus, HeldNote};

use super::keyboard::{self, KeyAction, DEFAULT_OCTAVE};
use panel::render_panel;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats, StatusLine};
use waveform::render_waveform;

/// Audio visualization buffer size
pub const VIS_BUFFER_SIZE: usize = 1024;

/// UI frames (~16ms each) a key-triggered note is held before release
const NOTE_HOLD_FRAMES: u16 = 18;

const NOTE_VELOCITY: u8 = 100;

/// UI application state
pub struct UiApp {
    /// Note and controller messages for the audio thread
    msg_tx: Producer<SynthMessage>,
    /// Mono scope samples from the audio thread
    audio_rx: Consumer<f32>,
    status_rx: Consumer<EngineStatus>,
    params: Arc<ParamSnapshot>,
    sample_rate: f32,
    max_voices: usize,
    status: EngineStatus,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    held: Vec<HeldNote>,
    octave: i8,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        msg_tx: Producer<SynthMessage>,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<EngineStatus>,
        params: Arc<ParamSnapshot>,
        sample_rate: f32,
        max_voices: usize,
    ) -> Self {
        Self {
            msg_tx,
            audio_rx,
            status_rx,
            params,
            sample_rate,
            max_voices,
            status: EngineStatus::default(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            held: Vec::new(),
            octave: DEFAULT_OCTAVE,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();
            self.release_expired_notes();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(SynthMessage::AllNotesOff);
        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE scope samples
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.spectrum.update(&self.audio_buffer);
        }
    }

    /// Keep only the latest status
    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn release_expired_notes(&mut self) {
        let mut expired = Vec::new();
        self.held.retain_mut(|held| {
            let done = held.tick();
            if done {
                expired.push(held.note);
            }
            !done
        });
        for note in expired {
            self.send(SynthMessage::NoteOff { note, velocity: 0 });
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.msg_tx.push(msg).is_err() {
            tracing::warn!(?msg, "synth message queue full, dropping");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let c = match key {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(c) => c,
            _ => return,
        };
        if c == 'q' || c == 'Q' {
            self.should_quit = true;
            return;
        }

        match keyboard::action_for_key(c, self.octave) {
            Some(KeyAction::Note(note)) => self.press_note(note),
            Some(KeyAction::OctaveDown) => self.octave = keyboard::shift_octave(self.octave, false),
            Some(KeyAction::OctaveUp) => self.octave = keyboard::shift_octave(self.octave, true),
            Some(KeyAction::Panic) => {
                self.held.clear();
                self.send(SynthMessage::AllNotesOff);
            }
            Some(KeyAction::Param(edit)) => keyboard::apply_edit(&self.params, edit),
            None => {}
        }
    }

    /// Key repeat re-arms the hold timer instead of retriggering.
    fn press_note(&mut self, note: u8) {
        if let Some(held) = self.held.iter_mut().find(|h| h.note == note) {
            *held = HeldNote::new(note, NOTE_HOLD_FRAMES);
            return;
        }
        self.held.push(HeldNote::new(note, NOTE_HOLD_FRAMES));
        self.send(SynthMessage::NoteOn {
            note,
            velocity: NOTE_VELOCITY,
        });
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(5), // Patch panel
                Constraint::Min(6),    // Scope
                Constraint::Min(6),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        let line = StatusLine {
            sample_rate: self.sample_rate,
            octave: self.octave,
            max_voices: self.max_voices,
            status: &self.status,
            stats: &stats,
            dominant_hz: self.spectrum.dominant_hz(),
        };
        render_status(frame, chunks[0], &line);
        render_panel(frame, chunks[1], &self.params);
        render_waveform(frame, chunks[2], &self.audio_buffer);
        render_spectrum(frame, chunks[3], self.spectrum.data());

        let help = Paragraph::new(
            " [A-K] Play  [Z/X] Octave  [Space] All notes off  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
