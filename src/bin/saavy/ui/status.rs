//! Status bar widget - shows octave, voices, sample rate and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_synth::dsp::gain::gain_to_db;

use super::EngineStatus;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Everything the status bar shows besides the engine snapshot
pub struct StatusLine<'a> {
    pub sample_rate: f32,
    pub octave: i8,
    pub max_voices: usize,
    pub status: &'a EngineStatus,
    pub stats: &'a AudioStats,
    pub dominant_hz: Option<f32>,
}

pub fn render_status(frame: &mut Frame, area: Rect, line: &StatusLine) {
    let block = Block::default().title(" saavy ").borders(Borders::ALL);

    let voice_color = if line.status.active_voices >= line.max_voices {
        Color::Red
    } else if line.status.active_voices > 0 {
        Color::Green
    } else {
        Color::DarkGray
    };

    let pitch = match line.dominant_hz {
        Some(hz) => format!("~{hz:.0}Hz  "),
        None => String::from("--  "),
    };

    let text = Line::from(vec![
        Span::styled(
            format!(" Octave: {}  ", line.octave),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Voices: {}/{}  ", line.status.active_voices, line.max_voices),
            Style::default().fg(voice_color),
        ),
        Span::styled(pitch, Style::default().fg(Color::White)),
        Span::styled(
            format!("{:.1}kHz  ", line.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "Meter: {:.1}dB  Peak: {:.2}  RMS: {:.2}",
                gain_to_db(line.status.meter),
                line.stats.peak,
                line.stats.rms
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
