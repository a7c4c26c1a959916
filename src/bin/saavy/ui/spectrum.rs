//! Spectrum analyzer widget
//!
//! FFT-based frequency spectrum visualization with log-spaced bins.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 48;

/// Below this the buffer is treated as silence
const SILENCE_DB: f64 = -60.0;

/// Spectrum analyzer with FFT processing
pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    sample_rate: f32,
    /// FFT bin indices for each displayed frequency
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (frequency_hz, magnitude_db) per displayed bin
    spectrum: Vec<(f64, f64)>,
    /// Frequency of the loudest raw FFT bin, if any bin clears the silence floor
    dominant_hz: Option<f32>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the scope buffer.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        // Hann window - reduces spectral leakage
        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                if buffer_len > 1 {
                    let denom = (buffer_len - 1) as f32;
                    0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        // Log-spaced frequency bins (20 Hz to Nyquist)
        let max_freq = (sample_rate / 2.0).clamp(1.0, 20_000.0) as f64;
        let min_freq = 20.0f64.min(max_freq);
        let half = (buffer_len / 2).max(1);

        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = min_freq * (max_freq / min_freq).powf(t);
            let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.min(half - 1));
            spectrum.push((freq, -120.0));
        }

        Self {
            window,
            sample_rate,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
            dominant_hz: None,
        }
    }

    /// Recompute from `buffer`. Buffers of the wrong length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() || buffer.is_empty() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let power_db = |bin: Complex<f32>| 10.0 * ((bin.norm_sqr()).max(1e-12) as f64).log10();

        for ((_, magnitude_db), &idx) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            *magnitude_db = power_db(self.scratch[idx]);
        }

        let half = self.scratch.len() / 2;
        self.dominant_hz = self.scratch[1..half.max(1)]
            .iter()
            .enumerate()
            .map(|(i, &bin)| (i + 1, power_db(bin)))
            .filter(|&(_, db)| db > SILENCE_DB)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i as f32 * self.sample_rate / self.scratch.len() as f32);
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    pub fn dominant_hz(&self) -> Option<f32> {
        self.dominant_hz
    }
}

/// Render the spectrum analyzer widget
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum
        .iter()
        .map(|(f, _)| *f)
        .fold(0.0, f64::max)
        .max(1.0);
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(-100.0, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-100.0, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
