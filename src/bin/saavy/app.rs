//! Saavy - main application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::sync::Arc;

use saavy_synth::{
    synth::SynthMessage, EngineConfig, ParamSnapshot, PolySynth, MAX_BLOCK_SIZE,
};

use super::ui::{EngineStatus, UiApp, VIS_BUFFER_SIZE};

/// Pending note and controller messages from the UI thread.
const MESSAGE_QUEUE_SIZE: usize = 256;
/// Status snapshots the UI has not picked up yet.
const STATUS_QUEUE_SIZE: usize = 16;

/// Main application builder
pub struct Saavy {
    voices: usize,
    params: Arc<ParamSnapshot>,
}

impl Saavy {
    pub fn new() -> Self {
        Self {
            voices: 8,
            params: Arc::new(ParamSnapshot::new()),
        }
    }

    /// Size of the voice pool
    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    /// Open the default output device and run the TUI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (msg_tx, msg_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_QUEUE_SIZE);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);
        let (mut status_tx, status_rx) = RingBuffer::<EngineStatus>::new(STATUS_QUEUE_SIZE);

        // Always render stereo; mono devices get the left channel
        let engine_config = EngineConfig::new()
            .with_sample_rate(sample_rate)
            .with_max_block_size(MAX_BLOCK_SIZE)
            .with_channels(2)
            .with_voice_count(self.voices);
        let mut synth = PolySynth::new(engine_config, self.params.clone(), msg_rx)
            .wrap_err("invalid engine configuration")?;

        let device_name = device.name().unwrap_or_default();
        tracing::info!(
            device = %device_name,
            sample_rate,
            channels,
            "audio output opened"
        );

        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let n = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    {
                        let mut outs: [&mut [f32]; 2] = [&mut left[..n], &mut right[..n]];
                        synth.render_block(&mut outs);
                    }

                    let out_off = frames_written * channels;
                    for i in 0..n {
                        let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = if ch == 0 { left[i] } else { right[i] };
                        }
                        // Scope is best effort; drop samples when the UI lags
                        let _ = scope_tx.push(0.5 * (left[i] + right[i]));
                    }

                    frames_written += n;
                }

                let _ = status_tx.push(EngineStatus {
                    active_voices: synth.active_voice_count(),
                    meter: synth.meter(),
                });
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let mut app = UiApp::new(
            msg_tx,
            scope_rx,
            status_rx,
            self.params.clone(),
            sample_rate,
            self.voices,
        );
        let result = app.run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Saavy {
    fn default() -> Self {
        Self::new()
    }
}
