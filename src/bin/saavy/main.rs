//! saavy - Terminal synthesizer interface
//!
//! Run with: cargo run
//!
//! Logs are written to `$TMPDIR/saavy.log`, or to the path in `SAAVY_LOG`.

mod app;
mod keyboard;
mod logging;
mod ui;

use app::Saavy;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let log_path = logging::init()?;
    tracing::info!(path = %log_path.display(), "logging started");

    Saavy::new().voices(8).run()
}
