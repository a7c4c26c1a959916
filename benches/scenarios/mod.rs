//! Real-world scenario benchmarks.
//!
//! Full voices and the polyphonic engine rendering the default patch.

mod poly;
mod voices;

pub use poly::bench_poly;
pub use voices::bench_voices;
