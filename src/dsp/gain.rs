//! Level and panning helpers for the voice mixer.

/*
Gain Staging
============

Levels are set in decibels because hearing is logarithmic: equal dB steps
sound like equal loudness steps.

    gain = 10^(dB / 20)          dB = 20 × log₁₀(gain)

    ×1.0   =   0 dB
    ×0.5   ≈  -6 dB
    ×0.1   = -20 dB

Anything at or below -100 dB is treated as silence.


Stereo Spread
-------------

The dry mono voice is split into left and right with a linear pan law:

    left  = 0.5 - 0.5 × spread
    right = 0.5 + 0.5 × spread

spread = 0 puts the voice dead centre at half level on each side. Positive
spread leans right, negative leans left.
*/

/// Floor below which a level is treated as silence.
pub const MINUS_INFINITY_DB: f32 = -100.0;

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db <= MINUS_INFINITY_DB {
        0.0
    } else {
        10.0_f32.powf(db * 0.05)
    }
}

#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        MINUS_INFINITY_DB
    } else {
        (20.0 * gain.log10()).max(MINUS_INFINITY_DB)
    }
}

/// `(left, right)` weights for a spread value in [-1, 1].
#[inline]
pub fn stereo_pan(spread: f32) -> (f32, f32) {
    let spread = spread.clamp(-1.0, 1.0);
    (0.5 - 0.5 * spread, 0.5 + 0.5 * spread)
}

/// Largest absolute sample in a buffer.
#[inline]
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}
