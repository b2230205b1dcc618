//! Theoretical bitrate model.
//!
//! Each tier has a bits-per-pixel factor. A resolution uses the factor of
//! the largest tier that does not exceed it, so non-standard origin
//! resolutions (e.g. 1078p) fall back to the tier below.
//!
//! `bitrate = resolution^2 * ratio * fps * bpp`, where `resolution` is the
//! short side and `ratio` is long side over short side.

use ef_core::Resolution;

/// Bits-per-pixel factors, largest tier first.
type BppTable = [(Resolution, f64); 9];

const MIN_BPP: BppTable = [
    (Resolution::P2160, 0.02),
    (Resolution::P1440, 0.02),
    (Resolution::P1080, 0.02),
    (Resolution::P720, 0.02),
    (Resolution::P480, 0.02),
    (Resolution::P360, 0.02),
    (Resolution::P240, 0.02),
    (Resolution::P144, 0.02),
    (Resolution::NO_VIDEO, 0.0),
];

const AVERAGE_BPP: BppTable = [
    (Resolution::P2160, 0.08),
    (Resolution::P1440, 0.09),
    (Resolution::P1080, 0.10),
    (Resolution::P720, 0.11),
    (Resolution::P480, 0.12),
    (Resolution::P360, 0.15),
    (Resolution::P240, 0.17),
    (Resolution::P144, 0.19),
    (Resolution::NO_VIDEO, 0.0),
];

const MAX_BPP: BppTable = [
    (Resolution::P2160, 0.14),
    (Resolution::P1440, 0.16),
    (Resolution::P1080, 0.17),
    (Resolution::P720, 0.19),
    (Resolution::P480, 0.22),
    (Resolution::P360, 0.26),
    (Resolution::P240, 0.29),
    (Resolution::P144, 0.32),
    (Resolution::NO_VIDEO, 0.0),
];

/// Returned instead of zero (audio-only or degenerate geometry).
const AVERAGE_FALLBACK: u64 = 192_000;
const MAX_FALLBACK: u64 = 256_000;
const MIN_FALLBACK: u64 = 10_000;

/// How far above the measured input bitrate a target may go.
const INPUT_HEADROOM: f64 = 1.3;

fn compute(table: &BppTable, resolution: Resolution, fps: f64, ratio: f64) -> u64 {
    let bpp = table
        .iter()
        .find(|(tier, _)| *tier <= resolution)
        .map(|(_, bpp)| *bpp)
        .unwrap_or(0.0);

    let side = f64::from(resolution.height());
    let bits = side * side * ratio * fps * bpp;
    if bits.is_finite() && bits > 0.0 {
        bits.floor() as u64
    } else {
        0
    }
}

fn or_fallback(bitrate: u64, fallback: u64) -> u64 {
    if bitrate == 0 {
        fallback
    } else {
        bitrate
    }
}

/// Bits per second a typical encode at these parameters lands on.
pub fn average_theoretical_bitrate(resolution: Resolution, fps: f64, ratio: f64) -> u64 {
    or_fallback(compute(&AVERAGE_BPP, resolution, fps, ratio), AVERAGE_FALLBACK)
}

/// Upper bound above which an input is considered over-encoded.
pub fn max_theoretical_bitrate(resolution: Resolution, fps: f64, ratio: f64) -> u64 {
    or_fallback(compute(&MAX_BPP, resolution, fps, ratio), MAX_FALLBACK)
}

/// Floor below which a target bitrate is never set.
pub fn min_theoretical_bitrate(resolution: Resolution, fps: f64, ratio: f64) -> u64 {
    or_fallback(compute(&MIN_BPP, resolution, fps, ratio), MIN_FALLBACK)
}

/// Target bitrate for an output rendition.
///
/// The average theoretical bitrate, capped at 1.3x the measured input
/// bitrate, but never below the minimum theoretical bitrate. An unknown or zero input
/// bitrate disables the cap.
///
/// Grows with resolution across the standard tiers only. A height between
/// two tiers uses the lower tier's bits per pixel, so it can land above the
/// next tier up.
pub fn target_bitrate(
    input_bitrate: Option<u64>,
    resolution: Resolution,
    fps: f64,
    ratio: f64,
) -> u64 {
    let average = average_theoretical_bitrate(resolution, fps, ratio);
    let min = min_theoretical_bitrate(resolution, fps, ratio);

    let capped = match input_bitrate.filter(|b| *b > 0) {
        Some(input) => average.min((input as f64 * INPUT_HEADROOM).floor() as u64),
        None => average,
    };

    capped.max(min)
}
