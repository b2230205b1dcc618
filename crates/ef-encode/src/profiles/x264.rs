//! libx264 builders.

use ef_core::Resolution;

use super::{gop_size, stream_suffix, EncoderOptions, EncoderOptionsParams, RateMultipliers};
use crate::bitrate::target_bitrate;

/// Per-resolution maxrate/bufsize multipliers for on-demand encodes.
/// Small renditions get more headroom since their target is tight.
const VOD_MULTIPLIERS: [(Resolution, RateMultipliers); 8] = [
    (Resolution::P2160, RateMultipliers::new(1.5, 3.0)),
    (Resolution::P1440, RateMultipliers::new(2.0, 4.0)),
    (Resolution::P1080, RateMultipliers::new(2.5, 5.0)),
    (Resolution::P720, RateMultipliers::new(2.3, 4.6)),
    (Resolution::P480, RateMultipliers::new(2.3, 4.6)),
    (Resolution::P360, RateMultipliers::new(3.5, 7.0)),
    (Resolution::P240, RateMultipliers::new(5.0, 10.0)),
    (Resolution::P144, RateMultipliers::new(5.0, 10.0)),
];

/// Used for non-standard (origin) resolutions.
const DEFAULT_VOD_MULTIPLIERS: RateMultipliers = RateMultipliers::new(1.5, 3.0);

const VOD_X264_OPTS: &str = "ref=5:trellis=2:psy=1:psy_rd=2.0:subme=11:rc_lookahead=240";

pub fn vod_multipliers(resolution: Resolution) -> RateMultipliers {
    VOD_MULTIPLIERS
        .iter()
        .find(|(r, _)| *r == resolution)
        .map(|(_, m)| *m)
        .unwrap_or(DEFAULT_VOD_MULTIPLIERS)
}

/// Quality-oriented on-demand H.264: slow preset, CRF 20, constrained by a
/// maxrate/bufsize derived from the target bitrate.
pub fn vod(params: &EncoderOptionsParams<'_>) -> ef_core::Result<EncoderOptions> {
    let target = target_bitrate(
        params.input_bitrate,
        params.resolution,
        params.fps,
        params.input_ratio,
    );
    let (max_rate, buf_size) = vod_multipliers(params.resolution).apply(target);

    Ok(EncoderOptions::encode(vec![
        "-sws_flags lanczos+accurate_rnd".to_string(),
        "-preset veryslow".to_string(),
        "-crf 20".to_string(),
        format!("-g {}", gop_size(params.fps)),
        "-pix_fmt yuv420p".to_string(),
        format!("-x264opts {VOD_X264_OPTS}"),
        format!("-maxrate:v {max_rate}"),
        format!("-bufsize:v {buf_size}"),
    ]))
}

/// Low-latency live H.264 with a constant target bitrate. Flags carry the
/// output stream index when one is set.
pub fn live(params: &EncoderOptionsParams<'_>) -> ef_core::Result<EncoderOptions> {
    let target = target_bitrate(
        params.input_bitrate,
        params.resolution,
        params.fps,
        params.input_ratio,
    );
    let n = params.stream_num;

    Ok(EncoderOptions::encode(vec![
        "-preset veryfast".to_string(),
        format!("{} {target}", stream_suffix("-maxrate:v", n)),
        format!("{} {}", stream_suffix("-bufsize:v", n), target * 2),
        "-b_strategy 1".to_string(),
        "-bf 16".to_string(),
        format!("{} {}", stream_suffix("-r:v", n), params.fps),
        format!("{} {target}", stream_suffix("-b:v", n)),
    ]))
}
