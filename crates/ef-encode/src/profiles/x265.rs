//! libx265 (HEVC) on-demand builder.
//!
//! The top two tiers are encoded in 10-bit.

use ef_core::Resolution;

use super::{gop_size, EncoderOptions, EncoderOptionsParams, RateMultipliers};
use crate::bitrate::target_bitrate;

/// Per-resolution HEVC tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HevcTuning {
    pub crf: u8,
    pub preset: &'static str,
    pub multipliers: RateMultipliers,
    pub pix_fmt: &'static str,
}

impl HevcTuning {
    const fn new(
        crf: u8,
        preset: &'static str,
        max_rate: f64,
        buf_size: f64,
        pix_fmt: &'static str,
    ) -> Self {
        Self {
            crf,
            preset,
            multipliers: RateMultipliers::new(max_rate, buf_size),
            pix_fmt,
        }
    }
}

const VOD_TUNING: [(Resolution, HevcTuning); 8] = [
    (Resolution::P2160, HevcTuning::new(24, "slow", 1.5, 3.0, "yuv420p10le")),
    (Resolution::P1440, HevcTuning::new(23, "slow", 2.0, 4.0, "yuv420p10le")),
    (Resolution::P1080, HevcTuning::new(22, "slow", 2.5, 5.0, "yuv420p")),
    (Resolution::P720, HevcTuning::new(22, "medium", 2.3, 4.6, "yuv420p")),
    (Resolution::P480, HevcTuning::new(23, "medium", 2.3, 4.6, "yuv420p")),
    (Resolution::P360, HevcTuning::new(24, "fast", 3.5, 7.0, "yuv420p")),
    (Resolution::P240, HevcTuning::new(26, "fast", 5.0, 10.0, "yuv420p")),
    (Resolution::P144, HevcTuning::new(28, "fast", 5.0, 10.0, "yuv420p")),
];

const DEFAULT_VOD_TUNING: HevcTuning = HevcTuning::new(24, "slow", 1.5, 3.0, "yuv420p");

pub fn vod_tuning(resolution: Resolution) -> HevcTuning {
    VOD_TUNING
        .iter()
        .find(|(r, _)| *r == resolution)
        .map(|(_, t)| *t)
        .unwrap_or(DEFAULT_VOD_TUNING)
}

pub fn vod(params: &EncoderOptionsParams<'_>) -> ef_core::Result<EncoderOptions> {
    let tuning = vod_tuning(params.resolution);
    let target = target_bitrate(
        params.input_bitrate,
        params.resolution,
        params.fps,
        params.input_ratio,
    );
    let (max_rate, buf_size) = tuning.multipliers.apply(target);

    Ok(EncoderOptions::encode(vec![
        format!("-preset {}", tuning.preset),
        format!("-crf {}", tuning.crf),
        format!("-g {}", gop_size(params.fps)),
        format!("-pix_fmt {}", tuning.pix_fmt),
        "-tag:v hvc1".to_string(),
        format!("-maxrate:v {max_rate}"),
        format!("-bufsize:v {buf_size}"),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::test_support::{option_value, params};
    use ef_probe::MediaFileDescriptor;

    #[test]
    fn ten_bit_only_for_top_tiers() {
        for (res, tuning) in VOD_TUNING {
            let ten_bit = tuning.pix_fmt == "yuv420p10le";
            assert_eq!(ten_bit, res >= Resolution::P1440, "{res}");
        }
    }

    #[test]
    fn vod_2160p() {
        let probe = MediaFileDescriptor::default();
        let mut p = params(&probe, Resolution::P2160);
        p.fps = 25.0;
        let opts = vod(&p).unwrap();
        assert_eq!(option_value(&opts, "-crf"), Some("24"));
        assert_eq!(option_value(&opts, "-pix_fmt"), Some("yuv420p10le"));
        assert_eq!(option_value(&opts, "-g"), Some("50"));
        assert_eq!(option_value(&opts, "-tag:v"), Some("hvc1"));
    }

    #[test]
    fn origin_resolution_uses_default() {
        assert_eq!(vod_tuning(Resolution::new(1000)), DEFAULT_VOD_TUNING);
    }
}
