//! Stream-copy eligibility.
//!
//! An input whose streams are already web-friendly and not over-encoded can
//! be remuxed instead of re-encoded. These checks only look at the probe
//! result.

use ef_probe::MediaFileDescriptor;

use crate::bitrate::max_theoretical_bitrate;

/// Highest AAC bitrate that is still copied as-is.
pub const MAX_COPY_AUDIO_BITRATE: u64 = 384_000;

/// Bitrate ceiling for re-encoded audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBitrateCeiling {
    /// The input bitrate is already acceptable; do not force one.
    KeepInput,
    /// Encode at most at this many kbit/s.
    Kbps(u32),
}

/// Audio bitrate ceiling derived from the input codec and bitrate.
///
/// Unknown bitrates get 256 kbit/s. AAC above 384 kbit/s is brought down to
/// 384, lower AAC is kept. Other codecs are mapped into three bands since
/// AAC needs fewer bits for the same quality.
pub fn max_audio_bitrate(codec: &str, bitrate: Option<u64>) -> AudioBitrateCeiling {
    let Some(bitrate) = bitrate.filter(|b| *b > 0) else {
        return AudioBitrateCeiling::Kbps(256);
    };

    if codec == "aac" {
        return if bitrate > MAX_COPY_AUDIO_BITRATE {
            AudioBitrateCeiling::Kbps(384)
        } else {
            AudioBitrateCeiling::KeepInput
        };
    }

    match bitrate {
        0..=192_000 => AudioBitrateCeiling::Kbps(128),
        192_001..=384_000 => AudioBitrateCeiling::Kbps(256),
        _ => AudioBitrateCeiling::Kbps(384),
    }
}

/// Whether the audio stream can be copied. A file without audio trivially
/// qualifies.
pub fn can_quick_transcode_audio(probe: &MediaFileDescriptor) -> bool {
    let Some(audio) = probe.audio.as_ref() else {
        return true;
    };

    if audio.codec_name != "aac" {
        return false;
    }

    match audio.bit_rate {
        Some(b) if b > 0 && b <= MAX_COPY_AUDIO_BITRATE => {}
        _ => return false,
    }

    !matches!(
        audio.channel_layout.as_deref(),
        None | Some("unknown") | Some("quad")
    )
}

/// Whether the video stream can be copied: H.264 in yuv420p, a frame rate
/// in `[2, max_fps]`, and a measured bitrate within the theoretical maximum
/// for its geometry.
pub fn can_quick_transcode_video(probe: &MediaFileDescriptor, max_fps: f64) -> bool {
    let Some(video) = probe.video.as_ref() else {
        return false;
    };
    let Some(bitrate) = probe.video_bitrate() else {
        return false;
    };

    if video.codec_name != "h264" || video.pix_fmt.as_deref() != Some("yuv420p") {
        return false;
    }

    let fps = probe.fps();
    if fps < 2.0 || fps > max_fps {
        return false;
    }

    let dims = probe.dimensions();
    bitrate <= max_theoretical_bitrate(dims.resolution, fps, dims.ratio)
}

/// Whether the whole file can be remuxed. Audio-only files never qualify.
pub fn can_quick_transcode(probe: &MediaFileDescriptor, max_fps: f64) -> bool {
    probe.video.is_some()
        && can_quick_transcode_video(probe, max_fps)
        && can_quick_transcode_audio(probe)
}
