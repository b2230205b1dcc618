//! AAC builders (native `aac` and `libfdk_aac`).

use ef_core::config::AudioBitratePolicy;

use super::{stream_suffix, EncoderOptions, EncoderOptionsParams};
use crate::quick::{can_quick_transcode_audio, max_audio_bitrate, AudioBitrateCeiling};

/// Bitrate used by [`AudioBitratePolicy::Fixed`].
pub const FIXED_BITRATE_KBPS: u32 = 320;

/// Native AAC encoder.
///
/// Copies the stream when the caller allows it and the input is already
/// eligible. Otherwise downmixes to stereo and picks a bitrate per the
/// configured policy; when the input bitrate is already acceptable no
/// bitrate flag is emitted.
pub fn aac(params: &EncoderOptionsParams<'_>) -> ef_core::Result<EncoderOptions> {
    if params.can_copy_audio && can_quick_transcode_audio(params.input_probe) {
        return Ok(EncoderOptions::copy());
    }

    let mut options = vec!["-channel_layout stereo".to_string()];

    let (codec, bitrate) = params
        .input_probe
        .audio
        .as_ref()
        .map(|a| (a.codec_name.as_str(), a.bit_rate))
        .unwrap_or(("", None));

    if let AudioBitrateCeiling::Kbps(ceiling) = max_audio_bitrate(codec, bitrate) {
        let kbps = match params.audio_bitrate_policy {
            AudioBitratePolicy::Fixed => FIXED_BITRATE_KBPS,
            AudioBitratePolicy::Measured => ceiling,
        };
        options.push(format!(
            "{} {kbps}k",
            stream_suffix("-b:a", params.stream_num)
        ));
    }

    Ok(EncoderOptions::encode(options))
}

/// Fraunhofer FDK AAC in VBR mode 5.
pub fn libfdk_aac(params: &EncoderOptionsParams<'_>) -> ef_core::Result<EncoderOptions> {
    Ok(EncoderOptions::encode(vec![format!(
        "{} 5",
        stream_suffix("-q:a", params.stream_num)
    )]))
}
