//! Resolution ladder and frame-rate policy.

use ef_core::config::{Config, ResolutionsConfig};
use ef_core::{Error, Resolution, Result, TranscodingContext};

/// Resolution used for the rendition built from an audio-only upload.
pub const AUDIO_MERGE_RESOLUTION: Resolution = Resolution::P480;

/// Frame rate of the rendition built from an audio-only upload, before the
/// configured cap.
pub const AUDIO_MERGE_FPS: f64 = 25.0;

/// Resolutions to produce for an input, highest first.
///
/// Keeps every enabled resolution up to `input` (below it when
/// `strict_lower`). The audio-only sentinel is dropped when the source has
/// no audio. With `include_input` the even-rounded input resolution is
/// added as well.
pub fn resolutions_to_produce(
    input: Resolution,
    has_audio: bool,
    include_input: bool,
    strict_lower: bool,
    enabled: &ResolutionsConfig,
) -> Vec<Resolution> {
    let mut out: Vec<Resolution> = enabled
        .enabled()
        .into_iter()
        .filter(|r| *r <= input)
        .filter(|r| !(strict_lower && *r == input))
        .filter(|r| has_audio || !r.is_no_video())
        .collect();

    if include_input {
        out.push(input.to_even());
    }

    out.sort_unstable_by(|a, b| b.cmp(a));
    out.dedup();
    out
}

/// Resolution of the ladder origin for an upload.
///
/// With `always_transcode_original_resolution` the upload keeps its own
/// (even-rounded) resolution. Otherwise it snaps to the largest enabled
/// resolution not above it, or keeps its own when none qualifies.
pub fn build_original_file_resolution(input: Resolution, config: &Config) -> Resolution {
    if config.transcoding.always_transcode_original_resolution {
        return input.to_even();
    }

    resolutions_to_produce(input, true, false, false, &config.transcoding.resolutions)
        .into_iter()
        .find(|r| !r.is_no_video())
        .unwrap_or_else(|| input.to_even())
}

/// Output frame-rate policy for one transcoding context.
#[derive(Debug, Clone, PartialEq)]
pub struct FpsPolicy {
    /// Highest frame rate an output may have.
    pub max: f64,
    /// Rates below this cannot be transcoded at all.
    pub hard_min: f64,
    /// Outputs are never slower than this.
    pub transcoded_min: f64,
    /// Non-origin renditions below this resolution get a standard rate.
    pub keep_origin_fps_resolution_min: Resolution,
}

impl FpsPolicy {
    pub fn new(max: f64) -> Self {
        Self {
            max,
            hard_min: 0.1,
            transcoded_min: 1.0,
            keep_origin_fps_resolution_min: Resolution::P720,
        }
    }

    pub fn for_context(config: &Config, context: TranscodingContext) -> Self {
        Self::new(config.max_fps(context))
    }

    /// 24, 25 and 30 where they fit under the maximum.
    fn standard(&self) -> Vec<f64> {
        let rates: Vec<f64> = [24.0, 25.0, 30.0]
            .into_iter()
            .filter(|r| *r <= self.max)
            .collect();
        if rates.is_empty() {
            vec![self.max]
        } else {
            rates
        }
    }

    /// 50, 60 and the maximum itself where they fit under it.
    fn hd_standard(&self) -> Vec<f64> {
        [50.0, 60.0, self.max]
            .into_iter()
            .filter(|r| *r <= self.max)
            .collect()
    }

    fn average(&self) -> f64 {
        self.max.min(30.0)
    }

    /// Frame rate for rendering `resolution` from an input at `input_fps`.
    ///
    /// The origin keeps its rate within bounds. Other renditions below 720p
    /// that run faster than 30 fps are brought to a standard rate. The
    /// result is at least 1 fps and at most the context maximum.
    ///
    /// # Errors
    ///
    /// [`Error::Fps`] when `input_fps` is below 0.1 (or not a number), or
    /// when the context maximum itself is.
    pub fn output_fps(
        &self,
        input_fps: f64,
        resolution: Resolution,
        is_origin_resolution: bool,
    ) -> Result<f64> {
        if !(self.max >= self.hard_min) {
            return Err(Error::Fps(format!(
                "maximum output rate {} fps is below {}",
                self.max, self.hard_min
            )));
        }

        let mut fps = input_fps;

        if !is_origin_resolution
            && resolution < self.keep_origin_fps_resolution_min
            && fps > self.average()
        {
            fps = closest_rate(fps, &self.standard());
        }

        if fps.is_nan() || fps < self.hard_min {
            return Err(Error::Fps(format!(
                "{input_fps} fps is below the minimum of {}",
                self.hard_min
            )));
        }

        fps = fps.max(self.transcoded_min);

        if fps > self.max {
            fps = closest_rate(fps, &self.hd_standard()).min(self.max);
        }

        Ok(fps)
    }
}

/// The largest candidate that divides `fps` evenly, otherwise the one that
/// leaves the smallest remainder (largest wins ties).
fn closest_rate(fps: f64, candidates: &[f64]) -> f64 {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    if let Some(divisor) = sorted.iter().find(|r| fps % **r == 0.0) {
        return *divisor;
    }

    sorted
        .iter()
        .copied()
        .min_by(|a, b| (fps % a).total_cmp(&(fps % b)))
        .unwrap_or(fps)
}
