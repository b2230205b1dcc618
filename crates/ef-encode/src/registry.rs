//! Encoder profile registry.
//!
//! For each transcoding context and stream type the registry keeps an
//! ordered try-list of codec names, and for each codec a set of named
//! option builders ("profiles"). Resolution walks the try-list and returns
//! the first codec that the host can run, that has a builder, and whose
//! builder succeeds.

use std::collections::{BTreeMap, HashMap, HashSet};

use ef_core::config::Config;
use ef_core::{StreamType, TranscodingContext};
use serde::Serialize;

use crate::profiles::{aac, x264, x265, EncoderOptions, EncoderOptionsBuilder, EncoderOptionsParams};

/// Profile used when none is requested or the requested one is missing.
pub const DEFAULT_PROFILE: &str = "default";

/// The chosen codec and its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEncoder {
    pub encoder: String,
    pub profile: String,
    #[serde(flatten)]
    pub options: EncoderOptions,
}

/// Codec try-lists and option builders, per transcoding context.
#[derive(Debug, Clone)]
pub struct EncoderProfileRegistry {
    to_try: HashMap<(TranscodingContext, StreamType), Vec<String>>,
    builders: HashMap<(TranscodingContext, String), BTreeMap<String, EncoderOptionsBuilder>>,
}

impl Default for EncoderProfileRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EncoderProfileRegistry {
    /// An empty registry: no try-lists, no builders.
    pub fn empty() -> Self {
        Self {
            to_try: HashMap::new(),
            builders: HashMap::new(),
        }
    }

    /// Built-in builders and try-lists: libx264 for video in both contexts,
    /// libfdk_aac then aac for audio. libx265 is registered for on-demand
    /// encodes but only tried when a configuration lists it.
    pub fn with_defaults() -> Self {
        use StreamType::{Audio, Video};
        use TranscodingContext::{Live, Vod};

        let mut registry = Self::empty();

        registry.register(Vod, "libx264", DEFAULT_PROFILE, x264::vod);
        registry.register(Live, "libx264", DEFAULT_PROFILE, x264::live);
        registry.register(Vod, "libx265", DEFAULT_PROFILE, x265::vod);
        for context in [Vod, Live] {
            registry.register(context, "aac", DEFAULT_PROFILE, aac::aac);
            registry.register(context, "libfdk_aac", DEFAULT_PROFILE, aac::libfdk_aac);

            registry.set_encoders_to_try(context, Video, ["libx264"]);
            registry.set_encoders_to_try(context, Audio, ["libfdk_aac", "aac"]);
        }

        registry
    }

    /// Built-in registry with the try-list overrides from `config` applied.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::with_defaults();
        for context in [TranscodingContext::Vod, TranscodingContext::Live] {
            let overrides = config.encoders(context);
            if let Some(video) = &overrides.video {
                registry.set_encoders_to_try(context, StreamType::Video, video.iter().cloned());
            }
            if let Some(audio) = &overrides.audio {
                registry.set_encoders_to_try(context, StreamType::Audio, audio.iter().cloned());
            }
        }
        registry
    }

    /// Register (or replace) a named builder for `encoder` in `context`.
    pub fn register(
        &mut self,
        context: TranscodingContext,
        encoder: &str,
        profile: &str,
        builder: EncoderOptionsBuilder,
    ) {
        self.builders
            .entry((context, encoder.to_string()))
            .or_default()
            .insert(profile.to_string(), builder);
    }

    /// Replace the try-list for a context and stream type.
    pub fn set_encoders_to_try(
        &mut self,
        context: TranscodingContext,
        stream_type: StreamType,
        encoders: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.to_try.insert(
            (context, stream_type),
            encoders.into_iter().map(Into::into).collect(),
        );
    }

    pub fn encoders_to_try(&self, context: TranscodingContext, stream_type: StreamType) -> &[String] {
        self.to_try
            .get(&(context, stream_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Builder for `encoder`, falling back to the default profile when
    /// `profile` is not registered.
    pub fn builder(
        &self,
        context: TranscodingContext,
        encoder: &str,
        profile: &str,
    ) -> Option<(&str, EncoderOptionsBuilder)> {
        let profiles = self.builders.get(&(context, encoder.to_string()))?;
        profiles
            .get_key_value(profile)
            .or_else(|| profiles.get_key_value(DEFAULT_PROFILE))
            .map(|(name, builder)| (name.as_str(), *builder))
    }

    /// Pick the first usable codec for a stream.
    ///
    /// `available` is the host's encoder set; `None` treats every codec as
    /// available. A codec is skipped when unavailable, when it has no
    /// builder, or when its builder fails.
    ///
    /// # Errors
    ///
    /// [`ef_core::Error::Encoder`] when no candidate yields options.
    pub fn resolve(
        &self,
        context: TranscodingContext,
        stream_type: StreamType,
        profile: &str,
        params: &EncoderOptionsParams<'_>,
        available: Option<&HashSet<String>>,
    ) -> ef_core::Result<ResolvedEncoder> {
        let mut skipped = Vec::new();

        for encoder in self.encoders_to_try(context, stream_type) {
            if available.is_some_and(|set| !set.contains(encoder)) {
                tracing::debug!(%encoder, %context, %stream_type, "encoder not available on host");
                skipped.push(format!("{encoder}: not available"));
                continue;
            }

            let Some((profile_name, builder)) = self.builder(context, encoder, profile) else {
                tracing::debug!(%encoder, %context, %stream_type, "no builder registered");
                skipped.push(format!("{encoder}: no builder"));
                continue;
            };

            match builder(params) {
                Ok(options) => {
                    tracing::debug!(
                        %encoder,
                        profile = profile_name,
                        copy = options.copy,
                        resolution = %params.resolution,
                        "encoder resolved"
                    );
                    return Ok(ResolvedEncoder {
                        encoder: encoder.clone(),
                        profile: profile_name.to_string(),
                        options,
                    });
                }
                Err(e) => {
                    tracing::warn!(%encoder, %context, %stream_type, error = %e, "builder failed; trying next encoder");
                    skipped.push(format!("{encoder}: {e}"));
                }
            }
        }

        let message = if skipped.is_empty() {
            "try-list is empty".to_string()
        } else {
            skipped.join("; ")
        };
        Err(ef_core::Error::encoder(stream_type, context, message))
    }

    /// Try-list entries that name a codec without any registered builder.
    pub fn validate_try_lists(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for context in [TranscodingContext::Vod, TranscodingContext::Live] {
            for stream_type in [StreamType::Video, StreamType::Audio] {
                for encoder in self.encoders_to_try(context, stream_type) {
                    if !self.builders.contains_key(&(context, encoder.clone())) {
                        warnings.push(format!(
                            "{context} {stream_type} encoder '{encoder}' has no registered builder"
                        ));
                    }
                }
            }
        }
        warnings
    }
}
