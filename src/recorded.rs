//! A [`Prober`] that replays saved ffprobe output.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ef_probe::ffprobe::parse_ffprobe_json;
use ef_probe::{MediaFileDescriptor, Prober};

/// Answers every probe with the same recorded
/// `ffprobe -print_format json -show_format -show_streams` document.
#[derive(Debug, Clone)]
pub struct RecordedProber {
    json: String,
}

impl RecordedProber {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Read the recorded document from `path`.
    pub fn from_file(path: &Path) -> ef_core::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        // Fail on load rather than on first probe.
        parse_ffprobe_json(path, &json)?;
        Ok(Self::new(json))
    }
}

#[async_trait]
impl Prober for RecordedProber {
    fn name(&self) -> &'static str {
        "recorded"
    }

    async fn probe(&self, path: &Path) -> ef_core::Result<MediaFileDescriptor> {
        let mut descriptor = parse_ffprobe_json(path, &self.json)?;
        descriptor.file_path = PathBuf::from(path);
        Ok(descriptor)
    }
}
