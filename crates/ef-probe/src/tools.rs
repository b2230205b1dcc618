//! External tool discovery.
//!
//! Locates ffprobe/ffmpeg (honouring configured overrides) and lists the
//! encoders the host ffmpeg build exposes, which the encoder registry uses to
//! skip codecs it cannot run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ef_core::config::ToolsConfig;
use serde::Serialize;

use crate::command::ToolCommand;

/// `-version` answers immediately; a tool that hangs counts as unavailable.
const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Availability information for a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of `-version` output, if available.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Resolve a tool path: a configured override wins when it exists,
/// otherwise `PATH` is searched.
pub fn locate(name: &str, override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = override_path {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        tracing::warn!(
            "Configured {name} path {} does not exist; searching PATH",
            p.display()
        );
    }
    which::which(name).ok()
}

pub fn locate_ffprobe(config: &ToolsConfig) -> Option<PathBuf> {
    locate("ffprobe", config.ffprobe_path.as_deref())
}

pub fn locate_ffmpeg(config: &ToolsConfig) -> Option<PathBuf> {
    locate("ffmpeg", config.ffmpeg_path.as_deref())
}

/// Check ffprobe and ffmpeg, reporting version strings when found.
pub async fn check_all(config: &ToolsConfig) -> Vec<ToolInfo> {
    let mut infos = Vec::new();
    for (name, path) in [
        ("ffprobe", locate_ffprobe(config)),
        ("ffmpeg", locate_ffmpeg(config)),
    ] {
        let version = match &path {
            Some(p) => ToolCommand::new(p.clone())
                .arg("-version")
                .timeout(VERSION_TIMEOUT)
                .execute()
                .await
                .ok()
                .and_then(|out| out.stdout.lines().next().map(str::to_string)),
            None => None,
        };
        infos.push(ToolInfo {
            name: name.to_string(),
            available: path.is_some(),
            version,
            path,
        });
    }
    infos
}

/// Ask ffmpeg which encoders it was built with.
pub async fn available_encoders(ffmpeg: &Path) -> ef_core::Result<HashSet<String>> {
    let output = ToolCommand::new(ffmpeg.to_path_buf())
        .args(["-hide_banner", "-encoders"])
        .execute()
        .await?;
    Ok(parse_encoder_list(&output.stdout))
}

/// Parse `ffmpeg -encoders` output: rows after the `------` separator are
/// `<flags> <name> <description>`.
pub fn parse_encoder_list(stdout: &str) -> HashSet<String> {
    stdout
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let _flags = parts.next()?;
            parts.next().map(str::to_string)
        })
        .collect()
}
