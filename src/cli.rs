use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "encodeforge")]
#[command(author, version, about = "Plans rendition-encoding job graphs for uploaded videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan the full job graph for a newly uploaded file
    Plan {
        /// Primary file of the video
        #[arg(required = true)]
        file: PathBuf,

        /// Use recorded ffprobe JSON instead of running ffprobe
        #[arg(long)]
        probe_json: Option<PathBuf>,

        /// Treat the upload as an existing video being reprocessed
        #[arg(long)]
        existing: bool,

        /// User who triggered the upload
        #[arg(long)]
        user: Option<String>,
    },

    /// Plan a manual regeneration of selected renditions
    Regenerate {
        /// Primary file of the video
        #[arg(required = true)]
        file: PathBuf,

        /// Output kind: hls or web-video
        #[arg(long, default_value = "hls")]
        kind: String,

        /// Resolutions to produce, e.g. 720,480,0 (0 is audio only)
        #[arg(long, required = true, value_delimiter = ',')]
        resolutions: Vec<u32>,

        /// Use recorded ffprobe JSON instead of running ffprobe
        #[arg(long)]
        probe_json: Option<PathBuf>,
    },

    /// Probe a media file and display the fields the planner uses
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Use recorded ffprobe JSON instead of running ffprobe
        #[arg(long)]
        probe_json: Option<PathBuf>,
    },

    /// Show the encoder and options chosen for one output stream
    EncoderOptions {
        /// Input file
        #[arg(required = true)]
        file: PathBuf,

        /// Output resolution (short side in pixels)
        #[arg(long, default_value = "720")]
        resolution: u32,

        /// Transcoding context: vod or live
        #[arg(long, default_value = "vod")]
        context: String,

        /// Choose the audio encoder instead of the video encoder
        #[arg(long)]
        audio: bool,

        /// Named encoder profile
        #[arg(long, default_value = "default")]
        profile: String,

        /// Output stream index (live commands with several outputs)
        #[arg(long)]
        stream_num: Option<usize>,

        /// Skip asking ffmpeg which encoders it supports
        #[arg(long)]
        skip_encoder_check: bool,

        /// Use recorded ffprobe JSON instead of running ffprobe
        #[arg(long)]
        probe_json: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
