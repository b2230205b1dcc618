mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ef_core::config::Config;
use ef_core::{Resolution, StreamType, TranscodingContext, TranscodingType, UserId};
use ef_encode::{EncoderOptionsParams, EncoderProfileRegistry};
use ef_planner::{
    ExplicitPlan, FpsPolicy, JobGraphBuilder, PlanFromScratch, StagedGraph, VideoLockRegistry,
};
use ef_probe::{tools, FfprobeProber, MediaFileDescriptor, Prober};
use encodeforge::{InMemoryVideoStore, JobSink, RecordedProber};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the default level.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "encodeforge=debug,ef_planner=debug,ef_encode=debug,ef_probe=debug".to_string()
        } else {
            "encodeforge=info,ef_planner=info".to_string()
        }
    });

    // Logs go to stderr so plans printed on stdout stay valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan {
            file,
            probe_json,
            existing,
            user,
        } => {
            let config = load_config(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(plan(
                config,
                &file,
                probe_json.as_deref(),
                !existing,
                user.as_deref(),
            ))
        }
        Commands::Regenerate {
            file,
            kind,
            resolutions,
            probe_json,
        } => {
            let config = load_config(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(regenerate(
                config,
                &file,
                &kind,
                &resolutions,
                probe_json.as_deref(),
            ))
        }
        Commands::Probe {
            file,
            json,
            probe_json,
        } => {
            let config = load_config(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&config, &file, json, probe_json.as_deref()))
        }
        Commands::EncoderOptions {
            file,
            resolution,
            context,
            audio,
            profile,
            stream_num,
            skip_encoder_check,
            probe_json,
        } => {
            let config = load_config(cli.config.as_deref());
            let request = EncoderRequest {
                resolution: Resolution::from(resolution),
                context: context.parse()?,
                stream_type: if audio {
                    StreamType::Audio
                } else {
                    StreamType::Video
                },
                profile,
                stream_num,
                check_availability: !skip_encoder_check,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(encoder_options(
                &config,
                &file,
                &request,
                probe_json.as_deref(),
            ))
        }
        Commands::CheckTools => {
            let config = load_config(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check_tools(&config))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn load_config(path: Option<&Path>) -> Config {
    let config = Config::load_or_default(path);
    for warning in config.validate() {
        tracing::warn!("{warning}");
    }
    config
}

fn make_prober(config: &Config, probe_json: Option<&Path>) -> Result<Arc<dyn Prober>> {
    if let Some(path) = probe_json {
        let prober = RecordedProber::from_file(path)
            .with_context(|| format!("Cannot load recorded probe {}", path.display()))?;
        return Ok(Arc::new(prober));
    }

    let ffprobe = tools::locate_ffprobe(&config.tools)
        .context("ffprobe not found; install it or pass --probe-json")?;
    Ok(Arc::new(FfprobeProber::new(ffprobe)))
}

/// Probe `file` once to seed the store with a video and its primary file.
async fn import(
    prober: &dyn Prober,
    store: &InMemoryVideoStore,
    file: &Path,
    recorded: bool,
) -> Result<(ef_core::VideoId, ef_core::VideoFileId)> {
    if !recorded && !file.exists() {
        anyhow::bail!("Input file does not exist: {:?}", file);
    }
    let descriptor = prober.probe(file).await?;
    Ok(store.import(file, &descriptor))
}

fn print_plan(graph: &StagedGraph, sink: &JobSink) -> Result<()> {
    tracing::info!(
        stages = graph.stage_count(),
        jobs = graph.job_count(),
        "plan ready"
    );
    println!("{}", sink.to_json()?);
    Ok(())
}

async fn plan(
    config: Config,
    file: &Path,
    probe_json: Option<&Path>,
    is_new_video: bool,
    user: Option<&str>,
) -> Result<()> {
    let user = user
        .map(str::parse::<UserId>)
        .transpose()
        .context("--user is not a valid UUID")?;

    let prober = make_prober(&config, probe_json)?;
    let store = Arc::new(InMemoryVideoStore::new());
    let (video_id, file_id) = import(prober.as_ref(), &store, file, probe_json.is_some()).await?;

    let sink = Arc::new(JobSink::new());
    let builder = JobGraphBuilder::new(
        Arc::new(config),
        store,
        prober,
        VideoLockRegistry::new(),
        sink.clone(),
    );

    let graph = builder
        .plan_from_scratch(PlanFromScratch {
            video_id,
            file_id,
            is_new_video,
            user,
            already_locked: false,
        })
        .await?;

    print_plan(&graph, &sink)
}

async fn regenerate(
    config: Config,
    file: &Path,
    kind: &str,
    resolutions: &[u32],
    probe_json: Option<&Path>,
) -> Result<()> {
    let kind: TranscodingType = kind.parse()?;

    let prober = make_prober(&config, probe_json)?;
    let store = Arc::new(InMemoryVideoStore::new());
    let (video_id, _) = import(prober.as_ref(), &store, file, probe_json.is_some()).await?;

    let sink = Arc::new(JobSink::new());
    let builder = JobGraphBuilder::new(
        Arc::new(config),
        store,
        prober,
        VideoLockRegistry::new(),
        sink.clone(),
    );

    let graph = builder
        .plan_explicit(ExplicitPlan {
            video_id,
            kind,
            resolutions: resolutions.iter().copied().map(Resolution::from).collect(),
            is_new_video: false,
        })
        .await?;

    print_plan(&graph, &sink)
}

async fn probe_file(
    config: &Config,
    file: &Path,
    json: bool,
    probe_json: Option<&Path>,
) -> Result<()> {
    if probe_json.is_none() && !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let prober = make_prober(config, probe_json)?;
    let info = prober.probe(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_descriptor(&info);
    }
    Ok(())
}

fn print_descriptor(info: &MediaFileDescriptor) {
    println!("File: {}", info.file_path.display());
    if let Some(duration) = info.duration {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }
    if let Some(bitrate) = info.video_bitrate() {
        println!("Bitrate: {} kbit/s", bitrate / 1000);
    }

    match &info.video {
        Some(video) => {
            let dims = info.dimensions();
            print!("Video: {} {}x{}", video.codec_name, video.width, video.height);
            print!(" ({}", dims.resolution);
            if dims.is_portrait {
                print!(", portrait");
            }
            println!(", {} fps)", info.fps());
        }
        None => println!("Video: none"),
    }

    match &info.audio {
        Some(audio) => {
            print!("Audio: {}", audio.codec_name);
            if let Some(channels) = audio.channels {
                print!(" {channels}ch");
            }
            if let Some(bitrate) = audio.bit_rate {
                print!(" {} kbit/s", bitrate / 1000);
            }
            println!();
        }
        None => println!("Audio: none"),
    }
}

struct EncoderRequest {
    resolution: Resolution,
    context: TranscodingContext,
    stream_type: StreamType,
    profile: String,
    stream_num: Option<usize>,
    check_availability: bool,
}

async fn encoder_options(
    config: &Config,
    file: &Path,
    request: &EncoderRequest,
    probe_json: Option<&Path>,
) -> Result<()> {
    let prober = make_prober(config, probe_json)?;
    let probe = prober.probe(file).await?;

    let fps = match request.stream_type {
        StreamType::Audio => probe.fps(),
        StreamType::Video => FpsPolicy::for_context(config, request.context).output_fps(
            probe.fps(),
            request.resolution,
            false,
        )?,
    };

    let available = if request.check_availability {
        match tools::locate_ffmpeg(&config.tools) {
            Some(ffmpeg) => Some(tools::available_encoders(&ffmpeg).await?),
            None => {
                tracing::warn!("ffmpeg not found; encoder availability is not checked");
                None
            }
        }
    } else {
        None
    };

    let params = EncoderOptionsParams {
        resolution: request.resolution,
        fps,
        input_bitrate: probe.video_bitrate(),
        input_ratio: probe.dimensions().ratio,
        stream_num: request.stream_num,
        can_copy_audio: true,
        input_probe: &probe,
        audio_bitrate_policy: config.transcoding.audio_bitrate_policy,
    };

    let registry = EncoderProfileRegistry::from_config(config);
    let resolved = registry.resolve(
        request.context,
        request.stream_type,
        &request.profile,
        &params,
        available.as_ref(),
    )?;

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

async fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = tools::check_all(&config.tools).await;
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Use --probe-json to plan without ffprobe.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("Cannot read config file {}", p.display()))?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let registry = EncoderProfileRegistry::from_config(&config);
    let mut warnings = config.validate();
    warnings.extend(registry.validate_try_lists());

    let t = &config.transcoding;
    println!("✓ Configuration is valid");
    println!(
        "  HLS: {} (split audio: {})",
        t.hls.enabled, t.hls.split_audio_and_video
    );
    println!("  Web videos: {}", t.web_videos.enabled);
    println!(
        "  VOD resolutions: {}",
        join(&config.resolutions(TranscodingContext::Vod).enabled())
    );
    println!(
        "  Live resolutions: {}",
        join(&config.resolutions(TranscodingContext::Live).enabled())
    );
    println!(
        "  Max fps: vod {}, live {}",
        t.fps.max, config.live.transcoding.fps.max
    );
    for context in [TranscodingContext::Vod, TranscodingContext::Live] {
        for stream_type in [StreamType::Video, StreamType::Audio] {
            println!(
                "  {context} {stream_type} encoders: {}",
                registry.encoders_to_try(context, stream_type).join(", ")
            );
        }
    }

    for warning in &warnings {
        println!("⚠ {warning}");
    }

    Ok(())
}

fn join(resolutions: &[Resolution]) -> String {
    if resolutions.is_empty() {
        return "none".to_string();
    }
    resolutions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
