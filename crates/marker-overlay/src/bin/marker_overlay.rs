//! marker-overlay CLI: project an image onto a four-marker card.

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
#[cfg(feature = "tracing")]
use marker_overlay::core::TracingFormat;
#[cfg(not(feature = "tracing"))]
use marker_overlay::core::init_with_level;
use marker_overlay::core::{level_from_env, parse_level};
use marker_overlay::image_io::{load_color, resize_to_width, save_color};
use marker_overlay::markers::{DetectedMarkers, FixedDetections, MarkerLayout};
use marker_overlay::{
    load_detections, ImageDirectorySink, ImageSequence, LiveLoop, OverlayConfig, OverlayPipeline,
    SystemClock,
};
use std::path::PathBuf;
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "marker-overlay")]
#[command(about = "Warp an image onto the card delimited by four fiducial markers")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). Defaults to
    /// `$MARKER_OVERLAY_LOG`, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// JSON config file (marker layout, frame rate, resize width, output path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Card marker ids in TL,TR,BR,BL order; overrides the config.
    #[arg(long, global = true, value_delimiter = ',')]
    marker_ids: Option<Vec<u32>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay onto a single target image.
    Still(StillArgs),

    /// Replay a directory of frames through the rate-capped live loop.
    Sequence(SequenceArgs),
}

#[derive(Debug, Clone, Args)]
struct ResizeArgs {
    /// Resize targets to this width before overlaying (default from config: 600).
    #[arg(long)]
    width: Option<u32>,

    /// Keep targets at their original size.
    #[arg(long, conflicts_with = "width")]
    no_resize: bool,
}

#[derive(Debug, Clone, Args)]
struct StillArgs {
    /// Image containing the marker card.
    #[arg(long)]
    target: PathBuf,

    /// Image to project onto the card.
    #[arg(long)]
    source: PathBuf,

    /// Marker detections for the (resized) target, as JSON.
    #[arg(long)]
    detections: PathBuf,

    /// Where to write the result; parent directories are created.
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    resize: ResizeArgs,
}

#[derive(Debug, Clone, Args)]
struct SequenceArgs {
    /// Directory of frames; `<name>.json` next to a frame holds its detections.
    #[arg(long)]
    frames: PathBuf,

    /// Image to project onto the card.
    #[arg(long)]
    source: PathBuf,

    /// Directory receiving the processed frames.
    #[arg(long)]
    out_dir: PathBuf,

    /// Processed frames per second; 0 processes every frame.
    #[arg(long)]
    frame_rate: Option<f64>,

    #[command(flatten)]
    resize: ResizeArgs,
}

fn init_logging(level: Option<&str>) {
    let level = match level {
        Some(name) => parse_level(name),
        None => level_from_env(LevelFilter::Info),
    };
    #[cfg(feature = "tracing")]
    {
        let directive = level.to_string().to_ascii_lowercase();
        marker_overlay::core::init_tracing(TracingFormat::Compact, &directive);
        let _ = tracing_log::LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = init_with_level(level);
    }
}

fn load_config(cli: &Cli) -> CliResult<OverlayConfig> {
    let mut cfg = match &cli.config {
        Some(path) => OverlayConfig::load_json(path)?,
        None => OverlayConfig::default(),
    };
    if let Some(ids) = &cli.marker_ids {
        let ids: [u32; 4] = ids
            .as_slice()
            .try_into()
            .map_err(|_| format!("--marker-ids needs 4 ids, got {}", ids.len()))?;
        cfg.layout = MarkerLayout::new(ids);
    }
    Ok(cfg)
}

fn resize_width(cfg: &OverlayConfig, args: &ResizeArgs) -> Option<u32> {
    if args.no_resize {
        None
    } else {
        args.width.or(cfg.resize_width)
    }
}

fn run_still(cfg: &OverlayConfig, args: &StillArgs) -> CliResult<ExitCode> {
    log::info!("loading target: {}", args.target.display());
    let mut target = load_color(&args.target)?;
    if let Some(width) = resize_width(cfg, &args.resize) {
        target = resize_to_width(target, width)?;
    }
    log::info!("target size: {}x{}", target.width, target.height);

    let source = load_color(&args.source)?;
    let detections = load_detections(&args.detections)?;
    log::info!(
        "{} markers, {} rejected candidates",
        detections.markers.len(),
        detections.rejected.len()
    );

    let pipeline = OverlayPipeline::new(source, cfg.layout);
    match pipeline.apply(&target.view(), &detections.markers) {
        Ok(out) => {
            let output = args.output.clone().unwrap_or_else(|| cfg.output_path());
            save_color(&output, &out)?;
            log::info!("result written to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("overlay failed: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_sequence(cfg: &OverlayConfig, args: &SequenceArgs) -> CliResult<ExitCode> {
    let mut frames =
        ImageSequence::open(&args.frames)?.with_resize_width(resize_width(cfg, &args.resize));
    log::info!("{} frames in {}", frames.len(), args.frames.display());

    let source = load_color(&args.source)?;
    let pipeline = OverlayPipeline::new(source, cfg.layout);
    // No built-in detector: frames without a sidecar pass through unchanged.
    let detector = FixedDetections(DetectedMarkers::default());
    let frame_rate = args.frame_rate.unwrap_or(cfg.frame_rate);

    let mut sink = ImageDirectorySink::new(&args.out_dir);
    let stats = LiveLoop::new(&pipeline, &detector, frame_rate).run(
        &mut frames,
        &mut sink,
        &mut SystemClock,
    )?;

    println!(
        "processed {} of {} frames ({} composited, {} unchanged)",
        stats.frames_processed, stats.frames_read, stats.composited, stats.passthrough
    );
    Ok(ExitCode::SUCCESS)
}

fn main() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let cfg = load_config(&cli)?;
    match &cli.command {
        Commands::Still(args) => run_still(&cfg, args),
        Commands::Sequence(args) => run_sequence(&cfg, args),
    }
}
