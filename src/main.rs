//! VisionLoop - Webcam Inference Pipeline Service
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use visionloop::{
    capture::{CaptureController, SyntheticCamera},
    config::{Config, DelegateChoice, PipelineVariant, RenderStrategy},
    engine::{ModelSession, ReplayFactory, ReplayScript},
    overlay::{
        CanvasRenderer, CoordinateMapper, DisplaySize, DomRenderer, MemoryHost, OverlayRenderer,
        SoftwareCanvas,
    },
    pipeline::InferenceLoop,
};

/// VisionLoop - Webcam Inference Pipeline Service
#[derive(Parser, Debug)]
#[command(name = "visionloop", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pipeline variant (overrides config): face_detector, face_landmarker,
    /// gesture_recognizer
    #[arg(long)]
    variant: Option<PipelineVariant>,

    /// Overlay strategy (overrides config): canvas, dom
    #[arg(long)]
    strategy: Option<RenderStrategy>,

    /// Compute delegate preference (overrides config): auto, gpu, cpu
    #[arg(long)]
    delegate: Option<DelegateChoice>,

    /// Stop after this many processed frames (0 = run until Ctrl+C)
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Replay script with per-frame results (JSON)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Reject the GPU delegate to exercise CPU fallback
    #[arg(long)]
    fail_gpu: bool,

    /// Inject an inference error every N frames
    #[arg(long)]
    fail_every: Option<u32>,

    /// Write each rendered frame as a PNG into this directory
    #[arg(long)]
    dump_frames: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", visionloop::NAME, visionloop::VERSION);

    run(&args).await?;

    info!("VisionLoop stopped");
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(variant) = args.variant {
        config.pipeline.variant = variant;
    }
    if let Some(strategy) = args.strategy {
        config.pipeline.strategy = strategy;
    }
    if let Some(delegate) = args.delegate {
        config.engine.delegate = delegate;
    }

    // Validate configuration
    config.validate()?;

    info!("Pipeline variant: {}", config.pipeline.variant.as_str());
    info!("Overlay strategy: {:?}", config.pipeline.strategy);
    info!(
        "Model asset: {}",
        config.engine.model_asset(config.pipeline.variant).display()
    );

    // Build the replay engine and load the model session
    let script = if let Some(ref path) = args.script {
        info!("Replay script: {}", path.display());
        ReplayScript::from_file(path)?
    } else {
        ReplayScript::for_variant(config.pipeline.variant)
    };
    let factory = ReplayFactory::new(script)
        .with_reject_gpu(args.fail_gpu)
        .with_fail_every(args.fail_every);

    let mut session = ModelSession::new();
    session
        .initialize(&factory, &config.engine, config.pipeline.variant)
        .await?;

    let capture = CaptureController::new(SyntheticCamera::new(), &config.capture);
    let renderer = build_renderer(&config, args.dump_frames.clone())?;

    // Enabling the webcam is gated on session readiness
    session.ensure_ready()?;
    capture.enable().await?;
    info!("Webcam enabled, toggle now reads '{}'", capture.label().await);

    let max_frames = if args.frames == 0 {
        None
    } else {
        Some(args.frames)
    };
    let mut pipeline =
        InferenceLoop::new(session, capture.clone(), renderer, &config).with_max_frames(max_frames);

    // Ctrl+C / SIGTERM disables capture, which ends the loop. The broadcast
    // channel also covers a loop still idle-polling before any enable.
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let signal_capture = capture.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        signal_capture.disable().await;
        let _ = shutdown_tx.send(());
    });

    let stats = pipeline.run(shutdown_rx).await?;
    info!(
        "Processed {} frames ({} duplicates skipped, {} discarded, {} errors)",
        stats.frames_processed,
        stats.duplicates_skipped,
        stats.discarded_results,
        stats.inference_errors + stats.render_errors
    );
    Ok(())
}

fn build_renderer(
    config: &Config,
    dump_frames: Option<PathBuf>,
) -> anyhow::Result<Box<dyn OverlayRenderer + Send>> {
    let display = DisplaySize::new(config.display.width, config.display.height);
    let mapper = CoordinateMapper::new(display, config.capture.mirrored);

    let renderer: Box<dyn OverlayRenderer + Send> = match config.pipeline.strategy {
        RenderStrategy::Canvas => {
            let mut canvas = SoftwareCanvas::new(display);
            if let Some(dir) = dump_frames {
                std::fs::create_dir_all(&dir)?;
                info!("Dumping rendered frames to {}", dir.display());
                canvas = canvas.with_dump_dir(dir);
            }
            Box::new(CanvasRenderer::new(canvas, mapper))
        }
        RenderStrategy::Dom => {
            if dump_frames.is_some() {
                warn!("--dump-frames only applies to the canvas strategy");
            }
            Box::new(DomRenderer::new(MemoryHost::new(), mapper))
        }
    };
    Ok(renderer)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
