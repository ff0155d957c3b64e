use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn, Level};

use particle_reveal::{
    config::Config,
    render::ColorSpec,
    session::{run_export, run_preview, DriveOutcome, RevealEngine},
    source::ImagePointSource,
    styles::{MotionStyle, StyleRegistry},
    video::OutputFormat,
};

#[derive(Parser)]
#[command(
    name = "particle-reveal",
    version,
    about = "Turn a still image into an animated particle reveal",
    long_about = "Particle-Reveal samples the dark foreground of an image (a QR code, a logo) into particles and animates them into place with one of eight motion styles, live or exported to WebM, MP4 or GIF."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by every command that renders an image
#[derive(clap::Args)]
struct RenderArgs {
    /// Image to reveal (PNG or JPEG)
    #[arg(short, long)]
    image: PathBuf,

    /// Motion style (assemble, elastic, galactic, glitch, liquid, vortex, scanwave, stipple)
    #[arg(short, long)]
    style: Option<MotionStyle>,

    /// Color preset (whiteout, matrix, cyberpunk, sunset, gold, deep-sea)
    #[arg(long)]
    preset: Option<String>,

    /// Playback speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Record the reveal and write it as a video file
    Export {
        #[command(flatten)]
        render: RenderArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output format (webm, mp4, gif)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Play the reveal in real time, optionally dumping every frame as PNG
    Preview {
        #[command(flatten)]
        render: RenderArgs,

        /// Directory for the frame dump
        #[arg(long)]
        frames: Option<PathBuf>,
    },

    /// Write the settled image as a PNG
    Still {
        #[command(flatten)]
        render: RenderArgs,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the motion styles
    Styles,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Particle-Reveal v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Export {
            render,
            output,
            format,
        } => export(render, output, format).await,
        Command::Preview { render, frames } => preview(render, frames).await,
        Command::Still { render, output } => still(render, output),
        Command::Styles => {
            list_styles();
            Ok(())
        }
    }
}

fn load_config(args: &RenderArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(style) = args.style {
        config.animation.style = style;
    }
    if let Some(speed) = args.speed {
        config.animation.speed = speed;
    }
    if let Some(seed) = args.seed {
        config.animation.seed = Some(seed);
    }
    if let Some(preset) = &args.preset {
        config.render.color = ColorSpec::preset(preset)
            .with_context(|| format!("Unknown color preset: {}", preset))?;
    }

    config.validate()?;
    Ok(config)
}

fn build_engine(args: &RenderArgs) -> Result<RevealEngine> {
    let config = load_config(args)?;
    info!("Image: {:?}", args.image);
    info!("Style: {}", config.animation.style);

    let mut engine = RevealEngine::new(config)?;
    engine.load_source(ImagePointSource::open(&args.image)?)?;
    if engine.field().is_empty() {
        warn!("No foreground pixels found; the reveal will be empty");
    }
    Ok(engine)
}

/// Cancel flag that flips on Ctrl-C
fn ctrl_c_cancel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        } else {
            // Keep the sender alive so the session is not treated as cancelled
            std::future::pending::<()>().await;
        }
    });
    rx
}

async fn export(args: RenderArgs, output: PathBuf, format: Option<OutputFormat>) -> Result<()> {
    let mut engine = build_engine(&args)?;
    let format = format.unwrap_or(engine.config().export.format);

    info!("Exporting {} to {:?}", format, output);
    match run_export(&mut engine, format, ctrl_c_cancel()).await {
        Ok(DriveOutcome::Exported(artifact)) => {
            tokio::fs::create_dir_all(&output).await?;
            let path = output.join(&artifact.file_name);
            tokio::fs::write(&path, &artifact.bytes).await?;
            info!(
                "Export complete! {} frames, {} bytes saved to: {:?}",
                artifact.frame_count,
                artifact.len(),
                path
            );
            Ok(())
        }
        Ok(DriveOutcome::Cancelled) => {
            warn!("Export cancelled");
            Ok(())
        }
        Ok(other) => bail!("Export did not complete: {:?}", other),
        Err(e) => bail!(e.user_message()),
    }
}

async fn preview(args: RenderArgs, frames: Option<PathBuf>) -> Result<()> {
    let mut engine = build_engine(&args)?;
    let fps = engine.config().export.fps;

    if let Some(dir) = &frames {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut index = 0usize;
    let mut dump_error = None;
    let outcome = run_preview(&mut engine, fps, ctrl_c_cancel(), |frame| {
        if let (Some(dir), None) = (&frames, &dump_error) {
            let path = dir.join(format!("frame_{:06}.png", index));
            if let Err(e) = frame.save_png(&path) {
                dump_error = Some(e);
            }
        }
        index += 1;
    })
    .await?;

    if let Some(e) = dump_error {
        return Err(e).context("Failed to write preview frames");
    }
    info!("Preview {:?} after {} frames", outcome, index);
    Ok(())
}

fn still(args: RenderArgs, output: PathBuf) -> Result<()> {
    let mut engine = build_engine(&args)?;
    engine.static_render();
    save_png(&engine, &output)?;
    info!("Static render saved to: {:?}", output);
    Ok(())
}

fn save_png(engine: &RevealEngine, path: &Path) -> Result<()> {
    engine
        .surface()
        .save_png(path)
        .with_context(|| format!("Failed to write {:?}", path))
}

fn list_styles() {
    let registry = StyleRegistry::new();
    for style in registry.available_styles() {
        if let Some(entry) = registry.get(style) {
            println!("{:<10} {:<18} {}", style.name(), entry.easing.name(), entry.description);
        }
    }
}
