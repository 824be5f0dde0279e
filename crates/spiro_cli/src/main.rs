//! Spiro CLI
//!
//! Render spirographs and figure files to PNG images.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spiro_canvas::prelude::*;
use spiro_canvas::{BakeConfig, FontId};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod figure;
mod spirograph;

use figure::{draw_figure, Figure};
use spirograph::{Hypotrochoid, SpiroStyle};

#[derive(Parser)]
#[command(name = "spiro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spiro 2D renderer CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a hypotrochoid to a PNG
    Spirograph(SpirographArgs),

    /// Render a figure description (TOML) to a PNG
    Render {
        /// Figure file
        figure: PathBuf,

        /// Output image
        #[arg(short, long, default_value = "figure.png")]
        output: PathBuf,

        /// Font for titles and labels (overrides the figure's font)
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Show the selected GPU adapter
    Info,
}

#[derive(Args)]
struct SpirographArgs {
    /// Fixed ring radius
    #[arg(long = "big", short = 'R', default_value = "10")]
    big: u32,

    /// Rolling gear radius
    #[arg(long = "small", short = 'r', default_value = "3")]
    small: u32,

    /// Pen distance from the rolling gear's center
    #[arg(long, short = 'd', default_value = "7")]
    distance: f32,

    /// Number of sampled points
    #[arg(long, default_value = "2000")]
    steps: usize,

    #[arg(long, default_value = "800")]
    width: u32,

    #[arg(long, default_value = "800")]
    height: u32,

    /// Curve color (#RRGGBB or #RRGGBBAA)
    #[arg(long, default_value = "#00FFFF")]
    color: Color,

    /// Background color
    #[arg(long, default_value = "#121212")]
    background: Color,

    #[arg(long, default_value = "1.5")]
    line_width: f32,

    /// Title drawn above the curve (needs --font)
    #[arg(long)]
    title: Option<String>,

    /// Font for the title
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output image
    #[arg(short, long, default_value = "spirograph.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Spirograph(args) => cmd_spirograph(args),
        Commands::Render {
            figure,
            output,
            font,
        } => cmd_render(&figure, &output, font.as_deref()),
        Commands::Info => cmd_info(),
    }
}

fn cmd_spirograph(args: SpirographArgs) -> Result<()> {
    let curve = Hypotrochoid::new(args.big, args.small, args.distance);
    info!(
        "Tracing R={} r={} d={} over {} revolutions",
        curve.big,
        curve.small,
        curve.distance,
        curve.revolutions()
    );

    let style = SpiroStyle {
        width: args.width,
        height: args.height,
        color: args.color,
        background: args.background,
        line_width: args.line_width,
        title: args.title,
    };
    let figure = curve.figure(args.steps, &style);
    render_to_png(&figure, args.font.as_deref(), &args.output)
}

fn cmd_render(path: &Path, output: &Path, font: Option<&Path>) -> Result<()> {
    let figure = Figure::load(path)?;
    info!(
        "Loaded {} with {} lines and {} labels",
        path.display(),
        figure.lines.len(),
        figure.texts.len()
    );

    let font = font.or(figure.font.as_deref().map(Path::new));
    render_to_png(&figure, font, output)
}

fn cmd_info() -> Result<()> {
    let spiro = Spiro::initialize().context("Failed to initialize renderer")?;
    let canvas = spiro
        .create_offscreen_canvas(CanvasConfig::default().size(1, 1))
        .context("Failed to create a GPU device")?;

    let adapter = canvas.backend().adapter_info();
    println!("Spiro 2D Renderer");
    println!("=================");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Adapter:");
    println!("  - Name: {}", adapter.name);
    println!("  - Backend: {:?}", adapter.backend);
    println!("  - Device type: {:?}", adapter.device_type);
    println!("  - Driver: {} {}", adapter.driver, adapter.driver_info);
    println!("  - Target format: {:?}", canvas.backend().format());

    Ok(())
}

/// Render `figure` offscreen and write it as a PNG
fn render_to_png(figure: &Figure, font: Option<&Path>, output: &Path) -> Result<()> {
    let spiro = Spiro::initialize().context("Failed to initialize renderer")?;
    let mut canvas = spiro
        .create_offscreen_canvas(figure.canvas_config())
        .context("Failed to create offscreen canvas")?;

    let font = load_font(&mut canvas, font)?;

    canvas.begin_frame()?;
    draw_figure(&mut canvas, figure, font);
    canvas.end_frame()?;

    let stats = canvas.frame_stats();
    info!("Rendered {} quads in {} draw calls", stats.quads, stats.draw_calls);

    canvas
        .snapshot()
        .context("Failed to read back the frame")?
        .save_png(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {}", output.display());
    Ok(())
}

fn load_font<B: GpuBackend>(canvas: &mut Canvas<B>, path: Option<&Path>) -> Result<Option<FontId>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        warn!("Font {} not found, text will be skipped", path.display());
        return Ok(None);
    }
    let font = canvas
        .load_font_with(path, &BakeConfig::default().with_pixel_height(48.0))
        .with_context(|| format!("Failed to load font {}", path.display()))?;
    Ok(Some(font))
}
