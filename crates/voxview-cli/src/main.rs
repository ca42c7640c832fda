mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use voxview_core::config::ViewerConfig;
use voxview_core::volume::HeaderDictionary;

#[derive(Parser)]
#[command(name = "voxview", about = "Medical volume slice viewer")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Viewer config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra header names (TOML `[names]` table) on top of the DICOM dictionary
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show volume shape, spacing and intensity range
    Info(commands::info::InfoArgs),
    /// Print header elements with readable names
    Headers(commands::headers::HeadersArgs),
    /// Render one slice through fit, contrast and zoom
    Slice(commands::slice::SliceArgs),
    /// Compute and draw the intensity histogram of a slice
    Histogram(commands::histogram::HistogramArgs),
    /// Read the raw intensity under a display pixel
    Probe(commands::probe::ProbeArgs),
    /// Measure the distance between two display points
    Measure(commands::measure::MeasureArgs),
    /// Marker-based watershed segmentation of a slice
    Segment(commands::segment::SegmentArgs),
    /// Blend two slices into a red/green overlay
    Fuse(commands::fuse::FuseArgs),
    /// Translation registration of a moving slice onto a fixed slice
    Register(commands::register::RegisterArgs),
    /// Print or save the default viewer config
    Config(commands::config::ConfigArgs),
    /// Replay a scripted interaction session
    Session(commands::session::SessionArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match cli.config {
        Some(ref path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Headers(args) => {
            commands::headers::run(args, &config, &load_dictionary(&cli)?)
        }
        Commands::Slice(args) => commands::slice::run(args, &config),
        Commands::Histogram(args) => commands::histogram::run(args, &config),
        Commands::Probe(args) => commands::probe::run(args, &config),
        Commands::Measure(args) => commands::measure::run(args, &config),
        Commands::Segment(args) => commands::segment::run(args, &config),
        Commands::Fuse(args) => commands::fuse::run(args, &config),
        Commands::Register(args) => commands::register::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Session(args) => {
            commands::session::run(args, config, load_dictionary(&cli)?)
        }
    }
}

fn load_dictionary(cli: &Cli) -> Result<HeaderDictionary> {
    let dictionary = HeaderDictionary::standard();
    match cli.dictionary {
        Some(ref path) => dictionary
            .load_overrides(path)
            .with_context(|| format!("Failed to read header names {}", path.display())),
        None => Ok(dictionary),
    }
}
