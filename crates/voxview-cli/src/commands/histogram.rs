use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::view::Histogram;

use super::SliceSelect;

#[derive(Args)]
pub struct HistogramArgs {
    #[command(flatten)]
    pub slice: SliceSelect,

    /// Number of bins (defaults to the config value)
    #[arg(long)]
    pub bins: Option<usize>,

    /// Save the bar chart to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &HistogramArgs, config: &ViewerConfig) -> Result<()> {
    let volume = super::load_volume(&args.slice.input)?;
    let slice = volume.slice(args.slice.axis.into(), args.slice.index)?;
    let histogram = Histogram::compute(&slice, args.bins.unwrap_or(config.histogram.bins))?;

    println!(
        "{} samples in {} bins, range {} .. {}",
        histogram.total(),
        histogram.bins(),
        histogram.min,
        histogram.max
    );

    match args.output {
        Some(ref path) => {
            histogram
                .histogram_image(config.histogram.width, config.histogram.height)
                .save(path)?;
            println!("Saved to {}", path.display());
        }
        None => {
            for (bin, count) in histogram.counts.iter().enumerate() {
                println!("{:>12.3}  {}", histogram.bin_start(bin), count);
            }
        }
    }
    Ok(())
}
