use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::image_io::save_gray;
use voxview_core::segment::{segment, Marker};

use super::SliceSelect;
use crate::summary::print_regions;

#[derive(Args)]
pub struct SegmentArgs {
    #[command(flatten)]
    pub slice: SliceSelect,

    /// Marker pixel in the slice, as `row,col` (repeatable, labelled in order)
    #[arg(long = "marker", required = true, value_parser = super::parse_pixel)]
    pub markers: Vec<[usize; 2]>,

    /// Half-size of the seed box painted around each marker
    #[arg(long)]
    pub radius: Option<usize>,

    /// Output label image path
    #[arg(short, long, default_value = "labels.png")]
    pub output: PathBuf,
}

pub fn run(args: &SegmentArgs, config: &ViewerConfig) -> Result<()> {
    let volume = super::load_volume(&args.slice.input)?;
    let slice = volume.slice(args.slice.axis.into(), args.slice.index)?;
    let markers: Vec<Marker> = args.markers.iter().copied().map(Marker::from).collect();
    let radius = args.radius.unwrap_or(config.segmentation.marker_radius);

    println!(
        "Segmenting slice {} with {} markers (radius {radius})",
        args.slice.index,
        markers.len()
    );
    let result = segment(&slice, &markers, radius)?;
    print_regions(&result.regions);

    save_gray(&result.display, &args.output)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}
