use anyhow::{bail, Result};
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::measure::DistanceTool;
use voxview_core::types::Point;

use super::slice::{build_view, DisplayArgs};
use super::SliceSelect;

#[derive(Args)]
pub struct MeasureArgs {
    #[command(flatten)]
    pub slice: SliceSelect,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// First display point, as `x,y`
    #[arg(long, value_parser = super::parse_point)]
    pub from: Point,

    /// Second display point, as `x,y`
    #[arg(long, value_parser = super::parse_point)]
    pub to: Point,
}

pub fn run(args: &MeasureArgs, config: &ViewerConfig) -> Result<()> {
    let view = build_view(&args.slice, &args.display, config)?;
    let spacing = view.pixel_spacing();

    let mut tool = DistanceTool::new();
    for point in [args.from, args.to] {
        if view.to_original(point).is_none() {
            bail!("Point {point} is outside the displayed image");
        }
    }
    tool.click(view.to_original(args.from), spacing);
    let Some(measurement) = tool.click(view.to_original(args.to), spacing) else {
        bail!("Measurement needs two points");
    };

    println!(
        "{} -> {}  {:.2} px",
        measurement.from, measurement.to, measurement.pixels
    );
    if let Some(mm) = measurement.physical {
        println!("{mm:.2} mm");
    }
    Ok(())
}
