use anyhow::Result;
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::types::Point;

use super::slice::{build_view, DisplayArgs};
use super::SliceSelect;

#[derive(Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub slice: SliceSelect,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Display pixels to read, as `x,y` (repeatable)
    #[arg(long = "at", required = true, value_parser = super::parse_point)]
    pub points: Vec<Point>,
}

pub fn run(args: &ProbeArgs, config: &ViewerConfig) -> Result<()> {
    let mut view = build_view(&args.slice, &args.display, config)?;

    for &point in &args.points {
        match view.probe(args.slice.index, point)? {
            Some(value) => println!("{point}  {value}"),
            None => println!("{point}  outside the image"),
        }
    }
    Ok(())
}
