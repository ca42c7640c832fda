use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::image_io::save_rgb;
use voxview_core::register::fuse;

use super::AxisArg;

#[derive(Args)]
pub struct FuseArgs {
    /// Principal volume (red channel)
    pub principal: PathBuf,

    /// Secondary volume (green channel)
    pub secondary: PathBuf,

    /// Axis used as depth in both volumes
    #[arg(long, value_enum, default_value = "first")]
    pub axis: AxisArg,

    /// Slice index in the principal volume
    #[arg(long, default_value = "0")]
    pub index: usize,

    /// Slice index in the secondary volume (defaults to --index)
    #[arg(long)]
    pub secondary_index: Option<usize>,

    /// Weight of the secondary slice in [0, 1]
    #[arg(long)]
    pub alpha: Option<f32>,

    /// Output file path
    #[arg(short, long, default_value = "fused.png")]
    pub output: PathBuf,
}

pub fn run(args: &FuseArgs, config: &ViewerConfig) -> Result<()> {
    let principal = super::load_volume(&args.principal)?;
    let secondary = super::load_volume(&args.secondary)?;
    let axis = args.axis.into();

    let a = principal.slice(axis, args.index)?;
    let b = secondary.slice(axis, args.secondary_index.unwrap_or(args.index))?;
    let alpha = args.alpha.unwrap_or(config.fusion.alpha);

    let rgb = fuse(&a, &b, alpha)?;
    save_rgb(&rgb, &args.output)?;
    println!("Fused with alpha {alpha}, saved to {}", args.output.display());
    Ok(())
}
