use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::image_io::{save_gray, save_raw_u16};
use voxview_core::view::VolumeView;

use super::SliceSelect;

/// Display settings shared by commands that render a slice.
#[derive(Args)]
pub struct DisplayArgs {
    /// Lower contrast bound as a fraction of the intensity range
    #[arg(long, default_value = "0.0")]
    pub low: f64,

    /// Upper contrast bound as a fraction of the intensity range
    #[arg(long, default_value = "1.0")]
    pub high: f64,

    /// Zoom factor (>= 1)
    #[arg(long, default_value = "1.0")]
    pub zoom: f64,

    /// Pan drag in display pixels, as `dx,dy`
    #[arg(long, value_parser = super::parse_point, allow_hyphen_values = true)]
    pub pan: Option<voxview_core::types::Point>,

    /// Show slices at original size instead of fitting them to the display box
    #[arg(long)]
    pub no_fit: bool,
}

#[derive(Args)]
pub struct SliceArgs {
    #[command(flatten)]
    pub slice: SliceSelect,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Save the raw slice as 16-bit grey instead of the rendered view
    #[arg(long)]
    pub raw: bool,

    /// Output file path (.png or .tiff)
    #[arg(short, long, default_value = "slice.png")]
    pub output: PathBuf,
}

/// Build a view of the selected slice with the display settings applied.
pub fn build_view(
    slice: &SliceSelect,
    display: &DisplayArgs,
    config: &ViewerConfig,
) -> Result<VolumeView> {
    let volume = super::load_volume(&slice.input)?;
    let max_size = if display.no_fit {
        None
    } else {
        config.max_display_size
    };

    let mut view = VolumeView::new(volume, max_size);
    view.set_axis(slice.axis.into());
    view.set_contrast(display.low, display.high)
        .context("Invalid contrast window")?;
    view.set_zoom(display.zoom).context("Invalid zoom factor")?;

    // Panning is clamped against the displayed size, which needs one render.
    view.render(slice.index)?;
    if let Some(drag) = display.pan {
        view.pan(drag.x.round() as i64, drag.y.round() as i64);
    }
    Ok(view)
}

pub fn run(args: &SliceArgs, config: &ViewerConfig) -> Result<()> {
    let mut view = build_view(&args.slice, &args.display, config)?;

    if args.raw {
        let slice = view.volume().slice(view.axis(), args.slice.index)?;
        save_raw_u16(&slice.to_owned(), &args.output)?;
    } else {
        let image = view.render(args.slice.index)?;
        let (rows, cols) = image.dim();
        println!("Rendered {cols}x{rows} slice {} along {}", args.slice.index, view.axis());
        save_gray(&image, &args.output)?;
    }

    println!("Saved to {}", args.output.display());
    Ok(())
}
