use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use voxview_core::config::ViewerConfig;
use voxview_core::image_io::save_raw_u16;
use voxview_core::register::{register, resample, Metric, Optimizer};

use super::AxisArg;
use crate::summary::print_registration_summary;

#[derive(Clone, Copy, ValueEnum)]
pub enum OptimizerArg {
    GradientDescent,
    PhaseCorrelation,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    MeanSquares,
    Correlation,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Fixed volume
    pub fixed: PathBuf,

    /// Moving volume, resampled onto the fixed grid
    pub moving: PathBuf,

    /// Axis used as depth in both volumes
    #[arg(long, value_enum, default_value = "first")]
    pub axis: AxisArg,

    /// Slice index in the fixed volume
    #[arg(long, default_value = "0")]
    pub index: usize,

    /// Slice index in the moving volume (defaults to --index)
    #[arg(long)]
    pub moving_index: Option<usize>,

    /// Optimizer (defaults to the config value)
    #[arg(long, value_enum)]
    pub optimizer: Option<OptimizerArg>,

    /// Similarity metric (defaults to the config value)
    #[arg(long, value_enum)]
    pub metric: Option<MetricArg>,

    /// Maximum optimizer iterations
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Save the registered moving slice (16-bit) to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &RegisterArgs, config: &ViewerConfig) -> Result<()> {
    let mut reg_config = config.registration.clone();
    if let Some(optimizer) = args.optimizer {
        reg_config.optimizer = match optimizer {
            OptimizerArg::GradientDescent => Optimizer::RegularStepGradientDescent,
            OptimizerArg::PhaseCorrelation => Optimizer::PhaseCorrelation,
        };
    }
    if let Some(metric) = args.metric {
        reg_config.metric = match metric {
            MetricArg::MeanSquares => Metric::MeanSquares,
            MetricArg::Correlation => Metric::NormalizedCorrelation,
        };
    }
    if let Some(iterations) = args.iterations {
        reg_config.iterations = iterations;
    }
    print_registration_summary(&reg_config);

    let fixed_volume = super::load_volume(&args.fixed)?;
    let moving_volume = super::load_volume(&args.moving)?;
    let axis = args.axis.into();
    let fixed = fixed_volume.slice(axis, args.index)?;
    let moving = moving_volume.slice(axis, args.moving_index.unwrap_or(args.index))?;

    let pb = ProgressBar::new(reg_config.iterations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Registering [{bar:40}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let result = register(&moving, &fixed, &reg_config, |report| {
        pb.set_position(report.iteration as u64);
        pb.set_message(format!("metric {:.4}", report.metric));
    })?;
    pb.finish_and_clear();

    println!(
        "Translation: dy={:.3} dx={:.3} after {} iterations (metric {:.6})",
        result.transform.dy, result.transform.dx, result.iterations, result.final_metric
    );

    if let Some(ref path) = args.output {
        let registered = resample(&moving, result.transform, reg_config.interpolation, fixed.dim());
        save_raw_u16(&registered, path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
