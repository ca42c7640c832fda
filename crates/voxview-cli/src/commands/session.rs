use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::warn;
use voxview_core::config::ViewerConfig;
use voxview_core::image_io::{save_gray, save_raw_u16, save_rgb};
use voxview_core::session::{ViewerEvent, ViewerOutcome, ViewerSession};
use voxview_core::volume::HeaderDictionary;

use crate::summary::print_regions;

#[derive(Args)]
pub struct SessionArgs {
    /// Event script (TOML with an `[[events]]` array)
    pub script: PathBuf,

    /// Save rendered frames and results into this directory
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Report failed events and carry on instead of stopping
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Deserialize)]
struct Script {
    #[serde(default)]
    events: Vec<ViewerEvent>,
}

pub fn run(args: &SessionArgs, config: ViewerConfig, dictionary: HeaderDictionary) -> Result<()> {
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let script: Script = toml::from_str(&text).context("Invalid session script")?;
    let base = args.script.parent().unwrap_or(Path::new("."));

    if let Some(ref dir) = args.save_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let error_style = Style::new().red().bold();
    let mut session = ViewerSession::new(config, dictionary);

    for (step, event) in script.events.into_iter().enumerate() {
        let event = resolve_paths(event, base);
        let label = format!("{:>3}", step + 1);

        let outcome = match event {
            ViewerEvent::Register => run_registration(&mut session),
            other => session.dispatch(other),
        };

        match outcome {
            Ok(outcome) => report(&label, &outcome, args.save_dir.as_deref(), step)?,
            Err(e) if args.keep_going => {
                warn!(step = step + 1, error = %e, "Event failed");
                println!("{label}  {}", error_style.apply_to(&e));
            }
            Err(e) => return Err(e).with_context(|| format!("Event {} failed", step + 1)),
        }
    }
    Ok(())
}

/// Open paths in a script are relative to the script file.
fn resolve_paths(event: ViewerEvent, base: &Path) -> ViewerEvent {
    match event {
        ViewerEvent::Open { path, target } if path.is_relative() => ViewerEvent::Open {
            path: base.join(path),
            target,
        },
        other => other,
    }
}

fn run_registration(session: &mut ViewerSession) -> voxview_core::error::Result<ViewerOutcome> {
    let iterations = session.config().registration.iterations;
    let pb = ProgressBar::new(iterations as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("Registering [{bar:40}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }

    let outcome = session.guarded(|s| {
        s.logged("register", String::new(), |s| {
            s.register_with(|report| {
                pb.set_position(report.iteration as u64);
                pb.set_message(format!("metric {:.4}", report.metric));
            })
        })
    });
    pb.finish_and_clear();
    outcome
}

fn report(label: &str, outcome: &ViewerOutcome, save_dir: Option<&Path>, step: usize) -> Result<()> {
    let save_path = |name: &str| save_dir.map(|dir| dir.join(format!("{:03}_{name}.png", step + 1)));

    match outcome {
        ViewerOutcome::Unchanged => println!("{label}  ok"),
        ViewerOutcome::Frame {
            target,
            depth,
            image,
        } => {
            let (rows, cols) = image.dim();
            println!("{label}  {target:?} frame {depth} ({cols}x{rows})");
            if let Some(path) = save_path("frame") {
                save_gray(image, &path)?;
            }
        }
        ViewerOutcome::Probe(Some(value)) => println!("{label}  value {value}"),
        ViewerOutcome::Probe(None) => println!("{label}  outside the image"),
        ViewerOutcome::MarkerAdded { label: id, row, col } => {
            println!("{label}  marker {id} at ({row}, {col})")
        }
        ViewerOutcome::SegmentationArmed => println!("{label}  collecting markers"),
        ViewerOutcome::Segmentation {
            display, regions, ..
        } => {
            println!("{label}  segmentation");
            print_regions(regions);
            if let Some(path) = save_path("labels") {
                save_gray(display, &path)?;
            }
        }
        ViewerOutcome::DistancePending => println!("{label}  first point set"),
        ViewerOutcome::Distance(m) => match m.physical {
            Some(mm) => println!("{label}  distance {:.2} px ({mm:.2} mm)", m.pixels),
            None => println!("{label}  distance {:.2} px", m.pixels),
        },
        ViewerOutcome::HistogramHandles { positions } => {
            println!("{label}  handles at {} / {}", positions[0], positions[1])
        }
        ViewerOutcome::Headers(rows) => {
            println!("{label}  {} header elements", rows.len());
            for row in rows {
                println!("       {}: {}", row.name, row.value);
            }
        }
        ViewerOutcome::History(records) => {
            println!("{label}  history");
            for record in records {
                println!("       {}  {:<10} {}", record.time, record.action, record.arguments);
            }
        }
        ViewerOutcome::Fusion(rgb) => {
            println!("{label}  fusion");
            if let Some(path) = save_path("fused") {
                save_rgb(rgb, &path)?;
            }
        }
        ViewerOutcome::Registration { result, registered } => {
            println!(
                "{label}  translation dy={:.3} dx={:.3} ({} iterations)",
                result.transform.dy, result.transform.dx, result.iterations
            );
            if let Some(path) = save_path("registered") {
                save_raw_u16(registered, &path)?;
            }
        }
    }
    Ok(())
}
