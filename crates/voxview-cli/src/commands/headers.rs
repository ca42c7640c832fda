use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use voxview_core::config::ViewerConfig;
use voxview_core::volume::header::format_header_rows;
use voxview_core::volume::HeaderDictionary;

#[derive(Args)]
pub struct HeadersArgs {
    /// Volume file or directory of slice files
    pub input: PathBuf,

    /// Only show rows whose name contains this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,
}

pub fn run(args: &HeadersArgs, config: &ViewerConfig, dictionary: &HeaderDictionary) -> Result<()> {
    let volume = super::load_volume(&args.input)?;
    let rows = format_header_rows(volume.header_entries(), dictionary, &config.headers);
    let needle = args.filter.as_deref().map(str::to_lowercase);

    let shown: Vec<_> = rows
        .iter()
        .filter(|row| {
            needle
                .as_deref()
                .is_none_or(|n| row.name.to_lowercase().contains(n))
        })
        .collect();
    if shown.is_empty() {
        println!("No header elements");
        return Ok(());
    }

    let width = shown.iter().map(|row| row.name.len()).max().unwrap_or(0);
    for row in shown {
        println!("{:<width$}  {}", row.name, row.value);
    }
    Ok(())
}
