use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::summary::print_volume_summary;

#[derive(Args)]
pub struct InfoArgs {
    /// Volume file or directory of slice files
    pub input: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let volume = super::load_volume(&args.input)?;
    print_volume_summary(&volume.info());
    Ok(())
}
