pub mod config;
pub mod fuse;
pub mod headers;
pub mod histogram;
pub mod info;
pub mod measure;
pub mod probe;
pub mod register;
pub mod segment;
pub mod session;
pub mod slice;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use voxview_core::types::{Point, SliceAxis};
use voxview_core::volume::{Volume, VolumeLoader};

#[derive(Clone, Copy, ValueEnum)]
pub enum AxisArg {
    First,
    Second,
    Third,
}

impl From<AxisArg> for SliceAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::First => SliceAxis::First,
            AxisArg::Second => SliceAxis::Second,
            AxisArg::Third => SliceAxis::Third,
        }
    }
}

/// Volume source and the slice to work on.
#[derive(Args)]
pub struct SliceSelect {
    /// Volume file or directory of slice files
    pub input: PathBuf,

    /// Axis used as depth
    #[arg(long, value_enum, default_value = "first")]
    pub axis: AxisArg,

    /// Slice index along the depth axis
    #[arg(long, default_value = "0")]
    pub index: usize,
}

pub fn load_volume(path: &Path) -> Result<Volume> {
    VolumeLoader::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Parse `"a,b"` into a pair of numbers.
fn parse_pair<T: std::str::FromStr>(s: &str) -> std::result::Result<(T, T), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated values, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<T>()
            .map_err(|_| format!("invalid number '{}'", v.trim()))
    };
    Ok((parse(a)?, parse(b)?))
}

/// `x,y` display point.
pub fn parse_point(s: &str) -> std::result::Result<Point, String> {
    parse_pair::<f64>(s).map(|(x, y)| Point::new(x, y))
}

/// `row,col` pixel.
pub fn parse_pixel(s: &str) -> std::result::Result<[usize; 2], String> {
    parse_pair::<usize>(s).map(|(row, col)| [row, col])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points_and_pixels() {
        assert_eq!(parse_point("1.5, 2").unwrap(), Point::new(1.5, 2.0));
        assert_eq!(parse_pixel("3,4").unwrap(), [3, 4]);
        assert!(parse_pixel("3").is_err());
        assert!(parse_pixel("-1,4").is_err());
    }
}
