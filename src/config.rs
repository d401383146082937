//! Pipeline configuration shared by every stage.
//!
//! The defaults reproduce the fixed layout the stages have always used:
//! years 2005 through 2019, raw files under `accidents/`, and the filtered
//! result in `output.json`.

use anyhow::{Result, bail};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_START_YEAR: i32 = 2005;
pub const DEFAULT_END_YEAR: i32 = 2019;
pub const DEFAULT_ACCIDENTS_DIR: &str = "accidents";
pub const DEFAULT_OUTPUT_FILE: &str = "output.json";
pub const DEFAULT_MARKER_SIZE: f64 = 0.05;

/// Locations and ranges the fetch, filter and display stages agree on.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub accidents_dir: PathBuf,
    pub output_file: PathBuf,
    pub marker_size: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            accidents_dir: PathBuf::from(DEFAULT_ACCIDENTS_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Points every stage at `root` instead of the working directory.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            accidents_dir: root.join(DEFAULT_ACCIDENTS_DIR),
            output_file: root.join(DEFAULT_OUTPUT_FILE),
            ..Self::default()
        }
    }

    pub fn with_years(mut self, start_year: i32, end_year: i32) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    /// Inclusive range of years to fetch or filter.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// Path of the raw API response for `year`.
    pub fn year_file(&self, year: i32) -> PathBuf {
        self.accidents_dir.join(format!("{year}.json"))
    }

    /// # Errors
    ///
    /// Fails when the year range is reversed or the marker size is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            bail!(
                "start year {} is after end year {}",
                self.start_year,
                self.end_year
            );
        }
        if !self.marker_size.is_finite() || self.marker_size <= 0.0 {
            bail!("marker size must be positive, got {}", self.marker_size);
        }
        Ok(())
    }
}
