//! Cyclist filter: scans each year's raw accidents and keeps the location
//! and severity of every accident with a pedal-cycle casualty.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

use crate::accidents::{AccidentRecord, FilteredAccident};
use crate::config::PipelineConfig;
use crate::output::{read_json, write_accidents};

/// Totals for one filter run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub scanned: usize,
    pub kept: usize,
    pub malformed: usize,
    pub kept_per_year: BTreeMap<i32, usize>,
}

impl FilterReport {
    pub fn pct_kept(&self) -> f64 {
        if self.scanned == 0 {
            0.0
        } else {
            (self.kept as f64 / self.scanned as f64) * 100.0
        }
    }
}

/// Appends the cyclist accidents among `records` to `accidents`, in order.
///
/// Records that cannot be read are skipped and counted as malformed.
pub fn collect_cyclist_accidents(
    year: i32,
    records: &[Value],
    accidents: &mut Vec<FilteredAccident>,
    report: &mut FilterReport,
) {
    let before = accidents.len();

    for (index, value) in records.iter().enumerate() {
        report.scanned += 1;

        let reduced = AccidentRecord::from_value(value).and_then(|r| r.to_cyclist_accident());
        match reduced {
            Ok(Some(accident)) => accidents.push(accident),
            Ok(None) => {}
            Err(e) => {
                report.malformed += 1;
                debug!(year, index, error = %e, "Skipping malformed record");
            }
        }
    }

    let kept = accidents.len() - before;
    report.kept += kept;
    report.kept_per_year.insert(year, kept);
}

/// Filters every configured year and writes the combined result.
///
/// Before each year a `"{count} {year}"` line goes to `out`, where `count`
/// is the number of accidents kept from earlier years.
///
/// # Errors
///
/// Fails when a year file is missing, is not valid JSON, is not a JSON
/// array, or when the output cannot be written.
#[tracing::instrument(skip_all, fields(output = %config.output_file.display()))]
pub fn run_filter<W: Write>(config: &PipelineConfig, out: &mut W) -> Result<FilterReport> {
    config.validate()?;

    let mut accidents = Vec::new();
    let mut report = FilterReport::default();

    for year in config.years() {
        writeln!(out, "{} {}", accidents.len(), year)?;
        out.flush()?;

        let path = config.year_file(year);
        let data: Value = read_json(&path)?;
        let Value::Array(records) = data else {
            bail!("{} does not hold a JSON array", path.display());
        };

        collect_cyclist_accidents(year, &records, &mut accidents, &mut report);
        debug!(year, records = records.len(), total = accidents.len(), "Year filtered");
    }

    write_accidents(&config.output_file, &accidents)
        .context("saving filtered cyclist accidents")?;

    debug!(
        scanned = report.scanned,
        kept = report.kept,
        malformed = report.malformed,
        "Filter complete"
    );

    Ok(report)
}
