//! CSV export of the merged asset table.
//!
//! Layout: header `Date,<display name>...`, one row per merged timestamp,
//! values with two decimals and an empty cell where an agent has no value.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::domain::Timestamp;
use crate::merge::MergedSeries;

/// File name used for every export.
pub const EXPORT_FILENAME: &str = "aitrader_asset_evolution.csv";

/// Render the merged table as CSV.
pub fn export_merged_csv(merged: &MergedSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(merged.agent_count() + 1);
    header.push("Date");
    header.extend(merged.display_names.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (i, ts) in merged.axis.iter().enumerate() {
        let mut row = Vec::with_capacity(merged.agent_count() + 1);
        row.push(ts.to_string());
        for agent in 0..merged.agent_count() {
            row.push(
                merged
                    .value(agent, i)
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse an exported table back. Agent ids are the header display names.
pub fn import_merged_csv(csv_text: &str) -> Result<MergedSeries> {
    let mut rdr = csv::Reader::from_reader(csv_text.as_bytes());

    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    match headers.get(0) {
        Some("Date") => {}
        other => bail!("expected first column 'Date', found {other:?}"),
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut axis = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];
    for (row_no, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV row {}", row_no + 1))?;
        let date = record.get(0).unwrap_or_default();
        axis.push(Timestamp::from(date));
        for (col, column) in values.iter_mut().enumerate() {
            let cell = record.get(col + 1).unwrap_or_default().trim();
            let value = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().with_context(|| {
                    format!("row {} column {}: '{cell}' is not a number", row_no + 1, col + 2)
                })?)
            };
            column.push(value);
        }
    }

    Ok(MergedSeries {
        axis,
        agents: names.clone(),
        display_names: names,
        values,
    })
}

/// Write the export into `dir`, returning the file path.
pub fn write_export(merged: &MergedSeries, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(EXPORT_FILENAME);
    let csv = export_merged_csv(merged)?;
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
