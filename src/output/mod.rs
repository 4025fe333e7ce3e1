use crate::agg::{AggregateResult, GroupBy};
use crate::query::DATETIME_FORMAT;
use crate::source::record::METRIC_COUNT;
use regex::Regex;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Serialize the merged result to `path`.
///
/// Rows are already ordered by the result map (window start, then group
/// key). The file is written to a temporary sibling and renamed into place,
/// so a failed write never replaces or truncates an existing result.
pub fn write_results(
    result: &AggregateResult,
    group_by: GroupBy,
    path: &Path,
) -> Result<(), WriteError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let tmp = tempfile::Builder::new()
        .prefix(".result-")
        .suffix(".csv.tmp")
        .tempfile_in(dir)?;

    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());

        let mut header: Vec<String> = vec!["window_start".to_string()];
        header.extend(group_by.column_names().iter().map(|c| c.to_string()));
        for i in 1..=METRIC_COUNT {
            header.push(format!("metric_{}", i));
        }
        header.push("row_count".to_string());
        writer.write_record(&header)?;

        for ((window, group), acc) in &result.entries {
            let mut row: Vec<String> = vec![window.format(DATETIME_FORMAT).to_string()];
            row.extend(group.components().iter().map(|c| c.to_string()));
            row.extend(acc.sums.iter().map(|&v| format_metric(v)));
            row.push(acc.rows.to_string());
            writer.write_record(&row)?;
        }

        writer.flush()?;
    }

    tmp.persist(path)?;
    debug!(path = %path.display(), rows = result.len(), "result file written");
    Ok(())
}

/// Integral sums print without a trailing `.0` so integer-metric inputs
/// produce integer-looking outputs.
fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Pick a non-clobbering output filename in `dir`: the requested name if it
/// is free, else `name_1.csv`, `name_2.csv`, ... one past the highest
/// existing suffix.
pub fn next_output_name(dir: &Path, requested: &str) -> String {
    let (stem, ext) = match requested.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
        _ => (requested.to_string(), ".csv".to_string()),
    };

    if !dir.join(requested).exists() {
        return requested.to_string();
    }

    let pattern = format!(
        "^{}_(\\d+){}$",
        regex::escape(&stem),
        regex::escape(&ext)
    );
    let re = Regex::new(&pattern).unwrap();

    let mut max_suffix = 0u64;
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(caps) = re.captures(name) {
                    if let Ok(n) = caps[1].parse::<u64>() {
                        max_suffix = max_suffix.max(n);
                    }
                }
            }
        }
    }

    format!("{}_{}{}", stem, max_suffix + 1, ext)
}
