use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extract the encoded date from a log filename of the form
/// `YYYY-MM-DD.log.csv`. Anything else is not a log file.
pub fn file_date(file_name: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^(\d{4}-\d{2}-\d{2})\.log\.csv$").unwrap();
    let caps = re.captures(file_name)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

/// List log files under `logs_dir` whose encoded date falls inside
/// `[from, to]` (inclusive), sorted by date.
///
/// Selection is by filename date only: a file dated on a boundary day is
/// always included, even if most of its rows fall outside the requested
/// time of day. Rows are filtered individually downstream.
pub fn discover_files(
    logs_dir: &Path,
    from: NaiveDate,
    to: NaiveDate,
) -> std::io::Result<Vec<PathBuf>> {
    let mut selected: Vec<(NaiveDate, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(logs_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        match file_date(name) {
            Some(date) if date >= from && date <= to => {
                selected.push((date, entry.path()));
            }
            Some(_) => {}
            None => {
                debug!(file = name, "ignoring non-log file in logs directory");
            }
        }
    }

    selected.sort();
    Ok(selected.into_iter().map(|(_, path)| path).collect())
}
