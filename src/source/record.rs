use crate::query::DATETIME_FORMAT;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Number of metric columns in every log row.
pub const METRIC_COUNT: usize = 9;

/// Total comma-separated fields per row: timestamp, user, app, nine metrics.
pub const FIELD_COUNT: usize = 3 + METRIC_COUNT;

#[derive(Debug, Error)]
pub enum RowParseError {
    #[error("expected {FIELD_COUNT} fields, got {0}")]
    FieldCount(usize),

    #[error("unparseable timestamp '{0}'")]
    Timestamp(String),

    #[error("non-numeric metric '{0}'")]
    Metric(String),
}

/// One parsed input row. Parsed fresh per row, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub app: String,
    pub metrics: [f64; METRIC_COUNT],
}

impl LogRecord {
    /// Parse one CSV record. Malformed rows are reported, not fatal; the
    /// caller counts them and moves on.
    pub fn parse(fields: &csv::StringRecord) -> Result<Self, RowParseError> {
        if fields.len() < FIELD_COUNT {
            return Err(RowParseError::FieldCount(fields.len()));
        }

        let timestamp = NaiveDateTime::parse_from_str(&fields[0], DATETIME_FORMAT)
            .map_err(|_| RowParseError::Timestamp(fields[0].to_string()))?;

        let mut metrics = [0.0; METRIC_COUNT];
        for (i, slot) in metrics.iter_mut().enumerate() {
            let raw = &fields[3 + i];
            *slot = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| RowParseError::Metric(raw.to_string()))?;
        }

        Ok(Self {
            timestamp,
            user: fields[1].to_string(),
            app: fields[2].to_string(),
            metrics,
        })
    }
}
