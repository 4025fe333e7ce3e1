use chrono::NaiveDateTime;
use std::collections::HashSet;
use thiserror::Error;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid granularity '{0}' (expected '30m' or '1day')")]
    UnknownGranularity(String),

    #[error("invalid dimension '{0}' (expected 'user' or 'app')")]
    UnknownDimension(String),

    #[error("at least one dimension is required")]
    EmptyDimensions,

    #[error("dimension '{0}' listed more than once")]
    DuplicateDimension(&'static str),

    #[error("from_time {from} is after to_time {to}")]
    InvertedRange {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },

    #[error("invalid datetime '{0}' (expected YYYY-MM-DD HH:MM:SS)")]
    BadDateTime(String),
}

/// Window size used to bucket records by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    ThirtyMinutes,
    OneDay,
}

impl Granularity {
    /// Parse a CLI granularity token.
    pub fn parse(token: &str) -> Result<Self, QueryError> {
        match token {
            "30m" => Ok(Granularity::ThirtyMinutes),
            "1day" => Ok(Granularity::OneDay),
            other => Err(QueryError::UnknownGranularity(other.to_string())),
        }
    }
}

/// Categorical attribute used to subdivide aggregation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    User,
    App,
}

impl Dimension {
    pub fn parse(token: &str) -> Result<Self, QueryError> {
        match token {
            "user" => Ok(Dimension::User),
            "app" => Ok(Dimension::App),
            other => Err(QueryError::UnknownDimension(other.to_string())),
        }
    }

    /// Column name used in output headers.
    pub fn column_name(&self) -> &'static str {
        match self {
            Dimension::User => "user",
            Dimension::App => "app",
        }
    }
}

/// One validated aggregation request.
///
/// The time range is inclusive on both ends: a record timestamped exactly at
/// `to_time` is part of the result. Dimension order is preserved and decides
/// the output column order.
#[derive(Debug, Clone)]
pub struct Query {
    pub from_time: NaiveDateTime,
    pub to_time: NaiveDateTime,
    pub granularity: Granularity,
    pub dimensions: Vec<Dimension>,
    pub user_filter: Option<HashSet<String>>,
    pub app_filter: Option<HashSet<String>>,
}

impl Query {
    pub fn new(
        from_time: NaiveDateTime,
        to_time: NaiveDateTime,
        granularity: Granularity,
        dimensions: Vec<Dimension>,
        user_filter: Option<HashSet<String>>,
        app_filter: Option<HashSet<String>>,
    ) -> Result<Self, QueryError> {
        if from_time > to_time {
            return Err(QueryError::InvertedRange {
                from: from_time,
                to: to_time,
            });
        }
        if dimensions.is_empty() {
            return Err(QueryError::EmptyDimensions);
        }
        let mut seen = Vec::new();
        for dim in &dimensions {
            if seen.contains(dim) {
                return Err(QueryError::DuplicateDimension(dim.column_name()));
            }
            seen.push(*dim);
        }

        Ok(Self {
            from_time,
            to_time,
            granularity,
            dimensions,
            user_filter,
            app_filter,
        })
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` datetime string.
    pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, QueryError> {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
            .map_err(|_| QueryError::BadDateTime(s.to_string()))
    }

    /// Parse a comma-separated dimension list, e.g. `user,app`.
    pub fn parse_dimensions(s: &str) -> Result<Vec<Dimension>, QueryError> {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Dimension::parse)
            .collect()
    }

    /// Parse an optional comma-separated allow-list, e.g. `user1,user7`.
    pub fn parse_filter(s: Option<&str>) -> Option<HashSet<String>> {
        s.map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        })
    }

    /// Whether a row with these attributes survives the query's filters.
    pub fn matches(&self, timestamp: NaiveDateTime, user: &str, app: &str) -> bool {
        if timestamp < self.from_time || timestamp > self.to_time {
            return false;
        }
        if let Some(users) = &self.user_filter {
            if !users.contains(user) {
                return false;
            }
        }
        if let Some(apps) = &self.app_filter {
            if !apps.contains(app) {
                return false;
            }
        }
        true
    }
}
