pub mod key;
pub mod merge;
pub mod runner;
pub mod window;

pub use key::{GroupBy, GroupKey};
pub use merge::{merge, AggregateResult};
pub use runner::{run_query, RunError, RunStats};
pub use window::window_start;

use crate::query::Query;
use crate::source::record::{LogRecord, METRIC_COUNT};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// A record's timestamp floored to the query granularity.
pub type WindowKey = NaiveDateTime;

/// Identifies one output row: window start plus grouped dimension values.
pub type AggregateKey = (WindowKey, GroupKey);

/// Running sums for one aggregate key. Created on the first record seen for
/// the key, updated in place thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    pub sums: [f64; METRIC_COUNT],
    pub rows: u64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sums: [0.0; METRIC_COUNT],
            rows: 0,
        }
    }

    fn observe(&mut self, metrics: &[f64; METRIC_COUNT]) {
        for (sum, value) in self.sums.iter_mut().zip(metrics) {
            *sum += value;
        }
        self.rows += 1;
    }

    fn absorb(&mut self, other: &Accumulator) {
        for (sum, value) in self.sums.iter_mut().zip(&other.sums) {
            *sum += value;
        }
        self.rows += other.rows;
    }
}

/// One worker's aggregate map, owned exclusively until the merge.
#[derive(Debug, Default)]
pub struct Partial {
    pub entries: HashMap<AggregateKey, Accumulator>,
}

/// Streaming reduction over a filtered record stream. Memory is bounded by
/// the number of distinct aggregate keys, not the number of records.
pub struct Aggregator {
    granularity: crate::query::Granularity,
    group_by: GroupBy,
    entries: HashMap<AggregateKey, Accumulator>,
}

impl Aggregator {
    pub fn new(query: &Query) -> Self {
        Self {
            granularity: query.granularity,
            group_by: GroupBy::from_dimensions(&query.dimensions),
            entries: HashMap::new(),
        }
    }

    pub fn observe(&mut self, record: &LogRecord) {
        let window = window_start(record.timestamp, self.granularity);
        let group = self.group_by.project(record);
        self.entries
            .entry((window, group))
            .or_insert_with(Accumulator::new)
            .observe(&record.metrics);
    }

    pub fn into_partial(self) -> Partial {
        Partial {
            entries: self.entries,
        }
    }
}
