use crate::agg::{Accumulator, AggregateKey, Partial};
use std::collections::BTreeMap;

/// The merged, ordered aggregate map for one run. Iteration order is window
/// start ascending, then group key lexicographic — the output row order.
#[derive(Debug, Default)]
pub struct AggregateResult {
    pub entries: BTreeMap<AggregateKey, Accumulator>,
}

impl AggregateResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge per-worker partial maps: key union, summing accumulators that share
/// a key. Associative and commutative, so the result is independent of the
/// worker count and of the order partials arrive.
pub fn merge(partials: Vec<Partial>) -> AggregateResult {
    let mut result = AggregateResult::default();

    for partial in partials {
        for (key, acc) in partial.entries {
            match result.entries.entry(key) {
                std::collections::btree_map::Entry::Vacant(slot) => {
                    slot.insert(acc);
                }
                std::collections::btree_map::Entry::Occupied(mut slot) => {
                    slot.get_mut().absorb(&acc);
                }
            }
        }
    }

    result
}
