//! Merge Engine

use rustc_hash::FxHashMap;

use crate::records::{Record, RecordId};

/// Union two collections keyed by id, with `incoming` winning collisions.
///
/// A replaced record keeps the position its id first appeared at, new ids are
/// appended, and the result is then stably sorted newest first.
pub fn merge(existing: Vec<Record>, incoming: Vec<Record>) -> Vec<Record> {
    let mut positions: FxHashMap<RecordId, usize> = FxHashMap::default();
    let mut merged: Vec<Record> = Vec::with_capacity(existing.len() + incoming.len());

    for record in existing.into_iter().chain(incoming) {
        match positions.get(&record.id) {
            Some(&position) => {
                if let Some(slot) = merged.get_mut(position) {
                    *slot = record;
                }
            }
            None => {
                positions.insert(record.id.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    sort_newest_first(&mut merged);

    merged
}

/// Stable sort by descending creation time.
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
