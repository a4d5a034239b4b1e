use std::collections::HashSet;

use crate::record::UnitRecord;

/// Names this short are decorative lines that slipped past the boundary check.
pub const MIN_NAME_CHARS: usize = 4;

/// Drops too-short names, optionally exact duplicates (first occurrence
/// kept), then sorts by name. Running it twice changes nothing.
pub fn finalize_records(records: Vec<UnitRecord>, dedupe: bool) -> Vec<UnitRecord> {
    let mut seen = HashSet::new();
    let mut output = records
        .into_iter()
        .filter(|record| record.name.trim().chars().count() >= MIN_NAME_CHARS)
        .filter(|record| !dedupe || seen.insert(record.clone()))
        .collect::<Vec<_>>();
    output.sort_by(|left, right| left.name.cmp(&right.name));
    output
}
