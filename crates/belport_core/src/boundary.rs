use crate::labels::PageLabels;
use crate::normalize::is_decorative;

/// Decorative lines tolerated between a unit's display name and its phone row.
pub const LOOKAHEAD: usize = 3;

/// Whether `lines[pos]` is the display name of a new unit: the next
/// substantive line, after skipping at most `LOOKAHEAD` decorative ones,
/// starts with a phone marker.
pub fn starts_unit(lines: &[String], pos: usize, labels: &PageLabels) -> bool {
    let Some(line) = lines.get(pos) else {
        return false;
    };
    if line.is_empty() || is_decorative(line) || labels.is_phone_line(line) {
        return false;
    }

    let mut skipped = 0usize;
    for next in lines.iter().skip(pos + 1) {
        if next.is_empty() || is_decorative(next) {
            skipped += 1;
            if skipped > LOOKAHEAD {
                return false;
            }
            continue;
        }
        return labels.is_phone_line(next);
    }
    false
}
