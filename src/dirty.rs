//! The dirty-state evaluator.
//!
//! A record is "dirty" when its current fields no longer match the snapshot
//! taken when its generated text was produced, implying that text may be
//! stale. Everything here is a pure, synchronous, side-effect-free read:
//! absent/NaN fields normalize to an "empty" value rather than failing, so
//! the comparison is total over partial data.

use alloc::string::String;
use alloc::vec::Vec;

use crate::key::RowSet;
use crate::record::{JournalEntry, PeriodId, Record, SnapshotJournal, normalize_grade};

/// Trimmed, deduplicated, sorted copy of a tag list, for set-equality checks.
pub(crate) fn sorted_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .map(|t| String::from(t.trim()))
        .filter(|t| !t.is_empty())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Computes the active tag set of a journal: a tag is active once at least
/// `threshold` entries carry it (an entry contributes at most once per tag).
///
/// Returns a sorted, deduplicated list.
pub fn active_journal_tags(entries: &[JournalEntry], threshold: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in entries {
        for tag in sorted_tags(&entry.tags) {
            match counts.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag, 1)),
            }
        }
    }
    let mut active: Vec<String> = counts
        .into_iter()
        .filter(|&(_, n)| n >= threshold)
        .map(|(t, _)| t)
        .collect();
    active.sort_unstable();
    active
}

/// Derives the journal notes digest: the sorted, trimmed, non-empty notes of
/// entries whose tags intersect `active`, concatenated with `\n`.
pub fn journal_notes_digest(entries: &[JournalEntry], active: &[String]) -> String {
    let active_set: RowSet<&str> = active.iter().map(String::as_str).collect();
    let mut notes: Vec<&str> = entries
        .iter()
        .filter(|e| e.tags.iter().any(|t| active_set.contains(t.trim())))
        .map(|e| e.note.trim())
        .filter(|n| !n.is_empty())
        .collect();
    notes.sort_unstable();
    notes.join("\n")
}

/// Whether `record`'s generated text is stale relative to its snapshot.
///
/// Returns `false` immediately when there is no snapshot, or the snapshot was
/// generated for a different period than the one being viewed (a cross-period
/// comparison is meaningless). Otherwise runs an ordered, short-circuiting
/// comparison: tags, grade, context text, then journal-derived state. The
/// first mismatch wins.
pub fn is_dirty<K>(record: &Record<K>, active_period: PeriodId, journal_threshold: usize) -> bool {
    let Some(snapshot) = &record.snapshot else {
        return false;
    };
    if snapshot.period != active_period {
        return false;
    }

    if sorted_tags(&record.tags) != snapshot.tags {
        return true;
    }

    let grade = normalize_grade(record.grades.get(&active_period).copied());
    if grade != snapshot.grade {
        return true;
    }

    let context = record
        .context
        .get(&active_period)
        .map(|s| s.trim())
        .unwrap_or("");
    if context != snapshot.context {
        return true;
    }

    match &snapshot.journal {
        // Legacy snapshots only tracked how many entries existed.
        SnapshotJournal::EntryCount(n) => record.journal.len() != *n,
        SnapshotJournal::Tracked {
            active_tags,
            notes_digest,
            ..
        } => {
            // The snapshot's active set was computed with the threshold in
            // effect at generation time; the current one uses the current
            // threshold, which may have changed since.
            let current_active = active_journal_tags(&record.journal, journal_threshold);
            if current_active != *active_tags {
                return true;
            }
            journal_notes_digest(&record.journal, &current_active) != *notes_digest
        }
    }
}
