use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::RowId;
use crate::dirty::{active_journal_tags, journal_notes_digest, sorted_tags};

/// Identifier of a reporting period (term, semester, ...).
pub type PeriodId = u32;

/// One journal entry attached to a record.
///
/// Entries carry free-form tags; a tag only becomes "active" for the
/// dirty-state evaluation once enough entries carry it (see
/// [`crate::active_journal_tags`]).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JournalEntry {
    pub tags: Vec<String>,
    pub note: String,
}

/// The journal-derived portion of a [`Snapshot`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SnapshotJournal {
    /// Legacy snapshots predate per-entry tracking and only recorded how many
    /// journal entries existed at generation time.
    EntryCount(usize),
    /// Modern snapshots track the active tag set and the derived notes digest,
    /// together with the threshold value they were computed with (the
    /// threshold setting may change after the snapshot is taken).
    Tracked {
        threshold: usize,
        active_tags: Vec<String>,
        notes_digest: String,
    },
}

/// A frozen copy of the fields relevant to staleness, taken when a record's
/// derived text was generated.
///
/// Immutable once written; replaced only by a fresh successful generation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// The period the text was generated for. A snapshot is only comparable
    /// against the same period.
    pub period: PeriodId,
    /// Sorted active tag set at generation time.
    pub tags: Vec<String>,
    /// Normalized grade for `period` at generation time.
    pub grade: Option<f32>,
    /// Trimmed context text for `period` at generation time.
    pub context: String,
    pub journal: SnapshotJournal,
}

impl Snapshot {
    /// Captures a snapshot of `record` as of a successful generation for
    /// `period`, with the journal threshold currently in effect.
    pub fn capture<K>(record: &Record<K>, period: PeriodId, threshold: usize) -> Self {
        let active = active_journal_tags(&record.journal, threshold);
        let notes_digest = journal_notes_digest(&record.journal, &active);
        Self {
            period,
            tags: sorted_tags(&record.tags),
            grade: normalize_grade(record.grades.get(&period).copied()),
            context: String::from(
                record
                    .context
                    .get(&period)
                    .map(|s| s.trim())
                    .unwrap_or(""),
            ),
            journal: SnapshotJournal::Tracked {
                threshold,
                active_tags: active,
                notes_digest,
            },
        }
    }
}

/// One displayed data item (e.g. a student), rendered as a row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record<K = RowId> {
    /// Stable unique id correlating the record across reconcile cycles.
    pub key: K,
    pub given_name: String,
    pub family_name: String,
    /// Current status tags, unordered.
    pub tags: Vec<String>,
    /// Numeric grade per period.
    pub grades: BTreeMap<PeriodId, f32>,
    /// Free-text context per period.
    pub context: BTreeMap<PeriodId, String>,
    /// Generated text per period.
    pub generated: BTreeMap<PeriodId, String>,
    /// Set when the last generation attempt for this record failed.
    pub generation_failed: bool,
    pub journal: Vec<JournalEntry>,
    /// Frozen comparison base for the dirty-state evaluation.
    pub snapshot: Option<Snapshot>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl<K> Record<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            given_name: String::new(),
            family_name: String::new(),
            tags: Vec::new(),
            grades: BTreeMap::new(),
            context: BTreeMap::new(),
            generated: BTreeMap::new(),
            generation_failed: false,
            journal: Vec::new(),
            snapshot: None,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    /// The display name used for the identity block.
    pub fn display_name(&self) -> (&str, &str) {
        (self.given_name.trim(), self.family_name.trim())
    }
}

/// Normalizes a grade value: absent and NaN both map to the same "empty"
/// sentinel so the dirty-state comparison stays total over partial data.
pub fn normalize_grade(grade: Option<f32>) -> Option<f32> {
    match grade {
        Some(g) if g.is_nan() => None,
        other => other,
    }
}
