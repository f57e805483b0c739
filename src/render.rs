//! Row content derivation and region-granular patching.
//!
//! A row has three sub-regions: the identity block (display name), the status
//! block (tags, grade, dirty indicator), and the derived-text block. Content
//! is derived once per cycle and cached by the engine; patches carry only the
//! regions that actually changed, so the host never rebuilds a whole row for
//! an in-place update.

use alloc::string::String;
use alloc::vec::Vec;

use crate::dirty::{is_dirty, sorted_tags};
use crate::record::{PeriodId, Record, normalize_grade};
use crate::view::RenderError;

/// The status-block portion of a row.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusBlock {
    /// Sorted active tag list.
    pub tags: Vec<String>,
    /// Normalized grade for the active period.
    pub grade: Option<f32>,
}

/// Everything needed to render one row, derived from a record.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowContent {
    /// Identity block: "Family, Given".
    pub identity: String,
    pub status: StatusBlock,
    /// Derived-text block: the generated text for the active period.
    pub body: String,
    /// Staleness indicator state.
    pub dirty: bool,
    /// Whether the last generation attempt failed.
    pub generation_failed: bool,
}

impl RowContent {
    /// Derives row content from a record for the given period.
    ///
    /// Fails on malformed records (no usable display name); the caller is
    /// expected to mount an error placeholder in that case and carry on with
    /// the remaining rows.
    pub fn build<K>(
        record: &Record<K>,
        active_period: PeriodId,
        journal_threshold: usize,
    ) -> Result<Self, RenderError> {
        let (given, family) = record.display_name();
        if given.is_empty() && family.is_empty() {
            return Err(RenderError::BlankName);
        }
        let identity = match (family.is_empty(), given.is_empty()) {
            (false, false) => {
                let mut s = String::from(family);
                s.push_str(", ");
                s.push_str(given);
                s
            }
            (false, true) => String::from(family),
            (true, _) => String::from(given),
        };

        Ok(Self {
            identity,
            status: StatusBlock {
                tags: sorted_tags(&record.tags),
                grade: normalize_grade(record.grades.get(&active_period).copied()),
            },
            body: record
                .generated
                .get(&active_period)
                .cloned()
                .unwrap_or_default(),
            dirty: is_dirty(record, active_period, journal_threshold),
            generation_failed: record.generation_failed,
        })
    }
}

/// A region-granular patch between two derivations of the same row.
///
/// `None` fields mean "leave that region alone".
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowPatch {
    pub identity: Option<String>,
    pub status: Option<StatusBlock>,
    pub body: Option<String>,
    pub dirty: Option<bool>,
    pub generation_failed: Option<bool>,
}

impl RowPatch {
    /// Diffs two content derivations; `None` when nothing changed.
    pub fn diff(old: &RowContent, new: &RowContent) -> Option<Self> {
        let patch = Self {
            identity: (old.identity != new.identity).then(|| new.identity.clone()),
            status: (old.status != new.status).then(|| new.status.clone()),
            body: (old.body != new.body).then(|| new.body.clone()),
            dirty: (old.dirty != new.dirty).then_some(new.dirty),
            generation_failed: (old.generation_failed != new.generation_failed)
                .then_some(new.generation_failed),
        };
        if patch.is_empty() { None } else { Some(patch) }
    }

    pub fn is_empty(&self) -> bool {
        self.identity.is_none()
            && self.status.is_none()
            && self.body.is_none()
            && self.dirty.is_none()
            && self.generation_failed.is_none()
    }

    /// Whether this patch touches only the staleness indicator.
    pub fn is_indicator_only(&self) -> bool {
        self.dirty.is_some()
            && self.identity.is_none()
            && self.status.is_none()
            && self.body.is_none()
            && self.generation_failed.is_none()
    }
}
