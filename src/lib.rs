//! A headless keyed-list reconciliation and FLIP transition engine.
//!
//! Given the previous and next display order of keyed records, this crate
//! decides whether an update is a no-op, a pure reorder, or an add/remove set
//! change, performs the minimal set of view-tree mutations, and produces
//! jank-free motion using the FIRST-LAST-INVERT-PLAY technique. A pure
//! dirty-state evaluator feeds the per-row staleness indicators.
//!
//! It is UI-agnostic. A host view layer is expected to provide:
//! - a [`ViewTree`] implementation (mount/patch/move/remove, position
//!   measurement, layout flushes, transform-style offsets)
//! - timer callbacks (`tick`) and display-refresh callbacks (`on_frame`),
//!   driven by `now_ms` timestamps the way an adapter drives a frame loop
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod classify;
mod dirty;
mod key;
mod options;
mod record;
mod reconciler;
mod render;
mod select;
mod types;
mod view;


pub use classify::classify;
pub use dirty::{active_journal_tags, is_dirty, journal_notes_digest};
pub use options::ReconcilerOptions;
pub use record::{JournalEntry, PeriodId, Record, Snapshot, SnapshotJournal, normalize_grade};
pub use reconciler::{Reconciler, Subscription};
pub use render::{RowContent, RowPatch, StatusBlock};
pub use select::{SelectionManager, SelectionState};
pub use types::{
    Rect, ReconcileOutcome, RowBadge, RowId, TransitionEvent, TransitionKind, TransitionPlan,
};
pub use view::{RenderError, ViewTree};

#[doc(hidden)]
pub use key::ReconcilerKey;
