use alloc::vec::Vec;

/// The default row key type.
pub type RowId = u64;

/// A measured bounding box reported by the host view layer.
///
/// The engine only ever consumes relative `top` deltas between two
/// measurements of the same row; the other fields are carried for hosts that
/// want to reuse the type.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// The classification of one update cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionKind {
    /// Identical key sequences. Content may still be patched in place.
    NoChange,
    /// Same key set, different positions.
    ReorderOnly,
    /// Keys were added and/or removed.
    SetChange,
}

/// The ephemeral per-cycle plan: which keys stay, appear, and leave.
///
/// Recomputed on every reconcile and never persisted between calls.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPlan<K> {
    /// Keys present in both sequences, in `after` order.
    pub kept: Vec<K>,
    /// Keys present only in `after`, in `after` order.
    pub entering: Vec<K>,
    /// Keys present only in `before`, in `before` order.
    pub exiting: Vec<K>,
    /// Whether the kept keys changed relative positions.
    pub order_changed: bool,
    pub kind: TransitionKind,
}

/// The result of [`crate::Reconciler::reconcile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconcileOutcome {
    /// `true` when every row was (re)created this cycle.
    ///
    /// Hosts must re-bind interaction handlers if and only if this is set;
    /// incremental cycles keep existing view nodes alive.
    pub rebuilt: bool,
}

/// A transient per-row badge, independent of the reconciliation cycle.
///
/// Used for asynchronous work in flight (e.g. text generation running for a
/// row). Cleared by passing `None` to [`crate::Reconciler::set_row_status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowBadge {
    InProgress,
    Queued,
    Failed,
}

/// Fired to subscribers after each reconcile cycle is classified and applied
/// (or, for set changes, scheduled).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    pub rebuilt: bool,
    pub entered: usize,
    pub exited: usize,
}
