use crate::render::{RowContent, RowPatch};
use crate::{Rect, RowBadge};

/// Why a row could not be rendered from its record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// Both name fields were blank; the identity block cannot be built.
    BlankName,
}

impl core::fmt::Display for RenderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BlankName => f.write_str("record has no display name"),
        }
    }
}

impl core::error::Error for RenderError {}

/// The view-tree capability supplied by the host UI layer.
///
/// The engine is headless: it decides *what* to mutate and in what order, and
/// the host realizes those mutations against its retained view tree (DOM,
/// scene graph, widget tree). One live node exists per key; nodes are created
/// by `mount` and destroyed by `remove`, never reused across keys.
///
/// Contract:
/// - `mount(key, content, before)` creates the node and inserts it before
///   `before` (append when `None`).
/// - `move_before` relocates an existing node; the engine only calls it when
///   the node is not already immediately before the target.
/// - `measure` returns the node's current bounding box, `None` when the node
///   is gone (the engine then skips that row's motion).
/// - `flush_layout` must synchronously flush any batched writes so the next
///   `measure` observes post-mutation geometry. This ordering is the single
///   correctness-critical invariant of the FLIP sequence.
/// - `set_offset` applies an instantaneous transform-style vertical offset
///   (no transition); `play` clears the offset while a transition of the
///   given duration is enabled; `clear_motion` strips both overrides.
/// - Every cleanup call (`clear_*`, `remove`) must tolerate targets that no
///   longer exist and never raise.
pub trait ViewTree<K> {
    fn mount(&mut self, key: &K, content: &RowContent, before: Option<&K>);

    /// Mounts an inline error placeholder occupying the row's space.
    fn mount_placeholder(&mut self, key: &K, message: &str, before: Option<&K>);

    fn move_before(&mut self, key: &K, before: Option<&K>);

    fn remove(&mut self, key: &K);

    /// Patches only the sub-regions named by `patch`.
    fn apply(&mut self, key: &K, patch: &RowPatch);

    fn set_exiting(&mut self, key: &K);
    fn clear_exiting(&mut self, key: &K);

    fn set_entering(&mut self, key: &K, delay_ms: u64);
    fn clear_entering(&mut self, key: &K);

    fn set_offset(&mut self, key: &K, dy: f64);
    fn play(&mut self, key: &K, duration_ms: u64);
    fn clear_motion(&mut self, key: &K);

    fn set_badge(&mut self, key: &K, badge: Option<RowBadge>);
    fn set_selected(&mut self, key: &K, selected: bool);

    fn measure(&self, key: &K) -> Option<Rect>;
    fn flush_layout(&mut self);

    /// Removes every row; used by full rebuilds.
    fn clear(&mut self);
}
