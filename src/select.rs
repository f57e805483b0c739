use alloc::vec::Vec;

use crate::key::{ReconcilerKey, RowSet};
use crate::view::ViewTree;
use crate::RowId;

/// A serializable snapshot of the current selection.
///
/// Useful for persisting selection across reloads; restore it with
/// [`SelectionManager::restore_state`] once rows are mounted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionState<K = RowId> {
    pub selected: Vec<K>,
    pub last_touched: Option<K>,
}

/// Tracks the selected key set and the anchor key for range selection.
///
/// Every mutation patches only the affected rows' selection affordance via
/// [`ViewTree::set_selected`] — never a full rebuild.
#[derive(Clone, Debug)]
pub struct SelectionManager<K = RowId> {
    selected: RowSet<K>,
    last_touched: Option<K>,
}

impl<K: ReconcilerKey> Default for SelectionManager<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ReconcilerKey> SelectionManager<K> {
    pub fn new() -> Self {
        Self {
            selected: RowSet::new(),
            last_touched: None,
        }
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The anchor for the next range selection.
    pub fn last_touched(&self) -> Option<&K> {
        self.last_touched.as_ref()
    }

    pub fn for_each_selected(&self, mut f: impl FnMut(&K)) {
        for key in &self.selected {
            f(key);
        }
    }

    /// Flips membership of `key` and makes it the new anchor.
    pub fn toggle(&mut self, key: &K, tree: &mut dyn ViewTree<K>) {
        let now_selected = if self.selected.remove(key) {
            false
        } else {
            self.selected.insert(key.clone());
            true
        };
        tree.set_selected(key, now_selected);
        self.last_touched = Some(key.clone());
    }

    /// Adds (never removes) every key in the inclusive span between `anchor`
    /// and `target` in the current visible `order`; `target` becomes the new
    /// anchor.
    ///
    /// Falls back to a plain toggle-on of `target` when either end is not
    /// currently visible.
    pub fn select_range(
        &mut self,
        anchor: &K,
        target: &K,
        order: &[K],
        tree: &mut dyn ViewTree<K>,
    ) {
        let a = order.iter().position(|k| k == anchor);
        let b = order.iter().position(|k| k == target);
        let (lo, hi) = match (a, b) {
            (Some(a), Some(b)) => (a.min(b), a.max(b)),
            _ => {
                if self.selected.insert(target.clone()) {
                    tree.set_selected(target, true);
                }
                self.last_touched = Some(target.clone());
                return;
            }
        };
        for key in &order[lo..=hi] {
            if self.selected.insert(key.clone()) {
                tree.set_selected(key, true);
            }
        }
        self.last_touched = Some(target.clone());
    }

    /// Selects or deselects every currently visible key. Keys filtered out of
    /// the current view are untouched.
    pub fn set_all_visible(&mut self, on: bool, order: &[K], tree: &mut dyn ViewTree<K>) {
        for key in order {
            let changed = if on {
                self.selected.insert(key.clone())
            } else {
                self.selected.remove(key)
            };
            if changed {
                tree.set_selected(key, on);
            }
        }
    }

    /// Drops selected keys that no longer appear in the visible order.
    ///
    /// Call after a set change removed rows; the view nodes are already gone,
    /// so no patches are issued.
    pub fn prune_missing(&mut self, order: &[K]) {
        let live: RowSet<&K> = order.iter().collect();
        self.selected.retain(|k| live.contains(k));
        if let Some(anchor) = &self.last_touched {
            if !live.contains(anchor) {
                self.last_touched = None;
            }
        }
    }

    pub fn clear(&mut self, tree: &mut dyn ViewTree<K>) {
        for key in core::mem::take(&mut self.selected) {
            tree.set_selected(&key, false);
        }
        self.last_touched = None;
    }

    /// Exports the selection for persistence.
    pub fn export_state(&self) -> SelectionState<K> {
        SelectionState {
            selected: self.selected.iter().cloned().collect(),
            last_touched: self.last_touched.clone(),
        }
    }

    /// Restores a previously exported selection, patching the affordance of
    /// every restored key that is currently visible.
    pub fn restore_state(
        &mut self,
        state: SelectionState<K>,
        order: &[K],
        tree: &mut dyn ViewTree<K>,
    ) {
        self.clear(tree);
        for key in state.selected {
            if order.contains(&key) {
                tree.set_selected(&key, true);
                self.selected.insert(key);
            }
        }
        self.last_touched = state.last_touched.filter(|k| order.contains(k));
    }
}
