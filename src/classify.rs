use alloc::vec::Vec;

use crate::key::{ReconcilerKey, RowSet};
use crate::{TransitionKind, TransitionPlan};

/// Classifies one update from `before` to `after` key order.
///
/// Pure function of the two sequences (both duplicate-free):
/// - any symmetric set difference → [`TransitionKind::SetChange`]
/// - same set, any positional mismatch → [`TransitionKind::ReorderOnly`]
/// - otherwise → [`TransitionKind::NoChange`]
///
/// A change in a record's *content* with identical key order is invisible
/// here; content patching happens independently of classification.
pub fn classify<K: ReconcilerKey>(before: &[K], after: &[K]) -> TransitionKind {
    if before.len() != after.len() {
        return TransitionKind::SetChange;
    }

    let before_set: RowSet<&K> = before.iter().collect();
    if after.iter().any(|k| !before_set.contains(k)) {
        return TransitionKind::SetChange;
    }
    // Equal lengths, duplicate-free, after ⊆ before ⇒ equal sets.

    if before.iter().zip(after.iter()).any(|(b, a)| b != a) {
        TransitionKind::ReorderOnly
    } else {
        TransitionKind::NoChange
    }
}

impl<K: ReconcilerKey> TransitionPlan<K> {
    /// Computes the per-cycle plan: kept/entering in `after` order, exiting
    /// in `before` order.
    pub fn compute(before: &[K], after: &[K]) -> Self {
        let before_set: RowSet<&K> = before.iter().collect();
        let after_set: RowSet<&K> = after.iter().collect();

        let mut kept = Vec::new();
        let mut entering = Vec::new();
        for k in after {
            if before_set.contains(k) {
                kept.push(k.clone());
            } else {
                entering.push(k.clone());
            }
        }
        let exiting: Vec<K> = before
            .iter()
            .filter(|k| !after_set.contains(*k))
            .cloned()
            .collect();

        let kind = classify(before, after);
        let order_changed = match kind {
            TransitionKind::NoChange => false,
            TransitionKind::ReorderOnly => true,
            TransitionKind::SetChange => {
                // Kept keys may still have preserved their relative order.
                let kept_before: Vec<&K> =
                    before.iter().filter(|k| after_set.contains(*k)).collect();
                kept_before
                    .iter()
                    .zip(kept.iter())
                    .any(|(b, a)| **b != *a)
            }
        };

        Self {
            kept,
            entering,
            exiting,
            order_changed,
            kind,
        }
    }
}
