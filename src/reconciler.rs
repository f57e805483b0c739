use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use crate::key::{ReconcilerKey, RowMap};
use crate::options::ReconcilerOptions;
use crate::record::Record;
use crate::render::{RowContent, RowPatch};
use crate::view::ViewTree;
use crate::{ReconcileOutcome, RowBadge, RowId, TransitionEvent, TransitionKind, TransitionPlan};

/// A callback fired after each reconcile cycle.
pub type TransitionListener = Arc<dyn Fn(&TransitionEvent) + Send + Sync>;

/// An owned handle to a registered transition listener.
///
/// Pass it back to [`Reconciler::unsubscribe`] before re-attaching a
/// replacement; dropping it without unsubscribing leaves the listener active.
#[must_use = "holds the registration; pass to `unsubscribe` to detach"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
}

/// Per-row engine bookkeeping. The view node itself lives in the host.
#[derive(Clone, Debug)]
struct RowState {
    /// Cached content of the last successful render; `None` while the row
    /// shows an error placeholder.
    content: Option<RowContent>,
    badge: Option<RowBadge>,
}

/// Everything a scheduled set change needs when its exit delay elapses.
///
/// Discarded wholesale on cancellation; there is no partial-completion state.
#[derive(Clone, Debug)]
struct PendingSet<K> {
    plan: TransitionPlan<K>,
    records: Vec<Record<K>>,
    /// FIRST positions of kept rows, captured before any mutation.
    first: Vec<(K, f64)>,
}

/// The per-list transition state machine.
///
/// `Idle → ExitScheduled → AwaitingFrame → Settling → Idle`. Exactly one
/// deadline lives in the phase; rescheduling always goes through
/// [`Reconciler::interrupt`], never ad hoc timer juggling.
#[derive(Clone, Debug)]
enum Phase<K> {
    Idle,
    ExitScheduled { at_ms: u64, pending: PendingSet<K> },
    AwaitingFrame { entering: Vec<K> },
    Settling { until_ms: u64, entering: Vec<K> },
}

/// The keyed list reconciliation and position-preserving transition engine.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any view objects; the host passes a [`ViewTree`] into
///   every entry point.
/// - It does not own timers. The host calls [`Reconciler::tick`] when the
///   deadline from [`Reconciler::next_deadline`] is due, and
///   [`Reconciler::on_frame`] on the next display refresh whenever
///   [`Reconciler::needs_frame`] is set. PLAY happens only inside `on_frame`,
///   so the synchronous layout flush always precedes the timed transition.
pub struct Reconciler<K = RowId> {
    options: ReconcilerOptions,
    /// Current mounted key order. The single source of truth for sibling
    /// identity checks.
    order: Vec<K>,
    rows: RowMap<K, RowState>,
    phase: Phase<K>,
    /// Rows carrying an INVERT offset, waiting for the next frame's PLAY.
    inverted: Vec<K>,
    /// Timed fallbacks for motion cleanup, in case the host's completion
    /// event never fires (node removed mid-flight).
    motion_cleanup: Vec<(K, u64)>,
    listeners: Vec<(u64, TransitionListener)>,
    next_listener_id: u64,
}

fn exceeds(delta: f64, threshold: f64) -> bool {
    delta > threshold || -delta > threshold
}

impl<K: ReconcilerKey> Reconciler<K> {
    pub fn new(options: ReconcilerOptions) -> Self {
        rdebug!(
            active_period = options.active_period,
            exit_delay_ms = options.exit_delay_ms,
            "Reconciler::new"
        );
        Self {
            options,
            order: Vec::new(),
            rows: RowMap::new(),
            phase: Phase::Idle,
            inverted: Vec::new(),
            motion_cleanup: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ReconcilerOptions) {
        self.options = options;
    }

    /// Clones the current options, applies `f`, then stores the result.
    pub fn update_options(&mut self, f: impl FnOnce(&mut ReconcilerOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    /// The currently mounted keys in display order.
    pub fn visible_keys(&self) -> &[K] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    /// Whether the row currently shows an inline error placeholder.
    pub fn row_errored(&self, key: &K) -> bool {
        self.rows
            .get(key)
            .is_some_and(|state| state.content.is_none())
    }

    /// Registers a listener fired after each reconcile cycle.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&TransitionEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        Subscription { id }
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|(id, _)| *id != subscription.id);
    }

    fn emit(&self, event: TransitionEvent) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }

    /// `true` when the host must invoke [`Reconciler::on_frame`] on the next
    /// display refresh.
    pub fn needs_frame(&self) -> bool {
        matches!(self.phase, Phase::AwaitingFrame { .. })
    }

    /// The next `now_ms` at which [`Reconciler::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        let phase_deadline = match &self.phase {
            Phase::ExitScheduled { at_ms, .. } => Some(*at_ms),
            Phase::Settling { until_ms, .. } => Some(*until_ms),
            Phase::Idle | Phase::AwaitingFrame { .. } => None,
        };
        let cleanup = self.motion_cleanup.iter().map(|&(_, at)| at).min();
        match (phase_deadline, cleanup) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The entry point: reconciles the view tree against `records` in target
    /// display order.
    ///
    /// Returns whether a structural rebuild occurred; callers must re-bind
    /// interaction handlers only when the flag is set.
    pub fn reconcile(
        &mut self,
        records: &[Record<K>],
        tree: &mut dyn ViewTree<K>,
        now_ms: u64,
    ) -> ReconcileOutcome {
        #[cfg(debug_assertions)]
        {
            let set: crate::key::RowSet<&K> = records.iter().map(|r| &r.key).collect();
            debug_assert!(set.len() == records.len(), "duplicate keys in records");
        }

        // A newer update supersedes anything in flight: the pending timer is
        // cancelled and its plan discarded before this cycle is scheduled.
        self.interrupt(tree);

        let after: Vec<K> = records.iter().map(|r| r.key.clone()).collect();
        let plan = TransitionPlan::compute(&self.order, &after);
        rdebug!(
            kept = plan.kept.len(),
            entering = plan.entering.len(),
            exiting = plan.exiting.len(),
            order_changed = plan.order_changed,
            "reconcile"
        );

        let rebuilt = match plan.kind {
            TransitionKind::NoChange => {
                self.patch_all(records, tree);
                false
            }
            TransitionKind::ReorderOnly => {
                self.apply_reorder(records, &after, tree);
                false
            }
            TransitionKind::SetChange => {
                if plan.kept.is_empty() && plan.exiting.is_empty() {
                    // From-scratch build; nothing to animate against.
                    self.mount_all(records, tree);
                    true
                } else {
                    self.schedule_set_change(plan.clone(), records, tree, now_ms);
                    false
                }
            }
        };

        self.emit(TransitionEvent {
            kind: plan.kind,
            rebuilt,
            entered: plan.entering.len(),
            exited: plan.exiting.len(),
        });
        ReconcileOutcome { rebuilt }
    }

    /// Forces a full rebuild: every row is destroyed and recreated.
    pub fn rebuild(
        &mut self,
        records: &[Record<K>],
        tree: &mut dyn ViewTree<K>,
    ) -> ReconcileOutcome {
        self.interrupt(tree);
        self.mount_all(records, tree);
        self.emit(TransitionEvent {
            kind: TransitionKind::SetChange,
            rebuilt: true,
            entered: records.len(),
            exited: 0,
        });
        ReconcileOutcome { rebuilt: true }
    }

    /// The host's timer callback. Fires any due phase deadline and the timed
    /// motion-cleanup fallbacks.
    pub fn tick(&mut self, tree: &mut dyn ViewTree<K>, now_ms: u64) {
        self.motion_cleanup.retain(|(key, at)| {
            if now_ms >= *at {
                tree.clear_motion(key);
                false
            } else {
                true
            }
        });

        let exit_due =
            matches!(&self.phase, Phase::ExitScheduled { at_ms, .. } if now_ms >= *at_ms);
        if exit_due {
            if let Phase::ExitScheduled { pending, .. } =
                mem::replace(&mut self.phase, Phase::Idle)
            {
                self.apply_set_change(pending, tree, now_ms);
            }
            return;
        }

        let settle_due =
            matches!(&self.phase, Phase::Settling { until_ms, .. } if now_ms >= *until_ms);
        if settle_due {
            if let Phase::Settling { entering, .. } = mem::replace(&mut self.phase, Phase::Idle) {
                for key in &entering {
                    tree.clear_entering(key);
                }
            }
        }
    }

    /// The host's display-refresh callback: PLAY.
    ///
    /// Clears the INVERT offsets while a timed transition is enabled, which
    /// animates each row from its old position to its new one. Called at most
    /// once per frame; a no-op unless [`Reconciler::needs_frame`] is set.
    pub fn on_frame(&mut self, tree: &mut dyn ViewTree<K>, now_ms: u64) {
        // A continuous frame loop may call this on every frame; any other
        // phase (a pending exit schedule in particular) must survive.
        if !matches!(self.phase, Phase::AwaitingFrame { .. }) {
            return;
        }
        let Phase::AwaitingFrame { entering } = mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };
        let duration = self.options.motion_duration_ms;
        let cleanup_at = now_ms.saturating_add(self.options.motion_cleanup_after_ms());
        for key in mem::take(&mut self.inverted) {
            tree.play(&key, duration);
            self.motion_cleanup.push((key, cleanup_at));
        }
        self.phase = if entering.is_empty() {
            Phase::Idle
        } else {
            Phase::Settling {
                until_ms: now_ms.saturating_add(self.options.settle_delay_ms),
                entering,
            }
        };
    }

    /// Host-reported transition completion for one row.
    ///
    /// Optional; the timed fallback covers rows whose completion event never
    /// fires.
    pub fn transition_ended(&mut self, key: &K, tree: &mut dyn ViewTree<K>) {
        if self.motion_cleanup.iter().any(|(k, _)| k == key) {
            tree.clear_motion(key);
            self.motion_cleanup.retain(|(k, _)| k != key);
        }
    }

    /// Patches a single row from the current source-of-truth record.
    ///
    /// The patch carries only the regions that changed, so an indicator-only
    /// change touches nothing else. A no-op for rows showing an error
    /// placeholder (those stay terminal until the next reconcile) and for
    /// unknown keys.
    pub fn update_one(&mut self, record: &Record<K>, tree: &mut dyn ViewTree<K>) {
        let Some(state) = self.rows.get(&record.key) else {
            return;
        };
        let Some(old) = &state.content else {
            return;
        };
        let new = match RowContent::build(
            record,
            self.options.active_period,
            self.options.journal_threshold,
        ) {
            Ok(new) => new,
            Err(_err) => {
                rwarn!("update_one: record became malformed; keeping last content");
                return;
            }
        };
        if let Some(patch) = RowPatch::diff(old, &new) {
            tree.apply(&record.key, &patch);
        }
        if let Some(state) = self.rows.get_mut(&record.key) {
            state.content = Some(new);
        }
    }

    /// Transient badge override, independent of the reconciliation cycle.
    pub fn set_row_status(
        &mut self,
        key: &K,
        badge: Option<RowBadge>,
        tree: &mut dyn ViewTree<K>,
    ) {
        let Some(state) = self.rows.get_mut(key) else {
            return;
        };
        state.badge = badge;
        tree.set_badge(key, badge);
    }

    /// Cancels whatever transition is in flight, leaving no visual residue.
    ///
    /// A pending set change is discarded entirely (its plan is never partially
    /// applied); un-played INVERT offsets are cleared instantly; entering
    /// markers are stripped. All the underlying view calls are defensive
    /// no-ops when their target is already gone.
    fn interrupt(&mut self, tree: &mut dyn ViewTree<K>) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::ExitScheduled { pending, .. } => {
                rtrace!("interrupt: discarding pending set change");
                for key in &pending.plan.exiting {
                    tree.clear_exiting(key);
                }
            }
            Phase::AwaitingFrame { entering } => {
                for key in mem::take(&mut self.inverted) {
                    tree.clear_motion(&key);
                }
                for key in &entering {
                    tree.clear_entering(key);
                }
            }
            Phase::Settling { entering, .. } => {
                for key in &entering {
                    tree.clear_entering(key);
                }
            }
        }
    }

    /// NO_CHANGE fast path: in-place content patching, no measurement.
    fn patch_all(&mut self, records: &[Record<K>], tree: &mut dyn ViewTree<K>) {
        for (i, record) in records.iter().enumerate() {
            let successor = self.order.get(i + 1).cloned();
            self.patch_row(record, successor.as_ref(), tree);
        }
    }

    /// Single-phase FLIP for same-set, different-order updates.
    fn apply_reorder(&mut self, records: &[Record<K>], after: &[K], tree: &mut dyn ViewTree<K>) {
        // FIRST: bounding positions before any mutation.
        let first: Vec<(K, f64)> = self
            .order
            .iter()
            .filter_map(|k| tree.measure(k).map(|r| (k.clone(), r.top)))
            .collect();

        for record in records {
            let successor = self.successor_of(&record.key);
            self.patch_row(record, successor.as_ref(), tree);
        }
        self.reorder_rows(after, tree);
        tree.flush_layout();

        self.invert_moved(&first, tree);
        debug_assert!(self.order.as_slice() == after, "reorder left order out of sync");

        if self.inverted.is_empty() {
            self.phase = Phase::Idle;
        } else {
            self.phase = Phase::AwaitingFrame {
                entering: Vec::new(),
            };
        }
    }

    /// SET_CHANGE steps 1–2: capture FIRST, mark exits, arm the one timer.
    fn schedule_set_change(
        &mut self,
        plan: TransitionPlan<K>,
        records: &[Record<K>],
        tree: &mut dyn ViewTree<K>,
        now_ms: u64,
    ) {
        let first: Vec<(K, f64)> = plan
            .kept
            .iter()
            .filter_map(|k| tree.measure(k).map(|r| (k.clone(), r.top)))
            .collect();

        for key in &plan.exiting {
            tree.set_exiting(key);
        }
        let delay = if plan.exiting.is_empty() {
            0
        } else {
            self.options.exit_delay_ms
        };

        let pending = PendingSet {
            plan,
            records: records.to_vec(),
            first,
        };
        if delay == 0 {
            self.apply_set_change(pending, tree, now_ms);
        } else {
            self.phase = Phase::ExitScheduled {
                at_ms: now_ms.saturating_add(delay),
                pending,
            };
        }
    }

    /// SET_CHANGE steps 3–6: remove exits, walk `after`, FLIP the kept rows.
    fn apply_set_change(
        &mut self,
        pending: PendingSet<K>,
        tree: &mut dyn ViewTree<K>,
        now_ms: u64,
    ) {
        let PendingSet {
            plan,
            records,
            first,
        } = pending;

        for key in &plan.exiting {
            tree.remove(key);
            self.rows.remove(key);
        }
        self.order.retain(|k| !plan.exiting.contains(k));

        let mut enter_index = 0usize;
        for (i, record) in records.iter().enumerate() {
            let key = record.key.clone();
            if self.rows.contains_key(&key) {
                // Kept: patch from the new record, relocate only when the row
                // is not already immediately before the correct next node.
                if self.order.get(i) != Some(&key) {
                    let pos = self.order.iter().position(|k| *k == key);
                    if let Some(pos) = pos {
                        self.order.remove(pos);
                    }
                    let before = self.order.get(i).cloned();
                    tree.move_before(&key, before.as_ref());
                    self.order.insert(i, key.clone());
                }
                let successor = self.order.get(i + 1).cloned();
                self.patch_row(record, successor.as_ref(), tree);
            } else {
                let before = self.order.get(i).cloned();
                self.mount_row(record, before.as_ref(), tree);
                self.order.insert(i, key.clone());
                tree.set_entering(
                    &key,
                    self.options.enter_stagger_step_ms * enter_index as u64,
                );
                enter_index += 1;
            }
        }

        // Flush batched writes so LAST observes post-reorder geometry.
        tree.flush_layout();
        self.invert_moved(&first, tree);

        self.phase = if !self.inverted.is_empty() {
            Phase::AwaitingFrame {
                entering: plan.entering,
            }
        } else if !plan.entering.is_empty() {
            Phase::Settling {
                until_ms: now_ms.saturating_add(self.options.settle_delay_ms),
                entering: plan.entering,
            }
        } else {
            Phase::Idle
        };
    }

    /// LAST + INVERT: measure post-mutation positions and freeze moved rows
    /// at their FIRST position with an instantaneous offset.
    fn invert_moved(&mut self, first: &[(K, f64)], tree: &mut dyn ViewTree<K>) {
        let mut inverted = Vec::new();
        for (key, first_top) in first {
            if !self.rows.contains_key(key) {
                continue;
            }
            let Some(last) = tree.measure(key) else {
                continue;
            };
            let delta = first_top - last.top;
            if exceeds(delta, self.options.min_visible_delta) {
                tree.set_offset(key, delta);
                inverted.push(key.clone());
            }
        }
        // Second synchronous flush: the offsets must be committed before the
        // next frame's PLAY enables the transition.
        tree.flush_layout();
        self.inverted = inverted;
    }

    /// Reinserts every row at its new index, skipping rows that already sit
    /// before the right neighbor.
    fn reorder_rows(&mut self, after: &[K], tree: &mut dyn ViewTree<K>) {
        for (i, key) in after.iter().enumerate() {
            if self.order.get(i) == Some(key) {
                continue;
            }
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
            let before = self.order.get(i).cloned();
            tree.move_before(key, before.as_ref());
            self.order.insert(i, key.clone());
        }
    }

    fn successor_of(&self, key: &K) -> Option<K> {
        let pos = self.order.iter().position(|k| k == key)?;
        self.order.get(pos + 1).cloned()
    }

    /// Full from-scratch build.
    fn mount_all(&mut self, records: &[Record<K>], tree: &mut dyn ViewTree<K>) {
        tree.clear();
        self.rows.clear();
        self.order.clear();
        self.inverted.clear();
        self.motion_cleanup.clear();
        for record in records {
            self.mount_row(record, None, tree);
            self.order.push(record.key.clone());
        }
    }

    /// Mounts one row, falling back to an inline error placeholder when the
    /// record cannot be rendered. One bad record never aborts the rest.
    fn mount_row(&mut self, record: &Record<K>, before: Option<&K>, tree: &mut dyn ViewTree<K>) {
        match RowContent::build(
            record,
            self.options.active_period,
            self.options.journal_threshold,
        ) {
            Ok(content) => {
                tree.mount(&record.key, &content, before);
                self.rows.insert(
                    record.key.clone(),
                    RowState {
                        content: Some(content),
                        badge: None,
                    },
                );
            }
            Err(err) => {
                rwarn!("render failed; mounting placeholder");
                tree.mount_placeholder(&record.key, &format!("{err}"), before);
                self.rows.insert(
                    record.key.clone(),
                    RowState {
                        content: None,
                        badge: None,
                    },
                );
            }
        }
    }

    /// Patches an existing row in place; swaps between real content and the
    /// error placeholder when the record's renderability changed.
    fn patch_row(&mut self, record: &Record<K>, successor: Option<&K>, tree: &mut dyn ViewTree<K>) {
        let Some(state) = self.rows.get(&record.key) else {
            return;
        };
        let had_content = state.content.is_some();
        let badge = state.badge;
        let built = RowContent::build(
            record,
            self.options.active_period,
            self.options.journal_threshold,
        );

        match built {
            Ok(new) => {
                if had_content {
                    let Some(state) = self.rows.get_mut(&record.key) else {
                        return;
                    };
                    let old = state.content.as_ref().unwrap_or(&new);
                    if let Some(patch) = RowPatch::diff(old, &new) {
                        tree.apply(&record.key, &patch);
                    }
                    state.content = Some(new);
                } else {
                    // Placeholder row recovered: replace it with a real node.
                    tree.remove(&record.key);
                    tree.mount(&record.key, &new, successor);
                    if badge.is_some() {
                        tree.set_badge(&record.key, badge);
                    }
                    if let Some(state) = self.rows.get_mut(&record.key) {
                        state.content = Some(new);
                    }
                }
            }
            Err(err) => {
                if had_content {
                    tree.remove(&record.key);
                    tree.mount_placeholder(&record.key, &format!("{err}"), successor);
                    if let Some(state) = self.rows.get_mut(&record.key) {
                        state.content = None;
                    }
                }
                // Already a placeholder: stays terminal.
            }
        }
    }
}
