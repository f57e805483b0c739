use crate::record::PeriodId;

/// Configuration for [`crate::Reconciler`].
///
/// All timings are in milliseconds and interpreted against the `now_ms`
/// timestamps the host passes into `reconcile`/`tick`/`on_frame`; the engine
/// never reads a clock itself.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconcilerOptions {
    /// The period whose grades/context/generated text are currently displayed.
    pub active_period: PeriodId,

    /// How many journal entries must carry a tag before it counts as active.
    pub journal_threshold: usize,

    /// Delay between marking exiting rows and removing them, so their exit
    /// visual state has time to play. Zero when nothing exits.
    pub exit_delay_ms: u64,

    /// Duration of the PLAY phase transition (INVERT offset back to zero).
    pub motion_duration_ms: u64,

    /// Delay before entering-stagger markers are stripped.
    pub settle_delay_ms: u64,

    /// Per-index stagger step applied to entering rows.
    pub enter_stagger_step_ms: u64,

    /// Extra slack added to `motion_duration_ms` for the timed cleanup
    /// fallback, in case the host's completion event never fires.
    pub motion_fallback_slack_ms: u64,

    /// Position deltas at or below this magnitude (px) are not animated.
    pub min_visible_delta: f64,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            active_period: 0,
            journal_threshold: 2,
            exit_delay_ms: 150,
            motion_duration_ms: 250,
            settle_delay_ms: 400,
            enter_stagger_step_ms: 30,
            motion_fallback_slack_ms: 100,
            min_visible_delta: 2.0,
        }
    }
}

impl ReconcilerOptions {
    pub fn new(active_period: PeriodId) -> Self {
        Self {
            active_period,
            ..Self::default()
        }
    }

    pub fn with_active_period(mut self, active_period: PeriodId) -> Self {
        self.active_period = active_period;
        self
    }

    pub fn with_journal_threshold(mut self, journal_threshold: usize) -> Self {
        self.journal_threshold = journal_threshold;
        self
    }

    pub fn with_exit_delay_ms(mut self, exit_delay_ms: u64) -> Self {
        self.exit_delay_ms = exit_delay_ms;
        self
    }

    pub fn with_motion_duration_ms(mut self, motion_duration_ms: u64) -> Self {
        self.motion_duration_ms = motion_duration_ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settle_delay_ms = settle_delay_ms;
        self
    }

    pub fn with_enter_stagger_step_ms(mut self, enter_stagger_step_ms: u64) -> Self {
        self.enter_stagger_step_ms = enter_stagger_step_ms;
        self
    }

    pub fn with_motion_fallback_slack_ms(mut self, motion_fallback_slack_ms: u64) -> Self {
        self.motion_fallback_slack_ms = motion_fallback_slack_ms;
        self
    }

    pub fn with_min_visible_delta(mut self, min_visible_delta: f64) -> Self {
        self.min_visible_delta = min_visible_delta;
        self
    }

    /// Total lifetime of a motion override before the timed fallback clears it.
    pub(crate) fn motion_cleanup_after_ms(&self) -> u64 {
        self.motion_duration_ms
            .saturating_add(self.motion_fallback_slack_ms)
    }
}
