#![forbid(unsafe_code)]

//! Debounced show/hide scheduling for the shared tooltip popup.
//!
//! [`TooltipScheduler`] consumes pointer lifecycle signals for registered
//! targets and for the popup itself, and decides when the popup is shown or
//! hidden. Every decision is a transition of an explicit state machine:
//!
//! ```text
//!            enter(target)               timer
//!   Idle ───────────────────▶ PendingShow ──────▶ Visible
//!    ▲                            │ leave            │ leave(target)
//!    │                            ▼                  ▼ leave(popup)
//!    └────────────────────────── Idle    Visible ◀── PendingHide
//!                      timer          enter(popup)
//! ```
//!
//! # Invariants
//!
//! 1. At most one timer is pending. Scheduling always cancels the previous
//!    pending timer first.
//! 2. The pending slot is cleared before a timer's action runs, and whenever
//!    the timer is cancelled.
//! 3. The popup is never hidden while the pointer is over it.
//! 4. Re-entering the target the popup is already showing schedules nothing
//!    and does not touch the popup.
//!
//! The scheduler depends only on [`DelayScheduler`] and [`PopupSurface`];
//! browsers, tests, and headless hosts plug in their own implementations.

use core::time::Duration;

use crate::config::TooltipConfig;
use crate::geometry::{PagePoint, ScrollOffset};
use crate::popup::{PopupSurface, RecordedPopup};
use crate::target::{Registration, TargetId, TargetRegistry};
use crate::timer::{DelayScheduler, DeterministicTimers, MonotonicClock, TimerId};

const LOG_TARGET: &str = "hovertip.scheduler";

/// Explicit state-machine phase, derived from [`TooltipState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    /// Popup hidden, nothing scheduled.
    Idle,
    /// A show is scheduled. The popup may still be visible with an older tip.
    PendingShow,
    /// Popup visible, nothing scheduled.
    Visible,
    /// Popup visible, a hide is scheduled.
    PendingHide,
}

/// Action committed when a pending timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Show `target`'s tip at `anchor` (page coordinates, offset applied).
    Show { target: TargetId, anchor: PagePoint },
    /// Hide the popup.
    Hide,
}

/// The single scheduled-but-not-fired action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub action: PendingAction,
}

/// Mutable tooltip state. Owned and mutated only by [`TooltipScheduler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipState {
    current_target: Option<TargetId>,
    shown_target: Option<TargetId>,
    visible: bool,
    pointer_over_popup: bool,
    pending: Option<PendingTimer>,
}

impl TooltipState {
    /// Target most recently entered.
    #[must_use]
    pub const fn current_target(&self) -> Option<TargetId> {
        self.current_target
    }

    /// Target whose tip the popup last displayed.
    #[must_use]
    pub const fn shown_target(&self) -> Option<TargetId> {
        self.shown_target
    }

    /// Whether the popup is displayed.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the pointer is currently over the popup.
    #[must_use]
    pub const fn is_pointer_over_popup(&self) -> bool {
        self.pointer_over_popup
    }

    /// The pending timer, if a show or hide is scheduled.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingTimer> {
        self.pending
    }
}

/// Signal that produced a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipLifecyclePhase {
    Register,
    Unregister,
    SetTip,
    PointerEnter,
    PointerLeave,
    PopupPointerEnter,
    PopupPointerLeave,
    PopupClick,
    TimerFired,
    FireShow,
    FireHide,
}

/// Why a signal left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipIgnoredReason {
    /// The target was never registered (or has been unregistered).
    UnknownTarget,
    /// `register` for a target that is already known.
    AlreadyRegistered,
    /// The popup is already showing the entered target.
    AlreadyShowingTarget,
    /// Hide suppressed because the pointer is over the popup.
    PointerOverPopup,
    /// Nothing to hide.
    PopupHidden,
    /// Timer id does not match the pending timer.
    StaleTimer,
    /// No matching action is pending.
    NothingPending,
}

/// Result category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipOutcome {
    Registered,
    Unregistered,
    TipUpdated,
    ShowScheduled,
    HideScheduled,
    /// A pending timer was cancelled and nothing new was scheduled.
    PendingCancelled,
    Shown,
    Hidden,
    /// Only the pointer-over-popup flag changed.
    StateUpdated,
    Ignored(TooltipIgnoredReason),
}

/// Structured log record for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipLogEntry {
    pub phase: TooltipLifecyclePhase,
    pub sequence: u64,
    pub target: Option<TargetId>,
    pub scheduled: Option<TimerId>,
    pub cancelled: Option<TimerId>,
    pub outcome: TooltipOutcome,
}

/// Result of one scheduler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipDispatch {
    pub log: TooltipLogEntry,
    pub phase_after: TooltipPhase,
}

impl TooltipDispatch {
    /// Whether the signal was ignored.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, TooltipOutcome::Ignored(_))
    }
}

/// Tooltip scheduler over a delayed-task source `T` and a popup surface `P`.
#[derive(Debug, Clone)]
pub struct TooltipScheduler<T, P> {
    config: TooltipConfig,
    targets: TargetRegistry,
    timers: T,
    popup: P,
    state: TooltipState,
    scroll: ScrollOffset,
    next_sequence: u64,
}

impl<T: DelayScheduler, P: PopupSurface> TooltipScheduler<T, P> {
    /// Create a scheduler with the default configuration.
    #[must_use]
    pub fn new(timers: T, popup: P) -> Self {
        Self::with_config(TooltipConfig::default(), timers, popup)
    }

    /// Create a scheduler with an explicit configuration.
    #[must_use]
    pub fn with_config(config: TooltipConfig, timers: T, popup: P) -> Self {
        Self {
            config,
            targets: TargetRegistry::new(),
            timers,
            popup,
            state: TooltipState::default(),
            scroll: ScrollOffset::ZERO,
            next_sequence: 1,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &TooltipConfig {
        &self.config
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &TooltipState {
        &self.state
    }

    /// Registered targets.
    #[must_use]
    pub const fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// The delayed-task source.
    #[must_use]
    pub const fn timers(&self) -> &T {
        &self.timers
    }

    /// Mutably access the delayed-task source (e.g. to advance a clock).
    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    /// The popup surface.
    #[must_use]
    pub const fn popup(&self) -> &P {
        &self.popup
    }

    /// Current scroll offset used to convert pointer positions.
    #[must_use]
    pub const fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    /// Update the document scroll offset.
    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    /// Current state-machine phase.
    #[must_use]
    pub fn phase(&self) -> TooltipPhase {
        match self.state.pending.map(|p| p.action) {
            Some(PendingAction::Show { .. }) => TooltipPhase::PendingShow,
            Some(PendingAction::Hide) => TooltipPhase::PendingHide,
            None if self.state.visible => TooltipPhase::Visible,
            None => TooltipPhase::Idle,
        }
    }

    /// Register `target` with its tip text. Idempotent per target.
    pub fn register(&mut self, target: TargetId, tip: impl Into<String>) -> TooltipDispatch {
        let outcome = match self.targets.register(target, tip) {
            Registration::Added => TooltipOutcome::Registered,
            Registration::AlreadyRegistered => {
                TooltipOutcome::Ignored(TooltipIgnoredReason::AlreadyRegistered)
            }
        };
        self.finish(
            TooltipLifecyclePhase::Register,
            Some(target),
            outcome,
            None,
            None,
        )
    }

    /// Remove `target`.
    ///
    /// A show scheduled for it is cancelled; if the popup is showing it, the
    /// popup is hidden immediately.
    pub fn unregister(&mut self, target: TargetId) -> TooltipDispatch {
        if self.targets.unregister(target).is_none() {
            return self.ignored(
                TooltipLifecyclePhase::Unregister,
                Some(target),
                TooltipIgnoredReason::UnknownTarget,
            );
        }

        let pending_for_target = matches!(
            self.state.pending,
            Some(PendingTimer {
                action: PendingAction::Show { target: t, .. },
                ..
            }) if t == target
        );
        let showing_target = self.state.visible && self.state.shown_target == Some(target);

        let cancelled = if pending_for_target || showing_target {
            self.cancel_pending()
        } else {
            None
        };
        if showing_target {
            self.popup.set_visible(false);
            self.state.visible = false;
            self.state.pointer_over_popup = false;
        }
        if self.state.shown_target == Some(target) {
            self.state.shown_target = None;
        }
        if self.state.current_target == Some(target) {
            self.state.current_target = None;
        }

        self.finish(
            TooltipLifecyclePhase::Unregister,
            Some(target),
            TooltipOutcome::Unregistered,
            None,
            cancelled,
        )
    }

    /// Replace the tip text of a registered target, refreshing the popup if
    /// it is currently showing that target.
    pub fn set_tip(&mut self, target: TargetId, tip: impl Into<String>) -> TooltipDispatch {
        if !self.targets.set_tip(target, tip) {
            return self.ignored(
                TooltipLifecyclePhase::SetTip,
                Some(target),
                TooltipIgnoredReason::UnknownTarget,
            );
        }
        if self.state.visible && self.state.shown_target == Some(target) {
            if let Some(tip) = self.targets.tip(target) {
                self.popup.set_content(tip);
            }
        }
        self.finish(
            TooltipLifecyclePhase::SetTip,
            Some(target),
            TooltipOutcome::TipUpdated,
            None,
            None,
        )
    }

    /// Pointer entered `target` at client position `(pointer_x, pointer_y)`.
    pub fn on_pointer_enter(
        &mut self,
        target: TargetId,
        pointer_x: i32,
        pointer_y: i32,
    ) -> TooltipDispatch {
        if !self.targets.contains(target) {
            return self.ignored(
                TooltipLifecyclePhase::PointerEnter,
                Some(target),
                TooltipIgnoredReason::UnknownTarget,
            );
        }

        self.state.current_target = Some(target);
        let cancelled = self.cancel_pending();

        if self.state.visible && self.state.shown_target == Some(target) {
            let outcome = if cancelled.is_some() {
                TooltipOutcome::PendingCancelled
            } else {
                TooltipOutcome::Ignored(TooltipIgnoredReason::AlreadyShowingTarget)
            };
            return self.finish(
                TooltipLifecyclePhase::PointerEnter,
                Some(target),
                outcome,
                None,
                cancelled,
            );
        }

        let anchor = self
            .scroll
            .to_page(pointer_x, pointer_y)
            .offset(self.config.offset_x, self.config.offset_y);
        let scheduled = self.schedule(
            PendingAction::Show { target, anchor },
            self.config.show_delay(),
        );
        self.finish(
            TooltipLifecyclePhase::PointerEnter,
            Some(target),
            TooltipOutcome::ShowScheduled,
            Some(scheduled),
            cancelled,
        )
    }

    /// Pointer left `target`.
    pub fn on_pointer_leave(&mut self, target: TargetId) -> TooltipDispatch {
        if !self.targets.contains(target) {
            return self.ignored(
                TooltipLifecyclePhase::PointerLeave,
                Some(target),
                TooltipIgnoredReason::UnknownTarget,
            );
        }

        let cancelled = self.cancel_pending();
        if self.state.pointer_over_popup {
            return self.finish(
                TooltipLifecyclePhase::PointerLeave,
                Some(target),
                TooltipOutcome::Ignored(TooltipIgnoredReason::PointerOverPopup),
                None,
                cancelled,
            );
        }
        if !self.state.visible {
            let outcome = if cancelled.is_some() {
                TooltipOutcome::PendingCancelled
            } else {
                TooltipOutcome::Ignored(TooltipIgnoredReason::PopupHidden)
            };
            return self.finish(
                TooltipLifecyclePhase::PointerLeave,
                Some(target),
                outcome,
                None,
                cancelled,
            );
        }

        let scheduled = self.schedule(PendingAction::Hide, self.config.hide_delay());
        self.finish(
            TooltipLifecyclePhase::PointerLeave,
            Some(target),
            TooltipOutcome::HideScheduled,
            Some(scheduled),
            cancelled,
        )
    }

    /// Pointer entered the popup. Cancels a pending hide.
    pub fn on_popup_pointer_enter(&mut self) -> TooltipDispatch {
        self.state.pointer_over_popup = true;
        let hide_pending = matches!(
            self.state.pending,
            Some(PendingTimer {
                action: PendingAction::Hide,
                ..
            })
        );
        let cancelled = if hide_pending {
            self.cancel_pending()
        } else {
            None
        };
        let outcome = if cancelled.is_some() {
            TooltipOutcome::PendingCancelled
        } else {
            TooltipOutcome::StateUpdated
        };
        let target = self.state.shown_target;
        self.finish(
            TooltipLifecyclePhase::PopupPointerEnter,
            target,
            outcome,
            None,
            cancelled,
        )
    }

    /// Pointer left the popup. Schedules a hide if the popup is visible.
    pub fn on_popup_pointer_leave(&mut self) -> TooltipDispatch {
        self.state.pointer_over_popup = false;
        let target = self.state.shown_target;
        if !self.state.visible {
            return self.finish(
                TooltipLifecyclePhase::PopupPointerLeave,
                target,
                TooltipOutcome::StateUpdated,
                None,
                None,
            );
        }

        let cancelled = self.cancel_pending();
        let scheduled = self.schedule(PendingAction::Hide, self.config.hide_delay());
        self.finish(
            TooltipLifecyclePhase::PopupPointerLeave,
            target,
            TooltipOutcome::HideScheduled,
            Some(scheduled),
            cancelled,
        )
    }

    /// The popup was clicked: hide it now.
    pub fn on_popup_click(&mut self) -> TooltipDispatch {
        let cancelled = self.cancel_pending();
        self.state.pointer_over_popup = false;
        let target = self.state.shown_target;
        let outcome = if self.state.visible {
            self.commit_hide()
        } else if cancelled.is_some() {
            TooltipOutcome::PendingCancelled
        } else {
            TooltipOutcome::Ignored(TooltipIgnoredReason::PopupHidden)
        };
        self.finish(
            TooltipLifecyclePhase::PopupClick,
            target,
            outcome,
            None,
            cancelled,
        )
    }

    /// A timer handed out by the [`DelayScheduler`] expired.
    ///
    /// Ids other than the pending one (cancelled or already fired) are
    /// ignored.
    pub fn on_timer(&mut self, id: TimerId) -> TooltipDispatch {
        let pending = match self.state.pending {
            Some(pending) if pending.id == id => pending,
            _ => {
                let target = self.state.current_target;
                return self.ignored(
                    TooltipLifecyclePhase::TimerFired,
                    target,
                    TooltipIgnoredReason::StaleTimer,
                );
            }
        };
        self.state.pending = None;

        let (target, outcome) = match pending.action {
            PendingAction::Show { target, anchor } => {
                (Some(target), self.commit_show(target, anchor))
            }
            PendingAction::Hide => (self.state.shown_target, self.commit_hide()),
        };
        self.finish(TooltipLifecyclePhase::TimerFired, target, outcome, None, None)
    }

    /// Commit the pending show now instead of waiting for its timer.
    pub fn fire_show(&mut self) -> TooltipDispatch {
        let Some(PendingTimer {
            id,
            action: PendingAction::Show { target, anchor },
        }) = self.state.pending
        else {
            let target = self.state.current_target;
            return self.ignored(
                TooltipLifecyclePhase::FireShow,
                target,
                TooltipIgnoredReason::NothingPending,
            );
        };
        self.state.pending = None;
        self.timers.cancel(id);
        let outcome = self.commit_show(target, anchor);
        self.finish(
            TooltipLifecyclePhase::FireShow,
            Some(target),
            outcome,
            None,
            Some(id),
        )
    }

    /// Commit the pending hide now instead of waiting for its timer.
    pub fn fire_hide(&mut self) -> TooltipDispatch {
        let Some(PendingTimer {
            id,
            action: PendingAction::Hide,
        }) = self.state.pending
        else {
            let target = self.state.shown_target;
            return self.ignored(
                TooltipLifecyclePhase::FireHide,
                target,
                TooltipIgnoredReason::NothingPending,
            );
        };
        self.state.pending = None;
        self.timers.cancel(id);
        let outcome = self.commit_hide();
        let target = self.state.shown_target;
        self.finish(
            TooltipLifecyclePhase::FireHide,
            target,
            outcome,
            None,
            Some(id),
        )
    }

    fn commit_show(&mut self, target: TargetId, anchor: PagePoint) -> TooltipOutcome {
        let Some(tip) = self.targets.tip(target) else {
            return TooltipOutcome::Ignored(TooltipIgnoredReason::UnknownTarget);
        };
        self.popup.move_to(anchor);
        self.popup.set_content(tip);
        self.popup.set_visible(true);
        self.state.visible = true;
        self.state.shown_target = Some(target);
        TooltipOutcome::Shown
    }

    fn commit_hide(&mut self) -> TooltipOutcome {
        if self.state.pointer_over_popup {
            return TooltipOutcome::Ignored(TooltipIgnoredReason::PointerOverPopup);
        }
        self.popup.set_visible(false);
        self.state.visible = false;
        TooltipOutcome::Hidden
    }

    fn cancel_pending(&mut self) -> Option<TimerId> {
        let pending = self.state.pending.take()?;
        self.timers.cancel(pending.id);
        Some(pending.id)
    }

    fn schedule(&mut self, action: PendingAction, delay: Duration) -> TimerId {
        debug_assert!(self.state.pending.is_none(), "pending timer not cancelled");
        let id = self.timers.schedule(delay);
        self.state.pending = Some(PendingTimer { id, action });
        id
    }

    fn ignored(
        &mut self,
        phase: TooltipLifecyclePhase,
        target: Option<TargetId>,
        reason: TooltipIgnoredReason,
    ) -> TooltipDispatch {
        self.finish(phase, target, TooltipOutcome::Ignored(reason), None, None)
    }

    fn finish(
        &mut self,
        phase: TooltipLifecyclePhase,
        target: Option<TargetId>,
        outcome: TooltipOutcome,
        scheduled: Option<TimerId>,
        cancelled: Option<TimerId>,
    ) -> TooltipDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let phase_after = self.phase();

        if outcome == TooltipOutcome::Ignored(TooltipIgnoredReason::UnknownTarget) {
            tracing::warn!(
                target: LOG_TARGET,
                phase = ?phase,
                sequence,
                target_id = ?target,
                "tooltip signal for unregistered target ignored"
            );
        } else {
            tracing::debug!(
                target: LOG_TARGET,
                phase = ?phase,
                sequence,
                target_id = ?target,
                outcome = ?outcome,
                scheduled = ?scheduled,
                cancelled = ?cancelled,
                phase_after = ?phase_after,
                "tooltip dispatch"
            );
        }

        TooltipDispatch {
            log: TooltipLogEntry {
                phase,
                sequence,
                target,
                scheduled,
                cancelled,
                outcome,
            },
            phase_after,
        }
    }
}

impl<P: PopupSurface> TooltipScheduler<DeterministicTimers, P> {
    /// Current deterministic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Advance the deterministic clock by `dt`, firing due timers in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<TooltipDispatch> {
        let due = self.timers.advance(dt);
        due.into_iter().map(|id| self.on_timer(id)).collect()
    }

    /// Move the deterministic clock to `now`, firing due timers in order.
    pub fn advance_to(&mut self, now: Duration) -> Vec<TooltipDispatch> {
        let due = self.timers.advance_to(now);
        due.into_iter().map(|id| self.on_timer(id)).collect()
    }

    /// Catch the deterministic clock up with `clock` and fire what came due.
    ///
    /// Native hosts call this from their event loop.
    pub fn pump(&mut self, clock: &MonotonicClock) -> Vec<TooltipDispatch> {
        self.advance_to(clock.now_mono())
    }
}

impl TooltipScheduler<DeterministicTimers, RecordedPopup> {
    /// A scheduler with deterministic timers and an in-memory popup.
    #[must_use]
    pub fn headless(config: TooltipConfig) -> Self {
        Self::with_config(config, DeterministicTimers::new(), RecordedPopup::new())
    }
}
