#![forbid(unsafe_code)]

//! `hovertip-web` drives the tooltip scheduler from a browser host.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) forwards DOM pointer
//!   events and timer expiries as [`TooltipInput`] values.
//! - **Command output**: DOM mutations and `setTimeout` / `clearTimeout`
//!   calls come back as an ordered queue of [`HostCommand`]s.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The popup `<div>` is created lazily the first time it is needed and is
//! shown and hidden by toggling [`HIDDEN_CLASS`], never removed.
//!
//! With the `json-bridge` feature, [`input_parser`] decodes host-encoded
//! JSON inputs and commands serialize to JSON; on `wasm32` a `wasm-bindgen`
//! `TooltipBridge` exposes the whole host to JavaScript.

#[cfg(feature = "json-bridge")]
pub mod input_parser;

#[cfg(all(target_arch = "wasm32", feature = "json-bridge"))]
mod bindings;

use core::time::Duration;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hovertip_core::{
    DelayScheduler, PagePoint, PopupSurface, ScrollOffset, TargetId, TimerId, TooltipConfig,
    TooltipDispatch, TooltipScheduler,
};

/// CSS class given to the popup element.
pub const POPUP_CLASS: &str = "popup";
/// CSS class toggled to hide the popup.
pub const HIDDEN_CLASS: &str = "hidden";

/// One DOM or timer operation for the JS host to apply, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json-bridge", derive(serde::Serialize))]
#[cfg_attr(feature = "json-bridge", serde(tag = "op", rename_all = "snake_case"))]
pub enum HostCommand {
    /// Create the popup `<div>` with `class` and append it to `<body>`.
    /// Registers the popup's own pointer handlers.
    CreatePopup { class: &'static str },
    /// Replace the popup's `innerHTML`.
    SetContent { html: String },
    /// Set the popup's `style.left` / `style.top` in pixels.
    MoveTo { left: i32, top: i32 },
    /// Add a CSS class to the popup.
    AddClass { class: &'static str },
    /// Remove a CSS class from the popup.
    RemoveClass { class: &'static str },
    /// Start a timer; report expiry with [`TooltipInput::TimerFired`].
    SetTimeout { timer: u64, delay_ms: u64 },
    /// Cancel a timer started by [`HostCommand::SetTimeout`].
    ClearTimeout { timer: u64 },
}

/// Host-originated signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipInput {
    /// `mouseover` on a registered element, client coordinates.
    PointerEnter { target: TargetId, x: i32, y: i32 },
    /// `mouseout` on a registered element.
    PointerLeave { target: TargetId },
    /// `mouseover` on the popup.
    PopupEnter,
    /// `mouseout` on the popup.
    PopupLeave,
    /// `click` on the popup.
    PopupClick,
    /// A `SetTimeout` timer expired.
    TimerFired { timer: u64 },
    /// The document scrolled to `(x, y)`.
    Scroll { x: i32, y: i32 },
}

/// Shared, single-threaded command queue.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Rc<RefCell<VecDeque<HostCommand>>>,
}

impl CommandQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn push(&self, command: HostCommand) {
        self.inner.borrow_mut().push_back(command);
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Take every queued command in order.
    pub fn drain(&self) -> Vec<HostCommand> {
        self.inner.borrow_mut().drain(..).collect()
    }
}

/// [`DelayScheduler`] that asks the host to run `setTimeout`.
#[derive(Debug, Clone)]
pub struct HostTimers {
    commands: CommandQueue,
    next_id: u64,
    outstanding: Vec<TimerId>,
}

impl HostTimers {
    /// Create timers that emit into `commands`.
    #[must_use]
    pub fn new(commands: CommandQueue) -> Self {
        Self {
            commands,
            next_id: 1,
            outstanding: Vec::new(),
        }
    }

    /// Whether the host still owns a running timer for `id`.
    #[must_use]
    pub fn is_outstanding(&self, id: TimerId) -> bool {
        self.outstanding.contains(&id)
    }

    /// Forget a timer the host reported as expired.
    pub fn mark_fired(&mut self, id: TimerId) {
        self.outstanding.retain(|t| *t != id);
    }
}

impl DelayScheduler for HostTimers {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId::from_raw(self.next_id);
        self.next_id += 1;
        self.outstanding.push(id);
        self.commands.push(HostCommand::SetTimeout {
            timer: id.get(),
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if self.is_outstanding(id) {
            self.outstanding.retain(|t| *t != id);
            self.commands.push(HostCommand::ClearTimeout { timer: id.get() });
        }
    }
}

/// [`PopupSurface`] that emits DOM commands for the shared popup `<div>`.
#[derive(Debug, Clone)]
pub struct HostPopup {
    commands: CommandQueue,
    created: bool,
}

impl HostPopup {
    /// Create a popup that emits into `commands`.
    #[must_use]
    pub fn new(commands: CommandQueue) -> Self {
        Self {
            commands,
            created: false,
        }
    }

    /// Whether the popup element has been requested from the host.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created
    }

    fn ensure_created(&mut self) {
        if self.created {
            return;
        }
        self.created = true;
        self.commands.push(HostCommand::CreatePopup { class: POPUP_CLASS });
        self.commands.push(HostCommand::AddClass {
            class: HIDDEN_CLASS,
        });
    }
}

impl PopupSurface for HostPopup {
    fn set_content(&mut self, tip: &str) {
        self.ensure_created();
        self.commands.push(HostCommand::SetContent {
            html: tip.to_owned(),
        });
    }

    fn move_to(&mut self, at: PagePoint) {
        self.ensure_created();
        self.commands.push(HostCommand::MoveTo {
            left: at.x,
            top: at.y,
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.ensure_created();
        let class = HIDDEN_CLASS;
        self.commands.push(if visible {
            HostCommand::RemoveClass { class }
        } else {
            HostCommand::AddClass { class }
        });
    }
}

/// Tooltip scheduler wired to a browser host through [`HostCommand`]s.
#[derive(Debug)]
pub struct WebTooltipHost {
    scheduler: TooltipScheduler<HostTimers, HostPopup>,
    commands: CommandQueue,
}

impl WebTooltipHost {
    /// Create a host with `config`.
    #[must_use]
    pub fn new(config: TooltipConfig) -> Self {
        let commands = CommandQueue::new();
        let scheduler = TooltipScheduler::with_config(
            config,
            HostTimers::new(commands.clone()),
            HostPopup::new(commands.clone()),
        );
        Self {
            scheduler,
            commands,
        }
    }

    /// The underlying scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &TooltipScheduler<HostTimers, HostPopup> {
        &self.scheduler
    }

    /// Register an element carrying `tip`.
    pub fn register(&mut self, target: TargetId, tip: impl Into<String>) -> TooltipDispatch {
        self.scheduler.register(target, tip)
    }

    /// Remove a registered element.
    pub fn unregister(&mut self, target: TargetId) -> TooltipDispatch {
        self.scheduler.unregister(target)
    }

    /// Replace an element's tip text.
    pub fn set_tip(&mut self, target: TargetId, tip: impl Into<String>) -> TooltipDispatch {
        self.scheduler.set_tip(target, tip)
    }

    /// Apply one host signal. Scroll updates produce no dispatch.
    pub fn handle(&mut self, input: TooltipInput) -> Option<TooltipDispatch> {
        let dispatch = match input {
            TooltipInput::PointerEnter { target, x, y } => {
                self.scheduler.on_pointer_enter(target, x, y)
            }
            TooltipInput::PointerLeave { target } => self.scheduler.on_pointer_leave(target),
            TooltipInput::PopupEnter => self.scheduler.on_popup_pointer_enter(),
            TooltipInput::PopupLeave => self.scheduler.on_popup_pointer_leave(),
            TooltipInput::PopupClick => self.scheduler.on_popup_click(),
            TooltipInput::TimerFired { timer } => self.timer_fired(timer),
            TooltipInput::Scroll { x, y } => {
                self.scheduler.set_scroll(ScrollOffset::new(x, y));
                return None;
            }
        };
        Some(dispatch)
    }

    /// A `SetTimeout` timer expired on the host.
    pub fn timer_fired(&mut self, timer: u64) -> TooltipDispatch {
        let id = TimerId::from_raw(timer);
        self.scheduler.timers_mut().mark_fired(id);
        self.scheduler.on_timer(id)
    }

    /// Number of commands waiting for the host.
    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Take every queued command in order.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        let drained = self.commands.drain();
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "hovertip.web",
            commands = drained.len(),
            "drained host commands"
        );
        drained
    }
}

impl Default for WebTooltipHost {
    fn default() -> Self {
        Self::new(TooltipConfig::default())
    }
}

/// Serialize commands as a JSON array for the host.
#[cfg(feature = "json-bridge")]
pub fn encode_commands(commands: &[HostCommand]) -> Result<String, serde_json::Error> {
    serde_json::to_string(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hovertip_core::{TooltipOutcome, TooltipPhase};
    use pretty_assertions::assert_eq;

    const A: TargetId = TargetId(1);

    fn host() -> WebTooltipHost {
        let mut host = WebTooltipHost::default();
        host.register(A, "Maximum URLs per sitemap");
        host
    }

    #[test]
    fn enter_requests_timer_only() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 10, y: 20 });
        assert_eq!(
            host.drain_commands(),
            vec![HostCommand::SetTimeout {
                timer: 1,
                delay_ms: 500
            }]
        );
    }

    #[test]
    fn first_show_creates_popup_lazily() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 10, y: 20 });
        host.drain_commands();

        let d = host.timer_fired(1);
        assert_eq!(d.log.outcome, TooltipOutcome::Shown);
        assert_eq!(
            host.drain_commands(),
            vec![
                HostCommand::CreatePopup { class: POPUP_CLASS },
                HostCommand::AddClass {
                    class: HIDDEN_CLASS
                },
                HostCommand::MoveTo { left: 25, top: 35 },
                HostCommand::SetContent {
                    html: "Maximum URLs per sitemap".to_owned()
                },
                HostCommand::RemoveClass {
                    class: HIDDEN_CLASS
                },
            ]
        );
        assert!(host.scheduler().popup().is_created());
    }

    #[test]
    fn popup_is_created_once() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        host.timer_fired(1);
        host.handle(TooltipInput::PointerLeave { target: A });
        host.timer_fired(2);
        host.drain_commands();

        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        host.timer_fired(3);
        let commands = host.drain_commands();
        assert!(
            !commands
                .iter()
                .any(|c| matches!(c, HostCommand::CreatePopup { .. }))
        );
        assert_eq!(
            commands.last(),
            Some(&HostCommand::RemoveClass {
                class: HIDDEN_CLASS
            })
        );
    }

    #[test]
    fn leave_before_show_clears_timeout() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        host.handle(TooltipInput::PointerLeave { target: A });
        assert_eq!(
            host.drain_commands(),
            vec![
                HostCommand::SetTimeout {
                    timer: 1,
                    delay_ms: 500
                },
                HostCommand::ClearTimeout { timer: 1 },
            ]
        );
        // A late expiry from the host is stale and changes nothing.
        assert!(host.timer_fired(1).is_ignored());
        assert_eq!(host.pending_commands(), 0);
    }

    #[test]
    fn fired_timer_is_not_cleared_again() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        host.timer_fired(1);
        host.drain_commands();

        host.handle(TooltipInput::PointerLeave { target: A });
        assert_eq!(
            host.drain_commands(),
            vec![HostCommand::SetTimeout {
                timer: 2,
                delay_ms: 200
            }]
        );
    }

    #[test]
    fn popup_hover_clears_hide_timeout() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        host.timer_fired(1);
        host.handle(TooltipInput::PointerLeave { target: A });
        host.drain_commands();

        let d = host.handle(TooltipInput::PopupEnter).unwrap();
        assert_eq!(d.phase_after, TooltipPhase::Visible);
        assert_eq!(
            host.drain_commands(),
            vec![HostCommand::ClearTimeout { timer: 2 }]
        );
    }

    #[test]
    fn popup_click_hides_now() {
        let mut host = host();
        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        host.timer_fired(1);
        host.handle(TooltipInput::PopupEnter);
        host.drain_commands();

        host.handle(TooltipInput::PopupClick);
        assert_eq!(
            host.drain_commands(),
            vec![HostCommand::AddClass {
                class: HIDDEN_CLASS
            }]
        );
    }

    #[test]
    fn scroll_updates_anchor() {
        let mut host = host();
        assert!(host.handle(TooltipInput::Scroll { x: 0, y: 250 }).is_none());
        host.handle(TooltipInput::PointerEnter { target: A, x: 5, y: 5 });
        host.handle(TooltipInput::TimerFired { timer: 1 });
        assert!(
            host.drain_commands()
                .contains(&HostCommand::MoveTo { left: 20, top: 270 })
        );
    }

    #[test]
    fn custom_delays_reach_host() {
        let config = TooltipConfig {
            show_delay_ms: 750,
            ..TooltipConfig::default()
        };
        let mut host = WebTooltipHost::new(config);
        host.register(A, "tip");
        host.handle(TooltipInput::PointerEnter { target: A, x: 0, y: 0 });
        assert_eq!(
            host.drain_commands(),
            vec![HostCommand::SetTimeout {
                timer: 1,
                delay_ms: 750
            }]
        );
    }

    #[cfg(feature = "json-bridge")]
    #[test]
    fn commands_encode_with_op_tag() {
        let json = encode_commands(&[
            HostCommand::SetTimeout {
                timer: 7,
                delay_ms: 500,
            },
            HostCommand::AddClass {
                class: HIDDEN_CLASS,
            },
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"[{"op":"set_timeout","timer":7,"delay_ms":500},{"op":"add_class","class":"hidden"}]"#
        );
    }
}
