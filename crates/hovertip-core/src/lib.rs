#![forbid(unsafe_code)]

//! Core: debounced hover-tooltip scheduling.
//!
//! # Role in hovertip
//! `hovertip-core` decides *when* the shared tooltip popup of the admin
//! console is shown or hidden. It owns the tooltip state machine and is
//! independent of any concrete timer or DOM API.
//!
//! # Primary responsibilities
//! - **TooltipScheduler**: pointer enter/leave handling with show/hide delays.
//! - **TargetRegistry**: which elements carry a tip, and the tip text.
//! - **DelayScheduler**: the cancellable delayed-task seam, with a
//!   deterministic host-driven implementation.
//! - **PopupSurface**: the presentation seam for the single reused popup.
//! - **TooltipConfig**: delays and pointer offset, optionally loaded from
//!   TOML/JSON (`config` feature).
//!
//! # How it fits in the system
//! `hovertip-web` wires the scheduler to a browser host by translating timer
//! and popup calls into commands the JavaScript side applies.

pub mod config;
pub mod geometry;
pub mod popup;
pub mod scheduler;
pub mod target;
pub mod timer;

pub use config::{TooltipConfig, TooltipConfigError};
pub use geometry::{PagePoint, ScrollOffset};
pub use popup::{PopupSurface, RecordedPopup};
pub use scheduler::{
    PendingAction, PendingTimer, TooltipDispatch, TooltipIgnoredReason, TooltipLifecyclePhase,
    TooltipLogEntry, TooltipOutcome, TooltipPhase, TooltipScheduler, TooltipState,
};
pub use target::{Registration, TargetId, TargetRegistry};
pub use timer::{DelayScheduler, DeterministicTimers, MonotonicClock, TimerId};
