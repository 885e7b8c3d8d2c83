#![forbid(unsafe_code)]

//! The shared popup element.
//!
//! There is exactly one popup per scheduler. It is reused for every target:
//! hiding it never destroys it.

use crate::geometry::PagePoint;

/// Presentation half of the tooltip: whatever displays the tip text.
///
/// In a browser this is a `<div>` whose visibility is toggled through a CSS
/// class; tests and headless hosts use [`RecordedPopup`].
pub trait PopupSurface {
    /// Replace the popup content with `tip`.
    fn set_content(&mut self, tip: &str);

    /// Move the popup's top-left corner to `at` (page coordinates).
    fn move_to(&mut self, at: PagePoint);

    /// Show or hide the popup.
    fn set_visible(&mut self, visible: bool);
}

/// In-memory popup that records its current presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedPopup {
    content: String,
    position: Option<PagePoint>,
    visible: bool,
    mutations: u64,
}

impl RecordedPopup {
    /// Create a hidden, empty popup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Last position set, if the popup was ever moved.
    #[must_use]
    pub const fn position(&self) -> Option<PagePoint> {
        self.position
    }

    /// Whether the popup is displayed.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Total number of surface calls received.
    ///
    /// A stable count across an interaction means the popup did not flicker.
    #[must_use]
    pub const fn mutations(&self) -> u64 {
        self.mutations
    }
}

impl PopupSurface for RecordedPopup {
    fn set_content(&mut self, tip: &str) {
        self.mutations += 1;
        tip.clone_into(&mut self.content);
    }

    fn move_to(&mut self, at: PagePoint) {
        self.mutations += 1;
        self.position = Some(at);
    }

    fn set_visible(&mut self, visible: bool) {
        self.mutations += 1;
        self.visible = visible;
    }
}
