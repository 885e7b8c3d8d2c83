#![forbid(unsafe_code)]

//! Pointer and page coordinates.
//!
//! Hosts report pointer positions in client (viewport) coordinates. The popup
//! is positioned in page coordinates, so the current scroll offset is added
//! before the tooltip offset is applied.

/// A point in page coordinates (CSS pixels, origin at the document top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PagePoint {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl PagePoint {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by `(dx, dy)`, saturating at the `i32` bounds.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Document scroll position at the time of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ScrollOffset {
    /// `window.pageXOffset` or equivalent.
    pub horizontal: i32,
    /// `window.pageYOffset` or equivalent.
    pub vertical: i32,
}

impl ScrollOffset {
    /// No scrolling.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a new scroll offset.
    #[inline]
    pub const fn new(horizontal: i32, vertical: i32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Convert a client-space pointer position to page space.
    #[inline]
    pub const fn to_page(self, client_x: i32, client_y: i32) -> PagePoint {
        PagePoint::new(client_x, client_y).offset(self.horizontal, self.vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_translates() {
        assert_eq!(PagePoint::new(10, 20).offset(15, 15), PagePoint::new(25, 35));
        assert_eq!(PagePoint::new(10, 20).offset(-5, -30), PagePoint::new(5, -10));
    }

    #[test]
    fn offset_saturates() {
        let p = PagePoint::new(i32::MAX - 1, i32::MIN + 1).offset(15, -15);
        assert_eq!(p, PagePoint::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn zero_scroll_is_identity() {
        assert_eq!(ScrollOffset::ZERO.to_page(7, 9), PagePoint::new(7, 9));
    }

    #[test]
    fn scroll_shifts_into_page_space() {
        let scroll = ScrollOffset::new(30, 400);
        assert_eq!(scroll.to_page(7, 9), PagePoint::new(37, 409));
    }
}
