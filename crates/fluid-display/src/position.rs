#![forbid(unsafe_code)]

//! Anchor positions for floating overlays.

use fluid_core::geometry::{EdgeInsets, Rect, Size};

/// Where a floating overlay anchors within its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayPosition {
    /// Below the container's top edge (the classic notification slot).
    #[default]
    Top,
    /// Centered in the container.
    Center,
    /// Above the container's bottom edge (the classic snackbar slot).
    Bottom,
}

impl DisplayPosition {
    /// Resolve the frame for an overlay of `size` inside `container`,
    /// respecting `insets` (safe area plus any margin the host applies).
    ///
    /// Overlays are centered horizontally; the position picks the vertical
    /// slot.
    pub fn frame_in(self, container: Rect, insets: EdgeInsets, size: Size) -> Rect {
        let available = container.inset_by(insets);
        let x = available.mid_x() - size.width / 2.0;
        let y = match self {
            Self::Top => available.min_y(),
            Self::Center => available.mid_y() - size.height / 2.0,
            Self::Bottom => available.max_y() - size.height,
        };
        Rect::new(x, y, size.width, size.height)
    }
}
