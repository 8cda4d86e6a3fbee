#![forbid(unsafe_code)]

//! Pan-gesture value types.
//!
//! Gesture recognition itself belongs to the host toolkit; it delivers
//! phase, translation, and velocity, and this framework only consumes
//! them. `PanGesture` is that delivery as plain data.

use crate::geometry::Vec2;

/// Recognition phase of a pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanPhase {
    /// Not yet recognized.
    #[default]
    Possible,
    /// Touch started moving.
    Began,
    /// Touch moved again.
    Changed,
    /// Touch lifted normally.
    Ended,
    /// Recognition cancelled by the system.
    Cancelled,
    /// Recognition failed.
    Failed,
}

impl PanPhase {
    /// Whether the gesture is actively tracking.
    #[inline]
    pub fn is_tracking(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Whether this phase ends the gesture (ended, cancelled, or failed).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }
}

/// One pan-gesture callback from the toolkit.
///
/// `translation` is the incremental movement since the last delivery (the
/// caller is expected to reset it each time, the way mobile-toolkit
/// recognizers report deltas); `velocity` is in container units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanGesture {
    pub phase: PanPhase,
    pub translation: Vec2,
    pub velocity: Vec2,
}

impl PanGesture {
    /// Create a gesture event.
    pub fn new(phase: PanPhase, translation: Vec2, velocity: Vec2) -> Self {
        Self {
            phase,
            translation,
            velocity,
        }
    }

    /// A tracking update with the given incremental translation.
    pub fn changed(translation: Vec2) -> Self {
        Self::new(PanPhase::Changed, translation, Vec2::ZERO)
    }

    /// A normal release with the given velocity.
    pub fn ended(velocity: Vec2) -> Self {
        Self::new(PanPhase::Ended, Vec2::ZERO, velocity)
    }

    /// A cancelled gesture.
    pub fn cancelled() -> Self {
        Self::new(PanPhase::Cancelled, Vec2::ZERO, Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_classification() {
        assert!(PanPhase::Began.is_tracking());
        assert!(PanPhase::Changed.is_tracking());
        assert!(!PanPhase::Ended.is_tracking());
        assert!(!PanPhase::Possible.is_tracking());

        assert!(PanPhase::Ended.is_terminal());
        assert!(PanPhase::Cancelled.is_terminal());
        assert!(PanPhase::Failed.is_terminal());
        assert!(!PanPhase::Changed.is_terminal());
        assert!(!PanPhase::Possible.is_terminal());
    }

    #[test]
    fn constructors_fill_phases() {
        let changed = PanGesture::changed(Vec2::new(3.0, -2.0));
        assert_eq!(changed.phase, PanPhase::Changed);
        assert_eq!(changed.translation, Vec2::new(3.0, -2.0));

        let ended = PanGesture::ended(Vec2::new(600.0, 0.0));
        assert_eq!(ended.phase, PanPhase::Ended);
        assert_eq!(ended.velocity, Vec2::new(600.0, 0.0));

        assert_eq!(PanGesture::cancelled().phase, PanPhase::Cancelled);
    }
}
