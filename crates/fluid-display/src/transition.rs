#![forbid(unsafe_code)]

//! Enter/exit animation pairs for floating overlays.

use std::time::Duration;

use fluid_core::spring::SpringTimingParameters;

/// The animation pair a floating overlay is displayed with.
///
/// Each queued entry carries its own transition; the controller drives the
/// enter spring when the entry is promoted to visible and the exit spring
/// when it is dismissed or preempted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingDisplayTransition {
    /// Timing for animating the overlay in.
    pub enter: SpringTimingParameters,
    /// Timing for animating the overlay out.
    pub exit: SpringTimingParameters,
}

impl FloatingDisplayTransition {
    /// Create a transition from explicit enter/exit timing.
    pub fn new(enter: SpringTimingParameters, exit: SpringTimingParameters) -> Self {
        Self { enter, exit }
    }

    /// Bouncy entrance, quick settle on the way out.
    pub fn slide_in() -> Self {
        Self::new(
            SpringTimingParameters::new(Duration::from_millis(500), 0.85),
            SpringTimingParameters::new(Duration::from_millis(300), 1.0),
        )
    }

    /// Symmetric short fade.
    pub fn fade() -> Self {
        let timing = SpringTimingParameters::new(Duration::from_millis(250), 1.0);
        Self::new(timing, timing)
    }

    /// Both directions complete synchronously.
    pub fn no_animation() -> Self {
        Self::new(
            SpringTimingParameters::instantaneous(),
            SpringTimingParameters::instantaneous(),
        )
    }
}

impl Default for FloatingDisplayTransition {
    fn default() -> Self {
        Self::slide_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_animation_is_instantaneous_both_ways() {
        let transition = FloatingDisplayTransition::no_animation();
        assert!(transition.enter.is_instantaneous());
        assert!(transition.exit.is_instantaneous());
    }

    #[test]
    fn default_is_animated() {
        let transition = FloatingDisplayTransition::default();
        assert!(!transition.enter.is_instantaneous());
        assert!(!transition.exit.is_instantaneous());
    }
}
