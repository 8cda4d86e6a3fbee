#![forbid(unsafe_code)]

//! Tick-driven one-shot animator.
//!
//! Stands in for the toolkit's animation primitive: construct it with
//! spring timing, advance it with `tick(delta)` from the host's frame
//! loop, and read interpolation values until it reports completion.
//!
//! # Invariants
//!
//! - `tick` returns `true` exactly once, on the tick that finishes
//! - Instantaneous springs finish on the first `tick`, matching the
//!   zero-duration behavior of the toolkit primitive
//! - After finishing, progress values are pinned to 1.0

use std::time::Duration;

use crate::spring::SpringTimingParameters;

/// A one-shot animation driven by explicit ticks.
#[derive(Debug, Clone)]
pub struct SpringAnimator {
    params: SpringTimingParameters,
    elapsed: Duration,
    finished: bool,
}

impl SpringAnimator {
    /// Start an animation with the given timing.
    pub fn new(params: SpringTimingParameters) -> Self {
        Self {
            params,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// The timing this animator runs with.
    pub fn params(&self) -> &SpringTimingParameters {
        &self.params
    }

    /// Whether the animation has completed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether this animation completes without any frames.
    #[inline]
    pub fn is_instantaneous(&self) -> bool {
        self.params.is_instantaneous()
    }

    /// Advance by `delta`.
    ///
    /// Returns `true` on the tick that completes the animation, `false`
    /// otherwise (including every tick after completion).
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.finished {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed >= self.params.duration {
            self.finished = true;
            return true;
        }
        false
    }

    /// Force completion, as when a transition is superseded.
    pub fn finish(&mut self) {
        self.finished = true;
        self.elapsed = self.params.duration;
    }

    /// Current spring progress per axis.
    ///
    /// Values start at 0.0 and settle at 1.0; underdamped springs pass
    /// through values above 1.0 on the way.
    pub fn value(&self) -> (f64, f64) {
        if self.finished {
            return (1.0, 1.0);
        }
        self.params.value_at_2d(self.elapsed)
    }

    /// Current spring progress on the horizontal axis only.
    pub fn value_x(&self) -> f64 {
        self.value().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    fn spring_ms(ms: u64) -> SpringTimingParameters {
        SpringTimingParameters::new(Duration::from_millis(ms), 1.0)
    }

    #[test]
    fn finishes_exactly_once() {
        let mut animator = SpringAnimator::new(spring_ms(100));
        assert!(!animator.tick(Duration::from_millis(60)));
        assert!(animator.tick(Duration::from_millis(60)));
        assert!(animator.is_finished());
        assert!(!animator.tick(Duration::from_millis(60)));
    }

    #[test]
    fn instantaneous_finishes_on_first_tick() {
        let mut animator = SpringAnimator::new(SpringTimingParameters::instantaneous());
        assert!(animator.is_instantaneous());
        assert!(!animator.is_finished());
        assert!(animator.tick(Duration::ZERO));
        assert_eq!(animator.value(), (1.0, 1.0));
    }

    #[test]
    fn value_progresses_and_pins_at_one() {
        let mut animator = SpringAnimator::new(spring_ms(800));
        animator.tick(Duration::from_millis(200));
        let (x, y) = animator.value();
        assert!(x > 0.0 && x < 1.0);
        assert_eq!(x, y);

        animator.tick(Duration::from_secs(1));
        assert_eq!(animator.value(), (1.0, 1.0));
    }

    #[test]
    fn finish_pins_progress() {
        let mut animator = SpringAnimator::new(spring_ms(800));
        animator.tick(Duration::from_millis(100));
        animator.finish();
        assert!(animator.is_finished());
        assert_eq!(animator.value(), (1.0, 1.0));
    }

    #[test]
    fn per_axis_velocity_splits_progress() {
        let params = spring_ms(800).initial_velocity(Vec2::new(8.0, 0.0));
        let mut animator = SpringAnimator::new(params);
        animator.tick(Duration::from_millis(100));
        let (x, y) = animator.value();
        assert!(x > y);
    }
}
