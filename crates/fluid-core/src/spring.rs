#![forbid(unsafe_code)]

//! Spring timing parameters and progress evaluation.
//!
//! The host toolkit's animation primitive is specified as "animate from A
//! to B over duration D with spring damping ratio R and initial velocity
//! V, then invoke a completion callback". `SpringTimingParameters` is the
//! value-type form of that contract; `value_at` evaluates the resulting
//! unit progress curve so tick-driven callers can interpolate themselves.
//!
//! # Invariants
//!
//! - `value_at` returns exactly 1.0 once `elapsed >= duration`
//! - A zero duration is treated as instantaneous (always 1.0)
//! - Damping ratios are clamped to a small positive minimum

use std::time::Duration;

use crate::geometry::Vec2;

/// Residual amplitude at which the spring is considered settled.
///
/// Determines the natural frequency derived from `duration`.
const SETTLING_EPSILON: f64 = 0.001;

const MIN_DAMPING_RATIO: f64 = 0.05;

/// Spring timing for a single animation.
///
/// `initial_velocity` is expressed in the toolkit's convention: units of
/// total travel distance per second, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringTimingParameters {
    /// Total settling duration.
    pub duration: Duration,
    /// Damping ratio; 1.0 is critically damped, below 1.0 bounces.
    pub damping_ratio: f64,
    /// Initial velocity per axis, in total-travel units per second.
    pub initial_velocity: Vec2,
}

impl SpringTimingParameters {
    /// Create spring timing with zero initial velocity.
    pub fn new(duration: Duration, damping_ratio: f64) -> Self {
        Self {
            duration,
            damping_ratio,
            initial_velocity: Vec2::ZERO,
        }
    }

    /// Set the initial velocity.
    pub fn initial_velocity(mut self, velocity: Vec2) -> Self {
        self.initial_velocity = velocity;
        self
    }

    /// Timing that completes instantly.
    pub fn instantaneous() -> Self {
        Self::new(Duration::ZERO, 1.0)
    }

    /// Whether this timing completes without any animation frames.
    #[inline]
    pub fn is_instantaneous(&self) -> bool {
        self.duration.is_zero()
    }

    /// Evaluate the unit progress curve at `elapsed` for one axis.
    ///
    /// `initial_velocity` is the per-axis velocity in total-travel units
    /// per second. The curve starts at 0.0 and settles at 1.0; damping
    /// ratios below 1.0 overshoot on the way.
    pub fn value_at(&self, elapsed: Duration, initial_velocity: f64) -> f64 {
        let total = self.duration.as_secs_f64();
        let t = elapsed.as_secs_f64();
        if total <= 0.0 || t >= total {
            return 1.0;
        }

        let zeta = self.damping_ratio.max(MIN_DAMPING_RATIO);
        // Natural frequency chosen so the envelope decays to
        // SETTLING_EPSILON at exactly `duration`.
        let omega = (1.0 / SETTLING_EPSILON).ln() / (zeta * total);
        let v0 = initial_velocity;

        // Deviation from target y = x - 1, with y(0) = -1, y'(0) = v0.
        if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega * t).exp();
            let b = (v0 - zeta * omega) / omega_d;
            1.0 + envelope * (-(omega_d * t).cos() + b * (omega_d * t).sin())
        } else {
            // Critically damped (and the over-damped clamp).
            let envelope = (-omega * t).exp();
            1.0 + envelope * (-1.0 + (v0 - omega) * t)
        }
    }

    /// Evaluate both axes at once using the stored initial velocity.
    pub fn value_at_2d(&self, elapsed: Duration) -> (f64, f64) {
        (
            self.value_at(elapsed, self.initial_velocity.dx),
            self.value_at(elapsed, self.initial_velocity.dy),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spring(duration_ms: u64, damping: f64) -> SpringTimingParameters {
        SpringTimingParameters::new(Duration::from_millis(duration_ms), damping)
    }

    #[test]
    fn starts_at_zero_settles_at_one() {
        let params = spring(800, 0.9);
        let start = params.value_at(Duration::ZERO, 0.0);
        assert!(start.abs() < 1e-9, "start was {start}");
        assert_eq!(params.value_at(Duration::from_millis(800), 0.0), 1.0);
        assert_eq!(params.value_at(Duration::from_secs(10), 0.0), 1.0);
    }

    #[test]
    fn zero_duration_is_instantaneous() {
        let params = SpringTimingParameters::instantaneous();
        assert!(params.is_instantaneous());
        assert_eq!(params.value_at(Duration::ZERO, 0.0), 1.0);
        assert_eq!(params.value_at(Duration::from_millis(1), 5.0), 1.0);
    }

    #[test]
    fn progress_moves_toward_target() {
        let params = spring(800, 1.0);
        let quarter = params.value_at(Duration::from_millis(200), 0.0);
        let half = params.value_at(Duration::from_millis(400), 0.0);
        assert!(quarter > 0.0 && quarter < 1.0);
        assert!(half > quarter);
    }

    #[test]
    fn underdamped_overshoots_critically_damped_does_not() {
        let bouncy = spring(800, 0.3);
        let mut overshoot = false;
        for i in 1..100 {
            let v = bouncy.value_at(Duration::from_millis(i * 8), 0.0);
            if v > 1.0 {
                overshoot = true;
                break;
            }
        }
        assert!(overshoot, "damping 0.3 should overshoot");

        let critical = spring(800, 1.0);
        for i in 0..=100 {
            let v = critical.value_at(Duration::from_millis(i * 8), 0.0);
            assert!(v <= 1.0 + 1e-9, "critical damping overshot: {v}");
        }
    }

    #[test]
    fn initial_velocity_pushes_progress_early() {
        let params = spring(800, 1.0);
        let still = params.value_at(Duration::from_millis(100), 0.0);
        let pushed = params.value_at(Duration::from_millis(100), 10.0);
        assert!(pushed > still);
    }

    #[test]
    fn value_at_2d_uses_per_axis_velocity() {
        let params = spring(800, 1.0).initial_velocity(Vec2::new(10.0, 0.0));
        let (x, y) = params.value_at_2d(Duration::from_millis(100));
        assert!(x > y);
    }

    #[test]
    fn damping_ratio_clamped_to_positive() {
        let params = spring(800, 0.0);
        // Must not produce NaN even with a degenerate ratio.
        let v = params.value_at(Duration::from_millis(400), 0.0);
        assert!(v.is_finite());
    }

    proptest::proptest! {
        #[test]
        fn always_finite_and_settles(
            duration_ms in 1u64..5_000,
            damping in 0.0f64..2.0,
            velocity in -50.0f64..50.0,
            sample in 0.0f64..2.0,
        ) {
            let params = spring(duration_ms, damping);
            let elapsed = Duration::from_secs_f64(
                duration_ms as f64 / 1000.0 * sample,
            );
            let v = params.value_at(elapsed, velocity);
            proptest::prop_assert!(v.is_finite());
            proptest::prop_assert_eq!(params.value_at(params.duration, velocity), 1.0);
        }
    }
}
