#![forbid(unsafe_code)]

//! Picture-in-picture positioning: a draggable floating panel that snaps
//! to container corners.
//!
//! The panel has three modes:
//!
//! - `Maximizing` — fills the container, no snapping
//! - `Folding` — hidden; layout is skipped entirely
//! - `Floating` — fixed-size panel snapped to one of four corners
//!
//! While floating, pan gestures move the panel under the finger
//! (spring-smoothed direct manipulation). On release the snap corner is
//! chosen per axis: the quadrant the panel currently sits in, unless the
//! gesture velocity on that axis exceeds the flick threshold, in which
//! case the flick direction wins for that axis.
//!
//! The release spring's initial velocity divides raw gesture velocity by
//! the positional delta per axis, zeroing non-finite components. The
//! units are inconsistent (velocity over distance rather than velocity),
//! but the resulting feel is what ships; kept as-is.

use std::time::Duration;

use bitflags::bitflags;
use fluid_core::animation::SpringAnimator;
use fluid_core::geometry::{EdgeInsets, Point, Rect, Size, Vec2};
use fluid_core::gesture::PanGesture;
use fluid_core::spring::SpringTimingParameters;

/// Panel size while floating.
const SIZE_FOR_FLOATING: Size = Size::new(100.0, 140.0);

/// Margin applied inside the safe area while floating.
const FLOATING_MARGIN: f64 = 12.0;

/// Per-axis gesture velocity beyond which a flick overrides the
/// location-based snap on that axis, in container units per second.
const FLICK_VELOCITY_THRESHOLD: f64 = 500.0;

fn mode_change_spring() -> SpringTimingParameters {
    SpringTimingParameters::new(Duration::from_millis(800), 0.9)
}

fn drag_tracking_spring() -> SpringTimingParameters {
    SpringTimingParameters::new(Duration::from_millis(400), 1.0)
}

fn release_spring(initial_velocity: Vec2) -> SpringTimingParameters {
    SpringTimingParameters::new(Duration::from_millis(800), 0.8)
        .initial_velocity(initial_velocity)
}

bitflags! {
    /// Edge flags selecting the floating panel's snap corner.
    ///
    /// One horizontal and one vertical flag form a corner. Opposite flags
    /// on the same axis never coexist: the flick-override logic removes
    /// the opposite flag before inserting the new one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SnapPosition: u8 {
        const RIGHT = 1 << 0;
        const LEFT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl Default for SnapPosition {
    fn default() -> Self {
        Self::RIGHT | Self::BOTTOM
    }
}

/// Display mode of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PictureInPictureMode {
    /// Fills the container; snapping is inactive.
    Maximizing,
    /// Hidden; no active layout.
    Folding,
    /// Small fixed-size panel snapped to a corner.
    #[default]
    Floating,
}

/// Environment snapshot that floating layout depends on.
///
/// Floating layout recomputes only when this changes, so transient layout
/// passes with identical geometry leave a dragged panel where it is.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutCondition {
    bounds: Rect,
    safe_area_insets: EdgeInsets,
    layout_margins: EdgeInsets,
}

#[derive(Debug, Clone)]
struct FrameAnimation {
    from: Rect,
    to: Rect,
    animator: SpringAnimator,
}

/// Drag-to-reposition floating panel controller.
///
/// Tick-driven like the rest of the framework: feed pan gestures and
/// environment updates in, advance springs with [`Self::tick`], read the
/// current panel placement from [`Self::frame`].
#[derive(Debug)]
pub struct PictureInPictureController {
    mode: PictureInPictureMode,
    snapping_position: SnapPosition,
    condition: Option<LayoutCondition>,
    bounds: Rect,
    safe_area_insets: EdgeInsets,
    layout_margins: EdgeInsets,
    /// Settled frame; the target while an animation is in flight.
    frame: Rect,
    animation: Option<FrameAnimation>,
}

impl PictureInPictureController {
    /// Create a floating panel in the given container bounds.
    ///
    /// Starts in `Floating` mode snapped to the bottom-right corner.
    pub fn new(bounds: Rect) -> Self {
        let mut controller = Self {
            mode: PictureInPictureMode::default(),
            snapping_position: SnapPosition::default(),
            condition: None,
            bounds,
            safe_area_insets: EdgeInsets::ZERO,
            layout_margins: EdgeInsets::ZERO,
            frame: Rect::ZERO,
            animation: None,
        };
        controller.layout_if_needed();
        controller
    }

    /// The current mode.
    pub fn mode(&self) -> PictureInPictureMode {
        self.mode
    }

    /// The snap corner the panel targets while floating.
    pub fn snapping_position(&self) -> SnapPosition {
        self.snapping_position
    }

    /// Whether a placement spring is still settling.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// The panel's frame right now, mid-animation values included.
    pub fn frame(&self) -> Rect {
        match &self.animation {
            Some(animation) => {
                let (tx, ty) = animation.animator.value();
                let from_center = animation.from.center();
                let to_center = animation.to.center();
                let center = Point::new(
                    from_center.x + (to_center.x - from_center.x) * tx,
                    from_center.y + (to_center.y - from_center.y) * ty,
                );
                let size = Size::new(
                    animation.from.size.width
                        + (animation.to.size.width - animation.from.size.width) * tx,
                    animation.from.size.height
                        + (animation.to.size.height - animation.from.size.height) * ty,
                );
                Rect::from_origin_size(Point::ZERO, size).with_center(center)
            }
            None => self.frame,
        }
    }

    // ------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------

    /// Update the container bounds (rotation, window resize).
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.layout_if_needed();
    }

    /// Update the container's safe-area insets.
    pub fn set_safe_area_insets(&mut self, insets: EdgeInsets) {
        self.safe_area_insets = insets;
        self.layout_if_needed();
    }

    /// Update the container's layout margins.
    pub fn set_layout_margins(&mut self, margins: EdgeInsets) {
        self.layout_margins = margins;
        self.layout_if_needed();
    }

    /// Run a non-animated layout pass.
    ///
    /// Maximizing pins the frame to the container and drops the cached
    /// condition. Folding skips layout entirely. Floating recomputes the
    /// snap frame only when the layout condition actually changed.
    pub fn layout_if_needed(&mut self) {
        match self.mode {
            PictureInPictureMode::Maximizing => {
                self.frame = self.bounds;
                self.animation = None;
                self.condition = None;
            }
            PictureInPictureMode::Folding => {}
            PictureInPictureMode::Floating => {
                let proposed = LayoutCondition {
                    bounds: self.bounds,
                    safe_area_insets: self.safe_area_insets,
                    layout_margins: self.layout_margins,
                };
                if self.condition == Some(proposed) {
                    return;
                }
                self.condition = Some(proposed);
                self.frame = self.frame_for_floating(self.snapping_position);
                self.animation = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Mode changes
    // ------------------------------------------------------------------

    /// Switch mode, animating the relayout with the mode-change spring.
    pub fn set_mode(&mut self, mode: PictureInPictureMode) {
        self.mode = mode;
        let target = match mode {
            PictureInPictureMode::Maximizing => {
                self.condition = None;
                self.bounds
            }
            PictureInPictureMode::Folding => return,
            PictureInPictureMode::Floating => {
                self.condition = Some(LayoutCondition {
                    bounds: self.bounds,
                    safe_area_insets: self.safe_area_insets,
                    layout_margins: self.layout_margins,
                });
                self.frame_for_floating(self.snapping_position)
            }
        };
        self.animate_to(target, mode_change_spring());
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Feed one pan-gesture delivery.
    ///
    /// Ignored outside `Floating` mode. Tracking phases move the panel by
    /// the incremental translation under a short critically-damped
    /// spring; terminal phases pick the snap corner and release.
    pub fn handle_pan(&mut self, gesture: PanGesture) {
        if self.mode != PictureInPictureMode::Floating {
            return;
        }
        if gesture.phase.is_tracking() {
            let current = self.frame();
            let center = current.center();
            let target = current.with_center(Point::new(
                center.x + gesture.translation.dx,
                center.y + gesture.translation.dy,
            ));
            self.animate_to(target, drag_tracking_spring());
        } else if gesture.phase.is_terminal() {
            let frame = self.frame();
            let location = self.location_based_anchor(frame);
            let flick = flick_direction(gesture.velocity);
            self.snapping_position = apply_flick(location, flick);

            let from_center = frame.center();
            let target = self.frame_for_floating(self.snapping_position);
            let to_center = target.center();
            let delta = Vec2::new(to_center.x - from_center.x, to_center.y - from_center.y);

            let mut base_velocity = Vec2::new(
                gesture.velocity.dx / delta.dx,
                gesture.velocity.dy / delta.dy,
            );
            base_velocity.dx = if base_velocity.dx.is_finite() {
                base_velocity.dx
            } else {
                0.0
            };
            base_velocity.dy = if base_velocity.dy.is_finite() {
                base_velocity.dy
            } else {
                0.0
            };

            self.animate_to(target, release_spring(base_velocity));
        }
    }

    /// Advance the placement spring by `delta`.
    pub fn tick(&mut self, delta: Duration) {
        if let Some(animation) = self.animation.as_mut()
            && animation.animator.tick(delta)
        {
            self.animation = None;
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn animate_to(&mut self, target: Rect, spring: SpringTimingParameters) {
        let from = self.frame();
        self.frame = target;
        if spring.is_instantaneous() || from == target {
            self.animation = None;
        } else {
            self.animation = Some(FrameAnimation {
                from,
                to: target,
                animator: SpringAnimator::new(spring),
            });
        }
    }

    /// The quadrant the panel currently sits in.
    ///
    /// Horizontal uses the frame's left edge, vertical its midpoint; the
    /// asymmetry is inherited behavior and kept intact.
    fn location_based_anchor(&self, frame: Rect) -> SnapPosition {
        match (
            self.bounds.mid_x() > frame.min_x(),
            self.bounds.mid_y() > frame.mid_y(),
        ) {
            (true, true) => SnapPosition::LEFT | SnapPosition::TOP,
            (true, false) => SnapPosition::LEFT | SnapPosition::BOTTOM,
            (false, true) => SnapPosition::RIGHT | SnapPosition::TOP,
            (false, false) => SnapPosition::RIGHT | SnapPosition::BOTTOM,
        }
    }

    fn frame_for_floating(&self, snapping_position: SnapPosition) -> Rect {
        let inset_frame = self
            .bounds
            .inset_by(self.safe_area_insets)
            .inset_by(EdgeInsets::uniform(FLOATING_MARGIN));

        let mut origin = Point::ZERO;

        if snapping_position.contains(SnapPosition::TOP) {
            origin.y = inset_frame.min_y();
        }
        if snapping_position.contains(SnapPosition::BOTTOM) {
            origin.y = inset_frame.max_y() - SIZE_FOR_FLOATING.height;
        }
        if snapping_position.contains(SnapPosition::LEFT) {
            origin.x = inset_frame.min_x();
        }
        if snapping_position.contains(SnapPosition::RIGHT) {
            origin.x = inset_frame.max_x() - SIZE_FOR_FLOATING.width;
        }

        Rect::from_origin_size(origin, SIZE_FOR_FLOATING)
    }
}

/// Per-axis flick flags for the given gesture velocity.
///
/// Both axes are independent; either or both may be empty.
fn flick_direction(velocity: Vec2) -> SnapPosition {
    let mut directions = SnapPosition::empty();

    if velocity.dx < -FLICK_VELOCITY_THRESHOLD {
        directions.insert(SnapPosition::LEFT);
    } else if velocity.dx >= FLICK_VELOCITY_THRESHOLD {
        directions.insert(SnapPosition::RIGHT);
    }

    if velocity.dy < -FLICK_VELOCITY_THRESHOLD {
        directions.insert(SnapPosition::TOP);
    } else if velocity.dy >= FLICK_VELOCITY_THRESHOLD {
        directions.insert(SnapPosition::BOTTOM);
    }

    directions
}

/// Flick wins over location, per axis independently; the opposite flag on
/// the axis is removed before the flick's flag is inserted.
fn apply_flick(location: SnapPosition, flick: SnapPosition) -> SnapPosition {
    let mut base = location;

    if flick.contains(SnapPosition::TOP) {
        base.remove(SnapPosition::BOTTOM);
        base.insert(SnapPosition::TOP);
    }
    if flick.contains(SnapPosition::BOTTOM) {
        base.remove(SnapPosition::TOP);
        base.insert(SnapPosition::BOTTOM);
    }
    if flick.contains(SnapPosition::RIGHT) {
        base.remove(SnapPosition::LEFT);
        base.insert(SnapPosition::RIGHT);
    }
    if flick.contains(SnapPosition::LEFT) {
        base.remove(SnapPosition::RIGHT);
        base.insert(SnapPosition::LEFT);
    }

    base
}
