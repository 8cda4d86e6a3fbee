#![forbid(unsafe_code)]

//! Transient overlay management for the fluid presentation framework:
//!
//! - [`FloatingDisplayController`] — a serial display queue for
//!   snackbar-style overlays, at most one visible at a time
//! - [`DisplayPosition`] — where an overlay anchors within its container
//! - [`PictureInPictureController`] — a drag-to-reposition floating panel
//!   with velocity-based corner snapping
//!
//! Like the rest of the framework, everything here is single-threaded and
//! tick-driven: the host advances animations by calling `tick` with frame
//! deltas and reacts to the returned actions. Timeout-driven auto-dismiss
//! is the caller's responsibility; this layer only models explicit
//! dismissal.

pub mod controller;
pub mod pip;
pub mod position;
pub mod transition;

pub use controller::{
    DisplayAction, DisplayPhase, FloatingDisplayContext, FloatingDisplayController,
    FloatingDisplayId,
};
pub use pip::{PictureInPictureController, PictureInPictureMode, SnapPosition};
pub use position::DisplayPosition;
pub use transition::FloatingDisplayTransition;
