#![forbid(unsafe_code)]

//! Transition strategies.
//!
//! A strategy is pure behavior: it resolves to a [`TransitionDescriptor`]
//! the stack manager drives through a tick-driven animator, calling
//! exactly one terminal notification on the owning context when done.
//! `NoAnimation` resolves to an instantaneous descriptor and completes
//! synchronously at the call site.
//!
//! Strategy selection is a fallback chain evaluated by the stack manager:
//! explicit strategy → the screen's preferred default → the framework
//! default (`SlideIn` for adds, `SlideOut` for removes).

use std::time::Duration;

use fluid_core::spring::SpringTimingParameters;

/// The animation a strategy resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionDescriptor {
    /// Spring timing driving the transition's progress.
    pub spring: SpringTimingParameters,
}

impl TransitionDescriptor {
    /// Create a descriptor from spring timing.
    pub fn new(spring: SpringTimingParameters) -> Self {
        Self { spring }
    }

    /// A descriptor that completes synchronously.
    pub fn no_animation() -> Self {
        Self::new(SpringTimingParameters::instantaneous())
    }

    /// Whether this descriptor completes without animation frames.
    #[inline]
    pub fn is_instantaneous(&self) -> bool {
        self.spring.is_instantaneous()
    }
}

/// Strategy for animating a screen onto a stack.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AddingTransition {
    /// Navigation-style slide from the trailing edge.
    #[default]
    SlideIn,
    /// Modal-style presentation from the bottom.
    PresentModal,
    /// No animation; completes synchronously.
    NoAnimation,
    /// Caller-supplied timing.
    Custom(TransitionDescriptor),
}

impl AddingTransition {
    /// Resolve to the descriptor the stack manager drives.
    pub fn descriptor(self) -> TransitionDescriptor {
        match self {
            Self::SlideIn => TransitionDescriptor::new(SpringTimingParameters::new(
                Duration::from_millis(600),
                1.0,
            )),
            Self::PresentModal => TransitionDescriptor::new(SpringTimingParameters::new(
                Duration::from_millis(600),
                0.9,
            )),
            Self::NoAnimation => TransitionDescriptor::no_animation(),
            Self::Custom(descriptor) => descriptor,
        }
    }
}

/// Strategy for animating a screen off a stack.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RemovingTransition {
    /// Navigation-style slide out to the trailing edge (the default pop).
    #[default]
    SlideOut,
    /// Modal-style dismissal toward the bottom.
    DismissModal,
    /// No animation; completes synchronously.
    NoAnimation,
    /// Caller-supplied timing.
    Custom(TransitionDescriptor),
}

impl RemovingTransition {
    /// Resolve to the descriptor the stack manager drives.
    pub fn descriptor(self) -> TransitionDescriptor {
        match self {
            Self::SlideOut => TransitionDescriptor::new(SpringTimingParameters::new(
                Duration::from_millis(600),
                1.0,
            )),
            Self::DismissModal => TransitionDescriptor::new(SpringTimingParameters::new(
                Duration::from_millis(600),
                0.9,
            )),
            Self::NoAnimation => TransitionDescriptor::no_animation(),
            Self::Custom(descriptor) => descriptor,
        }
    }
}
