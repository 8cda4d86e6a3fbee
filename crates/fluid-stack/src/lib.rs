#![forbid(unsafe_code)]

//! Screen stack management with interruptible transitions.
//!
//! This crate is the core of the fluid presentation framework:
//!
//! - [`ScreenRegistry`] — the explicit side-table that owns every screen's
//!   framework metadata (parent links, stack membership, action handlers)
//! - adding/removing transition contexts with an exactly-one-terminal-call
//!   completion contract
//! - pluggable transition strategies resolved through a fallback chain
//! - find strategies that locate a target stack by walking the ancestor
//!   chain
//! - push/pop operations with pop-forwarding and display-on-top z-order
//!   subscriptions
//!
//! Everything is single-threaded and tick-driven: animated transitions
//! progress only when the host calls [`ScreenRegistry::tick`] with a frame
//! delta. Failing to resolve a target stack is never fatal — operations
//! log and no-op, because a screen may legitimately live outside any
//! managed stack.

pub mod context;
pub mod find;
pub mod registry;
pub mod stack;
pub mod transition;

pub use context::{AddingTransitionContext, CompletionEvent, RemovingTransitionContext};
pub use find::{FindStrategy, StackCandidate};
pub use registry::{
    ContentConfiguration, ContentType, ScreenId, ScreenRegistry, StackAction, StackIdentifier,
    StackingRelation,
};
pub use stack::{DisplayOnTopSubscription, StackConfiguration, StackEvent};
pub use transition::{AddingTransition, RemovingTransition, TransitionDescriptor};
