#![forbid(unsafe_code)]

//! Transition contexts: one per in-flight add/remove.
//!
//! A context coordinates a single transition and its completion contract.
//! Every context must reach exactly one terminal state before it is
//! discarded:
//!
//! - completed (`notify_animation_completed`)
//! - invalidated (`invalidate`, fired when a newer transition supersedes
//!   it, or `notify_cancelled` for interactive cancellation)
//!
//! Dropping a context that is still pending is a programming error and
//! trips a debug assertion. After invalidation every further mutation is
//! a no-op, so callers holding an outdated context cannot corrupt the
//! stack that superseded it.

use std::fmt;

use fluid_core::animation::SpringAnimator;

use crate::registry::ScreenId;
use crate::transition::TransitionDescriptor;

/// How a transition ultimately ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEvent {
    /// The transition ran to completion with no interruption.
    Succeeded,
    /// A newer transition superseded this one.
    Interrupted,
    /// An interactive transition was cancelled and rolled back.
    Cancelled,
}

type EventHandler = Box<dyn FnMut(CompletionEvent)>;

/// Context for a transition that adds a screen to a stack.
pub struct AddingTransitionContext {
    from: Option<ScreenId>,
    to: ScreenId,
    completed: bool,
    invalidated: bool,
    handlers: Vec<EventHandler>,
    pub(crate) animator: SpringAnimator,
}

impl AddingTransitionContext {
    pub(crate) fn new(
        from: Option<ScreenId>,
        to: ScreenId,
        descriptor: TransitionDescriptor,
    ) -> Self {
        Self {
            from,
            to,
            completed: false,
            invalidated: false,
            handlers: Vec::new(),
            animator: SpringAnimator::new(descriptor.spring),
        }
    }

    /// The screen that was on top before this transition, if any.
    pub fn from_screen(&self) -> Option<ScreenId> {
        self.from
    }

    /// The screen being added.
    pub fn to_screen(&self) -> ScreenId {
        self.to
    }

    /// Whether the transition completed successfully.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether a newer transition superseded this one.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Register a handler for the terminal completion event.
    pub fn add_completion_event_handler(&mut self, handler: impl FnMut(CompletionEvent) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    fn emit(&mut self, event: CompletionEvent) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }

    pub(crate) fn notify_animation_completed(&mut self) {
        if self.completed || self.invalidated {
            return;
        }
        self.completed = true;
        self.emit(CompletionEvent::Succeeded);
    }

    /// Marks this transition as outdated because a newer one started.
    pub(crate) fn invalidate(&mut self) {
        if self.completed || self.invalidated {
            return;
        }
        self.invalidated = true;
        self.emit(CompletionEvent::Interrupted);
    }
}

impl fmt::Debug for AddingTransitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddingTransitionContext")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("completed", &self.completed)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

impl Drop for AddingTransitionContext {
    fn drop(&mut self) {
        debug_assert!(
            self.completed || self.invalidated,
            "{self:?} discarded without a terminal call; \
             call notify_animation_completed() or invalidate()"
        );
    }
}

/// Context for a transition that removes a screen from a stack.
pub struct RemovingTransitionContext {
    from: ScreenId,
    to: Option<ScreenId>,
    completed: bool,
    invalidated: bool,
    handlers: Vec<EventHandler>,
    pub(crate) animator: SpringAnimator,
}

impl RemovingTransitionContext {
    pub(crate) fn new(
        from: ScreenId,
        to: Option<ScreenId>,
        descriptor: TransitionDescriptor,
    ) -> Self {
        Self {
            from,
            to,
            completed: false,
            invalidated: false,
            handlers: Vec::new(),
            animator: SpringAnimator::new(descriptor.spring),
        }
    }

    /// The screen being removed.
    pub fn from_screen(&self) -> ScreenId {
        self.from
    }

    /// The screen that will be visible after removal, if any.
    pub fn to_screen(&self) -> Option<ScreenId> {
        self.to
    }

    /// Whether the transition completed.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the transition was invalidated (interrupted or cancelled).
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Register a handler for the terminal completion event.
    pub fn add_completion_event_handler(&mut self, handler: impl FnMut(CompletionEvent) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    fn emit(&mut self, event: CompletionEvent) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }

    pub(crate) fn notify_animation_completed(&mut self) {
        if self.completed || self.invalidated {
            return;
        }
        self.completed = true;
    }

    /// Fires `Succeeded` once the stack has committed the removal.
    pub(crate) fn transition_succeeded(&mut self) {
        if self.invalidated {
            return;
        }
        self.emit(CompletionEvent::Succeeded);
    }

    /// Interactive cancellation: the screen stays where it was.
    pub(crate) fn notify_cancelled(&mut self) {
        if self.completed || self.invalidated {
            return;
        }
        self.invalidated = true;
        self.emit(CompletionEvent::Cancelled);
    }

    /// Marks this transition as outdated because a newer one started.
    pub(crate) fn invalidate(&mut self) {
        if self.completed || self.invalidated {
            return;
        }
        self.invalidated = true;
        self.emit(CompletionEvent::Interrupted);
    }
}

impl fmt::Debug for RemovingTransitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemovingTransitionContext")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("completed", &self.completed)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

impl Drop for RemovingTransitionContext {
    fn drop(&mut self) {
        debug_assert!(
            self.completed || self.invalidated,
            "{self:?} discarded without a terminal call; \
             call notify_animation_completed() or notify_cancelled()"
        );
    }
}
