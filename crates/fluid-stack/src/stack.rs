#![forbid(unsafe_code)]

//! The stack manager: add/remove operations, pop-forwarding, z-order
//! subscriptions, and tick-driven transition completion.
//!
//! A stack owns an ordered sequence of screens (bottom → top) and at most
//! one active transition at any instant. Starting a new transition while
//! one is pending invalidates the pending one first (`Interrupted`) —
//! newest request wins, transitions on a stack are strictly serialized.
//!
//! Failure to resolve a target stack is a soft failure by design: the
//! caller may legitimately be presented outside any managed stack (a
//! full-screen modal, for example), so push/pop log and no-op instead of
//! panicking.

use std::time::Duration;

use crate::context::{AddingTransitionContext, RemovingTransitionContext};
use crate::find::FindStrategy;
use crate::registry::{ScreenId, ScreenRegistry, StackAction, StackIdentifier, StackingRelation};
use crate::transition::{AddingTransition, RemovingTransition};

/// Behavior policies for a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfiguration {
    /// Keep the first screen in place; pops that would remove it forward
    /// to the parent stack instead.
    pub retains_root_view_controller: bool,
    /// Refuse to forward pops to the parent stack.
    pub prevents_forwarding_pop: bool,
}

impl Default for StackConfiguration {
    fn default() -> Self {
        Self {
            retains_root_view_controller: true,
            prevents_forwarding_pop: false,
        }
    }
}

impl StackConfiguration {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the root screen is protected from local pops.
    pub fn retains_root_view_controller(mut self, retains: bool) -> Self {
        self.retains_root_view_controller = retains;
        self
    }

    /// Set whether pop-forwarding to the parent stack is refused.
    pub fn prevents_forwarding_pop(mut self, prevents: bool) -> Self {
        self.prevents_forwarding_pop = prevents;
        self
    }
}

/// Per-stack state stored in the registry.
pub(crate) struct StackState {
    pub(crate) identifier: Option<StackIdentifier>,
    pub(crate) configuration: StackConfiguration,
    /// Ordered members, bottom → top.
    pub(crate) stacking: Vec<ScreenId>,
    pub(crate) adding: Option<AddingTransitionContext>,
    pub(crate) removing: Option<RemovingTransitionContext>,
    /// Display-on-top subscriptions, oldest first.
    pub(crate) raised: Vec<(u64, ScreenId)>,
    pub(crate) next_subscription: u64,
}

impl StackState {
    pub(crate) fn new(
        identifier: Option<StackIdentifier>,
        configuration: StackConfiguration,
    ) -> Self {
        Self {
            identifier,
            configuration,
            stacking: Vec::new(),
            adding: None,
            removing: None,
            raised: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Invalidate any pending transition contexts (fires `Interrupted`).
    pub(crate) fn invalidate_pending(&mut self) {
        if let Some(mut context) = self.adding.take() {
            context.invalidate();
        }
        if let Some(mut context) = self.removing.take() {
            context.invalidate();
        }
    }
}

impl Drop for StackState {
    fn drop(&mut self) {
        // Disposal of the stack itself must not leave contexts pending.
        self.invalidate_pending();
    }
}

/// Token for a display-on-top request; release it to restore z-order.
#[derive(Debug, PartialEq, Eq)]
pub struct DisplayOnTopSubscription {
    stack: ScreenId,
    token: u64,
}

impl DisplayOnTopSubscription {
    /// The stack whose z-order this subscription raises.
    pub fn stack(&self) -> ScreenId {
        self.stack
    }
}

/// One stack-level event observed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEvent {
    /// The stack the event occurred on.
    pub stack: ScreenId,
    /// What happened.
    pub action: StackAction,
}

impl ScreenRegistry {
    pub(crate) fn stack_state(&self, stack: ScreenId) -> Option<&StackState> {
        self.node(stack)?.stack.as_ref()
    }

    pub(crate) fn stack_state_mut(&mut self, stack: ScreenId) -> Option<&mut StackState> {
        self.node_mut(stack)?.stack.as_mut()
    }

    /// A stack's ordered members, bottom → top.
    pub fn stacking(&self, stack: ScreenId) -> &[ScreenId] {
        self.stack_state(stack)
            .map(|s| s.stacking.as_slice())
            .unwrap_or(&[])
    }

    /// The top screen of a stack.
    pub fn top_screen(&self, stack: ScreenId) -> Option<ScreenId> {
        self.stack_state(stack)?.stacking.last().copied()
    }

    /// A stack's configuration.
    pub fn stack_configuration(&self, stack: ScreenId) -> Option<StackConfiguration> {
        Some(self.stack_state(stack)?.configuration)
    }

    /// The identifier a stack was registered with.
    pub fn stack_identifier(&self, stack: ScreenId) -> Option<&StackIdentifier> {
        self.stack_state(stack)?.identifier.as_ref()
    }

    /// Whether the stack has a transition in flight.
    pub fn has_pending_transition(&self, stack: ScreenId) -> bool {
        self.stack_state(stack)
            .is_some_and(|s| s.adding.is_some() || s.removing.is_some())
    }

    /// The in-flight adding context, if any.
    pub fn adding_context(&self, stack: ScreenId) -> Option<&AddingTransitionContext> {
        self.stack_state(stack)?.adding.as_ref()
    }

    /// Mutable access to the in-flight adding context (for registering
    /// completion-event handlers).
    pub fn adding_context_mut(&mut self, stack: ScreenId) -> Option<&mut AddingTransitionContext> {
        self.stack_state_mut(stack)?.adding.as_mut()
    }

    /// The in-flight removing context, if any.
    pub fn removing_context(&self, stack: ScreenId) -> Option<&RemovingTransitionContext> {
        self.stack_state(stack)?.removing.as_ref()
    }

    /// Mutable access to the in-flight removing context.
    pub fn removing_context_mut(
        &mut self,
        stack: ScreenId,
    ) -> Option<&mut RemovingTransitionContext> {
        self.stack_state_mut(stack)?.removing.as_mut()
    }

    // ------------------------------------------------------------------
    // Adding
    // ------------------------------------------------------------------

    /// Append a screen to the top of a stack.
    ///
    /// Exactly one [`AddingTransitionContext`] is created per call. A
    /// still-pending transition on the same stack is invalidated first.
    /// The screen joins the stack order immediately; the context gates
    /// only the completion events. Returns `false` (logged) when the
    /// operation is invalid.
    pub fn add_content(
        &mut self,
        stack: ScreenId,
        screen: ScreenId,
        transition: Option<AddingTransition>,
    ) -> bool {
        if !self.is_stack(stack) {
            tracing::error!(%stack, "add_content target is not a registered stack");
            return false;
        }
        if !self.contains(screen) {
            tracing::error!(%screen, "add_content with unregistered screen");
            return false;
        }
        if screen == stack {
            tracing::error!(%stack, "a stack cannot be added to itself");
            return false;
        }
        if let Some(owner) = self.node(screen).and_then(|n| n.owner_stack) {
            tracing::error!(%screen, %owner, "screen is already owned by a stack");
            return false;
        }

        let preferred = self.node(screen).and_then(|n| n.preferred_adding);
        let descriptor = transition.or(preferred).unwrap_or_default().descriptor();

        let from = {
            let Some(state) = self.stack_state_mut(stack) else {
                return false;
            };
            state.invalidate_pending();
            let from = state.stacking.last().copied();
            state.stacking.push(screen);
            from
        };

        if let Some(node) = self.node_mut(screen) {
            node.owner_stack = Some(stack);
        }
        self.set_parent(screen, Some(stack));

        self.dispatch(screen, StackAction::WillPush(screen));
        self.dispatch(stack, StackAction::WillPush(screen));

        let mut context = AddingTransitionContext::new(from, screen, descriptor);
        if descriptor.is_instantaneous() {
            context.notify_animation_completed();
            self.dispatch(screen, StackAction::DidPush(screen));
            self.dispatch(stack, StackAction::DidPush(screen));
        } else if let Some(state) = self.stack_state_mut(stack) {
            state.adding = Some(context);
        }
        true
    }

    /// Push a screen onto the stack resolved by a find strategy.
    ///
    /// Resolution failure is logged and the operation no-ops — the
    /// presenter may be outside any managed stack.
    pub fn fluid_push(
        &mut self,
        presenter: ScreenId,
        screen: ScreenId,
        strategy: &FindStrategy,
        relation: Option<StackingRelation>,
        transition: Option<AddingTransition>,
    ) -> bool {
        let Some(stack) = self.fluid_stack_controller(presenter, strategy) else {
            tracing::error!(
                %presenter,
                strategy = strategy.name(),
                "could not push: no target stack found; \
                 the presenter may be presented outside any managed stack"
            );
            return false;
        };
        if !self.add_content(stack, screen, transition) {
            return false;
        }
        // Only an accepted push may touch the screen's relation; a refused
        // one must leave the screen exactly as it was.
        self.set_relation(screen, relation);
        true
    }

    // ------------------------------------------------------------------
    // Removing
    // ------------------------------------------------------------------

    /// Remove a screen from its stack, animated per `transition`.
    ///
    /// When no strategy is given, the screen's preferred removing
    /// transition applies, falling back to the default pop. The screen
    /// leaves the stack order only when the transition succeeds.
    pub fn remove_content(
        &mut self,
        stack: ScreenId,
        screen: ScreenId,
        transition: Option<RemovingTransition>,
    ) -> bool {
        let Some(state) = self.stack_state(stack) else {
            tracing::error!(%stack, "remove_content target is not a registered stack");
            return false;
        };
        let Some(position) = state.stacking.iter().position(|s| *s == screen) else {
            tracing::error!(%stack, %screen, "screen is not a member of the stack");
            return false;
        };
        if state.configuration.retains_root_view_controller && position == 0 {
            tracing::warn!(
                %stack, %screen,
                "refusing to remove the retained root screen"
            );
            return false;
        }
        let to = position.checked_sub(1).map(|i| state.stacking[i]);

        let preferred = self.node(screen).and_then(|n| n.preferred_removing);
        let descriptor = transition.or(preferred).unwrap_or_default().descriptor();

        if let Some(state) = self.stack_state_mut(stack) {
            state.invalidate_pending();
        }

        self.dispatch(screen, StackAction::WillPop(screen));
        self.dispatch(stack, StackAction::WillPop(screen));

        let context = RemovingTransitionContext::new(screen, to, descriptor);
        if descriptor.is_instantaneous() {
            self.commit_removal(stack, context);
        } else if let Some(state) = self.stack_state_mut(stack) {
            state.removing = Some(context);
        }
        true
    }

    /// Pop a screen out of fluid presentation.
    ///
    /// When the pop would strip the stack's protected root — the stack
    /// retains its root, forwarding is permitted, and `screen` descends
    /// from the stack's first member — the request forwards to the parent
    /// stack instead of acting locally. `completion` runs once the pop has
    /// been accepted.
    pub fn fluid_pop(
        &mut self,
        screen: ScreenId,
        transition: Option<RemovingTransition>,
        forwarding_to_parent: bool,
        completion: Option<Box<dyn FnOnce()>>,
    ) -> bool {
        let Some((stack, member)) = self.stack_context(screen) else {
            tracing::error!(%screen, "screen is not presented as fluid presentation");
            return false;
        };

        let (prevents, retains, first) = {
            let Some(state) = self.stack_state(stack) else {
                return false;
            };
            (
                state.configuration.prevents_forwarding_pop,
                state.configuration.retains_root_view_controller,
                state.stacking.first().copied(),
            )
        };

        let forwards = !prevents
            && forwarding_to_parent
            && retains
            && first.is_some_and(|f| self.is_descendant_of(screen, f));

        if forwards {
            // Nothing above the protected root here; ask the parent stack
            // to pop this stack instead.
            self.fluid_pop(stack, transition, forwarding_to_parent, completion)
        } else {
            let removed = self.remove_content(stack, member, transition);
            if removed && let Some(completion) = completion {
                completion();
            }
            removed
        }
    }

    fn commit_removal(
        &mut self,
        stack: ScreenId,
        mut context: RemovingTransitionContext,
    ) -> Vec<StackEvent> {
        let screen = context.from_screen();
        context.notify_animation_completed();
        context.transition_succeeded();

        let new_top = {
            let Some(state) = self.stack_state_mut(stack) else {
                return Vec::new();
            };
            state.stacking.retain(|s| *s != screen);
            state.raised.retain(|(_, s)| *s != screen);
            state.stacking.last().copied()
        };

        if let Some(node) = self.node_mut(screen) {
            node.owner_stack = None;
        }
        self.set_parent(screen, None);

        let mut events = Vec::new();
        self.dispatch(screen, StackAction::DidPop(screen));
        self.dispatch(stack, StackAction::DidPop(screen));
        events.push(StackEvent {
            stack,
            action: StackAction::DidPop(screen),
        });

        if let Some(top) = new_top {
            self.dispatch(top, StackAction::DidBecomeTop(top));
            self.dispatch(stack, StackAction::DidBecomeTop(top));
            events.push(StackEvent {
                stack,
                action: StackAction::DidBecomeTop(top),
            });
        }
        events
    }

    /// Cancel an in-flight removing transition interactively.
    ///
    /// The screen stays in place; the context fires `Cancelled`. Returns
    /// `false` when no removing transition is pending.
    pub fn cancel_removing(&mut self, stack: ScreenId) -> bool {
        let Some(state) = self.stack_state_mut(stack) else {
            return false;
        };
        match state.removing.take() {
            Some(mut context) => {
                context.notify_cancelled();
                true
            }
            None => false,
        }
    }

    /// Complete an in-flight removing transition immediately.
    ///
    /// Used by interactive strategies that finish ahead of the spring.
    pub fn finish_removing(&mut self, stack: ScreenId) -> bool {
        let pending = match self.stack_state_mut(stack) {
            Some(state) => state.removing.take(),
            None => return false,
        };
        match pending {
            Some(context) => {
                self.commit_removal(stack, context);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Display-on-top
    // ------------------------------------------------------------------

    /// Temporarily raise a screen above the stack's normal z-order.
    ///
    /// Only valid while a removing transition is active (interactive
    /// dismiss re-raising mid-gesture). Concurrent subscriptions compose
    /// most-recent-on-top. Returns `None` (logged) otherwise.
    pub fn request_display_on_top(
        &mut self,
        stack: ScreenId,
        source: ScreenId,
    ) -> Option<DisplayOnTopSubscription> {
        let Some(state) = self.stack_state_mut(stack) else {
            tracing::warn!(%stack, "display-on-top requested on a non-stack");
            return None;
        };
        if state.removing.is_none() {
            tracing::warn!(
                %stack, %source,
                "display-on-top requested without an active removing transition"
            );
            return None;
        }
        let token = state.next_subscription;
        state.next_subscription += 1;
        state.raised.push((token, source));
        Some(DisplayOnTopSubscription { stack, token })
    }

    /// Release a display-on-top subscription, restoring the prior order.
    ///
    /// Safe to call after the transition ended, including after
    /// cancellation.
    pub fn release_display_on_top(&mut self, subscription: DisplayOnTopSubscription) {
        if let Some(state) = self.stack_state_mut(subscription.stack) {
            state.raised.retain(|(token, _)| *token != subscription.token);
        }
    }

    /// The stack's effective z-order, bottom → top, with raised screens
    /// composed most-recent-on-top.
    pub fn z_order(&self, stack: ScreenId) -> Vec<ScreenId> {
        let Some(state) = self.stack_state(stack) else {
            return Vec::new();
        };
        let mut order = state.stacking.clone();
        for (_, source) in &state.raised {
            order.retain(|s| s != source);
            order.push(*source);
        }
        order
    }

    // ------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------

    /// Advance all in-flight transitions by `delta`.
    ///
    /// Returns the stack events that occurred during this tick. Stacks
    /// are processed in id order for determinism.
    pub fn tick(&mut self, delta: Duration) -> Vec<StackEvent> {
        let mut events = Vec::new();
        let mut stack_ids: Vec<ScreenId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.stack.is_some())
            .map(|(id, _)| *id)
            .collect();
        stack_ids.sort();

        for stack in stack_ids {
            let finished_adding = {
                let Some(state) = self.stack_state_mut(stack) else {
                    continue;
                };
                let done = state
                    .adding
                    .as_mut()
                    .is_some_and(|context| context.animator.tick(delta));
                if done { state.adding.take() } else { None }
            };
            if let Some(mut context) = finished_adding {
                let screen = context.to_screen();
                context.notify_animation_completed();
                self.dispatch(screen, StackAction::DidPush(screen));
                self.dispatch(stack, StackAction::DidPush(screen));
                events.push(StackEvent {
                    stack,
                    action: StackAction::DidPush(screen),
                });
            }

            let finished_removing = {
                let Some(state) = self.stack_state_mut(stack) else {
                    continue;
                };
                let done = state
                    .removing
                    .as_mut()
                    .is_some_and(|context| context.animator.tick(delta));
                if done { state.removing.take() } else { None }
            };
            if let Some(context) = finished_removing {
                events.extend(self.commit_removal(stack, context));
            }
        }
        events
    }
}
