#![forbid(unsafe_code)]

//! Serial display queue for transient overlays (snackbars, popups).
//!
//! State machine per controller instance: `Idle` (nothing visible, empty
//! queue) ⇄ displaying (exactly one visible entry) with a pending FIFO
//! queue behind it.
//!
//! The controller owns no views. Each display request is a
//! [`FloatingDisplayContext`]: a placement descriptor plus a content
//! factory. The factory runs once, when the request is promoted to
//! visible, and its product is handed to the host inside
//! [`DisplayAction::Show`] so the overlay can be materialized lazily.
//!
//! # Invariants
//!
//! - At most one entry is visible at any instant
//! - `waits_in_queue = true` preserves FIFO order; `false` preempts both
//!   the visible entry and the queue order
//! - The content factory runs exactly once, at promotion time
//! - Dismissal is always explicit; timeouts live outside this layer
//!
//! # Example
//!
//! ```ignore
//! let mut controller = FloatingDisplayController::new();
//! let id = controller.deliver(FloatingDisplayContext::new(
//!     DisplayPosition::Top,
//!     FloatingDisplayTransition::slide_in(),
//!     || Snackbar::saved(),
//! ));
//!
//! for action in controller.tick(Duration::from_millis(16)) {
//!     match action {
//!         DisplayAction::Show(id, content) => { /* mount the overlay */ }
//!         DisplayAction::Hide(id) => { /* unmount it */ }
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use fluid_core::animation::SpringAnimator;

use crate::position::DisplayPosition;
use crate::transition::FloatingDisplayTransition;

/// Identity of a display request within its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloatingDisplayId(u64);

impl fmt::Display for FloatingDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display#{}", self.0)
    }
}

/// One overlay request: where it goes, how it animates, and a factory
/// for its content.
///
/// The factory is deferred: a request can sit in the queue indefinitely
/// without paying for content it may never show. It runs once, at the
/// moment the request is promoted to visible.
pub struct FloatingDisplayContext<C> {
    /// Anchor position within the container.
    pub position: DisplayPosition,
    /// Enter/exit animation pair.
    pub transition: FloatingDisplayTransition,
    content: Box<dyn FnOnce() -> C>,
}

impl<C> FloatingDisplayContext<C> {
    /// Create a request with a deferred content factory.
    pub fn new(
        position: DisplayPosition,
        transition: FloatingDisplayTransition,
        content: impl FnOnce() -> C + 'static,
    ) -> Self {
        Self {
            position,
            transition,
            content: Box::new(content),
        }
    }
}

impl<C> fmt::Debug for FloatingDisplayContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingDisplayContext")
            .field("position", &self.position)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

/// Where a visible entry is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPhase {
    /// Animating in.
    Entering,
    /// Fully presented.
    Shown,
    /// Animating out; the slot frees when the exit spring settles.
    Exiting,
}

/// Actions returned by `tick()` for the host to apply.
#[derive(Debug, PartialEq, Eq)]
pub enum DisplayAction<C> {
    /// Mount this freshly built content and begin its entrance.
    Show(FloatingDisplayId, C),
    /// Tear the overlay down; its exit animation has finished.
    Hide(FloatingDisplayId),
}

#[derive(Debug)]
struct VisibleEntry {
    id: FloatingDisplayId,
    position: DisplayPosition,
    transition: FloatingDisplayTransition,
    phase: DisplayPhase,
    animator: SpringAnimator,
}

/// Serial display queue controller.
///
/// Explicitly owned and injected at call sites; there is no process-wide
/// default instance.
pub struct FloatingDisplayController<C> {
    queue: VecDeque<(FloatingDisplayId, FloatingDisplayContext<C>)>,
    visible: Option<VisibleEntry>,
    next_id: u64,
}

impl<C> Default for FloatingDisplayController<C> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            visible: None,
            next_id: 0,
        }
    }
}

impl<C> fmt::Debug for FloatingDisplayController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingDisplayController")
            .field("queued", &self.queue.len())
            .field("visible", &self.visible)
            .finish()
    }
}

impl<C> FloatingDisplayController<C> {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> FloatingDisplayId {
        self.next_id += 1;
        FloatingDisplayId(self.next_id)
    }

    /// Whether nothing is visible and the queue is empty.
    pub fn is_idle(&self) -> bool {
        self.visible.is_none() && self.queue.is_empty()
    }

    /// Number of entries waiting behind the visible one.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// The currently visible request, if any.
    pub fn visible_id(&self) -> Option<FloatingDisplayId> {
        self.visible.as_ref().map(|entry| entry.id)
    }

    /// The visible entry's lifecycle phase.
    pub fn visible_phase(&self) -> Option<DisplayPhase> {
        self.visible.as_ref().map(|entry| entry.phase)
    }

    /// The visible entry's anchor position.
    pub fn visible_position(&self) -> Option<DisplayPosition> {
        self.visible.as_ref().map(|entry| entry.position)
    }

    /// Spring progress of the visible entry's current phase animation.
    ///
    /// 0.0 → 1.0 while entering or exiting; pinned at 1.0 once shown.
    pub fn visible_progress(&self) -> Option<f64> {
        self.visible.as_ref().map(|entry| entry.animator.value_x())
    }

    /// Request display of an overlay.
    ///
    /// With `waits_in_queue = true` the request joins the queue tail and
    /// shows in FIFO order. With `false` it preempts: the visible entry
    /// (if any) starts animating out immediately and this request jumps
    /// ahead of everything already queued.
    ///
    /// The returned id identifies the request in subsequent
    /// [`DisplayAction`]s.
    pub fn display(
        &mut self,
        context: FloatingDisplayContext<C>,
        waits_in_queue: bool,
    ) -> FloatingDisplayId {
        let id = self.allocate();
        if waits_in_queue {
            self.queue.push_back((id, context));
        } else {
            if let Some(entry) = self.visible.as_mut()
                && entry.phase != DisplayPhase::Exiting
            {
                entry.phase = DisplayPhase::Exiting;
                entry.animator = SpringAnimator::new(entry.transition.exit);
            }
            self.queue.push_front((id, context));
        }
        id
    }

    /// Sugar for [`Self::display`] with `waits_in_queue = true`.
    pub fn deliver(&mut self, context: FloatingDisplayContext<C>) -> FloatingDisplayId {
        self.display(context, true)
    }

    /// Dismiss the visible entry, animating it out via its stored exit
    /// transition. The next queue head (if any) promotes once the exit
    /// settles.
    ///
    /// Returns `false` (logged) when nothing is visible or the entry is
    /// already on its way out.
    pub fn dismiss(&mut self) -> bool {
        match self.visible.as_mut() {
            Some(entry) if entry.phase != DisplayPhase::Exiting => {
                entry.phase = DisplayPhase::Exiting;
                entry.animator = SpringAnimator::new(entry.transition.exit);
                true
            }
            Some(_) => {
                tracing::warn!("dismiss requested while the entry is already exiting");
                false
            }
            None => {
                tracing::warn!("dismiss requested with nothing visible");
                false
            }
        }
    }

    /// Advance animations by `delta` and promote queued entries.
    ///
    /// Promotion runs the queue head's content factory and hands the
    /// product out with [`DisplayAction::Show`]. At most one entry
    /// changes visibility per tick, keeping display strictly serial.
    pub fn tick(&mut self, delta: Duration) -> Vec<DisplayAction<C>> {
        let mut actions = Vec::new();

        if let Some(entry) = self.visible.as_mut() {
            match entry.phase {
                DisplayPhase::Entering => {
                    if entry.animator.tick(delta) {
                        entry.phase = DisplayPhase::Shown;
                    }
                }
                DisplayPhase::Shown => {}
                DisplayPhase::Exiting => {
                    if entry.animator.tick(delta) {
                        let id = entry.id;
                        self.visible = None;
                        actions.push(DisplayAction::Hide(id));
                    }
                }
            }
        }

        if self.visible.is_none()
            && let Some((id, context)) = self.queue.pop_front()
        {
            let content = (context.content)();
            let mut entry = VisibleEntry {
                id,
                position: context.position,
                transition: context.transition,
                phase: DisplayPhase::Entering,
                animator: SpringAnimator::new(context.transition.enter),
            };
            if entry.animator.is_instantaneous() {
                entry.animator.finish();
                entry.phase = DisplayPhase::Shown;
            }
            self.visible = Some(entry);
            actions.push(DisplayAction::Show(id, content));
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    fn instant(label: &'static str) -> FloatingDisplayContext<&'static str> {
        FloatingDisplayContext::new(
            DisplayPosition::Top,
            FloatingDisplayTransition::no_animation(),
            move || label,
        )
    }

    fn animated(label: &'static str) -> FloatingDisplayContext<&'static str> {
        FloatingDisplayContext::new(
            DisplayPosition::Top,
            FloatingDisplayTransition::slide_in(),
            move || label,
        )
    }

    fn settle(
        controller: &mut FloatingDisplayController<&'static str>,
    ) -> Vec<DisplayAction<&'static str>> {
        let mut actions = Vec::new();
        for _ in 0..100 {
            actions.extend(controller.tick(FRAME));
        }
        actions
    }

    // ------------------------------------------------------------------
    // Queue ordering
    // ------------------------------------------------------------------

    #[test]
    fn idle_controller_shows_on_first_tick() {
        let mut controller = FloatingDisplayController::new();
        assert!(controller.is_idle());

        let id = controller.deliver(instant("a"));
        let actions = controller.tick(FRAME);
        assert_eq!(actions, vec![DisplayAction::Show(id, "a")]);
        assert_eq!(controller.visible_id(), Some(id));
        assert_eq!(controller.visible_phase(), Some(DisplayPhase::Shown));
    }

    #[test]
    fn fifo_order_one_at_a_time() {
        let mut controller = FloatingDisplayController::new();
        let a = controller.display(instant("a"), true);
        let b = controller.display(instant("b"), true);
        let c = controller.display(instant("c"), true);

        assert_eq!(controller.tick(FRAME), vec![DisplayAction::Show(a, "a")]);
        // Queue does not advance while something is visible.
        assert_eq!(controller.tick(FRAME), vec![]);
        assert_eq!(controller.queued_len(), 2);

        assert!(controller.dismiss());
        assert_eq!(
            controller.tick(FRAME),
            vec![DisplayAction::Hide(a), DisplayAction::Show(b, "b")]
        );

        assert!(controller.dismiss());
        assert_eq!(
            controller.tick(FRAME),
            vec![DisplayAction::Hide(b), DisplayAction::Show(c, "c")]
        );

        assert!(controller.dismiss());
        assert_eq!(controller.tick(FRAME), vec![DisplayAction::Hide(c)]);
        assert!(controller.is_idle());
    }

    #[test]
    fn preemption_jumps_the_queue() {
        let mut controller = FloatingDisplayController::new();
        let a = controller.display(instant("a"), true);
        let b = controller.display(instant("b"), true);
        let c = controller.display(instant("c"), true);
        assert_eq!(controller.tick(FRAME), vec![DisplayAction::Show(a, "a")]);

        // Preempting entry interrupts the visible one and shows ahead of
        // b and c.
        let d = controller.display(instant("d"), false);
        assert_eq!(controller.visible_phase(), Some(DisplayPhase::Exiting));
        assert_eq!(
            controller.tick(FRAME),
            vec![DisplayAction::Hide(a), DisplayAction::Show(d, "d")]
        );

        assert!(controller.dismiss());
        assert_eq!(
            controller.tick(FRAME),
            vec![DisplayAction::Hide(d), DisplayAction::Show(b, "b")]
        );
        assert_eq!(controller.queued_len(), 1);
        let _ = c;
    }

    #[test]
    fn preemption_while_idle_just_shows() {
        let mut controller = FloatingDisplayController::new();
        let id = controller.display(instant("a"), false);
        assert_eq!(controller.tick(FRAME), vec![DisplayAction::Show(id, "a")]);
    }

    // ------------------------------------------------------------------
    // Content factory
    // ------------------------------------------------------------------

    #[test]
    fn content_factory_runs_once_at_promotion() {
        let built = Rc::new(RefCell::new(0u32));
        let mut controller = FloatingDisplayController::new();

        let counter = Rc::clone(&built);
        controller.deliver(FloatingDisplayContext::new(
            DisplayPosition::Top,
            FloatingDisplayTransition::no_animation(),
            move || {
                *counter.borrow_mut() += 1;
                "built"
            },
        ));
        // Queued requests pay nothing until promoted.
        assert_eq!(*built.borrow(), 0);

        let actions = controller.tick(FRAME);
        assert_eq!(*built.borrow(), 1);
        assert!(matches!(actions[0], DisplayAction::Show(_, "built")));

        // Further ticks never re-run the factory.
        settle(&mut controller);
        assert_eq!(*built.borrow(), 1);
    }

    #[test]
    fn queued_factory_never_runs_for_an_undisplayed_entry() {
        let built = Rc::new(RefCell::new(0u32));
        let mut controller = FloatingDisplayController::new();

        controller.deliver(instant("a"));
        let counter = Rc::clone(&built);
        controller.deliver(FloatingDisplayContext::new(
            DisplayPosition::Top,
            FloatingDisplayTransition::no_animation(),
            move || {
                *counter.borrow_mut() += 1;
                "b"
            },
        ));

        // "a" shows; "b" stays queued and unbuilt.
        settle(&mut controller);
        assert_eq!(*built.borrow(), 0);
        assert_eq!(controller.queued_len(), 1);
    }

    // ------------------------------------------------------------------
    // Animation phases
    // ------------------------------------------------------------------

    #[test]
    fn animated_entry_enters_then_shows() {
        let mut controller = FloatingDisplayController::new();
        let id = controller.deliver(animated("a"));

        let actions = controller.tick(FRAME);
        assert_eq!(actions, vec![DisplayAction::Show(id, "a")]);
        assert_eq!(controller.visible_phase(), Some(DisplayPhase::Entering));
        let early = controller.visible_progress().unwrap();
        assert!(early < 1.0);

        settle(&mut controller);
        assert_eq!(controller.visible_phase(), Some(DisplayPhase::Shown));
        assert_eq!(controller.visible_progress(), Some(1.0));
    }

    #[test]
    fn dismiss_mid_entrance_interrupts() {
        let mut controller = FloatingDisplayController::new();
        let id = controller.deliver(animated("a"));
        controller.tick(FRAME);
        assert_eq!(controller.visible_phase(), Some(DisplayPhase::Entering));

        assert!(controller.dismiss());
        assert_eq!(controller.visible_phase(), Some(DisplayPhase::Exiting));

        let actions = settle(&mut controller);
        assert!(actions.contains(&DisplayAction::Hide(id)));
        assert!(controller.is_idle());
    }

    #[test]
    fn dismiss_is_idempotent_per_entry() {
        let mut controller = FloatingDisplayController::new();
        controller.deliver(animated("a"));
        controller.tick(FRAME);

        assert!(controller.dismiss());
        // Already exiting: second request is a logged no-op.
        assert!(!controller.dismiss());
    }

    #[test]
    fn dismiss_when_idle_is_soft_failure() {
        let mut controller = FloatingDisplayController::<&'static str>::new();
        assert!(!controller.dismiss());
    }

    #[test]
    fn position_is_preserved_for_the_visible_entry() {
        let mut controller = FloatingDisplayController::new();
        controller.deliver(FloatingDisplayContext::new(
            DisplayPosition::Bottom,
            FloatingDisplayTransition::fade(),
            || "a",
        ));
        controller.tick(FRAME);
        assert_eq!(controller.visible_position(), Some(DisplayPosition::Bottom));
    }
}
