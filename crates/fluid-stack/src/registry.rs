#![forbid(unsafe_code)]

//! The screen registry: an explicit side-table for screen metadata.
//!
//! The framework never attaches state to externally-owned objects.
//! Instead, every screen is registered here and identified by a
//! [`ScreenId`]; the registry owns the parent links, stack membership,
//! content configuration, and action-handler lists for every registered
//! screen. Insertion and removal are explicit; nothing is materialized
//! on first access.
//!
//! # Invariants
//!
//! - A screen is owned by at most one stack at a time
//! - Parent links form a forest (no cycles)
//! - All mutation happens on the single thread that owns the registry;
//!   temporal overlap of animations is the only "concurrency" here

use ahash::AHashMap;
use std::borrow::Cow;
use std::fmt;

use crate::find::{FindStrategy, StackCandidate};
use crate::stack::{StackConfiguration, StackState};
use crate::transition::{AddingTransition, RemovingTransition};

/// Identity of a registered screen (or stack; stacks are screens too).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(u64);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// Identifier a stack can be registered with, for find-strategy matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackIdentifier(Cow<'static, str>);

impl StackIdentifier {
    /// Create an identifier.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The identifier's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for StackIdentifier {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

/// Logical relation of a screen to its predecessor in a stack.
///
/// Consulted by pop-forwarding heuristics and available to transition
/// strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackingRelation {
    /// Presented over the predecessor, modal-style.
    Modality,
    /// Pushed as a deeper level of the same navigation flow.
    HierarchicalNavigation,
}

/// How a screen's content participates in the stack's display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Fully covers the content beneath it.
    #[default]
    Opaque,
    /// Content beneath stays visible.
    Transparent,
}

/// Per-screen display options within a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentConfiguration {
    /// Opacity participation of this screen's content.
    pub content_type: ContentType,
    /// Whether this screen drives status-bar appearance while on top.
    pub captures_status_bar_appearance: bool,
}

impl ContentConfiguration {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content type.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Set status-bar capture.
    pub fn captures_status_bar_appearance(mut self, captures: bool) -> Self {
        self.captures_status_bar_appearance = captures;
        self
    }
}

/// Stack-level events delivered to registered action handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    /// A screen is about to join the stack.
    WillPush(ScreenId),
    /// A screen's adding transition completed.
    DidPush(ScreenId),
    /// A screen is about to leave the stack.
    WillPop(ScreenId),
    /// A screen's removing transition completed and it left the stack.
    DidPop(ScreenId),
    /// A screen became the top of its stack after a removal.
    DidBecomeTop(ScreenId),
}

type ActionHandler = Box<dyn FnMut(StackAction)>;

pub(crate) struct Node {
    pub(crate) parent: Option<ScreenId>,
    pub(crate) children: Vec<ScreenId>,
    pub(crate) relation: Option<StackingRelation>,
    pub(crate) content_configuration: ContentConfiguration,
    pub(crate) preferred_adding: Option<AddingTransition>,
    pub(crate) preferred_removing: Option<RemovingTransition>,
    pub(crate) handlers: Vec<ActionHandler>,
    /// The stack currently displaying this screen, if any.
    pub(crate) owner_stack: Option<ScreenId>,
    /// Wrapper created for this screen by `fluid_wrapped`.
    pub(crate) wrapper: Option<ScreenId>,
    /// The screen this node wraps, when the node is itself a wrapper.
    pub(crate) wraps: Option<ScreenId>,
    pub(crate) prohibits_wrapping: bool,
    pub(crate) stack: Option<StackState>,
}

impl Node {
    fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            relation: None,
            content_configuration: ContentConfiguration::default(),
            preferred_adding: None,
            preferred_removing: None,
            handlers: Vec::new(),
            owner_stack: None,
            wrapper: None,
            wraps: None,
            prohibits_wrapping: false,
            stack: None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("relation", &self.relation)
            .field("owner_stack", &self.owner_stack)
            .field("is_stack", &self.stack.is_some())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Owns all screens, stacks, and their framework metadata.
///
/// Created per hosting environment and injected where needed; there is no
/// process-wide default instance.
#[derive(Debug, Default)]
pub struct ScreenRegistry {
    pub(crate) nodes: AHashMap<ScreenId, Node>,
    next_id: u64,
}

impl ScreenRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ScreenId {
        self.next_id += 1;
        ScreenId(self.next_id)
    }

    /// Register a plain screen.
    pub fn register_screen(&mut self) -> ScreenId {
        let id = self.allocate();
        self.nodes.insert(id, Node::new());
        id
    }

    /// Register a stack, optionally with an identifier.
    pub fn register_stack(
        &mut self,
        identifier: Option<StackIdentifier>,
        configuration: StackConfiguration,
    ) -> ScreenId {
        let id = self.allocate();
        let mut node = Node::new();
        node.stack = Some(StackState::new(identifier, configuration));
        self.nodes.insert(id, node);
        id
    }

    /// Remove a screen from the registry.
    ///
    /// Pending transition contexts on the screen's own stack state are
    /// invalidated (firing `Interrupted`) so disposal never violates the
    /// terminal-call contract. Children are detached, not removed.
    pub fn unregister(&mut self, id: ScreenId) {
        let Some(mut node) = self.nodes.remove(&id) else {
            return;
        };
        if let Some(state) = node.stack.as_mut() {
            state.invalidate_pending();
            for member in state.stacking.clone() {
                if let Some(child) = self.nodes.get_mut(&member) {
                    child.owner_stack = None;
                }
            }
        }
        if let Some(parent) = node.parent
            && let Some(parent_node) = self.nodes.get_mut(&parent)
        {
            parent_node.children.retain(|c| *c != id);
        }
        for child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }
        if let Some(owner) = node.owner_stack
            && let Some(owner_node) = self.nodes.get_mut(&owner)
            && let Some(state) = owner_node.stack.as_mut()
        {
            state.stacking.retain(|s| *s != id);
        }
    }

    /// Whether the registry knows this id.
    pub fn contains(&self, id: ScreenId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether this id was registered as a stack.
    pub fn is_stack(&self, id: ScreenId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.stack.is_some())
    }

    /// Number of registered screens (stacks included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Set or clear a screen's structural parent.
    ///
    /// A parent assignment that would create a cycle is rejected with a
    /// log (and a debug assertion).
    pub fn set_parent(&mut self, child: ScreenId, parent: Option<ScreenId>) {
        if !self.contains(child) || parent.is_some_and(|p| !self.contains(p)) {
            tracing::warn!(%child, "set_parent on unknown screen");
            return;
        }
        if let Some(parent) = parent {
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == child {
                    tracing::error!(%child, %parent, "parent assignment would create a cycle");
                    debug_assert!(false, "parent assignment would create a cycle");
                    return;
                }
                cursor = self.nodes.get(&current).and_then(|n| n.parent);
            }
        }
        let old_parent = match self.nodes.get_mut(&child) {
            Some(node) => std::mem::replace(&mut node.parent, parent),
            None => return,
        };
        if let Some(old) = old_parent
            && Some(old) != parent
            && let Some(old_node) = self.nodes.get_mut(&old)
        {
            old_node.children.retain(|c| *c != child);
        }
        if let Some(parent) = parent
            && let Some(parent_node) = self.nodes.get_mut(&parent)
            && !parent_node.children.contains(&child)
        {
            parent_node.children.push(child);
        }
    }

    /// A screen's structural parent.
    pub fn parent(&self, id: ScreenId) -> Option<ScreenId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// A screen's direct children.
    pub fn children(&self, id: ScreenId) -> &[ScreenId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `id` is `ancestor` itself or one of its direct children.
    ///
    /// Deliberately shallow: only immediate children count, which is all
    /// pop-forwarding needs to decide whether a screen sits on a root.
    pub fn is_descendant_of(&self, id: ScreenId, ancestor: ScreenId) -> bool {
        ancestor == id || self.children(ancestor).contains(&id)
    }

    // ------------------------------------------------------------------
    // Per-screen metadata
    // ------------------------------------------------------------------

    /// Set a screen's stacking relation to its predecessor.
    pub fn set_relation(&mut self, id: ScreenId, relation: Option<StackingRelation>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.relation = relation;
        }
    }

    /// A screen's stacking relation.
    pub fn relation(&self, id: ScreenId) -> Option<StackingRelation> {
        self.nodes.get(&id).and_then(|n| n.relation)
    }

    /// Set a screen's content configuration.
    pub fn set_content_configuration(&mut self, id: ScreenId, configuration: ContentConfiguration) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.content_configuration = configuration;
        }
    }

    /// A screen's content configuration.
    pub fn content_configuration(&self, id: ScreenId) -> ContentConfiguration {
        self.nodes
            .get(&id)
            .map(|n| n.content_configuration)
            .unwrap_or_default()
    }

    /// Set the transition a screen prefers when pushed without an explicit
    /// strategy.
    pub fn set_preferred_adding_transition(
        &mut self,
        id: ScreenId,
        transition: Option<AddingTransition>,
    ) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.preferred_adding = transition;
        }
    }

    /// Set the transition a screen prefers when popped without an explicit
    /// strategy.
    pub fn set_preferred_removing_transition(
        &mut self,
        id: ScreenId,
        transition: Option<RemovingTransition>,
    ) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.preferred_removing = transition;
        }
    }

    /// Mark a screen as prohibited from being wrapped.
    pub fn set_prohibits_wrapping(&mut self, id: ScreenId, prohibits: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.prohibits_wrapping = prohibits;
        }
    }

    /// Register an observer for stack-level events involving this screen.
    ///
    /// Handlers on a pushed/popped screen and on its stack both fire.
    pub fn add_fluid_stack_action_handler(
        &mut self,
        id: ScreenId,
        handler: impl FnMut(StackAction) + 'static,
    ) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.handlers.push(Box::new(handler));
        } else {
            tracing::warn!(%id, "action handler registered for unknown screen");
        }
    }

    pub(crate) fn dispatch(&mut self, target: ScreenId, action: StackAction) {
        let Some(node) = self.nodes.get_mut(&target) else {
            return;
        };
        let mut handlers = std::mem::take(&mut node.handlers);
        for handler in &mut handlers {
            handler(action);
        }
        if let Some(node) = self.nodes.get_mut(&target) {
            // New handlers registered during dispatch stay behind ours.
            handlers.append(&mut node.handlers);
            node.handlers = handlers;
        }
    }

    // ------------------------------------------------------------------
    // Wrapping
    // ------------------------------------------------------------------

    /// Wrap a screen so it can participate in fluid presentation.
    ///
    /// Wrapping an existing wrapper (or an already-wrapped screen) is a
    /// logged error that returns the existing wrapper — best effort, never
    /// fatal. Screens marked with [`Self::set_prohibits_wrapping`] log an
    /// error but are still wrapped.
    pub fn fluid_wrapped(&mut self, id: ScreenId) -> ScreenId {
        let Some(node) = self.nodes.get(&id) else {
            tracing::error!(%id, "attempt to wrap an unregistered screen");
            return id;
        };
        if node.wraps.is_some() {
            tracing::error!(%id, "attempt to wrap a screen that is already a wrapper");
            return id;
        }
        if let Some(existing) = node.wrapper {
            tracing::error!(%id, %existing, "screen is already wrapped; returning existing wrapper");
            return existing;
        }
        if node.prohibits_wrapping {
            tracing::error!(%id, "screen prohibits fluid wrapping");
            debug_assert!(false, "screen prohibits fluid wrapping");
        }
        let wrapper = self.register_screen();
        if let Some(wrapper_node) = self.nodes.get_mut(&wrapper) {
            wrapper_node.wraps = Some(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.wrapper = Some(wrapper);
        }
        self.set_parent(id, Some(wrapper));
        wrapper
    }

    /// The screen a wrapper was created around, if this id is a wrapper.
    pub fn wrapped_screen(&self, id: ScreenId) -> Option<ScreenId> {
        self.nodes.get(&id).and_then(|n| n.wraps)
    }

    // ------------------------------------------------------------------
    // Stack discovery
    // ------------------------------------------------------------------

    /// Every stack on the ancestor chain of `id`, nearest first.
    ///
    /// Walks structural parent links only (never presentation links), so
    /// full-screen modal boundaries are ignored, and includes `id` itself
    /// when it is a stack.
    pub fn fluid_stack_controllers(&self, id: ScreenId) -> Vec<ScreenId> {
        let mut found = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                break;
            };
            if node.stack.is_some() {
                found.push(current);
            }
            cursor = node.parent;
        }
        found
    }

    pub(crate) fn stack_candidates(&self, id: ScreenId) -> Vec<StackCandidate> {
        self.fluid_stack_controllers(id)
            .into_iter()
            .map(|stack_id| StackCandidate {
                id: stack_id,
                identifier: self
                    .nodes
                    .get(&stack_id)
                    .and_then(|n| n.stack.as_ref())
                    .and_then(|s| s.identifier.clone()),
            })
            .collect()
    }

    /// Resolve the target stack for `id` under a find strategy.
    ///
    /// Deterministic and side-effect-free.
    pub fn fluid_stack_controller(&self, id: ScreenId, strategy: &FindStrategy) -> Option<ScreenId> {
        strategy.pick(&self.stack_candidates(id))
    }

    /// The stack currently displaying this screen or its nearest owned
    /// ancestor, along with the member screen the stack actually holds.
    ///
    /// The walk stops at a stack boundary without an ownership record, so
    /// a screen hosted by a foreign stack never reports that stack as its
    /// own context.
    pub fn stack_context(&self, id: ScreenId) -> Option<(ScreenId, ScreenId)> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(&current)?;
            if let Some(owner) = node.owner_stack {
                return Some((owner, current));
            }
            let parent = node.parent?;
            if self.is_stack(parent) {
                // Reached a stack that does not own this chain: stop.
                return None;
            }
            cursor = Some(parent);
        }
        None
    }

    /// Whether this screen participates in fluid presentation.
    pub fn is_in_fluid_stack(&self, id: ScreenId) -> bool {
        self.stack_context(id).is_some()
    }

    pub(crate) fn node(&self, id: ScreenId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: ScreenId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }
}
