#![forbid(unsafe_code)]

//! Find strategies: pluggable rules for locating a target stack.
//!
//! The registry walks a screen's ancestor chain and produces the stacks
//! it finds, nearest first. A [`FindStrategy`] is a named pure function
//! over that ordered candidate list — deterministic and side-effect-free,
//! so strategies can be composed and retried freely.

use std::borrow::Cow;
use std::fmt;

use crate::registry::{ScreenId, StackIdentifier};

/// One stack on the ancestor chain, nearest first in the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCandidate {
    /// The stack's id.
    pub id: ScreenId,
    /// The identifier the stack was registered with, if any.
    pub identifier: Option<StackIdentifier>,
}

type Picker = Box<dyn Fn(&[StackCandidate]) -> Option<ScreenId>>;

/// A named rule picking a stack from the nearest-first candidate list.
pub struct FindStrategy {
    name: Cow<'static, str>,
    pick: Picker,
}

impl FindStrategy {
    /// Create a strategy from a name and a pure picker function.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        pick: impl Fn(&[StackCandidate]) -> Option<ScreenId> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pick: Box::new(pick),
        }
    }

    /// The strategy's name, for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the strategy to a candidate list.
    pub fn pick(&self, candidates: &[StackCandidate]) -> Option<ScreenId> {
        (self.pick)(candidates)
    }

    /// The nearest stack, including the requesting screen itself.
    pub fn current() -> Self {
        Self::new("current", |candidates| candidates.first().map(|c| c.id))
    }

    /// The nearest stack, excluding the requesting screen itself.
    pub fn nearest_ancestor() -> Self {
        Self::new("nearestAncestor", |candidates| {
            candidates.get(1).map(|c| c.id)
        })
    }

    /// The outermost stack on the chain.
    pub fn root() -> Self {
        Self::new("root", |candidates| candidates.last().map(|c| c.id))
    }

    /// The first stack registered with the given identifier.
    pub fn identifier(identifier: StackIdentifier) -> Self {
        let name = format!("identifier.{}", identifier.as_str());
        Self::new(name, move |candidates| {
            candidates
                .iter()
                .find(|c| c.identifier.as_ref() == Some(&identifier))
                .map(|c| c.id)
        })
    }

    /// The first sub-strategy to produce a result, tried in order.
    pub fn matching(
        name: impl Into<Cow<'static, str>>,
        strategies: Vec<FindStrategy>,
    ) -> Self {
        Self::new(name, move |candidates| {
            strategies
                .iter()
                .find_map(|strategy| strategy.pick(candidates))
        })
    }
}

impl fmt::Debug for FindStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindStrategy")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ScreenRegistry;
    use crate::stack::StackConfiguration;

    fn chain_of_three() -> (Vec<StackCandidate>, ScreenId, ScreenId, ScreenId) {
        let mut registry = ScreenRegistry::new();
        let outer = registry.register_stack(Some("outer".into()), StackConfiguration::default());
        let middle = registry.register_stack(None, StackConfiguration::default());
        let inner = registry.register_stack(Some("inner".into()), StackConfiguration::default());
        registry.set_parent(middle, Some(outer));
        registry.set_parent(inner, Some(middle));
        let candidates = registry.stack_candidates(inner);
        (candidates, inner, middle, outer)
    }

    #[test]
    fn current_picks_innermost() {
        let (candidates, inner, _, _) = chain_of_three();
        assert_eq!(FindStrategy::current().pick(&candidates), Some(inner));
    }

    #[test]
    fn nearest_ancestor_skips_first() {
        let (candidates, _, middle, _) = chain_of_three();
        assert_eq!(
            FindStrategy::nearest_ancestor().pick(&candidates),
            Some(middle)
        );
    }

    #[test]
    fn root_picks_outermost() {
        let (candidates, _, _, outer) = chain_of_three();
        assert_eq!(FindStrategy::root().pick(&candidates), Some(outer));
    }

    #[test]
    fn identifier_matches_stored_identifier() {
        let (candidates, inner, _, outer) = chain_of_three();
        assert_eq!(
            FindStrategy::identifier("outer".into()).pick(&candidates),
            Some(outer)
        );
        assert_eq!(
            FindStrategy::identifier("inner".into()).pick(&candidates),
            Some(inner)
        );
        assert_eq!(
            FindStrategy::identifier("absent".into()).pick(&candidates),
            None
        );
    }

    #[test]
    fn matching_tries_in_order() {
        let (candidates, _, _, outer) = chain_of_three();
        let strategy = FindStrategy::matching(
            "fallback",
            vec![
                FindStrategy::identifier("absent".into()),
                FindStrategy::root(),
                FindStrategy::current(),
            ],
        );
        assert_eq!(strategy.pick(&candidates), Some(outer));
    }

    #[test]
    fn matching_empty_returns_none() {
        let (candidates, _, _, _) = chain_of_three();
        let strategy = FindStrategy::matching("empty", Vec::new());
        assert_eq!(strategy.pick(&candidates), None);
    }

    #[test]
    fn strategies_handle_empty_candidates() {
        assert_eq!(FindStrategy::current().pick(&[]), None);
        assert_eq!(FindStrategy::nearest_ancestor().pick(&[]), None);
        assert_eq!(FindStrategy::root().pick(&[]), None);
        assert_eq!(FindStrategy::identifier("x".into()).pick(&[]), None);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(FindStrategy::current().name(), "current");
        assert_eq!(FindStrategy::nearest_ancestor().name(), "nearestAncestor");
        assert_eq!(FindStrategy::root().name(), "root");
        assert_eq!(
            FindStrategy::identifier("main".into()).name(),
            "identifier.main"
        );
    }

    #[test]
    fn strategy_is_deterministic() {
        let (candidates, _, _, _) = chain_of_three();
        let strategy = FindStrategy::root();
        assert_eq!(strategy.pick(&candidates), strategy.pick(&candidates));
    }
}
