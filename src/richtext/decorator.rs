// Decorators
// A decorator finds ranges in a block (its strategy) that the view renders
// with a dedicated component. Ranges claimed by an earlier decorator cannot
// be claimed again.

use super::content_state::ContentBlock;
use super::entity::{EntityStore, Mutability};
use std::fmt;

/// Reports decorated ranges of a block as (start, end)
pub type Strategy = Box<dyn Fn(&ContentBlock, &EntityStore, &mut dyn FnMut(usize, usize))>;

pub struct Decorator {
    name: &'static str,
    strategy: Strategy,
}

impl Decorator {
    pub fn new(name: &'static str, strategy: Strategy) -> Self {
        Decorator { name, strategy }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Identifies one decorated range: which decorator, and which of its matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationKey {
    pub decorator: usize,
    pub occurrence: usize,
}

#[derive(Default)]
pub struct CompositeDecorator {
    decorators: Vec<Decorator>,
}

impl CompositeDecorator {
    pub fn new(decorators: Vec<Decorator>) -> Self {
        CompositeDecorator { decorators }
    }

    /// Decorator rendering LINK entities as anchors
    pub fn links() -> Self {
        Self::new(vec![Decorator::new("link", Box::new(link_strategy))])
    }

    pub fn decorator_name(&self, index: usize) -> Option<&'static str> {
        self.decorators.get(index).map(Decorator::name)
    }

    /// One entry per character of `block`: the decoration covering it, if any
    pub fn decorations(
        &self,
        block: &ContentBlock,
        entities: &EntityStore,
    ) -> Vec<Option<DecorationKey>> {
        let mut result: Vec<Option<DecorationKey>> = vec![None; block.len()];

        for (index, decorator) in self.decorators.iter().enumerate() {
            let mut occurrence = 0;
            let mut claim = |start: usize, end: usize| {
                let end = end.min(result.len());
                if start >= end || result[start..end].iter().any(Option::is_some) {
                    return;
                }
                let key = DecorationKey {
                    decorator: index,
                    occurrence,
                };
                result[start..end].fill(Some(key));
                occurrence += 1;
            };
            (decorator.strategy)(block, entities, &mut claim);
        }

        result
    }
}

impl fmt::Debug for CompositeDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.decorators.iter().map(Decorator::name))
            .finish()
    }
}

/// Ranges annotated with a LINK entity
pub fn link_strategy(
    block: &ContentBlock,
    entities: &EntityStore,
    callback: &mut dyn FnMut(usize, usize),
) {
    block.find_entity_ranges(
        |c| c.entity.is_some_and(|key| entities.is_link(key)),
        callback,
    );
}

/// Ranges annotated with any entity of the given mutability
pub fn mutability_strategy(mutability: Mutability) -> Strategy {
    Box::new(
        move |block: &ContentBlock,
              entities: &EntityStore,
              callback: &mut dyn FnMut(usize, usize)| {
            block.find_entity_ranges(
                |c| {
                    c.entity
                        .and_then(|key| entities.get(key))
                        .is_some_and(|e| e.mutability == mutability)
                },
                callback,
            );
        },
    )
}
