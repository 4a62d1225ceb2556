//! Entity pool handed from stage to stage
//!
//! The pool owns the normalized entity sequence together with a claim record.
//! Each stage takes the pool by value, claims what it consumes, and hands the
//! narrowed pool to the next stage. A claimed index is invisible to every
//! later stage, so the final partition is disjoint by construction.

use serde::Serialize;
use shared_types::{Entity, EntityTag, Span};

/// Pipeline stage that consumed an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Header,
    Signature,
    Event,
}

#[derive(Debug, Clone)]
pub struct EntityPool {
    entities: Vec<Entity>,
    claims: Vec<Option<Stage>>,
}

impl EntityPool {
    /// Wrap an already normalized entity sequence
    pub fn new(entities: Vec<Entity>) -> Self {
        let claims = vec![None; entities.len()];
        Self { entities, claims }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Entity {
        &self.entities[idx]
    }

    pub fn is_claimed(&self, idx: usize) -> bool {
        self.claims[idx].is_some()
    }

    /// Mark `idx` as consumed by `stage`.
    ///
    /// Returns `false` if the index was already claimed. An index claimed by
    /// an earlier stage is never reassigned.
    pub fn claim(&mut self, idx: usize, stage: Stage) -> bool {
        match self.claims[idx] {
            Some(owner) => {
                debug_assert_eq!(owner, stage, "entity {} claimed across stages", idx);
                false
            }
            None => {
                self.claims[idx] = Some(stage);
                true
            }
        }
    }

    /// Unclaimed indices in document order
    pub fn unclaimed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.entities.len()).filter(move |&idx| self.claims[idx].is_none())
    }

    /// Unclaimed indices carrying `tag`, in document order
    pub fn unclaimed_with(&self, tag: &EntityTag) -> Vec<usize> {
        self.unclaimed()
            .filter(|&idx| &self.entities[idx].tag == tag)
            .collect()
    }

    /// Pair indices with their spans, skipping entities without offsets
    pub fn spans<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = (usize, Span)> + 'a {
        indices
            .iter()
            .filter_map(move |&idx| self.entities[idx].span.map(|span| (idx, span)))
    }

    /// Entities no stage has consumed so far
    pub fn remaining(&self) -> Vec<&Entity> {
        self.unclaimed().map(|idx| &self.entities[idx]).collect()
    }

    /// Freeze the pool into a record of who consumed what
    pub fn into_ledger(self) -> ClaimLedger {
        ClaimLedger {
            entries: self.entities.into_iter().zip(self.claims).collect(),
        }
    }
}

/// Final partition of the normalized entities
#[derive(Debug, Clone)]
pub struct ClaimLedger {
    pub entries: Vec<(Entity, Option<Stage>)>,
}

impl ClaimLedger {
    pub fn claimed_by(&self, stage: Stage) -> Vec<&Entity> {
        self.entries
            .iter()
            .filter(|(_, owner)| *owner == Some(stage))
            .map(|(entity, _)| entity)
            .collect()
    }

    pub fn unconsumed(&self) -> Vec<&Entity> {
        self.entries
            .iter()
            .filter(|(_, owner)| owner.is_none())
            .map(|(entity, _)| entity)
            .collect()
    }
}
