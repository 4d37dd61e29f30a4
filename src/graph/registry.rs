//! Relation type registry: bidirectional name ↔ id mapping.
//!
//! Two `DashMap`s give O(1) lookups in both directions and let rayon workers
//! read concurrently while the table is filled lazily. Inserting the same
//! type twice is harmless.

use dashmap::DashMap;

use super::{RelationType, RelationTypeId};

/// Bidirectional relation type table.
#[derive(Debug, Default)]
pub struct RelationRegistry {
    /// Forward map: id → relation type (source of truth).
    by_id: DashMap<RelationTypeId, RelationType>,
    /// Reverse map: exact name → id. JDM names are case-sensitive.
    by_name: DashMap<String, RelationTypeId>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation type, replacing any previous entry with the same id.
    pub fn insert(&self, relation: RelationType) {
        self.by_name.insert(relation.name.clone(), relation.id);
        self.by_id.insert(relation.id, relation);
    }

    /// Register every relation type of a listing.
    pub fn extend(&self, relations: impl IntoIterator<Item = RelationType>) {
        for relation in relations {
            self.insert(relation);
        }
    }

    pub fn id_of(&self, name: &str) -> Option<RelationTypeId> {
        self.by_name.get(name).map(|r| *r.value())
    }

    pub fn name_of(&self, id: RelationTypeId) -> Option<String> {
        self.by_id.get(&id).map(|r| r.value().name.clone())
    }

    /// All registered relation types, sorted by id.
    pub fn all(&self) -> Vec<RelationType> {
        let mut all: Vec<RelationType> = self.by_id.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|r| r.id);
        all
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
