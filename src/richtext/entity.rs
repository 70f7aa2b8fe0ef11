// Entity table
// Entities annotate character ranges with a type and data (e.g. a link URL).
// The table is append-only: entities are never deleted or changed in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque handle to an entity stored in an [`EntityStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityKey(u32);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Link,
    Image,
    Token,
}

/// How the annotated text behaves when edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    /// Text may be edited freely, the annotation follows the remaining characters
    Mutable,
    /// Partially editing the text removes the annotation from the whole range
    Immutable,
    /// Like immutable, but whole segments may be removed
    Segmented,
}

/// Entity payload
pub type EntityData = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub entity_type: EntityType,
    pub mutability: Mutability,
    pub data: EntityData,
}

impl Entity {
    pub fn new(entity_type: EntityType, mutability: Mutability, data: EntityData) -> Self {
        Entity {
            entity_type,
            mutability,
            data,
        }
    }

    /// Mutable link entity pointing at `url`
    pub fn link(url: impl Into<String>) -> Self {
        let mut data = EntityData::new();
        data.insert("url".to_string(), url.into());
        Self::new(EntityType::Link, Mutability::Mutable, data)
    }

    pub fn is_link(&self) -> bool {
        self.entity_type == EntityType::Link
    }

    /// Link destination, if the entity carries one
    pub fn url(&self) -> Option<&str> {
        self.data.get("url").map(String::as_str)
    }
}

/// Append-only table of entities
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and return its key
    pub fn create(
        &mut self,
        entity_type: EntityType,
        mutability: Mutability,
        data: EntityData,
    ) -> EntityKey {
        self.add(Entity::new(entity_type, mutability, data))
    }

    pub fn add(&mut self, entity: Entity) -> EntityKey {
        self.entities.push(entity);
        // Keys start at 1 so that they never collide with a zero sentinel in foreign data
        EntityKey(self.entities.len() as u32)
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        (key.0 as usize)
            .checked_sub(1)
            .and_then(|idx| self.entities.get(idx))
    }

    /// Whether the key refers to a LINK entity
    pub fn is_link(&self, key: EntityKey) -> bool {
        self.get(key).is_some_and(Entity::is_link)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
