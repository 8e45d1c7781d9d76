use crate::core::{DbError, Entity, Result};
use std::collections::HashMap;

/// Authoritative keyed collection of entities.
///
/// Entities keep their insertion order; `replace` overwrites in place and
/// `remove` closes the gap. There is no locking here: the owner
/// serializes access.
#[derive(Debug, Clone)]
pub struct RecordStore<E: Entity> {
    entities: Vec<E>,
    positions: HashMap<String, usize>,
}

impl<E: Entity> RecordStore<E> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Build a store from existing entities, in order.
    ///
    /// Fails with `DuplicateId` on the first repeated id.
    pub fn from_entities(entities: impl IntoIterator<Item = E>) -> Result<Self> {
        let mut store = Self::new();
        for entity in entities {
            store.insert(entity)?;
        }
        Ok(store)
    }

    pub fn list(&self) -> Vec<E> {
        self.entities.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entities.iter()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.positions.get(id).map(|&pos| &self.entities[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn insert(&mut self, entity: E) -> Result<()> {
        if self.positions.contains_key(entity.id()) {
            return Err(DbError::DuplicateId(entity.id().to_string()));
        }
        self.positions
            .insert(entity.id().to_string(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    /// Overwrite the entity stored under `id`, keeping its position.
    ///
    /// The replacement must carry the same id; re-keying through
    /// `replace` would break the index.
    pub fn replace(&mut self, id: &str, entity: E) -> Result<()> {
        let pos = *self
            .positions
            .get(id)
            .ok_or_else(|| DbError::NotFound(id.to_string()))?;
        if entity.id() != id {
            return Err(DbError::Validation(format!(
                "replacement for '{}' carries id '{}'",
                id,
                entity.id()
            )));
        }
        self.entities[pos] = entity;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<E> {
        let pos = self
            .positions
            .remove(id)
            .ok_or_else(|| DbError::NotFound(id.to_string()))?;
        let removed = self.entities.remove(pos);
        for entity in &self.entities[pos..] {
            if let Some(slot) = self.positions.get_mut(entity.id()) {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<E: Entity> Default for RecordStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use serde_json::json;

    fn ids(store: &RecordStore<Record>) -> Vec<String> {
        store.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut store = RecordStore::new();
        store.insert(Record::new("b")).unwrap();
        store.insert(Record::new("a")).unwrap();
        store.insert(Record::new("c")).unwrap();
        assert_eq!(ids(&store), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut store = RecordStore::new();
        store.insert(Record::new("S1")).unwrap();
        let err = store.insert(Record::new("S1").with_field("x", 1)).unwrap_err();
        assert_eq!(err, DbError::DuplicateId("S1".into()));
        assert_eq!(store.len(), 1);
        assert!(store.get("S1").unwrap().get("x").is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut store =
            RecordStore::from_entities(vec![Record::new("a"), Record::new("b"), Record::new("c")])
                .unwrap();
        store
            .replace("b", Record::new("b").with_field("marks", 95))
            .unwrap();
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.get("b").unwrap().get("marks"), Some(&json!(95)));
    }

    #[test]
    fn test_replace_missing_fails() {
        let mut store: RecordStore<Record> = RecordStore::new();
        assert_eq!(
            store.replace("nope", Record::new("nope")).unwrap_err(),
            DbError::NotFound("nope".into())
        );
    }

    #[test]
    fn test_replace_rejects_rekeying() {
        let mut store = RecordStore::from_entities(vec![Record::new("a")]).unwrap();
        assert!(matches!(
            store.replace("a", Record::new("z")),
            Err(DbError::Validation(_))
        ));
        assert!(store.contains("a"));
        assert!(!store.contains("z"));
    }

    #[test]
    fn test_remove_reindexes_tail() {
        let mut store = RecordStore::from_entities(vec![
            Record::new("a"),
            Record::new("b"),
            Record::new("c"),
            Record::new("d"),
        ])
        .unwrap();

        let removed = store.remove("b").unwrap();
        assert_eq!(removed.id, "b");
        assert_eq!(ids(&store), vec!["a", "c", "d"]);
        assert_eq!(store.get("c").unwrap().id, "c");
        assert_eq!(store.get("d").unwrap().id, "d");

        store.insert(Record::new("b")).unwrap();
        assert_eq!(ids(&store), vec!["a", "c", "d", "b"]);
        assert_eq!(store.get("b").unwrap().id, "b");
    }

    #[test]
    fn test_remove_missing_fails() {
        let mut store: RecordStore<Record> = RecordStore::new();
        assert_eq!(
            store.remove("S1").unwrap_err(),
            DbError::NotFound("S1".into())
        );
    }

    #[test]
    fn test_from_entities_rejects_duplicates() {
        let result = RecordStore::from_entities(vec![Record::new("a"), Record::new("a")]);
        assert_eq!(result.unwrap_err(), DbError::DuplicateId("a".into()));
    }
}
