// Minimal stand-in for the catalog boundary named in the external
// interfaces: `resolve_relation`, `create_relation`, `drop_relation`, and
// `register_new_block`. The catalog's own persistence format, migration
// logic, and view/permission machinery are out of scope; this module exists
// only so the parser's typed column validation and the execution core's
// `new_block_available` handling have a concrete collaborator to test
// against.

use crate::common::{BlockId, QueryId, RelationId};
use crate::error::{DbError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Column data type, restricted to what the parser's CREATE TABLE grammar
/// recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Double,
    Char(usize),
    Varchar(usize),
    DateTime,
    DateTimeInterval,
    YearMonthInterval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug)]
pub struct RelationSchema {
    pub name: String,
    pub relation_id: RelationId,
    pub columns: Vec<Column>,
}

/// An event the catalog asynchronously delivers to a Query Manager when a
/// new block is registered for one of its output relations.
#[derive(Debug, Clone, Copy)]
pub struct NewBlockEvent {
    pub relation_id: RelationId,
    pub block_id: BlockId,
    pub query_id: QueryId,
}

/// In-memory catalog sufficient to drive the execution core end to end in
/// tests. Real persistence is out of scope.
#[derive(Clone, Default)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogInner>>,
}

#[derive(Default)]
struct CatalogInner {
    relations: HashMap<String, RelationSchema>,
    by_id: HashMap<RelationId, String>,
    next_id: RelationId,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `resolve_relation(name) -> relation_id?`
    pub fn resolve_relation(&self, name: &str) -> Option<RelationId> {
        self.inner.read().relations.get(name).map(|r| r.relation_id)
    }

    /// `create_relation(name, attributes) -> relation_id`
    pub fn create_relation(&self, name: &str, columns: Vec<Column>) -> Result<RelationId> {
        let mut inner = self.inner.write();
        if inner.relations.contains_key(name) {
            return Err(DbError::AlreadyExists(name.to_string()));
        }
        let relation_id = inner.next_id;
        inner.next_id += 1;
        inner.by_id.insert(relation_id, name.to_string());
        inner.relations.insert(
            name.to_string(),
            RelationSchema {
                name: name.to_string(),
                relation_id,
                columns,
            },
        );
        Ok(relation_id)
    }

    /// `drop_relation(relation_id)`
    pub fn drop_relation(&self, relation_id: RelationId) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.by_id.remove(&relation_id) {
            Some(name) => {
                inner.relations.remove(&name);
                Ok(())
            }
            None => Err(DbError::NotFound(format!("relation {relation_id}"))),
        }
    }

    pub fn schema_of(&self, relation_id: RelationId) -> Option<RelationSchema> {
        let inner = self.inner.read();
        inner
            .by_id
            .get(&relation_id)
            .and_then(|name| inner.relations.get(name))
            .cloned()
    }

    /// `register_new_block(relation_id, block_id, query_id)`: builds the
    /// event the catalog sends to the owning Query Manager. Delivery itself
    /// goes through the message queue the caller already holds; the
    /// catalog has no bus of its own.
    pub fn register_new_block(
        &self,
        relation_id: RelationId,
        block_id: BlockId,
        query_id: QueryId,
    ) -> NewBlockEvent {
        NewBlockEvent {
            relation_id,
            block_id,
            query_id,
        }
    }
}

impl Clone for RelationSchema {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            relation_id: self.relation_id,
            columns: self.columns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_resolve() {
        let catalog = Catalog::new();
        assert!(catalog.resolve_relation("t").is_none());

        let id = catalog
            .create_relation(
                "t",
                vec![Column {
                    name: "a".to_string(),
                    data_type: DataType::Integer,
                }],
            )
            .unwrap();
        assert_eq!(catalog.resolve_relation("t"), Some(id));
        assert_eq!(catalog.schema_of(id).unwrap().columns.len(), 1);
    }

    #[test]
    fn duplicate_relation_name_rejected() {
        let catalog = Catalog::new();
        catalog.create_relation("t", vec![]).unwrap();
        assert!(matches!(
            catalog.create_relation("t", vec![]),
            Err(DbError::AlreadyExists(_))
        ));
    }

    #[test]
    fn register_new_block_builds_event() {
        let catalog = Catalog::new();
        let id = catalog.create_relation("t", vec![]).unwrap();
        let event = catalog.register_new_block(id, 7, 42);
        assert_eq!(event.relation_id, id);
        assert_eq!(event.block_id, 7);
        assert_eq!(event.query_id, 42);
    }

    #[test]
    fn drop_removes_resolution() {
        let catalog = Catalog::new();
        let id = catalog.create_relation("t", vec![]).unwrap();
        catalog.drop_relation(id).unwrap();
        assert!(catalog.resolve_relation("t").is_none());
    }

    #[test]
    fn drop_unknown_relation_reports_not_found() {
        let catalog = Catalog::new();
        assert!(matches!(catalog.drop_relation(999), Err(DbError::NotFound(_))));
    }
}
