// Hierarchical (database, relation, block, tuple) resource identifier.
//
// Grounded on the original `ResourceId.cpp`: components are optional
// (`None` standing in for the C++ sentinel), parent-of zeroes the deepest
// specified component, and hashing combines the four component hashes with
// a fixed, non-commutative mixing function so that permutations of the same
// values hash differently.

use std::hash::{Hash, Hasher};

use crate::common::{BlockId, DatabaseId, RelationId};

/// Row-within-block identifier. Kept local to this module: nothing else in
/// the execution core needs to know its representation.
pub type TupleId = u64;

/// A 4-tuple (database, relation, block, tuple) resource name used as the
/// Lock Table's key. Valid iff specified components form a prefix of the
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId {
    database: DatabaseId,
    relation: Option<RelationId>,
    block: Option<BlockId>,
    tuple: Option<TupleId>,
}

impl ResourceId {
    pub fn make_db(database: DatabaseId) -> Self {
        Self {
            database,
            relation: None,
            block: None,
            tuple: None,
        }
    }

    pub fn make_rel(database: DatabaseId, relation: RelationId) -> Self {
        Self {
            database,
            relation: Some(relation),
            block: None,
            tuple: None,
        }
    }

    pub fn make_block(database: DatabaseId, relation: RelationId, block: BlockId) -> Self {
        Self {
            database,
            relation: Some(relation),
            block: Some(block),
            tuple: None,
        }
    }

    pub fn make_tuple(
        database: DatabaseId,
        relation: RelationId,
        block: BlockId,
        tuple: TupleId,
    ) -> Self {
        Self {
            database,
            relation: Some(relation),
            block: Some(block),
            tuple: Some(tuple),
        }
    }

    pub fn is_db(&self) -> bool {
        self.relation.is_none()
    }

    pub fn is_rel(&self) -> bool {
        self.relation.is_some() && self.block.is_none()
    }

    pub fn is_block(&self) -> bool {
        self.block.is_some() && self.tuple.is_none()
    }

    pub fn is_tuple(&self) -> bool {
        self.tuple.is_some()
    }

    /// Parent-of: zeroes the deepest specified component. Fails when called
    /// on a database-level id, which has no parent.
    pub fn parent(&self) -> Option<ResourceId> {
        if self.is_tuple() {
            Some(Self {
                database: self.database,
                relation: self.relation,
                block: self.block,
                tuple: None,
            })
        } else if self.is_block() {
            Some(Self {
                database: self.database,
                relation: self.relation,
                block: None,
                tuple: None,
            })
        } else if self.is_rel() {
            Some(Self::make_db(self.database))
        } else {
            None
        }
    }

    pub fn to_display_string(&self) -> String {
        fn fmt(component: Option<u64>) -> String {
            match component {
                Some(v) => v.to_string(),
                None => "_".to_string(),
            }
        }
        format!(
            "({}, {}, {}, {})",
            self.database,
            fmt(self.relation.map(|r| r as u64)),
            fmt(self.block),
            fmt(self.tuple),
        )
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

fn hash_component<T: Hash>(value: T) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Non-commutative pairwise combine, matching the nesting in
/// `ResourceIdHasher::operator()`: combine(combine(h1, h2), combine(h3, h4)).
fn combine_hashes(a: u64, b: u64) -> u64 {
    a.rotate_left(5) ^ b.wrapping_mul(0x9E3779B97F4A7C15)
}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let h1 = hash_component(self.database);
        let h2 = hash_component(self.relation);
        let h3 = hash_component(self.block);
        let h4 = hash_component(self.tuple);
        let combined = combine_hashes(combine_hashes(h1, h2), combine_hashes(h3, h4));
        combined.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_zeroes_deepest_component() {
        let t = ResourceId::make_tuple(1, 2, 3, 4);
        let b = t.parent().unwrap();
        assert!(b.is_block());
        let r = b.parent().unwrap();
        assert!(r.is_rel());
        let d = r.parent().unwrap();
        assert!(d.is_db());
        assert!(d.parent().is_none());
    }

    #[test]
    fn hash_is_order_sensitive() {
        use std::collections::hash_map::DefaultHasher;

        let a = ResourceId::make_block(1, 2, 0);
        let b = ResourceId {
            database: 0,
            relation: Some(2),
            block: Some(1),
            tuple: None,
        };

        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);

        assert_ne!(ha.finish(), hb.finish());
    }

    #[test]
    fn equality_is_componentwise() {
        assert_eq!(ResourceId::make_rel(1, 2), ResourceId::make_rel(1, 2));
        assert_ne!(ResourceId::make_rel(1, 2), ResourceId::make_rel(1, 3));
    }
}
