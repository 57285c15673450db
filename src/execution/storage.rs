// Storage-manager boundary consumed by WorkOrders. The block format, disk
// layout, and buffer pool behind it are out of scope for this core; this
// is the contract surface a real storage manager would implement.

use crate::common::{BlockId, RelationId};

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub bytes: Vec<u8>,
}

pub trait StorageManager: Send + Sync {
    fn load_block(&self, block_id: BlockId) -> Option<Block>;
    fn create_block(&self, relation_id: RelationId) -> BlockId;
    fn drop_blocks(&self, relation_id: RelationId);
    fn finalize_block(&self, block_id: BlockId);
}

/// In-memory double sufficient to drive Query Manager / Policy Enforcer
/// tests end to end without a real buffer pool behind it.
#[derive(Default)]
pub struct InMemoryStorageManager {
    blocks: parking_lot::RwLock<std::collections::HashMap<BlockId, Block>>,
    next_block_id: std::sync::atomic::AtomicU64,
    finalized: parking_lot::RwLock<std::collections::HashSet<BlockId>>,
}

impl InMemoryStorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finalized(&self, block_id: BlockId) -> bool {
        self.finalized.read().contains(&block_id)
    }
}

impl StorageManager for InMemoryStorageManager {
    fn load_block(&self, block_id: BlockId) -> Option<Block> {
        self.blocks.read().get(&block_id).cloned()
    }

    fn create_block(&self, _relation_id: RelationId) -> BlockId {
        let id = self
            .next_block_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.blocks.write().insert(id, Block::default());
        id
    }

    fn drop_blocks(&self, _relation_id: RelationId) {
        // Block-to-relation ownership isn't tracked by this minimal double;
        // a real storage manager indexes blocks by relation to do this.
    }

    fn finalize_block(&self, block_id: BlockId) {
        self.finalized.write().insert(block_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_load_round_trips() {
        let sm = InMemoryStorageManager::new();
        let block_id = sm.create_block(1);
        assert!(sm.load_block(block_id).is_some());
        assert!(sm.load_block(block_id + 1).is_none());
    }

    #[test]
    fn finalize_marks_block_done() {
        let sm = InMemoryStorageManager::new();
        let block_id = sm.create_block(1);
        assert!(!sm.is_finalized(block_id));
        sm.finalize_block(block_id);
        assert!(sm.is_finalized(block_id));
    }
}
