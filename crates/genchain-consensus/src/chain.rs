//! Read-only chain access consumed by the engine.

use crate::chain_params::ChainConfig;
use genchain_types::{Block, Hash32, Header};
use parking_lot::RwLock;
use std::collections::HashMap;

/// The slice of the chain the engine is allowed to see: configuration and
/// header/block lookups. Implementations must be safe for concurrent reads;
/// the batch verifier shares one reader across its worker pool.
pub trait ChainReader: Send + Sync {
    /// The chain's fork configuration.
    fn config(&self) -> &ChainConfig;

    /// Header by hash and height.
    fn get_header(&self, hash: &Hash32, number: u64) -> Option<Header>;

    /// Canonical header at a height.
    fn get_header_by_number(&self, number: u64) -> Option<Header>;

    /// Block by hash and height.
    fn get_block(&self, hash: &Hash32, number: u64) -> Option<Block>;
}

#[derive(Default)]
struct ChainIndex {
    headers: HashMap<(Hash32, u64), Header>,
    blocks: HashMap<(Hash32, u64), Block>,
    canonical: HashMap<u64, Hash32>,
}

/// An in-memory chain index. Backs the engine's tests and any tooling that
/// wants to replay headers without a database; inserts and lookups may run
/// concurrently.
pub struct MemoryChain {
    config: ChainConfig,
    index: RwLock<ChainIndex>,
}

impl MemoryChain {
    /// Empty chain under the given configuration.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            index: RwLock::new(ChainIndex::default()),
        }
    }

    /// Index a header and mark it canonical at its height.
    pub fn insert_header(&self, header: Header) {
        let mut index = self.index.write();
        let hash = header.hash();
        index.canonical.insert(header.number, hash);
        index.headers.insert((hash, header.number), header);
    }

    /// Index a block (and its header) and mark it canonical at its height.
    pub fn insert_block(&self, block: Block) {
        let mut index = self.index.write();
        let hash = block.hash();
        let number = block.number();
        index.canonical.insert(number, hash);
        index.headers.insert((hash, number), block.header().clone());
        index.blocks.insert((hash, number), block);
    }
}

impl ChainReader for MemoryChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn get_header(&self, hash: &Hash32, number: u64) -> Option<Header> {
        self.index.read().headers.get(&(*hash, number)).cloned()
    }

    fn get_header_by_number(&self, number: u64) -> Option<Header> {
        let index = self.index.read();
        let hash = index.canonical.get(&number)?;
        index.headers.get(&(*hash, number)).cloned()
    }

    fn get_block(&self, hash: &Hash32, number: u64) -> Option<Block> {
        self.index.read().blocks.get(&(*hash, number)).cloned()
    }
}
