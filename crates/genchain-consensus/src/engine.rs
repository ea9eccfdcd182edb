//! The consensus engine façade.
//!
//! [`Engine`] is the contract the node programs against; which engine
//! backs it is decided once, at node construction, from chain
//! configuration. [`GenPow`] is the proof-of-work engine of this chain.

use crate::batch::{self, AbortHandle};
use crate::chain::ChainReader;
use crate::chain_params::{MAX_UNCLES, UNCLE_GENERATION_WINDOW};
use crate::difficulty::{lake_tuple, sea_tuple, verify_tuple, LAKE_WINDOW};
use crate::pow::{compare_diff, gen_hash};
use crate::rewards::accumulate_rewards;
use crate::scalar_difficulty::calc_difficulty;
use crate::validation::check_header_rules;
use crate::{forks, ConsensusError, ConsensusResult};
use genchain_types::{Address, Block, Hash32, Header, Receipt, StateAccess, Transaction};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How much of the protocol an engine instance actually enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowMode {
    /// Full verification. The only mode fit for a live network.
    Normal,
    /// Seals are accepted unchecked (optionally delayed, optionally failing
    /// one pinned height); everything else is enforced.
    Fake,
    /// Every header verifies unconditionally.
    FullFake,
}

/// What the node hands a consensus engine and what it gets back.
pub trait Engine: Send + Sync {
    /// The account to credit for a sealed block.
    fn author(&self, header: &Header) -> Address;

    /// Verify one header against the chain.
    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()>;

    /// Verify a batch of headers concurrently. Results arrive strictly in
    /// input order; the handle cancels outstanding work.
    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, Receiver<ConsensusResult<()>>);

    /// Verify a block's uncle references.
    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()>;

    /// Verify a header's proof-of-work seal.
    fn verify_seal(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()>;

    /// Stamp the difficulty fields a miner needs before sealing.
    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()>;

    /// The scalar difficulty a child of `parent` created at `time` must
    /// carry.
    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> BigUint;

    /// Credit block rewards, commit the state root, and assemble the final
    /// block.
    fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: &mut Header,
        state: &mut dyn StateAccess,
        transactions: Vec<Transaction>,
        uncles: Vec<Header>,
        receipts: Vec<Receipt>,
    ) -> ConsensusResult<Block>;
}

/// The proof-of-work engine.
#[derive(Debug, Clone)]
pub struct GenPow {
    mode: PowMode,
    fake_delay: Duration,
    fake_fail: Option<u64>,
}

impl Default for GenPow {
    fn default() -> Self {
        Self::new()
    }
}

impl GenPow {
    /// A fully verifying engine. Every node on a live network runs this.
    pub fn new() -> Self {
        Self {
            mode: PowMode::Normal,
            fake_delay: Duration::ZERO,
            fake_fail: None,
        }
    }

    /// Test engine that accepts every seal. Never wire into a live node.
    pub fn fake() -> Self {
        Self {
            mode: PowMode::Fake,
            ..Self::new()
        }
    }

    /// Test engine that accepts every seal except at one height.
    pub fn fake_failer(number: u64) -> Self {
        Self {
            mode: PowMode::Fake,
            fake_fail: Some(number),
            ..Self::new()
        }
    }

    /// Test engine that accepts every seal after a fixed delay.
    pub fn fake_delayer(delay: Duration) -> Self {
        Self {
            mode: PowMode::Fake,
            fake_delay: delay,
            ..Self::new()
        }
    }

    /// Test engine that accepts every header outright. Only constructible
    /// by name; nothing on the configuration path can select it.
    pub fn full_fake() -> Self {
        Self {
            mode: PowMode::FullFake,
            ..Self::new()
        }
    }

    /// The engine's verification mode.
    pub fn mode(&self) -> PowMode {
        self.mode
    }

    pub(crate) fn is_full_fake(&self) -> bool {
        self.mode == PowMode::FullFake
    }

    /// Full per-header verification once a parent is in hand: invariants,
    /// optional seal, then fork consistency.
    pub(crate) fn verify_against_parent(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        parent: &Header,
        uncle: bool,
        seal: bool,
    ) -> ConsensusResult<()> {
        let config = chain.config();
        check_header_rules(config, header, parent, uncle)?;
        if seal {
            self.verify_seal(chain, header)?;
        }
        forks::verify_dao_extra(config, header)?;
        forks::verify_fork_hashes(config, header, uncle)?;
        Ok(())
    }
}

impl Engine for GenPow {
    fn author(&self, header: &Header) -> Address {
        header.coinbase
    }

    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()> {
        if self.is_full_fake() {
            return Ok(());
        }
        // known headers are good by definition
        if chain.get_header(&header.hash(), header.number).is_some() {
            return Ok(());
        }
        let parent = chain
            .get_header(&header.parent_hash, header.number.wrapping_sub(1))
            .ok_or(ConsensusError::UnknownAncestor)?;
        self.verify_against_parent(chain, header, &parent, false, seal)
    }

    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, Receiver<ConsensusResult<()>>) {
        batch::verify_headers(self.clone(), chain, headers, seals)
    }

    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()> {
        if self.is_full_fake() {
            return Ok(());
        }
        if block.uncles().len() > MAX_UNCLES {
            return Err(ConsensusError::TooManyUncles);
        }
        if block.uncles().is_empty() {
            return Ok(());
        }

        // gather the recent ancestry and every uncle it already rewarded
        let mut ancestors: HashMap<Hash32, Header> = HashMap::new();
        let mut seen: HashSet<Hash32> = HashSet::new();

        let mut parent_hash = block.parent_hash();
        let mut number = block.number().wrapping_sub(1);
        for _ in 0..UNCLE_GENERATION_WINDOW {
            let ancestor = match chain.get_block(&parent_hash, number) {
                Some(ancestor) => ancestor,
                None => break,
            };
            for uncle in ancestor.uncles() {
                seen.insert(uncle.hash());
            }
            parent_hash = ancestor.parent_hash();
            number = number.wrapping_sub(1);
            ancestors.insert(ancestor.hash(), ancestor.header().clone());
        }
        ancestors.insert(block.hash(), block.header().clone());
        seen.insert(block.hash());

        for uncle in block.uncles() {
            // rewarded once, ever
            let hash = uncle.hash();
            if !seen.insert(hash) {
                return Err(ConsensusError::DuplicateUncle);
            }
            if ancestors.contains_key(&hash) {
                return Err(ConsensusError::UncleIsAncestor);
            }
            let uncle_parent = ancestors
                .get(&uncle.parent_hash)
                .ok_or(ConsensusError::DanglingUncle)?;
            if uncle.parent_hash == block.parent_hash() {
                return Err(ConsensusError::DanglingUncle);
            }
            self.verify_against_parent(chain, uncle, uncle_parent, true, true)?;
        }
        Ok(())
    }

    fn verify_seal(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()> {
        if self.mode == PowMode::Fake || self.mode == PowMode::FullFake {
            if !self.fake_delay.is_zero() {
                thread::sleep(self.fake_delay);
            }
            if self.fake_fail == Some(header.number) {
                return Err(ConsensusError::InvalidPoW);
            }
            return Ok(());
        }

        if header.difficulty.is_zero() {
            return Err(ConsensusError::InvalidDifficulty {
                have: "0".to_string(),
                want: "positive".to_string(),
            });
        }

        // the nonce must reproduce the committed fuzzy hash and land under
        // the zero-digit target
        let seal_hash = header.seal_hash();
        let (fhash, _, hash256) = gen_hash(&seal_hash, header.nonce, header.p, header.n);
        if fhash != header.fuzzy_hash {
            return Err(ConsensusError::InvalidMixDigest);
        }
        if !compare_diff(&hash256, header.p) {
            return Err(ConsensusError::InvalidMixDigest);
        }

        // the claimed parameters must fall out of the stored timespan
        let seafork = chain.config().is_seafork(header.number);
        let (n, p) = verify_tuple(seafork, header);
        if header.n != n || header.p != p {
            return Err(ConsensusError::InvalidPoW);
        }
        Ok(())
    }

    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()> {
        let parent = chain
            .get_header(&header.parent_hash, header.number.wrapping_sub(1))
            .ok_or(ConsensusError::UnknownAncestor)?;
        if parent.time >= header.time {
            return Err(ConsensusError::UnknownAncestor);
        }

        let tuple = if chain.config().is_seafork(header.number) {
            sea_tuple(header, &parent)
        } else {
            let parent12 = if header.number > LAKE_WINDOW {
                let found = chain.get_header_by_number(header.number - LAKE_WINDOW);
                if found.is_none() {
                    return Err(ConsensusError::UnknownAncestor);
                }
                found
            } else {
                None
            };
            lake_tuple(header, &parent, parent12.as_ref())
        };

        header.n = tuple.n;
        header.nn = parent.n;
        header.p = tuple.p;
        header.pp = parent.p;
        header.alpha = tuple.alpha;
        header.np = tuple.np;

        let time = header.time.to_u64().unwrap_or(u64::MAX);
        header.difficulty = calc_difficulty(chain.config(), time, &parent);

        debug!(
            number = header.number,
            n = header.n,
            p = header.p,
            alpha = header.alpha,
            "header prepared"
        );
        Ok(())
    }

    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> BigUint {
        calc_difficulty(chain.config(), time, parent)
    }

    fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: &mut Header,
        state: &mut dyn StateAccess,
        transactions: Vec<Transaction>,
        uncles: Vec<Header>,
        receipts: Vec<Receipt>,
    ) -> ConsensusResult<Block> {
        accumulate_rewards(state, header, &uncles);
        header.root = state.intermediate_root(chain.config().is_eip158(header.number));
        Ok(Block::new(header.clone(), transactions, uncles, &receipts))
    }
}
