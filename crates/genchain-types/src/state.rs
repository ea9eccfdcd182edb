//! The minimal world-state surface consumed by block finalization.

use crate::{Address, Blake2b256, Hash32};
use blake2::Digest;
use num_bigint::BigUint;
use num_traits::Zero;
use std::collections::BTreeMap;

/// World-state access as seen by the consensus engine: balance reads and
/// credits, account nonces, and the intermediate state root. The full state
/// database lives outside the engine; this is the only surface it touches.
pub trait StateAccess {
    /// Current balance of an account (zero if absent).
    fn balance(&self, addr: &Address) -> BigUint;

    /// Credit an account.
    fn add_balance(&mut self, addr: &Address, amount: &BigUint);

    /// Current nonce of an account (zero if absent).
    fn nonce(&self, addr: &Address) -> u64;

    /// Overwrite an account nonce.
    fn set_nonce(&mut self, addr: &Address, nonce: u64);

    /// Root commitment over the current state. With `drop_empty` set
    /// (EIP-158 active), accounts with zero balance and zero nonce do not
    /// contribute to the root.
    fn intermediate_root(&self, drop_empty: bool) -> Hash32;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Account {
    balance: BigUint,
    nonce: u64,
}

impl Account {
    fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0
    }
}

/// In-memory state over a sorted map. The ordering makes the root
/// deterministic, which is what the engine's idempotence guarantees rest on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    accounts: BTreeMap<Address, Account>,
}

impl MemoryState {
    /// Fresh, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked accounts, empty ones included.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if no account has ever been touched.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl StateAccess for MemoryState {
    fn balance(&self, addr: &Address) -> BigUint {
        self.accounts
            .get(addr)
            .map(|acct| acct.balance.clone())
            .unwrap_or_default()
    }

    fn add_balance(&mut self, addr: &Address, amount: &BigUint) {
        let acct = self.accounts.entry(*addr).or_default();
        acct.balance += amount;
    }

    fn nonce(&self, addr: &Address) -> u64 {
        self.accounts.get(addr).map(|acct| acct.nonce).unwrap_or(0)
    }

    fn set_nonce(&mut self, addr: &Address, nonce: u64) {
        self.accounts.entry(*addr).or_default().nonce = nonce;
    }

    fn intermediate_root(&self, drop_empty: bool) -> Hash32 {
        let mut hasher = Blake2b256::new();
        hasher.update(b"stateroot");
        for (addr, acct) in &self.accounts {
            if drop_empty && acct.is_empty() {
                continue;
            }
            hasher.update(addr.as_bytes());
            let balance = acct.balance.to_bytes_be();
            hasher.update((balance.len() as u32).to_be_bytes());
            hasher.update(&balance);
            hasher.update(acct.nonce.to_be_bytes());
        }
        Hash32(hasher.finalize().into())
    }
}
