//! Parallel batch header verification with ordered results.
//!
//! A bounded pool of worker threads pulls header indices off a shared
//! cursor; a coordinator re-orders their completions so the caller sees one
//! result per input, in input order, however the scheduler interleaves the
//! workers. Cancellation is cooperative: workers observe the abort flag
//! between headers, so in-flight results may or may not still be emitted.

use crate::chain::ChainReader;
use crate::engine::GenPow;
use crate::ConsensusResult;
use genchain_types::Header;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::trace;

/// Cancellation handle for a running batch verification.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    fn new() -> Self {
        Self {
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop dispatching further headers. Workers finish the header they
    /// are on; buffered results may still arrive.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Whether the batch has been cancelled.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Verify a batch of headers on a worker pool, emitting one result per
/// header in input order.
pub(crate) fn verify_headers(
    engine: GenPow,
    chain: Arc<dyn ChainReader>,
    headers: Vec<Header>,
    seals: Vec<bool>,
) -> (AbortHandle, Receiver<ConsensusResult<()>>) {
    let total = headers.len();
    let handle = AbortHandle::new();

    // a faked-out engine accepts everything up front
    if engine.is_full_fake() || total == 0 {
        let (results_tx, results_rx) = sync_channel(total.max(1));
        for _ in 0..total {
            let _ = results_tx.send(Ok(()));
        }
        return (handle, results_rx);
    }

    let workers = total.min(num_cpus::get()).max(1);
    let headers = Arc::new(headers);
    let seals = Arc::new(seals);
    let cursor = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = sync_channel::<(usize, ConsensusResult<()>)>(workers);
    let (results_tx, results_rx) = sync_channel(total);

    for worker in 0..workers {
        let engine = engine.clone();
        let chain = Arc::clone(&chain);
        let headers = Arc::clone(&headers);
        let seals = Arc::clone(&seals);
        let cursor = Arc::clone(&cursor);
        let aborted = Arc::clone(&handle.aborted);
        let done = done_tx.clone();

        thread::Builder::new()
            .name(format!("header-verify-{worker}"))
            .spawn(move || loop {
                if aborted.load(Ordering::SeqCst) {
                    break;
                }
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                if index >= headers.len() {
                    break;
                }
                let result = verify_entry(&engine, chain.as_ref(), &headers, &seals, index);
                if done.send((index, result)).is_err() {
                    break;
                }
            })
            .expect("spawn header verification worker");
    }
    // workers hold the only remaining senders; the coordinator stops when
    // the last of them exits
    drop(done_tx);

    thread::Builder::new()
        .name("header-verify-order".to_string())
        .spawn(move || {
            let mut pending: Vec<Option<ConsensusResult<()>>> = vec![None; total];
            let mut next = 0usize;
            while next < total {
                let (index, result) = match done_rx.recv() {
                    Ok(completed) => completed,
                    Err(_) => break,
                };
                trace!(index, "header verified");
                pending[index] = Some(result);
                while next < total {
                    match pending[next].take() {
                        Some(ready) => {
                            if results_tx.send(ready).is_err() {
                                return;
                            }
                            next += 1;
                        }
                        None => break,
                    }
                }
            }
        })
        .expect("spawn header verification coordinator");

    (handle, results_rx)
}

/// Verify one batch entry. The parent is the chain header for the first
/// entry, and the preceding batch header afterwards when the hashes link
/// up; a broken link inside the batch is an unknown ancestor even if the
/// chain happens to know the header.
fn verify_entry(
    engine: &GenPow,
    chain: &dyn ChainReader,
    headers: &[Header],
    seals: &[bool],
    index: usize,
) -> ConsensusResult<()> {
    let header = &headers[index];

    let parent = if index == 0 {
        chain.get_header(&header.parent_hash, header.number.wrapping_sub(1))
    } else if headers[index - 1].hash() == header.parent_hash {
        Some(headers[index - 1].clone())
    } else {
        None
    };
    let parent = match parent {
        Some(parent) => parent,
        None => return Err(crate::ConsensusError::UnknownAncestor),
    };

    if chain.get_header(&header.hash(), header.number).is_some() {
        return Ok(());
    }

    let seal = seals.get(index).copied().unwrap_or(false);
    engine.verify_against_parent(chain, header, &parent, false, seal)
}
