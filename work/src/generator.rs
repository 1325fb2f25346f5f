//! PoW generation (multi-threaded CPU, cancellable).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;

use crate::validator::work_value;
use crate::{WorkError, WorkNonce};
use tessera_types::BlockHash;

/// Nonces tried per thread between cancellation checks.
const BATCH_SIZE: u64 = 4096;

/// Generates proof-of-work for a block using all available CPU cores.
pub struct WorkGenerator;

impl WorkGenerator {
    /// Search for a nonce whose work value meets `min_difficulty`.
    ///
    /// The nonce space is split across CPU cores via rayon; the first thread
    /// to find a valid nonce signals the others to stop. Setting `cancel`
    /// aborts the search with [`WorkError::Cancelled`] — the sealing path
    /// uses this when a competing block lands first.
    pub fn generate(
        &self,
        block_hash: &BlockHash,
        min_difficulty: u64,
        cancel: &AtomicBool,
    ) -> Result<WorkNonce, WorkError> {
        if min_difficulty == 0 {
            return Ok(WorkNonce(0));
        }

        let found = AtomicU64::new(u64::MAX);
        let num_threads = rayon::current_num_threads().max(1);

        (0..num_threads).into_par_iter().for_each(|thread_id| {
            let mut nonce = thread_id as u64;
            let stride = num_threads as u64;

            loop {
                if cancel.load(Ordering::Relaxed) || found.load(Ordering::Relaxed) != u64::MAX {
                    return;
                }

                let end = nonce.saturating_add(BATCH_SIZE * stride);
                while nonce < end {
                    if work_value(block_hash, nonce) >= min_difficulty {
                        found.store(nonce, Ordering::Relaxed);
                        return;
                    }
                    nonce = nonce.wrapping_add(stride);
                }
            }
        });

        let result = found.load(Ordering::Relaxed);
        if result == u64::MAX {
            Err(WorkError::Cancelled)
        } else {
            Ok(WorkNonce(result))
        }
    }
}
