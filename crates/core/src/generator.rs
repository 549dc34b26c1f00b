//! Sequential etag generation
//!
//! One generator serves every category. All categories share a single
//! sequence so that an etag allocated for a pending transactional write
//! still orders correctly against document etags once the transaction
//! commits and the shadow etag becomes the live etag. Each category's own
//! stream is therefore strictly increasing as well.
//!
//! The coarse component is the generator's start time in microseconds. When
//! the 56-bit sequence is exhausted the coarse component is bumped and the
//! sequence restarts, so values never collide.

use crate::etag::{Etag, EtagCategory};
use crate::timestamp::Timestamp;
use parking_lot::Mutex;

const MAX_SEQUENCE: u64 = (1 << 56) - 1;

#[derive(Debug)]
struct GeneratorState {
    restarts: u64,
    sequence: u64,
}

/// Monotonic, collision-free etag allocator
///
/// Thread-safe: allocation happens under a lock, never as a plain
/// read-increment-write.
#[derive(Debug)]
pub struct EtagGenerator {
    state: Mutex<GeneratorState>,
}

impl EtagGenerator {
    /// Create a generator whose coarse component is the current time
    pub fn new() -> Self {
        Self::with_restarts(Timestamp::now().as_micros())
    }

    /// Create a generator with an explicit coarse component
    pub fn with_restarts(restarts: u64) -> Self {
        EtagGenerator {
            state: Mutex::new(GeneratorState {
                restarts,
                sequence: 0,
            }),
        }
    }

    /// Create a generator that only produces etags greater than `last`
    ///
    /// Used when reopening a store whose highest etag is known, in case the
    /// clock moved backwards between runs.
    pub fn starting_after(last: Etag) -> Self {
        let now = Timestamp::now().as_micros();
        Self::with_restarts(now.max(last.restarts().saturating_add(1)))
    }

    /// Allocate the next etag for `category`
    pub fn create_sequential_etag(&self, category: EtagCategory) -> Etag {
        let mut state = self.state.lock();
        if state.sequence == MAX_SEQUENCE {
            state.restarts += 1;
            state.sequence = 0;
        }
        state.sequence += 1;
        Etag::compose(category, state.restarts, state.sequence)
    }

    /// Sequence number of the last allocation, `None` before the first one
    pub fn last_sequence(&self) -> Option<u64> {
        let state = self.state.lock();
        (state.sequence > 0).then_some(state.sequence)
    }
}

impl Default for EtagGenerator {
    fn default() -> Self {
        Self::new()
    }
}
