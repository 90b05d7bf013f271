use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// EgressEndpoint
// ---------------------------------------------------------------------------

/// Reporting snapshot of one egress endpoint. Scores are advisory telemetry
/// only: they never remove an endpoint from rotation and never influence
/// selection (availability over optimality).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EgressEndpoint {
    pub address: String,
    pub success_score: u32,
    pub fail_score: u32,
}

struct Slot {
    address: String,
    success: AtomicU32,
    fail: AtomicU32,
}

// ---------------------------------------------------------------------------
// EgressRotator
// ---------------------------------------------------------------------------

/// Index-based round-robin over the configured endpoint list.
///
/// Cursor advancement is a single atomic step, so concurrent `next` calls
/// are safe if the executor is ever parallelized.
pub struct EgressRotator {
    slots: Vec<Slot>,
    cursor: AtomicUsize,
    enabled: bool,
}

impl EgressRotator {
    pub fn new(addresses: Vec<String>, enabled: bool) -> Self {
        let slots = addresses
            .into_iter()
            .map(|address| Slot {
                address,
                success: AtomicU32::new(0),
                fail: AtomicU32::new(0),
            })
            .collect();
        Self {
            slots,
            cursor: AtomicUsize::new(0),
            enabled,
        }
    }

    /// The next endpoint address, or `None` when rotation is disabled or the
    /// list is empty ("no proxy" is a valid state, not an error).
    pub fn next(&self) -> Option<String> {
        if !self.enabled || self.slots.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        Some(self.slots[idx].address.clone())
    }

    /// Bump the matching score counter. Unknown addresses are ignored.
    pub fn record_outcome(&self, address: &str, success: bool) {
        if let Some(slot) = self.slots.iter().find(|s| s.address == address) {
            if success {
                slot.success.fetch_add(1, Ordering::Relaxed);
            } else {
                slot.fail.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> Vec<EgressEndpoint> {
        self.slots
            .iter()
            .map(|s| EgressEndpoint {
                address: s.address.clone(),
                success_score: s.success.load(Ordering::Relaxed),
                fail_score: s.fail.load(Ordering::Relaxed),
            })
            .collect()
    }
}
