//! Navigation generations.
//!
//! Every navigation takes a [`Ticket`]. Starting a newer navigation bumps the
//! shared counter, which makes older tickets stale: their pending effects must
//! be dropped rather than applied after the fact.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter shared by all tickets of one browsing context.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new navigation, superseding every outstanding ticket.
    pub fn begin(&self) -> Ticket {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            current: Some(self.current.clone()),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Proof that a navigation is (or was) the latest one.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    current: Option<Arc<AtomicU64>>,
}

impl Ticket {
    /// Ticket that is never superseded (one-shot decisions).
    pub fn detached() -> Self {
        Self {
            generation: 0,
            current: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        match &self.current {
            Some(current) => current.load(Ordering::SeqCst) == self.generation,
            None => true,
        }
    }
}
