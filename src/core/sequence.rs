use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request counter used to drop stale responses.
///
/// Every fetch that writes shared state takes a ticket before it starts and
/// only applies its result if the ticket is still the latest one issued.
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidate every outstanding ticket.
    pub fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}
