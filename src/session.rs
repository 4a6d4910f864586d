//! Contains the session type owning the retryable-write transaction-number counter.

/// A session for a sequence of related operations. The only state this crate consumes is the
/// monotonic transaction-number counter used to tag retryable writes so the cluster can suppress
/// duplicate application on retry.
#[derive(Debug, Default)]
pub struct ClientSession {
    txn_number: u64,
}

impl ClientSession {
    /// Creates a new session with a fresh transaction-number counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current txn_number.
    pub fn txn_number(&self) -> u64 {
        self.txn_number
    }

    /// Increments the txn_number and returns the new value.
    pub fn get_and_increment_txn_number(&mut self) -> u64 {
        self.txn_number += 1;
        self.txn_number
    }
}
