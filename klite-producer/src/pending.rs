use tokio::sync::oneshot;

use crate::error::SharedProducerError;

/// A waiter's eventual result: the offset assigned to its payload, or the
/// shared flush error if the batch failed atomically.
pub type SendResult = Result<i64, SharedProducerError>;

/// The transient, producer-instance-local accumulation of sends awaiting a
/// flush for one (topic, partition). Not shared across producer instances:
/// each instance owns its own pending-batch map, guarded by its own mutex.
pub struct PendingBatch {
    pub payloads: Vec<Vec<u8>>,
    pub waiters: Vec<oneshot::Sender<SendResult>>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self {
            payloads: Vec::new(),
            waiters: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn push(&mut self, payload: Vec<u8>) -> oneshot::Receiver<SendResult> {
        let (tx, rx) = oneshot::channel();
        self.payloads.push(payload);
        self.waiters.push(tx);
        rx
    }

    /// Atomically detach this batch's contents, leaving an empty batch
    /// behind for subsequent sends to accumulate into. A timer that fires
    /// after another flush already detached the batch finds it empty here
    /// and the caller's `is_empty` guard (under the same mutex) no-ops.
    pub fn take(&mut self) -> (Vec<Vec<u8>>, Vec<oneshot::Sender<SendResult>>) {
        (
            std::mem::take(&mut self.payloads),
            std::mem::take(&mut self.waiters),
        )
    }
}

impl Default for PendingBatch {
    fn default() -> Self {
        Self::new()
    }
}
