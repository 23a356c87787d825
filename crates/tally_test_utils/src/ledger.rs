//! Ledger that parks reads until released.

use async_trait::async_trait;
use tally_sheets::{LedgerClient, LedgerError, MemoryLedger};
use tokio::sync::{Notify, Semaphore};

/// Wraps a [`MemoryLedger`]; every `read_range` waits at a gate, so a test
/// can observe the pipeline while a ledger round-trip is in flight.
#[derive(Debug)]
pub struct GatedLedger {
    inner: MemoryLedger,
    gate: Semaphore,
    entered: Notify,
}

impl GatedLedger {
    pub fn new(inner: MemoryLedger) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            entered: Notify::new(),
        }
    }

    pub fn inner(&self) -> &MemoryLedger {
        &self.inner
    }

    /// Resolves once a read has reached the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one parked (or future) read through.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl LedgerClient for GatedLedger {
    async fn read_range(&self) -> tally_sheets::Result<Vec<Vec<String>>> {
        self.entered.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| LedgerError::Rejected("gate closed".to_string()))?;
        permit.forget();
        self.inner.read_range().await
    }

    async fn write_range(&self, rows: &[Vec<String>]) -> tally_sheets::Result<()> {
        self.inner.write_range(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_read_waits_for_release() {
        let ledger = Arc::new(GatedLedger::new(MemoryLedger::with_rows(vec![vec![
            "Nova".to_string(),
            "1".to_string(),
        ]])));
        let reader = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.read_range().await })
        };

        ledger.wait_entered().await;
        assert!(!reader.is_finished());

        ledger.release();
        let rows = reader.await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
    }
}
