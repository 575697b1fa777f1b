//! Remote transaction lifecycle
//!
//! `Submitted` (waiting for signature and broadcast) → `Pending` (broadcast,
//! waiting to be mined) → `Confirmed` or `Failed`. A broadcast transaction
//! cannot be withdrawn, so there is no cancelled phase.

use crate::remote::{Receipt, TxHash};
use amm::OperationKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPhase {
    Submitted,
    Pending,
    Confirmed,
    Failed,
}

/// Observable status of the most recent remote transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub kind: OperationKind,
    pub hash: Option<TxHash>,
    pub phase: TxPhase,
    pub block_number: Option<u64>,
}

impl TransactionStatus {
    pub fn submitted(kind: OperationKind) -> Self {
        Self {
            kind,
            hash: None,
            phase: TxPhase::Submitted,
            block_number: None,
        }
    }

    pub fn broadcast(&mut self, hash: TxHash) {
        self.hash = Some(hash);
        self.phase = TxPhase::Pending;
    }

    pub fn confirm(&mut self, receipt: &Receipt) {
        self.hash = Some(receipt.hash);
        self.block_number = Some(receipt.block_number);
        self.phase = TxPhase::Confirmed;
    }

    pub fn fail(&mut self) {
        self.phase = TxPhase::Failed;
    }

    /// Submitted or pending: another submission must wait
    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, TxPhase::Submitted | TxPhase::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_progression() {
        let hash = TxHash([7u8; 32]);
        let mut status = TransactionStatus::submitted(OperationKind::Swap);
        assert!(status.is_in_flight());
        assert_eq!(status.hash, None);

        status.broadcast(hash);
        assert_eq!(status.phase, TxPhase::Pending);
        assert!(status.is_in_flight());

        status.confirm(&Receipt {
            hash,
            block_number: 42,
            success: true,
        });
        assert_eq!(status.phase, TxPhase::Confirmed);
        assert_eq!(status.block_number, Some(42));
        assert!(!status.is_in_flight());
    }

    #[test]
    fn test_failure_before_broadcast() {
        let mut status = TransactionStatus::submitted(OperationKind::AddLiquidity);
        status.fail();
        assert_eq!(status.phase, TxPhase::Failed);
        assert_eq!(status.hash, None);
        assert!(!status.is_in_flight());
    }
}
