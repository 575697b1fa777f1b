//! Pool Error Types
//!
//! Every way an operation against the pool can be refused. Engine
//! functions fail before producing a new state, so an error never
//! implies a partial mutation.

use crate::types::Asset;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result alias used across the engine, store and facade
pub type AmmResult<T> = Result<T, AmmError>;

/// Unified error for pool operations in both simulated and remote mode
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmmError {
    /// A supplied quantity is zero or negative
    #[error("AMM: Invalid amount")]
    InvalidAmount,

    /// Deposit amounts must both be positive
    #[error("AMM: Invalid reserve values")]
    InvalidReserveValues,

    #[error("Insufficient {asset} balance. Required: {required}, Available: {available}")]
    InsufficientBalance {
        asset: Asset,
        required: Decimal,
        available: Decimal,
    },

    /// Swap output computed to zero, only possible against empty reserves
    #[error("AMM: Invalid amount out")]
    InvalidAmountOut,

    /// Deposit ratio deviates from the pool ratio by more than the tolerance
    #[error("Invalid ratio: reserve0*amount1={left}, reserve1*amount0={right}")]
    InvalidRatio { left: Decimal, right: Decimal },

    #[error("AMM: Invalid shares")]
    InvalidShares,

    #[error("AMM: Insufficient shares. Required: {required}, Available: {available}")]
    InsufficientShares { required: Decimal, available: Decimal },

    /// Withdrawal would return nothing of one side
    #[error("AMM: Invalid reserves")]
    InvalidReserves,

    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    /// Allowance for the asset has not been granted to the pool contract
    #[error("Approval required for {amount} of {asset}")]
    ApprovalRequired { asset: Asset, amount: Decimal },

    /// Wallet disconnected, wrong network, or the confirmation wait failed
    #[error("Remote unavailable: {reason}")]
    RemoteUnavailable { reason: String },
}

impl AmmError {
    pub fn overflow(operation: &'static str) -> Self {
        AmmError::ArithmeticOverflow { operation }
    }

    pub fn remote(reason: impl Into<String>) -> Self {
        AmmError::RemoteUnavailable {
            reason: reason.into(),
        }
    }

    /// Errors that only the remote path can produce
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AmmError::RemoteUnavailable { .. } | AmmError::ApprovalRequired { .. }
        )
    }
}
