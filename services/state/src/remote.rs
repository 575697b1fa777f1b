//! Remote Pool Collaborator
//!
//! The deployed pool contract and the user's wallet, seen through the calls
//! the facade needs: connection and approval facts, the `getPoolState` tuple,
//! token balances, and transaction submission with a confirmation wait that
//! the collaborator drives on its own schedule.
//!
//! Everything crossing this seam is in raw token units (`u128` scaled by each
//! token's decimals), exactly as the contract sees it. Conversion to engine
//! amounts happens on this side using [`TokenDecimals`].

use amm::fixed_point::{from_base_units, to_base_units};
use amm::{
    Address, AmmError, AmmResult, Asset, Operation, OperationKind, PoolState, TokenDecimals,
    UserPosition,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Precision of the contract's ratio and exchange-rate fields
pub const RATE_DECIMALS: u32 = 18;

/// Hash of a broadcast transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub hash: TxHash,
    pub block_number: u64,
    /// False when the contract reverted
    pub success: bool,
}

/// Contract call with arguments in raw token units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteCall {
    Swap { token_in: Address, amount_in: u128 },
    AddLiquidity { amount0: u128, amount1: u128 },
    RemoveLiquidity { shares: u128 },
}

impl RemoteCall {
    pub fn kind(&self) -> OperationKind {
        match self {
            RemoteCall::Swap { .. } => OperationKind::Swap,
            RemoteCall::AddLiquidity { .. } => OperationKind::AddLiquidity,
            RemoteCall::RemoveLiquidity { .. } => OperationKind::RemoveLiquidity,
        }
    }

    /// Encode an engine operation the way the wallet would (`parseUnits`)
    pub fn encode(
        operation: &Operation,
        pool: &PoolState,
        decimals: &TokenDecimals,
    ) -> AmmResult<Self> {
        let call = match *operation {
            Operation::Swap {
                token_in,
                amount_in,
            } => RemoteCall::Swap {
                token_in: pool.address_of(token_in),
                amount_in: to_base_units(amount_in, decimals.of(token_in))?,
            },
            Operation::AddLiquidity { amount0, amount1 } => RemoteCall::AddLiquidity {
                amount0: to_base_units(amount0, decimals.token0)?,
                amount1: to_base_units(amount1, decimals.token1)?,
            },
            Operation::RemoveLiquidity { shares } => RemoteCall::RemoveLiquidity {
                shares: to_base_units(shares, decimals.lp)?,
            },
        };
        Ok(call)
    }

    /// Decode back into an engine operation against the given pair
    pub fn to_operation(&self, pool: &PoolState, decimals: &TokenDecimals) -> AmmResult<Operation> {
        let operation = match *self {
            RemoteCall::Swap {
                token_in,
                amount_in,
            } => {
                let asset = if token_in == pool.token0 {
                    Asset::A
                } else if token_in == pool.token1 {
                    Asset::B
                } else {
                    return Err(AmmError::remote(format!(
                        "token 0x{} is not part of this pool",
                        hex::encode(token_in)
                    )));
                };
                Operation::Swap {
                    token_in: asset,
                    amount_in: from_base_units(amount_in, decimals.of(asset))?,
                }
            }
            RemoteCall::AddLiquidity { amount0, amount1 } => Operation::AddLiquidity {
                amount0: from_base_units(amount0, decimals.token0)?,
                amount1: from_base_units(amount1, decimals.token1)?,
            },
            RemoteCall::RemoveLiquidity { shares } => Operation::RemoveLiquidity {
                shares: from_base_units(shares, decimals.lp)?,
            },
        };
        Ok(operation)
    }
}

/// The contract's `getPoolState()` tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePoolState {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: u128,
    pub reserve1: u128,
    /// reserve1 / reserve0 at [`RATE_DECIMALS`]
    pub ratio: u128,
    pub total_lp_supply: u128,
    pub token0_exchange_rate: u128,
    pub token1_exchange_rate: u128,
}

impl RemotePoolState {
    /// Engine view of the tuple; the rate fields are derived again from reserves
    pub fn to_pool_state(&self, decimals: &TokenDecimals) -> AmmResult<PoolState> {
        Ok(PoolState {
            token0: self.token0,
            token1: self.token1,
            reserve0: from_base_units(self.reserve0, decimals.token0)?,
            reserve1: from_base_units(self.reserve1, decimals.token1)?,
            total_shares: from_base_units(self.total_lp_supply, decimals.lp)?,
        })
    }

    pub fn from_pool_state(pool: &PoolState, decimals: &TokenDecimals) -> AmmResult<Self> {
        Ok(Self {
            token0: pool.token0,
            token1: pool.token1,
            reserve0: to_base_units(pool.reserve0, decimals.token0)?,
            reserve1: to_base_units(pool.reserve1, decimals.token1)?,
            ratio: to_base_units(pool.price(), RATE_DECIMALS)?,
            total_lp_supply: to_base_units(pool.total_shares, decimals.lp)?,
            token0_exchange_rate: to_base_units(pool.exchange_rate0(), RATE_DECIMALS)?,
            token1_exchange_rate: to_base_units(pool.exchange_rate1(), RATE_DECIMALS)?,
        })
    }
}

/// Wallet balances of both tokens and the LP token, raw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteBalances {
    pub token0: u128,
    pub token1: u128,
    pub lp: u128,
}

impl RemoteBalances {
    pub fn to_position(&self, decimals: &TokenDecimals) -> AmmResult<UserPosition> {
        Ok(UserPosition::new(
            from_base_units(self.token0, decimals.token0)?,
            from_base_units(self.token1, decimals.token1)?,
            from_base_units(self.lp, decimals.lp)?,
        ))
    }

    pub fn from_position(position: &UserPosition, decimals: &TokenDecimals) -> AmmResult<Self> {
        Ok(Self {
            token0: to_base_units(position.balance_a, decimals.token0)?,
            token1: to_base_units(position.balance_b, decimals.token1)?,
            lp: to_base_units(position.lp_shares, decimals.lp)?,
        })
    }
}

/// Failures reported by the wallet or the chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Please connect your wallet")]
    Disconnected,

    #[error("Wrong network: expected chain {expected}, wallet is on {actual}")]
    NetworkMismatch { expected: u64, actual: u64 },

    #[error("RPC failure: {0}")]
    Rpc(String),

    #[error("Transaction {hash} reverted")]
    Reverted { hash: TxHash },

    #[error("Confirmation failed: {0}")]
    ConfirmationFailed(String),
}

impl From<RemoteError> for AmmError {
    fn from(err: RemoteError) -> Self {
        AmmError::remote(err.to_string())
    }
}

/// Contract and wallet behind the facade's remote mode
#[async_trait]
pub trait RemotePool: Send + Sync {
    /// Whether a wallet account is connected
    async fn is_connected(&self) -> bool;

    /// Chain the wallet is currently on
    async fn chain_id(&self) -> Result<u64, RemoteError>;

    /// Whether the pool contract may pull `amount` of `token` from the wallet
    async fn approval_satisfied(&self, token: Address, amount: u128) -> Result<bool, RemoteError>;

    async fn fetch_pool_state(&self) -> Result<RemotePoolState, RemoteError>;

    async fn fetch_balances(&self) -> Result<RemoteBalances, RemoteError>;

    /// Sign and broadcast; returns once the transaction has a hash
    async fn submit(&self, call: RemoteCall) -> Result<TxHash, RemoteError>;

    /// Wait until the transaction is mined; no timeout is applied here
    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<Receipt, RemoteError>;
}

/// Remote that never has a wallet, for runs that stay in simulated mode
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemote;

#[async_trait]
impl RemotePool for OfflineRemote {
    async fn is_connected(&self) -> bool {
        false
    }

    async fn chain_id(&self) -> Result<u64, RemoteError> {
        Err(RemoteError::Disconnected)
    }

    async fn approval_satisfied(&self, _token: Address, _amount: u128) -> Result<bool, RemoteError> {
        Err(RemoteError::Disconnected)
    }

    async fn fetch_pool_state(&self) -> Result<RemotePoolState, RemoteError> {
        Err(RemoteError::Rpc("no provider configured".to_string()))
    }

    async fn fetch_balances(&self) -> Result<RemoteBalances, RemoteError> {
        Err(RemoteError::Disconnected)
    }

    async fn submit(&self, _call: RemoteCall) -> Result<TxHash, RemoteError> {
        Err(RemoteError::Disconnected)
    }

    async fn wait_for_confirmation(&self, _hash: TxHash) -> Result<Receipt, RemoteError> {
        Err(RemoteError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm::Genesis;
    use rust_decimal_macros::dec;

    fn pool() -> PoolState {
        Genesis::seeded(
            [1u8; 20],
            [2u8; 20],
            dec!(1000),
            dec!(2500000),
            dec!(10.5),
            dec!(25000),
            None,
        )
        .unwrap()
        .pool
    }

    #[test]
    fn test_encode_uses_token_decimals() {
        let decimals = TokenDecimals::default();
        let call = RemoteCall::encode(
            &Operation::Swap {
                token_in: Asset::B,
                amount_in: dec!(2500.5),
            },
            &pool(),
            &decimals,
        )
        .unwrap();
        assert_eq!(
            call,
            RemoteCall::Swap {
                token_in: [2u8; 20],
                amount_in: 2_500_500_000,
            }
        );

        let call = RemoteCall::encode(
            &Operation::RemoveLiquidity { shares: dec!(1.5) },
            &pool(),
            &decimals,
        )
        .unwrap();
        assert_eq!(
            call,
            RemoteCall::RemoveLiquidity {
                shares: 1_500_000_000_000_000_000
            }
        );
        assert_eq!(call.kind(), OperationKind::RemoveLiquidity);
    }

    #[test]
    fn test_decode_rejects_foreign_token() {
        let call = RemoteCall::Swap {
            token_in: [9u8; 20],
            amount_in: 1,
        };
        let err = call
            .to_operation(&pool(), &TokenDecimals::default())
            .unwrap_err();
        assert!(err.is_remote());
    }

    #[test]
    fn test_pool_state_tuple() {
        let decimals = TokenDecimals::default();
        let raw = RemotePoolState::from_pool_state(&pool(), &decimals).unwrap();
        assert_eq!(raw.reserve0, 1_000 * 10u128.pow(18));
        assert_eq!(raw.reserve1, 2_500_000 * 10u128.pow(6));
        assert_eq!(raw.ratio, 2_500 * 10u128.pow(18));
        assert_eq!(raw.token1_exchange_rate, 4 * 10u128.pow(14));
        assert_eq!(raw.to_pool_state(&decimals).unwrap(), pool());
    }

    #[test]
    fn test_balances_truncate_to_token_precision() {
        let decimals = TokenDecimals::default();
        let position = UserPosition::new(dec!(1.123456789), dec!(2.123456789), dec!(3));
        let raw = RemoteBalances::from_position(&position, &decimals).unwrap();
        assert_eq!(raw.token1, 2_123_456);

        let back = raw.to_position(&decimals).unwrap();
        assert_eq!(back.balance_a, dec!(1.123456789));
        assert_eq!(back.balance_b, dec!(2.123456));
        assert_eq!(back.lp_shares, dec!(3));
    }

    #[test]
    fn test_remote_error_surfaces_as_unavailable() {
        let err: AmmError = RemoteError::NetworkMismatch {
            expected: 84532,
            actual: 1,
        }
        .into();
        assert_eq!(
            err,
            AmmError::remote("Wrong network: expected chain 84532, wallet is on 1")
        );
    }

    #[tokio::test]
    async fn test_offline_remote_refuses_everything() {
        let remote = OfflineRemote;
        assert!(!remote.is_connected().await);
        assert_eq!(
            remote
                .submit(RemoteCall::RemoveLiquidity { shares: 1 })
                .await
                .unwrap_err(),
            RemoteError::Disconnected
        );
        assert!(remote.fetch_pool_state().await.is_err());
    }
}
