//! Pool data model
//!
//! `PoolState` mirrors what the contract's `getPoolState` reports, with
//! the ratio and exchange rates derived rather than stored. `UserPosition`
//! is the simulated wallet of the acting user.

use crate::error::AmmResult;
use crate::fixed_point::{checked_mul, div_trunc, fixed_sqrt, quantize};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full 20-byte token address
pub type Address = [u8; 20];

/// One of the two pooled assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// token0, the base asset (e.g. WETH)
    A,
    /// token1, the quote asset (e.g. USDC)
    B,
}

impl Asset {
    pub fn other(self) -> Self {
        match self {
            Asset::A => Asset::B,
            Asset::B => Asset::A,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::A => write!(f, "token0"),
            Asset::B => write!(f, "token1"),
        }
    }
}

/// Per-token precision used when talking to the contract in raw units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDecimals {
    pub token0: u32,
    pub token1: u32,
    pub lp: u32,
}

impl TokenDecimals {
    pub fn of(&self, asset: Asset) -> u32 {
        match asset {
            Asset::A => self.token0,
            Asset::B => self.token1,
        }
    }
}

impl Default for TokenDecimals {
    /// WETH / USDC / LP
    fn default() -> Self {
        Self {
            token0: 18,
            token1: 6,
            lp: 18,
        }
    }
}

/// Reserves and outstanding LP supply of the pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: Decimal,
    pub reserve1: Decimal,
    pub total_shares: Decimal,
}

impl PoolState {
    /// Pool with no liquidity ever added
    pub fn uninitialized(token0: Address, token1: Address) -> Self {
        Self {
            token0,
            token1,
            reserve0: Decimal::ZERO,
            reserve1: Decimal::ZERO,
            total_shares: Decimal::ZERO,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.total_shares > Decimal::ZERO
    }

    /// Constant product `reserve0 * reserve1`, saturating for display
    pub fn k(&self) -> Decimal {
        self.reserve0
            .checked_mul(self.reserve1)
            .unwrap_or(Decimal::MAX)
    }

    /// Units of token1 per unit of token0; zero when unseeded
    pub fn price(&self) -> Decimal {
        ratio_or_zero(self.reserve1, self.reserve0)
    }

    /// Price of token0 in token1
    pub fn exchange_rate0(&self) -> Decimal {
        self.price()
    }

    /// Price of token1 in token0
    pub fn exchange_rate1(&self) -> Decimal {
        ratio_or_zero(self.reserve0, self.reserve1)
    }

    pub fn reserve_of(&self, asset: Asset) -> Decimal {
        match asset {
            Asset::A => self.reserve0,
            Asset::B => self.reserve1,
        }
    }

    /// `(reserve_in, reserve_out)` for a trade selling `token_in`
    pub fn reserves_for(&self, token_in: Asset) -> (Decimal, Decimal) {
        (self.reserve_of(token_in), self.reserve_of(token_in.other()))
    }

    pub fn address_of(&self, asset: Asset) -> Address {
        match asset {
            Asset::A => self.token0,
            Asset::B => self.token1,
        }
    }

    /// True when a reserve went negative or live shares sit on an empty side
    pub fn violates_invariants(&self) -> bool {
        let negative = self.reserve0 < Decimal::ZERO
            || self.reserve1 < Decimal::ZERO
            || self.total_shares < Decimal::ZERO;
        let unbacked = self.is_initialized()
            && (self.reserve0.is_zero() || self.reserve1.is_zero());
        negative || unbacked
    }
}

fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        div_trunc(numerator, denominator, "ratio").unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Holdings of the acting user in the simulated world
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPosition {
    pub balance_a: Decimal,
    pub balance_b: Decimal,
    pub lp_shares: Decimal,
}

impl UserPosition {
    pub fn new(balance_a: Decimal, balance_b: Decimal, lp_shares: Decimal) -> Self {
        Self {
            balance_a: quantize(balance_a),
            balance_b: quantize(balance_b),
            lp_shares: quantize(lp_shares),
        }
    }

    pub fn balance_of(&self, asset: Asset) -> Decimal {
        match asset {
            Asset::A => self.balance_a,
            Asset::B => self.balance_b,
        }
    }

    pub(crate) fn balance_mut(&mut self, asset: Asset) -> &mut Decimal {
        match asset {
            Asset::A => &mut self.balance_a,
            Asset::B => &mut self.balance_b,
        }
    }

    /// Percentage of the pool's LP supply held by this user
    pub fn pool_share(&self, pool: &PoolState) -> Decimal {
        if !pool.is_initialized() {
            return Decimal::ZERO;
        }
        checked_mul(self.lp_shares, dec!(100), "pool_share")
            .and_then(|scaled| div_trunc(scaled, pool.total_shares, "pool_share"))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Genesis values the simulated pool starts from and resets to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genesis {
    pub pool: PoolState,
    pub position: UserPosition,
}

impl Genesis {
    /// Seed a pool at the given reserves; the LP supply is their geometric mean
    ///
    /// `lp_shares` of `None` hands the whole genesis supply to the user.
    pub fn seeded(
        token0: Address,
        token1: Address,
        reserve0: Decimal,
        reserve1: Decimal,
        balance_a: Decimal,
        balance_b: Decimal,
        lp_shares: Option<Decimal>,
    ) -> AmmResult<Self> {
        let reserve0 = quantize(reserve0);
        let reserve1 = quantize(reserve1);
        let total_shares = fixed_sqrt(checked_mul(reserve0, reserve1, "genesis")?)?;
        let pool = PoolState {
            token0,
            token1,
            reserve0,
            reserve1,
            total_shares,
        };
        let position = UserPosition::new(
            balance_a,
            balance_b,
            lp_shares.unwrap_or(total_shares).min(total_shares),
        );
        Ok(Self { pool, position })
    }
}

/// Mutating operations a user can request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Swap { token_in: Asset, amount_in: Decimal },
    AddLiquidity { amount0: Decimal, amount1: Decimal },
    RemoveLiquidity { shares: Decimal },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Swap { .. } => OperationKind::Swap,
            Operation::AddLiquidity { .. } => OperationKind::AddLiquidity,
            Operation::RemoveLiquidity { .. } => OperationKind::RemoveLiquidity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Swap => write!(f, "swap"),
            OperationKind::AddLiquidity => write!(f, "addLiquidity"),
            OperationKind::RemoveLiquidity => write!(f, "removeLiquidity"),
        }
    }
}

/// Proportional withdrawal preview
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RemovalAmounts {
    pub amount0: Decimal,
    pub amount1: Decimal,
}

/// What an operation moved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationOutcome {
    Swapped {
        token_in: Asset,
        amount_in: Decimal,
        amount_out: Decimal,
    },
    LiquidityAdded {
        amount0: Decimal,
        amount1: Decimal,
        shares_minted: Decimal,
    },
    LiquidityRemoved {
        shares_burned: Decimal,
        amounts: RemovalAmounts,
    },
}

/// Engine output: the next pool and user state plus what moved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub pool: PoolState,
    pub position: UserPosition,
    pub outcome: OperationOutcome,
}
