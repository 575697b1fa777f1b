//! # Pool AMM Library - Constant Product Accounting Engine
//!
//! ## Purpose
//!
//! Exact arithmetic for a single two-asset constant product pool (`x * y = k`):
//! swap quotes with the 0.3% input fee, LP share issuance for deposits,
//! proportional redemption on withdrawal, and the 1% ratio tolerance that
//! gates deposits. The functions reproduce the pool contract's integer
//! semantics so a simulated pool behaves exactly like the deployed one.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool state snapshots from the simulated store or the remote contract
//! - **Output Destinations**: `pool-state` store commits, facade previews, the simulator CLI
//! - **Precision**: `Decimal` quantised to 9 places, truncating division, integer square root
//!
//! ## Architecture Role
//!
//! ```text
//! Facade ──> PoolStore::apply ──> PoolMath::{execute_swap, add_liquidity, remove_liquidity}
//!    │                                   │
//!    └── previews ──> PoolMath::{swap_estimate, price_impact, removal_amounts}
//!                                        │
//!                               fixed_point::{integer_sqrt, min_of, div_trunc}
//! ```
//!
//! Nothing in this crate holds state; every operation maps an input state to
//! an [`OperationResult`] or an [`AmmError`] without touching its inputs.

pub mod error;
pub mod fixed_point;
pub mod pool_math;
pub mod types;

pub use error::{AmmError, AmmResult};
pub use fixed_point::{fixed_sqrt, integer_sqrt, min_of, quantize, AMOUNT_SCALE};
pub use pool_math::{PoolMath, FEE_DENOMINATOR, FEE_NUMERATOR, RATIO_TOLERANCE_BPS};
pub use types::{
    Address, Asset, Genesis, Operation, OperationKind, OperationOutcome, OperationResult,
    PoolState, RemovalAmounts, TokenDecimals, UserPosition,
};

/// Common types for pool calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
