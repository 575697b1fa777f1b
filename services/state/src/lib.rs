//! # Pool State - Simulated Store and Mode-Aware Facade
//!
//! ## Purpose
//!
//! Holds the two worlds a pool front-end can act on. The simulated world is
//! a [`PoolStore`] owning one pool and one user position, mutated only
//! through the accounting engine. The remote world is the deployed contract
//! reached through the [`RemotePool`] seam. [`AmmFacade`] puts one read and
//! write surface over both and tracks transaction phases for the remote one.
//!
//! ## Integration Points
//!
//! - **Engine**: every simulated write runs `amm::PoolMath` under the store's lock
//! - **Configuration**: genesis, latency, decimals and chain id from `amm-config`
//! - **Remote**: any wallet/contract client implementing [`RemotePool`]
//! - **Consumers**: the `amm-sim` driver and anything rendering pool state
//!
//! ## Architecture Role
//!
//! ```text
//!                      ┌─ Simulated ─> PoolStore::apply ─> PoolMath
//! caller ─> AmmFacade ─┤
//!                      └─ Remote ────> RemotePool::submit ─> wait_for_confirmation
//!                                            │                        │
//!                                   TransactionStatus          refresh_remote
//!                                (Submitted → Pending →       (pool + balances)
//!                                 Confirmed | Failed)
//! ```
//!
//! The two worlds never exchange balances. Switching mode only changes which
//! one reads and writes go to, and clears the facade's error and status.

pub mod facade;
pub mod pool_store;
pub mod remote;
pub mod transaction;

pub use facade::{AmmFacade, FacadeSettings, Mode};
pub use pool_store::{PoolStore, StoreStats};
pub use remote::{
    OfflineRemote, Receipt, RemoteBalances, RemoteCall, RemoteError, RemotePool,
    RemotePoolState, TxHash,
};
pub use transaction::{TransactionStatus, TxPhase};
