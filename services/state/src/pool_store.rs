//! Pool State Store
//!
//! Owns the simulated pool and the acting user's position. Operations run
//! through the engine and commit atomically under a single-flight lock;
//! snapshots are copies, never references into the store.

use amm::{AmmError, AmmResult, Genesis, Operation, OperationResult, PoolMath, PoolState, UserPosition};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Counters for operations the store has seen
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub applied: u64,
    pub rejected: u64,
    pub resets: u64,
}

struct StoreState {
    pool: PoolState,
    position: UserPosition,
}

/// Mutable backing store for simulated mode
pub struct PoolStore {
    genesis: Genesis,
    state: Mutex<StoreState>,
    stats: RwLock<StoreStats>,
}

impl PoolStore {
    pub fn new(genesis: Genesis) -> Self {
        let state = StoreState {
            pool: genesis.pool.clone(),
            position: genesis.position.clone(),
        };
        Self {
            genesis,
            state: Mutex::new(state),
            stats: RwLock::new(StoreStats::default()),
        }
    }

    /// Copies of the current pool and position
    pub fn snapshot(&self) -> (PoolState, UserPosition) {
        let state = self.state.lock();
        (state.pool.clone(), state.position.clone())
    }

    pub fn pool(&self) -> PoolState {
        self.state.lock().pool.clone()
    }

    pub fn position(&self) -> UserPosition {
        self.state.lock().position.clone()
    }

    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.read().clone()
    }

    /// Run an operation against the current state without committing it
    pub fn preview(&self, operation: &Operation) -> AmmResult<OperationResult> {
        let state = self.state.lock();
        run(&state.pool, &state.position, operation)
    }

    /// Run an operation and commit its result, or leave the state untouched on error
    pub fn apply(&self, operation: Operation) -> AmmResult<OperationResult> {
        let mut state = self.state.lock();

        let result = match run(&state.pool, &state.position, &operation) {
            Ok(result) => result,
            Err(e) => {
                warn!("Rejected {} against simulated pool: {}", operation.kind(), e);
                self.stats.write().rejected += 1;
                return Err(e);
            }
        };

        // Engine bug, not a user error: refuse to commit a broken pool
        debug_assert!(
            !result.pool.violates_invariants(),
            "engine produced an invalid pool state: {:?}",
            result.pool
        );
        if result.pool.violates_invariants() {
            error!(
                "Refusing to commit {}: result breaks pool invariants: {:?}",
                operation.kind(),
                result.pool
            );
            self.stats.write().rejected += 1;
            return Err(AmmError::InvalidReserves);
        }

        state.pool = result.pool.clone();
        state.position = result.position.clone();
        self.stats.write().applied += 1;

        info!(
            "Committed {}: reserve0={} reserve1={} total_shares={}",
            operation.kind(),
            state.pool.reserve0,
            state.pool.reserve1,
            state.pool.total_shares
        );
        Ok(result)
    }

    /// Restore the genesis pool and position
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.pool = self.genesis.pool.clone();
        state.position = self.genesis.position.clone();
        self.stats.write().resets += 1;
        info!("Simulated pool reset to genesis");
    }
}

fn run(
    pool: &PoolState,
    position: &UserPosition,
    operation: &Operation,
) -> AmmResult<OperationResult> {
    match *operation {
        Operation::Swap {
            token_in,
            amount_in,
        } => PoolMath::execute_swap(pool, position, token_in, amount_in),
        Operation::AddLiquidity { amount0, amount1 } => {
            PoolMath::add_liquidity(pool, position, amount0, amount1)
        }
        Operation::RemoveLiquidity { shares } => {
            PoolMath::remove_liquidity(pool, position, shares)
        }
    }
}
