//! Mode-Aware Facade
//!
//! One read and write surface over two independent worlds: the simulated
//! pool in [`PoolStore`] and the deployed contract behind a [`RemotePool`].
//! Simulated writes commit through the store after an artificial latency.
//! Remote writes are submitted as transactions, tracked through their
//! phases, and followed by a re-fetch of ground truth on confirmation; the
//! facade never computes remote state itself.
//!
//! The last error and the transaction status are single values. Every write
//! clears the error on entry and records its own failure, so the last error
//! wins. Switching mode clears both without touching either world.

use crate::pool_store::{PoolStore, StoreStats};
use crate::remote::{RemoteCall, RemoteError, RemotePool};
use crate::transaction::TransactionStatus;
use amm::{
    AmmError, AmmResult, Asset, Decimal, Genesis, Operation, OperationKind, OperationOutcome,
    PoolMath, PoolState, RemovalAmounts, TokenDecimals, UserPosition,
};
use amm_config::pool::simulation;
use amm_config::SimulatorConfig;
use anyhow::Context;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Which world reads and writes go to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Simulated,
    Remote,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Simulated => Mode::Remote,
            Mode::Remote => Mode::Simulated,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Simulated => write!(f, "simulated"),
            Mode::Remote => write!(f, "remote"),
        }
    }
}

/// Timing and precision knobs for the facade
#[derive(Debug, Clone)]
pub struct FacadeSettings {
    pub swap_latency: Duration,
    pub liquidity_latency: Duration,
    pub poll_interval: Duration,
    pub slippage_bps: u32,
    pub chain_id: u64,
    pub decimals: TokenDecimals,
}

impl Default for FacadeSettings {
    /// No artificial latency
    fn default() -> Self {
        Self {
            swap_latency: Duration::ZERO,
            liquidity_latency: Duration::ZERO,
            poll_interval: Duration::from_millis(simulation::REMOTE_POLL_INTERVAL_MS),
            slippage_bps: simulation::DEFAULT_SLIPPAGE_BPS,
            chain_id: simulation::CHAIN_ID,
            decimals: TokenDecimals::default(),
        }
    }
}

impl FacadeSettings {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            swap_latency: config.swap_latency(),
            liquidity_latency: config.liquidity_latency(),
            poll_interval: config.poll_interval(),
            slippage_bps: config.simulation.slippage_bps,
            chain_id: config.pool.chain_id,
            decimals: config.token_decimals(),
        }
    }

    fn latency_for(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Swap => self.swap_latency,
            OperationKind::AddLiquidity | OperationKind::RemoveLiquidity => {
                self.liquidity_latency
            }
        }
    }
}

/// Last values fetched from the remote world
#[derive(Debug, Clone)]
struct RemoteView {
    pool: PoolState,
    position: UserPosition,
}

pub struct AmmFacade<R: RemotePool> {
    mode: RwLock<Mode>,
    store: PoolStore,
    remote: Arc<R>,
    remote_view: RwLock<RemoteView>,
    last_error: RwLock<Option<AmmError>>,
    pending: RwLock<Option<TransactionStatus>>,
    /// Bumped whenever status is cleared; late results from an older epoch are dropped
    epoch: AtomicU64,
    in_flight: AtomicUsize,
    settings: FacadeSettings,
}

impl<R: RemotePool> AmmFacade<R> {
    /// Facade in simulated mode over a fresh store seeded from `genesis`
    pub fn new(genesis: Genesis, remote: Arc<R>, settings: FacadeSettings) -> Self {
        // nothing fetched yet: the remote pair reads as empty
        let remote_view = RemoteView {
            pool: PoolState::uninitialized(genesis.pool.token0, genesis.pool.token1),
            position: UserPosition::default(),
        };
        Self {
            mode: RwLock::new(Mode::Simulated),
            store: PoolStore::new(genesis),
            remote,
            remote_view: RwLock::new(remote_view),
            last_error: RwLock::new(None),
            pending: RwLock::new(None),
            epoch: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            settings,
        }
    }

    /// Build from layered configuration; the configured mode is the starting mode
    pub fn from_config(config: &SimulatorConfig, remote: Arc<R>) -> anyhow::Result<Self> {
        let genesis = config.genesis()?;
        let start_remote = config
            .start_remote()
            .context("Failed to resolve starting mode")?;
        let facade = Self::new(genesis, remote, FacadeSettings::from_config(config));
        if start_remote {
            *facade.mode.write() = Mode::Remote;
        }
        info!("AMM facade ready in {} mode", facade.mode());
        Ok(facade)
    }

    // ---- reads ----

    pub fn mode(&self) -> Mode {
        *self.mode.read()
    }

    pub fn settings(&self) -> &FacadeSettings {
        &self.settings
    }

    pub fn store(&self) -> &PoolStore {
        &self.store
    }

    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Pool state of the active world
    pub fn pool_state(&self) -> PoolState {
        match self.mode() {
            Mode::Simulated => self.store.pool(),
            Mode::Remote => self.remote_view.read().pool.clone(),
        }
    }

    /// Balances of the active world
    pub fn user_balances(&self) -> UserPosition {
        match self.mode() {
            Mode::Simulated => self.store.position(),
            Mode::Remote => self.remote_view.read().position.clone(),
        }
    }

    pub fn k(&self) -> Decimal {
        self.pool_state().k()
    }

    pub fn current_price(&self) -> Decimal {
        self.pool_state().price()
    }

    /// User's percentage of the LP supply
    pub fn pool_share(&self) -> Decimal {
        self.user_balances().pool_share(&self.pool_state())
    }

    pub fn last_error(&self) -> Option<AmmError> {
        self.last_error.read().clone()
    }

    pub fn pending_transaction(&self) -> Option<TransactionStatus> {
        self.pending.read().clone()
    }

    /// A remote transaction is submitted or pending
    pub fn is_busy(&self) -> bool {
        self.pending
            .read()
            .as_ref()
            .is_some_and(TransactionStatus::is_in_flight)
    }

    /// Any write is in progress, simulated latency included
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0 || self.is_busy()
    }

    pub fn swap_estimate(&self, token_in: Asset, amount_in: Decimal) -> Decimal {
        PoolMath::swap_estimate(&self.pool_state(), token_in, amount_in)
    }

    pub fn price_impact(&self, token_in: Asset, amount_in: Decimal) -> Decimal {
        PoolMath::price_impact(&self.pool_state(), token_in, amount_in)
    }

    /// Quoted output less the configured slippage tolerance
    pub fn minimum_received(&self, token_in: Asset, amount_in: Decimal) -> Decimal {
        let quote = self.swap_estimate(token_in, amount_in);
        PoolMath::minimum_received(quote, self.settings.slippage_bps)
    }

    pub fn removal_preview(&self, shares: Decimal) -> RemovalAmounts {
        PoolMath::removal_amounts(&self.pool_state(), shares)
    }

    pub fn required_counter_amount(&self, input_asset: Asset, amount: Decimal) -> Option<Decimal> {
        PoolMath::required_counter_amount(&self.pool_state(), input_asset, amount)
    }

    // ---- mode and status ----

    /// Switch worlds; error and transaction status are cleared either way
    pub fn set_mode(&self, mode: Mode) {
        let previous = {
            let mut current = self.mode.write();
            std::mem::replace(&mut *current, mode)
        };
        self.clear_status();
        if previous != mode {
            info!("AMM facade switched from {} to {} mode", previous, mode);
        }
    }

    pub fn toggle_mode(&self) -> Mode {
        let (previous, next) = {
            let mut current = self.mode.write();
            let previous = *current;
            *current = previous.toggled();
            (previous, *current)
        };
        self.clear_status();
        info!("AMM facade switched from {} to {} mode", previous, next);
        next
    }

    /// Restore the simulated genesis; in remote mode only status is cleared
    pub fn reset_pool(&self) {
        if self.mode() == Mode::Simulated {
            self.store.reset();
        } else {
            debug!("Reset ignored in remote mode");
        }
        self.clear_status();
    }

    /// Re-fetch pool state and wallet balances from the remote world
    ///
    /// A no-op in simulated mode. Balances read as zero while no wallet is
    /// connected. A failed refresh is recorded as the last error; a
    /// successful one leaves it alone.
    pub async fn refresh_remote(&self) -> AmmResult<()> {
        if self.mode() != Mode::Remote {
            return Ok(());
        }
        let epoch = self.epoch.load(Ordering::Acquire);
        let result = self.fetch_remote_view().await;
        match result {
            Ok(view) => {
                debug!(
                    "Remote pool refreshed: reserve0={} reserve1={} total_shares={}",
                    view.pool.reserve0, view.pool.reserve1, view.pool.total_shares
                );
                *self.remote_view.write() = view;
                Ok(())
            }
            Err(e) => {
                warn!("Remote refresh failed: {}", e);
                self.record_error(epoch, &e);
                Err(e)
            }
        }
    }

    async fn fetch_remote_view(&self) -> AmmResult<RemoteView> {
        let decimals = &self.settings.decimals;
        let pool = self.remote.fetch_pool_state().await?.to_pool_state(decimals)?;
        let position = if self.remote.is_connected().await {
            self.remote.fetch_balances().await?.to_position(decimals)?
        } else {
            UserPosition::default()
        };
        Ok(RemoteView { pool, position })
    }

    // ---- writes ----

    /// Sell `amount_in` of `token_in`; returns the amount received
    ///
    /// In remote mode this is the estimate against the last fetched pool.
    pub async fn swap(&self, token_in: Asset, amount_in: Decimal) -> AmmResult<Decimal> {
        let outcome = self
            .execute(Operation::Swap {
                token_in,
                amount_in,
            })
            .await?;
        match outcome {
            OperationOutcome::Swapped { amount_out, .. } => Ok(amount_out),
            _ => Err(unexpected_outcome(OperationKind::Swap)),
        }
    }

    /// Deposit both assets; returns the LP shares minted
    pub async fn add_liquidity(&self, amount0: Decimal, amount1: Decimal) -> AmmResult<Decimal> {
        let outcome = self
            .execute(Operation::AddLiquidity { amount0, amount1 })
            .await?;
        match outcome {
            OperationOutcome::LiquidityAdded { shares_minted, .. } => Ok(shares_minted),
            _ => Err(unexpected_outcome(OperationKind::AddLiquidity)),
        }
    }

    /// Burn LP shares; returns the amounts withdrawn
    pub async fn remove_liquidity(&self, shares: Decimal) -> AmmResult<RemovalAmounts> {
        let outcome = self
            .execute(Operation::RemoveLiquidity { shares })
            .await?;
        match outcome {
            OperationOutcome::LiquidityRemoved { amounts, .. } => Ok(amounts),
            _ => Err(unexpected_outcome(OperationKind::RemoveLiquidity)),
        }
    }

    /// Run an operation in the active mode
    pub async fn execute(&self, operation: Operation) -> AmmResult<OperationOutcome> {
        *self.last_error.write() = None;
        let epoch = self.epoch.load(Ordering::Acquire);

        let result = {
            let _loading = InFlight::enter(&self.in_flight);
            match self.mode() {
                Mode::Simulated => self.execute_simulated(operation).await,
                Mode::Remote => self.execute_remote(operation, epoch).await,
            }
        };

        if let Err(e) = &result {
            self.record_error(epoch, e);
        }
        result
    }

    async fn execute_simulated(&self, operation: Operation) -> AmmResult<OperationOutcome> {
        // fail fast before the artificial wait
        let preview = self.store.preview(&operation)?;
        debug!("Simulated {} preview: {:?}", operation.kind(), preview.outcome);

        let latency = self.settings.latency_for(operation.kind());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        // the store re-validates against whatever state it holds now
        Ok(self.store.apply(operation)?.outcome)
    }

    async fn execute_remote(
        &self,
        operation: Operation,
        epoch: u64,
    ) -> AmmResult<OperationOutcome> {
        let kind = operation.kind();
        let pool = self.remote_view.read().pool.clone();
        let expected = expected_remote_outcome(&pool, &operation)?;

        self.ensure_remote_ready(&operation, &pool).await?;
        let call = RemoteCall::encode(&operation, &pool, &self.settings.decimals)?;

        self.begin_transaction(kind, epoch)?;
        let hash = match self.remote.submit(call).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Remote {} was not broadcast: {}", kind, e);
                self.update_transaction(epoch, TransactionStatus::fail);
                return Err(e.into());
            }
        };
        info!("Remote {} broadcast: {}", kind, hash);
        self.update_transaction(epoch, |status| status.broadcast(hash));

        match self.remote.wait_for_confirmation(hash).await {
            Ok(receipt) if receipt.success => {
                if let Err(e) = self.refresh_remote().await {
                    warn!("Remote {} confirmed but refresh failed: {}", kind, e);
                }
                self.update_transaction(epoch, |status| status.confirm(&receipt));
                info!(
                    "Remote {} confirmed in block {}: {}",
                    kind, receipt.block_number, hash
                );
                Ok(expected)
            }
            Ok(_) => {
                error!("Remote {} reverted: {}", kind, hash);
                self.update_transaction(epoch, TransactionStatus::fail);
                Err(RemoteError::Reverted { hash }.into())
            }
            Err(e) => {
                error!("Remote {} confirmation failed: {}", kind, e);
                self.update_transaction(epoch, TransactionStatus::fail);
                Err(e.into())
            }
        }
    }

    /// Wallet connected, on the right chain, and allowances granted
    async fn ensure_remote_ready(&self, operation: &Operation, pool: &PoolState) -> AmmResult<()> {
        if !self.remote.is_connected().await {
            return Err(RemoteError::Disconnected.into());
        }
        let actual = self.remote.chain_id().await?;
        if actual != self.settings.chain_id {
            return Err(RemoteError::NetworkMismatch {
                expected: self.settings.chain_id,
                actual,
            }
            .into());
        }

        let spends: Vec<(Asset, Decimal)> = match *operation {
            Operation::Swap {
                token_in,
                amount_in,
            } => vec![(token_in, amount_in)],
            Operation::AddLiquidity { amount0, amount1 } => {
                vec![(Asset::A, amount0), (Asset::B, amount1)]
            }
            // LP shares are burned by the pool itself
            Operation::RemoveLiquidity { .. } => Vec::new(),
        };
        for (asset, amount) in spends {
            let raw = amm::fixed_point::to_base_units(amount, self.settings.decimals.of(asset))?;
            if !self
                .remote
                .approval_satisfied(pool.address_of(asset), raw)
                .await?
            {
                return Err(AmmError::ApprovalRequired { asset, amount });
            }
        }
        Ok(())
    }

    /// Claim the single transaction slot or refuse
    ///
    /// A clear bumps the epoch before it empties the slot, so the epoch is
    /// checked under the slot lock: a write whose epoch was cleared during
    /// its pre-flight checks is never broadcast.
    fn begin_transaction(&self, kind: OperationKind, epoch: u64) -> AmmResult<()> {
        let mut pending = self.pending.write();
        if self.epoch.load(Ordering::Acquire) != epoch {
            debug!("Refusing remote {} from a cleared epoch", kind);
            return Err(AmmError::remote("mode changed before broadcast"));
        }
        if pending
            .as_ref()
            .is_some_and(TransactionStatus::is_in_flight)
        {
            return Err(AmmError::remote("transaction already in flight"));
        }
        *pending = Some(TransactionStatus::submitted(kind));
        Ok(())
    }

    fn update_transaction(&self, epoch: u64, update: impl FnOnce(&mut TransactionStatus)) {
        if self.epoch.load(Ordering::Acquire) != epoch {
            debug!("Dropping transaction update from a cleared epoch");
            return;
        }
        if let Some(status) = self.pending.write().as_mut() {
            update(status);
        }
    }

    fn record_error(&self, epoch: u64, error: &AmmError) {
        if self.epoch.load(Ordering::Acquire) == epoch {
            *self.last_error.write() = Some(error.clone());
        }
    }

    fn clear_status(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *self.last_error.write() = None;
        *self.pending.write() = None;
    }
}

impl<R: RemotePool + 'static> AmmFacade<R> {
    /// Refresh the remote view on the configured interval while in remote mode
    pub fn spawn_remote_poller(self: &Arc<Self>) -> JoinHandle<()> {
        let facade = Arc::clone(self);
        let period = facade.settings.poll_interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if facade.mode() == Mode::Remote {
                    // failure is already recorded as the last error
                    let _ = facade.refresh_remote().await;
                }
            }
        })
    }
}

/// What the contract is expected to yield, from the last fetched pool
///
/// Only input checks and the deposit ratio gate run here; balances are the
/// contract's to check.
fn expected_remote_outcome(pool: &PoolState, operation: &Operation) -> AmmResult<OperationOutcome> {
    match *operation {
        Operation::Swap {
            token_in,
            amount_in,
        } => {
            if amount_in <= Decimal::ZERO {
                return Err(AmmError::InvalidAmount);
            }
            Ok(OperationOutcome::Swapped {
                token_in,
                amount_in,
                amount_out: PoolMath::try_swap_estimate(pool, token_in, amount_in)?,
            })
        }
        Operation::AddLiquidity { amount0, amount1 } => {
            if amount0 <= Decimal::ZERO || amount1 <= Decimal::ZERO {
                return Err(AmmError::InvalidReserveValues);
            }
            Ok(OperationOutcome::LiquidityAdded {
                amount0,
                amount1,
                shares_minted: PoolMath::shares_for_deposit(pool, amount0, amount1)?,
            })
        }
        Operation::RemoveLiquidity { shares } => {
            if shares <= Decimal::ZERO {
                return Err(AmmError::InvalidShares);
            }
            Ok(OperationOutcome::LiquidityRemoved {
                shares_burned: shares,
                amounts: PoolMath::removal_amounts(pool, shares),
            })
        }
    }
}

/// Counts a write as in progress until dropped, including on cancellation
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

fn unexpected_outcome(kind: OperationKind) -> AmmError {
    AmmError::remote(format!("{} produced a mismatched outcome", kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::OfflineRemote;
    use rust_decimal_macros::dec;

    fn facade() -> AmmFacade<OfflineRemote> {
        let genesis = SimulatorConfig::default().genesis().unwrap();
        AmmFacade::new(genesis, Arc::new(OfflineRemote), FacadeSettings::default())
    }

    #[test]
    fn test_starts_simulated_with_genesis_reads() {
        let facade = facade();
        assert_eq!(facade.mode(), Mode::Simulated);
        assert_eq!(facade.k(), dec!(2500000000));
        assert_eq!(facade.current_price(), dec!(2500));
        assert_eq!(facade.pool_share(), dec!(100));
        assert!(!facade.is_loading());
        assert_eq!(facade.pending_transaction(), None);
    }

    #[test]
    fn test_previews_follow_active_world() {
        let facade = facade();
        assert_eq!(
            facade.swap_estimate(Asset::B, dec!(2500)),
            dec!(0.996006981)
        );
        assert_eq!(
            facade.required_counter_amount(Asset::A, dec!(2)),
            Some(dec!(5000))
        );
        assert_eq!(
            facade.removal_preview(dec!(5000)),
            RemovalAmounts {
                amount0: dec!(100),
                amount1: dec!(250000),
            }
        );
        assert_eq!(
            facade.minimum_received(Asset::B, dec!(2500)),
            dec!(0.991026946)
        );

        facade.toggle_mode();
        assert_eq!(facade.swap_estimate(Asset::B, dec!(2500)), Decimal::ZERO);
        assert_eq!(facade.required_counter_amount(Asset::A, dec!(2)), None);
        assert_eq!(facade.k(), Decimal::ZERO);
    }

    #[test]
    fn test_toggle_round_trip() {
        let facade = facade();
        assert_eq!(facade.toggle_mode(), Mode::Remote);
        assert_eq!(facade.toggle_mode(), Mode::Simulated);
        facade.set_mode(Mode::Remote);
        assert_eq!(facade.mode(), Mode::Remote);
    }

    #[test]
    fn test_remote_estimate_checks_inputs_only() {
        let pool = SimulatorConfig::default().genesis().unwrap().pool;
        let err = expected_remote_outcome(
            &pool,
            &Operation::Swap {
                token_in: Asset::A,
                amount_in: Decimal::ZERO,
            },
        )
        .unwrap_err();
        assert_eq!(err, AmmError::InvalidAmount);

        // balance is the contract's concern
        let outcome = expected_remote_outcome(
            &pool,
            &Operation::Swap {
                token_in: Asset::A,
                amount_in: dec!(100),
            },
        )
        .unwrap();
        assert!(matches!(
            outcome,
            OperationOutcome::Swapped { amount_out, .. } if amount_out == dec!(226652.723470037)
        ));

        let err = expected_remote_outcome(
            &pool,
            &Operation::AddLiquidity {
                amount0: dec!(10),
                amount1: dec!(20),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AmmError::InvalidRatio { .. }));
    }
}
