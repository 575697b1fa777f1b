//! Simulator Configuration Module
//!
//! Provides configuration loading for the pool simulator and facade.
//! Built-in defaults are layered under an optional TOML file and
//! `AMM__`-prefixed environment variables.

use crate::pool::{genesis, simulation, tokens};
use amm::{Address, Genesis, TokenDecimals};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Main simulator configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SimulatorConfig {
    /// Token identities and precision
    pub pool: PoolSettings,

    /// Seed for the simulated pool
    pub genesis: GenesisSettings,

    /// Mode, latency and polling
    pub simulation: SimulationSettings,

    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolSettings {
    pub token0_address: String,
    pub token1_address: String,
    pub token0_decimals: u32,
    pub token1_decimals: u32,
    pub lp_decimals: u32,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenesisSettings {
    pub reserve0: Decimal,
    pub reserve1: Decimal,
    pub balance_a: Decimal,
    pub balance_b: Decimal,
    /// LP shares held by the seeded user; all genesis shares when absent
    pub lp_shares: Option<Decimal>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulationSettings {
    /// "simulated" or "remote"
    pub mode: String,
    pub swap_latency_ms: u64,
    pub liquidity_latency_ms: u64,
    pub poll_interval_ms: u64,
    pub slippage_bps: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            token0_address: tokens::WETH.to_string(),
            token1_address: tokens::USDC.to_string(),
            token0_decimals: tokens::WETH_DECIMALS,
            token1_decimals: tokens::USDC_DECIMALS,
            lp_decimals: tokens::LP_DECIMALS,
            chain_id: simulation::CHAIN_ID,
        }
    }
}

impl Default for GenesisSettings {
    fn default() -> Self {
        Self {
            reserve0: Decimal::from(genesis::RESERVE0),
            reserve1: Decimal::from(genesis::RESERVE1),
            balance_a: Decimal::new(genesis::BALANCE_A_CENTS, 2),
            balance_b: Decimal::from(genesis::BALANCE_B),
            lp_shares: None,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            mode: "simulated".to_string(),
            swap_latency_ms: simulation::SWAP_LATENCY_MS,
            liquidity_latency_ms: simulation::LIQUIDITY_LATENCY_MS,
            poll_interval_ms: simulation::REMOTE_POLL_INTERVAL_MS,
            slippage_bps: simulation::DEFAULT_SLIPPAGE_BPS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration: defaults, then the optional file, then `AMM__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&SimulatorConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!("Loading simulator config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // AMM__SIMULATION__MODE=remote, AMM__GENESIS__RESERVE0=500, ...
        builder = builder.add_source(
            Environment::with_prefix("AMM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: SimulatorConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!("Simulator configuration: {:?}", config);
        Ok(config)
    }

    /// Reject settings the pool cannot start from
    pub fn validate(&self) -> Result<()> {
        if self.genesis.reserve0 <= Decimal::ZERO || self.genesis.reserve1 <= Decimal::ZERO {
            bail!("Genesis reserves must be positive");
        }
        if self.genesis.balance_a < Decimal::ZERO || self.genesis.balance_b < Decimal::ZERO {
            bail!("Genesis balances must not be negative");
        }
        if let Some(shares) = self.genesis.lp_shares {
            if shares < Decimal::ZERO {
                bail!("Genesis LP shares must not be negative");
            }
        }
        if self.simulation.slippage_bps > 10_000 {
            bail!(
                "Slippage tolerance {} bps exceeds 100%",
                self.simulation.slippage_bps
            );
        }
        if self.simulation.poll_interval_ms == 0 {
            bail!("Remote poll interval must be positive");
        }
        self.start_remote()?;
        self.token0()?;
        self.token1()?;
        Ok(())
    }

    pub fn token0(&self) -> Result<Address> {
        parse_address(&self.pool.token0_address).context("Invalid token0 address")
    }

    pub fn token1(&self) -> Result<Address> {
        parse_address(&self.pool.token1_address).context("Invalid token1 address")
    }

    pub fn token_decimals(&self) -> TokenDecimals {
        TokenDecimals {
            token0: self.pool.token0_decimals,
            token1: self.pool.token1_decimals,
            lp: self.pool.lp_decimals,
        }
    }

    /// Seed values for the simulated pool
    pub fn genesis(&self) -> Result<Genesis> {
        Genesis::seeded(
            self.token0()?,
            self.token1()?,
            self.genesis.reserve0,
            self.genesis.reserve1,
            self.genesis.balance_a,
            self.genesis.balance_b,
            self.genesis.lp_shares,
        )
        .context("Failed to seed genesis pool")
    }

    /// Whether the facade should start in remote mode
    pub fn start_remote(&self) -> Result<bool> {
        match self.simulation.mode.to_lowercase().as_str() {
            "simulated" | "mock" => Ok(false),
            "remote" | "live" => Ok(true),
            other => bail!("Unknown simulation mode: {}", other),
        }
    }

    pub fn swap_latency(&self) -> Duration {
        Duration::from_millis(self.simulation.swap_latency_ms)
    }

    pub fn liquidity_latency(&self) -> Duration {
        Duration::from_millis(self.simulation.liquidity_latency_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.poll_interval_ms)
    }
}

/// Parse a `0x`-prefixed 20-byte hex address
pub fn parse_address(value: &str) -> Result<Address> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).with_context(|| format!("Not hex: {}", value))?;
    let address: Address = bytes
        .as_slice()
        .try_into()
        .with_context(|| format!("Expected 20 bytes, got {}", bytes.len()))?;
    Ok(address)
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>) -> Result<SimulatorConfig> {
    SimulatorConfig::load(path)
}
