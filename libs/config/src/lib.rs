//! # Pool Simulator Configuration
//!
//! Centralized constants and layered configuration for the pool simulator,
//! the state store and the mode-aware facade.
//!
//! ## Features
//!
//! - **Pool Constants**: Token addresses and precision, genesis seed, latency defaults
//! - **Simulator Configuration**: Defaults → TOML file → `AMM__*` environment overrides
//!
//! ## Usage
//!
//! ```rust
//! use amm_config::{pool, SimulatorConfig};
//!
//! let weth = pool::tokens::WETH;
//! let config = SimulatorConfig::default();
//! let genesis = config.genesis().expect("default seed is valid");
//! assert!(genesis.pool.is_initialized());
//! # let _ = weth;
//! ```

pub mod pool;
pub mod simulator_config;

pub use simulator_config::{
    load_config, parse_address, GenesisSettings, LoggingSettings, PoolSettings,
    SimulationSettings, SimulatorConfig,
};
