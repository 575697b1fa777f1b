//! Pool deployment constants and defaults
//!
//! Values shared by the simulated pool and the deployed contract it
//! rehearses. Anything here can be overridden through
//! [`SimulatorConfig`](crate::SimulatorConfig) except the fee and the
//! ratio tolerance, which the contract fixes.

/// Token addresses on Base Sepolia
pub mod tokens {
    /// Wrapped ether (token0)
    pub const WETH: &str = "0x4200000000000000000000000000000000000006";

    /// USD Coin (token1)
    pub const USDC: &str = "0x036CbD53842c5426634e7929541eC2318f3dCF7e";

    pub const WETH_DECIMALS: u32 = 18;
    pub const USDC_DECIMALS: u32 = 6;
    pub const LP_DECIMALS: u32 = 18;
}

/// Seed the simulated pool starts from and resets to
pub mod genesis {
    /// 1000 WETH against 2.5M USDC sets a starting price of 2500
    pub const RESERVE0: i64 = 1_000;
    pub const RESERVE1: i64 = 2_500_000;

    /// Free wallet balance for rehearsing deposits and swaps, in hundredths
    pub const BALANCE_A_CENTS: i64 = 1_050;
    pub const BALANCE_B: i64 = 25_000;
}

/// Simulation and remote polling defaults
pub mod simulation {
    /// Artificial transaction latency for simulated swaps (milliseconds)
    pub const SWAP_LATENCY_MS: u64 = 1_000;

    /// Artificial transaction latency for simulated liquidity changes (milliseconds)
    pub const LIQUIDITY_LATENCY_MS: u64 = 1_500;

    /// How often consumers should refresh remote pool state (milliseconds)
    pub const REMOTE_POLL_INTERVAL_MS: u64 = 5_000;

    /// Slippage tolerance used for minimum-received quotes (basis points)
    pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

    /// Base Sepolia
    pub const CHAIN_ID: u64 = 84_532;
}
