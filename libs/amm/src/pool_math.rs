//! Constant product pool engine
//!
//! Pure functions over a `PoolState` and the acting `UserPosition`. Each
//! mutating operation validates everything before building the next state,
//! so a returned error always means nothing changed. Arithmetic follows the
//! contract: fee taken on input as `997/1000`, truncating division at the
//! engine scale, and the integer square root for the first deposit.

use crate::error::{AmmError, AmmResult};
use crate::fixed_point::{
    checked_add, checked_mul, div_trunc, fixed_sqrt, min_of, quantize, to_raw, AMOUNT_SCALE,
};
use crate::types::{
    Asset, OperationOutcome, OperationResult, PoolState, RemovalAmounts, UserPosition,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Swap fee numerator; the pool keeps `1 - 997/1000` = 0.3% of every input
pub const FEE_NUMERATOR: u32 = 997;
pub const FEE_DENOMINATOR: u32 = 1000;

/// Deposits may deviate from the pool ratio by at most 1% (100 bps)
pub const RATIO_TOLERANCE_BPS: u32 = 100;

const BPS_DENOMINATOR: u32 = 10_000;

/// Pool accounting functions with contract-exact rounding
pub struct PoolMath;

impl PoolMath {
    /// Input amount left after the pool's fee, truncated
    pub fn amount_in_with_fee(amount_in: Decimal) -> AmmResult<Decimal> {
        let scaled = checked_mul(amount_in, Decimal::from(FEE_NUMERATOR), "fee")?;
        div_trunc(scaled, Decimal::from(FEE_DENOMINATOR), "fee")
    }

    /// Output of selling `amount_in` of `token_in` into the pool
    ///
    /// Returns zero for non-positive input or an empty pool. The result is
    /// always strictly below the output reserve.
    pub fn swap_estimate(pool: &PoolState, token_in: Asset, amount_in: Decimal) -> Decimal {
        Self::try_swap_estimate(pool, token_in, amount_in).unwrap_or(Decimal::ZERO)
    }

    /// `swap_estimate` with arithmetic failures surfaced
    pub fn try_swap_estimate(
        pool: &PoolState,
        token_in: Asset,
        amount_in: Decimal,
    ) -> AmmResult<Decimal> {
        let amount_in = quantize(amount_in);
        if amount_in <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let (reserve_in, reserve_out) = pool.reserves_for(token_in);
        let amount_in_with_fee = Self::amount_in_with_fee(amount_in)?;

        // amount_out = reserve_out * fee_adjusted / (reserve_in + fee_adjusted)
        let numerator = checked_mul(reserve_out, amount_in_with_fee, "swap_estimate")?;
        let denominator = checked_add(reserve_in, amount_in_with_fee, "swap_estimate")?;
        if denominator <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        div_trunc(numerator, denominator, "swap_estimate")
    }

    /// Percentage by which the execution price falls short of the spot price
    pub fn price_impact(pool: &PoolState, token_in: Asset, amount_in: Decimal) -> Decimal {
        let amount_in = quantize(amount_in);
        let (reserve_in, reserve_out) = pool.reserves_for(token_in);
        if amount_in <= Decimal::ZERO || reserve_in <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let amount_out = Self::swap_estimate(pool, token_in, amount_in);
        let impact = || -> AmmResult<Decimal> {
            let spot = div_trunc(reserve_out, reserve_in, "price_impact")?;
            let execution = div_trunc(amount_out, amount_in, "price_impact")?;
            let shortfall = checked_mul(spot - execution, dec!(100), "price_impact")?;
            div_trunc(shortfall, spot, "price_impact")
        };
        impact().unwrap_or(Decimal::ZERO)
    }

    /// Slippage-protected floor for a quoted output
    pub fn minimum_received(amount_out: Decimal, slippage_bps: u32) -> Decimal {
        let kept = BPS_DENOMINATOR.saturating_sub(slippage_bps);
        checked_mul(amount_out, Decimal::from(kept), "minimum_received")
            .and_then(|v| div_trunc(v, Decimal::from(BPS_DENOMINATOR), "minimum_received"))
            .unwrap_or(Decimal::ZERO)
    }

    /// Sell `amount_in` of `token_in`; the whole input, fee included, joins the reserves
    pub fn execute_swap(
        pool: &PoolState,
        position: &UserPosition,
        token_in: Asset,
        amount_in: Decimal,
    ) -> AmmResult<OperationResult> {
        let amount_in = quantize(amount_in);
        if amount_in <= Decimal::ZERO {
            return Err(AmmError::InvalidAmount);
        }
        Self::ensure_balance(position, token_in, amount_in)?;

        let amount_out = Self::try_swap_estimate(pool, token_in, amount_in)?;
        if amount_out <= Decimal::ZERO {
            return Err(AmmError::InvalidAmountOut);
        }

        let token_out = token_in.other();
        let mut next = pool.clone();
        match token_in {
            Asset::A => {
                next.reserve0 = checked_add(pool.reserve0, amount_in, "execute_swap")?;
                next.reserve1 = pool.reserve1 - amount_out;
            }
            Asset::B => {
                next.reserve1 = checked_add(pool.reserve1, amount_in, "execute_swap")?;
                next.reserve0 = pool.reserve0 - amount_out;
            }
        }

        let mut position = position.clone();
        *position.balance_mut(token_in) -= amount_in;
        let credited = checked_add(position.balance_of(token_out), amount_out, "execute_swap")?;
        *position.balance_mut(token_out) = credited;

        Ok(OperationResult {
            pool: next,
            position,
            outcome: OperationOutcome::Swapped {
                token_in,
                amount_in,
                amount_out,
            },
        })
    }

    /// Amount of the other asset that keeps the pool ratio for a deposit
    ///
    /// `None` while the pool is unseeded, since any first ratio is accepted.
    pub fn required_counter_amount(
        pool: &PoolState,
        input_asset: Asset,
        input_amount: Decimal,
    ) -> Option<Decimal> {
        let reserve_self = pool.reserve_of(input_asset);
        let reserve_other = pool.reserve_of(input_asset.other());
        if reserve_self <= Decimal::ZERO || reserve_other <= Decimal::ZERO {
            return None;
        }
        let input_amount = quantize(input_amount);
        if input_amount <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }
        checked_mul(input_amount, reserve_other, "required_counter_amount")
            .and_then(|v| div_trunc(v, reserve_self, "required_counter_amount"))
            .ok()
    }

    /// Reject deposits whose ratio is more than 1% away from the pool's
    ///
    /// `left = reserve0 * amount1`, `right = reserve1 * amount0`; fails when
    /// `|left - right| * 10000 > left * 100`. Evaluated on raw units so the
    /// boundary is exact; falls back to `Decimal` only when the raw products
    /// no longer fit a u128.
    pub fn check_ratio(pool: &PoolState, amount0: Decimal, amount1: Decimal) -> AmmResult<()> {
        let outside = match Self::ratio_outside_raw(pool, amount0, amount1) {
            Some(outside) => outside,
            None => {
                let left = checked_mul(pool.reserve0, amount1, "check_ratio")?;
                let right = checked_mul(pool.reserve1, amount0, "check_ratio")?;
                let diff = (left - right).abs();
                let scaled_diff =
                    checked_mul(diff, Decimal::from(BPS_DENOMINATOR), "check_ratio")?;
                let allowed =
                    checked_mul(left, Decimal::from(RATIO_TOLERANCE_BPS), "check_ratio")?;
                scaled_diff > allowed
            }
        };
        if outside {
            return Err(AmmError::InvalidRatio {
                left: pool.reserve0.saturating_mul(amount1),
                right: pool.reserve1.saturating_mul(amount0),
            });
        }
        Ok(())
    }

    /// The ratio gate in raw integer units, exact while the products fit u128
    fn ratio_outside_raw(pool: &PoolState, amount0: Decimal, amount1: Decimal) -> Option<bool> {
        let raw = |value: Decimal| to_raw(value, AMOUNT_SCALE);
        let left = raw(pool.reserve0)?.checked_mul(raw(amount1)?)?;
        let right = raw(pool.reserve1)?.checked_mul(raw(amount0)?)?;
        let scaled_diff = left.abs_diff(right).checked_mul(u128::from(BPS_DENOMINATOR))?;
        let allowed = left.checked_mul(u128::from(RATIO_TOLERANCE_BPS))?;
        Some(scaled_diff > allowed)
    }

    /// LP shares a deposit would mint against the current pool
    pub fn shares_for_deposit(
        pool: &PoolState,
        amount0: Decimal,
        amount1: Decimal,
    ) -> AmmResult<Decimal> {
        if !pool.is_initialized() {
            return fixed_sqrt(checked_mul(amount0, amount1, "shares_for_deposit")?);
        }
        Self::check_ratio(pool, amount0, amount1)?;
        if pool.reserve0 <= Decimal::ZERO || pool.reserve1 <= Decimal::ZERO {
            return Err(AmmError::InvalidReserves);
        }
        let shares0 = div_trunc(
            checked_mul(amount0, pool.total_shares, "shares_for_deposit")?,
            pool.reserve0,
            "shares_for_deposit",
        )?;
        let shares1 = div_trunc(
            checked_mul(amount1, pool.total_shares, "shares_for_deposit")?,
            pool.reserve1,
            "shares_for_deposit",
        )?;
        Ok(min_of(shares0, shares1))
    }

    /// Deposit both assets and mint LP shares
    pub fn add_liquidity(
        pool: &PoolState,
        position: &UserPosition,
        amount0: Decimal,
        amount1: Decimal,
    ) -> AmmResult<OperationResult> {
        let amount0 = quantize(amount0);
        let amount1 = quantize(amount1);
        if amount0 <= Decimal::ZERO || amount1 <= Decimal::ZERO {
            return Err(AmmError::InvalidReserveValues);
        }
        Self::ensure_balance(position, Asset::A, amount0)?;
        Self::ensure_balance(position, Asset::B, amount1)?;

        let shares_minted = Self::shares_for_deposit(pool, amount0, amount1)?;
        if shares_minted <= Decimal::ZERO {
            return Err(AmmError::InvalidShares);
        }

        let mut next = pool.clone();
        next.reserve0 = checked_add(pool.reserve0, amount0, "add_liquidity")?;
        next.reserve1 = checked_add(pool.reserve1, amount1, "add_liquidity")?;
        next.total_shares = checked_add(pool.total_shares, shares_minted, "add_liquidity")?;

        let mut position = position.clone();
        position.balance_a -= amount0;
        position.balance_b -= amount1;
        position.lp_shares = checked_add(position.lp_shares, shares_minted, "add_liquidity")?;

        Ok(OperationResult {
            pool: next,
            position,
            outcome: OperationOutcome::LiquidityAdded {
                amount0,
                amount1,
                shares_minted,
            },
        })
    }

    /// Proportional share of each reserve that `shares` redeem for
    pub fn removal_amounts(pool: &PoolState, shares: Decimal) -> RemovalAmounts {
        let shares = quantize(shares);
        if shares <= Decimal::ZERO || pool.total_shares <= Decimal::ZERO {
            return RemovalAmounts::default();
        }
        Self::try_removal_amounts(pool, shares).unwrap_or_default()
    }

    fn try_removal_amounts(pool: &PoolState, shares: Decimal) -> AmmResult<RemovalAmounts> {
        let amount0 = div_trunc(
            checked_mul(shares, pool.reserve0, "removal_amounts")?,
            pool.total_shares,
            "removal_amounts",
        )?;
        let amount1 = div_trunc(
            checked_mul(shares, pool.reserve1, "removal_amounts")?,
            pool.total_shares,
            "removal_amounts",
        )?;
        Ok(RemovalAmounts { amount0, amount1 })
    }

    /// Burn LP shares for a proportional slice of both reserves
    ///
    /// Burning the whole supply drains the pool back to the unseeded state.
    pub fn remove_liquidity(
        pool: &PoolState,
        position: &UserPosition,
        shares: Decimal,
    ) -> AmmResult<OperationResult> {
        let shares = quantize(shares);
        if shares <= Decimal::ZERO {
            return Err(AmmError::InvalidShares);
        }
        if position.lp_shares < shares {
            return Err(AmmError::InsufficientShares {
                required: shares,
                available: position.lp_shares,
            });
        }
        if shares > pool.total_shares {
            return Err(AmmError::InvalidShares);
        }

        let amounts = Self::try_removal_amounts(pool, shares)?;
        if amounts.amount0 <= Decimal::ZERO || amounts.amount1 <= Decimal::ZERO {
            return Err(AmmError::InvalidReserves);
        }

        let mut next = pool.clone();
        next.reserve0 = pool.reserve0 - amounts.amount0;
        next.reserve1 = pool.reserve1 - amounts.amount1;
        next.total_shares = pool.total_shares - shares;

        let mut position = position.clone();
        position.balance_a = checked_add(position.balance_a, amounts.amount0, "remove_liquidity")?;
        position.balance_b = checked_add(position.balance_b, amounts.amount1, "remove_liquidity")?;
        position.lp_shares -= shares;

        Ok(OperationResult {
            pool: next,
            position,
            outcome: OperationOutcome::LiquidityRemoved {
                shares_burned: shares,
                amounts,
            },
        })
    }

    fn ensure_balance(position: &UserPosition, asset: Asset, required: Decimal) -> AmmResult<()> {
        let available = position.balance_of(asset);
        if available < required {
            return Err(AmmError::InsufficientBalance {
                asset,
                required,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(reserve0: Decimal, reserve1: Decimal, total_shares: Decimal) -> PoolState {
        PoolState {
            token0: [1u8; 20],
            token1: [2u8; 20],
            reserve0,
            reserve1,
            total_shares,
        }
    }

    fn seeded() -> PoolState {
        pool(dec!(1000), dec!(2500000), dec!(50000))
    }

    fn wallet() -> UserPosition {
        UserPosition::new(dec!(1000), dec!(5000000), dec!(50000))
    }

    #[test]
    fn test_swap_estimate_matches_contract() {
        let out = PoolMath::swap_estimate(&seeded(), Asset::A, dec!(100));
        assert_eq!(out, dec!(226652.723470037));

        let out = PoolMath::swap_estimate(&seeded(), Asset::B, dec!(2500));
        assert_eq!(out, dec!(0.996006981));
    }

    #[test]
    fn test_swap_estimate_rejects_non_positive() {
        assert_eq!(PoolMath::swap_estimate(&seeded(), Asset::A, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(PoolMath::swap_estimate(&seeded(), Asset::A, dec!(-5)), Decimal::ZERO);
        let empty = PoolState::uninitialized([1u8; 20], [2u8; 20]);
        assert_eq!(PoolMath::swap_estimate(&empty, Asset::A, dec!(5)), Decimal::ZERO);
    }

    #[test]
    fn test_execute_swap_updates_reserves_and_wallet() {
        let result = PoolMath::execute_swap(&seeded(), &wallet(), Asset::A, dec!(100)).unwrap();
        assert_eq!(result.pool.reserve0, dec!(1100));
        assert_eq!(result.pool.reserve1, dec!(2500000) - dec!(226652.723470037));
        assert_eq!(result.pool.total_shares, dec!(50000));
        assert_eq!(result.position.balance_a, dec!(900));
        assert_eq!(result.position.balance_b, dec!(5226652.723470037));
        assert!(result.pool.k() > seeded().k());
    }

    #[test]
    fn test_execute_swap_validation() {
        assert_eq!(
            PoolMath::execute_swap(&seeded(), &wallet(), Asset::A, Decimal::ZERO),
            Err(AmmError::InvalidAmount)
        );
        let err = PoolMath::execute_swap(&seeded(), &wallet(), Asset::A, dec!(1001)).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientBalance { asset: Asset::A, .. }));

        let empty = PoolState::uninitialized([1u8; 20], [2u8; 20]);
        assert_eq!(
            PoolMath::execute_swap(&empty, &wallet(), Asset::A, dec!(1)),
            Err(AmmError::InvalidAmountOut)
        );
    }

    #[test]
    fn test_price_impact_grows_with_size() {
        let small = PoolMath::price_impact(&seeded(), Asset::A, dec!(1));
        let large = PoolMath::price_impact(&seeded(), Asset::A, dec!(100));
        assert!(small > Decimal::ZERO);
        assert!(large > small);
        // fee alone accounts for 0.3%
        assert!(small >= dec!(0.3));
    }

    #[test]
    fn test_minimum_received() {
        assert_eq!(PoolMath::minimum_received(dec!(1000), 50), dec!(995));
        assert_eq!(PoolMath::minimum_received(dec!(1000), 20_000), Decimal::ZERO);
    }

    #[test]
    fn test_required_counter_amount() {
        assert_eq!(
            PoolMath::required_counter_amount(&seeded(), Asset::A, dec!(2)),
            Some(dec!(5000))
        );
        assert_eq!(
            PoolMath::required_counter_amount(&seeded(), Asset::B, dec!(5000)),
            Some(dec!(2))
        );
        let empty = PoolState::uninitialized([1u8; 20], [2u8; 20]);
        assert_eq!(PoolMath::required_counter_amount(&empty, Asset::A, dec!(2)), None);
    }

    #[test]
    fn test_genesis_deposit_mints_geometric_mean() {
        let empty = PoolState::uninitialized([1u8; 20], [2u8; 20]);
        let result =
            PoolMath::add_liquidity(&empty, &wallet(), dec!(1000), dec!(2500000)).unwrap();
        assert_eq!(
            result.outcome,
            OperationOutcome::LiquidityAdded {
                amount0: dec!(1000),
                amount1: dec!(2500000),
                shares_minted: dec!(50000),
            }
        );
        assert_eq!(result.pool.total_shares, dec!(50000));
        assert_eq!(result.position.lp_shares, dec!(100000));
    }

    #[test]
    fn test_add_liquidity_proportional_shares() {
        let result = PoolMath::add_liquidity(&seeded(), &wallet(), dec!(10), dec!(25000)).unwrap();
        assert_eq!(result.pool.total_shares, dec!(50500));
        assert_eq!(result.pool.reserve0, dec!(1010));
        assert_eq!(result.pool.reserve1, dec!(2525000));
        assert_eq!(result.position.balance_a, dec!(990));
        assert_eq!(result.position.lp_shares, dec!(50500));
    }

    #[test]
    fn test_add_liquidity_takes_smaller_share_count() {
        // 0.5% more token1 than the ratio asks for: accepted, minted off token0
        let result = PoolMath::add_liquidity(&seeded(), &wallet(), dec!(10), dec!(25125)).unwrap();
        match result.outcome {
            OperationOutcome::LiquidityAdded { shares_minted, .. } => {
                assert_eq!(shares_minted, dec!(500))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_ratio_tolerance_boundaries() {
        // left = 1000 * 25250 = 25_250_000, right = 2_500_000 * 10 = 25_000_000
        // diff * 10000 = 2.5e9, left * 100 = 2.525e9 -> inside
        assert!(PoolMath::check_ratio(&seeded(), dec!(10), dec!(25250)).is_ok());
        // left = 1000 * 25252.6 = 25_252_600, diff = 252_600 -> 2.526e9 > 2.5252600e9
        assert!(matches!(
            PoolMath::check_ratio(&seeded(), dec!(10), dec!(25252.6)),
            Err(AmmError::InvalidRatio { .. })
        ));
        // exactly on the boundary is accepted: left = 10000, diff = 100
        let square = pool(dec!(100), dec!(100), dec!(100));
        assert!(PoolMath::check_ratio(&square, dec!(99), dec!(100)).is_ok());
        assert!(PoolMath::check_ratio(&square, dec!(98.99), dec!(100)).is_err());
        // below the ratio: left = 1000 * 24753 = 24_753_000, diff = 247_000
        // 2.47e9 <= 2.4753e9 -> inside
        assert!(PoolMath::check_ratio(&seeded(), dec!(10), dec!(24753)).is_ok());
        assert!(PoolMath::check_ratio(&seeded(), dec!(10), dec!(24752)).is_err());
    }

    #[test]
    fn test_ratio_boundary_exact_at_large_reserves() {
        // products carry 31 significant digits here; the boundary must not move
        let deep = pool(
            dec!(123456789.123456789),
            dec!(123456789.123456789),
            dec!(1000000),
        );
        // (a1 - a0) * 100 == a1 exactly
        let boundary = PoolMath::check_ratio(&deep, dec!(99000.000000099), dec!(100000.0000001));
        assert!(boundary.is_ok());
        assert!(matches!(
            PoolMath::check_ratio(&deep, dec!(99000.000000098), dec!(100000.0000001)),
            Err(AmmError::InvalidRatio { .. })
        ));
    }

    #[test]
    fn test_ratio_gate_beyond_raw_range() {
        // raw products exceed u128; the gate still rejects a 2x deviation
        let huge = pool(dec!(1000000000000), dec!(1000000000000), dec!(1000000000000));
        assert!(PoolMath::check_ratio(&huge, dec!(1000000000000), dec!(1000000000000)).is_ok());
        assert!(matches!(
            PoolMath::check_ratio(&huge, dec!(1000000000000), dec!(2000000000000)),
            Err(AmmError::InvalidRatio { .. })
        ));
    }

    #[test]
    fn test_genesis_deposit_overflow_fails_cleanly() {
        let empty = PoolState::uninitialized([1u8; 20], [2u8; 20]);
        let whale = UserPosition::new(
            dec!(1000000000000000),
            dec!(1000000000000000),
            Decimal::ZERO,
        );
        // 1e15 * 1e15 is past the Decimal range
        assert_eq!(
            PoolMath::add_liquidity(
                &empty,
                &whale,
                dec!(1000000000000000),
                dec!(1000000000000000)
            ),
            Err(AmmError::overflow("shares_for_deposit"))
        );
    }

    #[test]
    fn test_add_liquidity_rejects_bad_ratio() {
        let err = PoolMath::add_liquidity(&seeded(), &wallet(), dec!(10), dec!(20)).unwrap_err();
        assert!(matches!(err, AmmError::InvalidRatio { .. }));
    }

    #[test]
    fn test_add_liquidity_validation() {
        assert_eq!(
            PoolMath::add_liquidity(&seeded(), &wallet(), Decimal::ZERO, dec!(1)),
            Err(AmmError::InvalidReserveValues)
        );
        let poor = UserPosition::new(dec!(1), dec!(1), Decimal::ZERO);
        let err = PoolMath::add_liquidity(&seeded(), &poor, dec!(1), dec!(2500)).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientBalance { asset: Asset::B, .. }));
    }

    #[test]
    fn test_add_liquidity_dust_mints_nothing() {
        let thin_supply = pool(dec!(1000), dec!(2500000), dec!(0.001));
        let result =
            PoolMath::add_liquidity(&thin_supply, &wallet(), dec!(0.000000001), dec!(0.0000025));
        assert_eq!(result, Err(AmmError::InvalidShares));
    }

    #[test]
    fn test_removal_amounts() {
        let amounts = PoolMath::removal_amounts(&seeded(), dec!(5000));
        assert_eq!(amounts.amount0, dec!(100));
        assert_eq!(amounts.amount1, dec!(250000));
        assert_eq!(PoolMath::removal_amounts(&seeded(), Decimal::ZERO), RemovalAmounts::default());
        let empty = PoolState::uninitialized([1u8; 20], [2u8; 20]);
        assert_eq!(PoolMath::removal_amounts(&empty, dec!(1)), RemovalAmounts::default());
    }

    #[test]
    fn test_remove_liquidity() {
        let result = PoolMath::remove_liquidity(&seeded(), &wallet(), dec!(5000)).unwrap();
        assert_eq!(result.pool.reserve0, dec!(900));
        assert_eq!(result.pool.reserve1, dec!(2250000));
        assert_eq!(result.pool.total_shares, dec!(45000));
        assert_eq!(result.position.balance_a, dec!(1100));
        assert_eq!(result.position.lp_shares, dec!(45000));
    }

    #[test]
    fn test_remove_all_liquidity_drains_pool() {
        let result = PoolMath::remove_liquidity(&seeded(), &wallet(), dec!(50000)).unwrap();
        assert_eq!(result.pool.reserve0, Decimal::ZERO);
        assert_eq!(result.pool.reserve1, Decimal::ZERO);
        assert!(!result.pool.is_initialized());
        assert_eq!(result.pool.price(), Decimal::ZERO);
        assert!(!result.pool.violates_invariants());

        // drained pool is re-seeded by the next deposit
        let reseeded =
            PoolMath::add_liquidity(&result.pool, &result.position, dec!(4), dec!(9)).unwrap();
        assert_eq!(reseeded.pool.total_shares, dec!(6));
    }

    #[test]
    fn test_remove_liquidity_validation() {
        assert_eq!(
            PoolMath::remove_liquidity(&seeded(), &wallet(), Decimal::ZERO),
            Err(AmmError::InvalidShares)
        );
        let err = PoolMath::remove_liquidity(&seeded(), &wallet(), dec!(50001)).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientShares { .. }));
        // 1e-9 shares of a near-empty token0 reserve truncates to zero
        let thin = pool(dec!(0.00001), dec!(2500000), dec!(50000));
        assert_eq!(
            PoolMath::remove_liquidity(&thin, &wallet(), dec!(0.000000001)),
            Err(AmmError::InvalidReserves)
        );
    }
}
