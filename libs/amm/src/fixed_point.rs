//! Fixed-point helpers shared by the pool engine
//!
//! Every engine quantity is a `Decimal` held at [`AMOUNT_SCALE`] decimal
//! places. Divisions truncate toward zero at that scale, which matches the
//! contract's integer division over raw units of a common scale. The
//! square root works on the raw integer form so share issuance agrees
//! with the contract bit for bit.

use crate::error::{AmmError, AmmResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places every engine quantity is held at
///
/// Products of two engine quantities carry twice this scale. `Decimal`
/// keeps 96 bits of mantissa, so such a product is exact only while its
/// integer part stays below about `7.9e10`; past that the low fractional
/// digits are rounded away. Comparisons that must be exact at any size
/// (the deposit ratio gate) work on raw integer units instead.
pub const AMOUNT_SCALE: u32 = 9;

/// Largest token precision accepted by the base-unit conversions
pub const MAX_TOKEN_DECIMALS: u32 = 28;

/// Truncate a value to the engine scale
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero)
}

pub fn checked_mul(a: Decimal, b: Decimal, operation: &'static str) -> AmmResult<Decimal> {
    a.checked_mul(b).ok_or(AmmError::overflow(operation))
}

pub fn checked_add(a: Decimal, b: Decimal, operation: &'static str) -> AmmResult<Decimal> {
    a.checked_add(b).ok_or(AmmError::overflow(operation))
}

/// Truncating division at the engine scale
///
/// A zero divisor is reported as an overflow; callers that treat an empty
/// pool as a legal state check reserves before dividing.
pub fn div_trunc(
    numerator: Decimal,
    denominator: Decimal,
    operation: &'static str,
) -> AmmResult<Decimal> {
    if denominator.is_zero() {
        return Err(AmmError::overflow(operation));
    }
    numerator
        .checked_div(denominator)
        .map(quantize)
        .ok_or(AmmError::overflow(operation))
}

/// `floor(sqrt(x))` using the contract's Newton iteration
///
/// Seeds at `x / 2 + 1` and iterates `y = (x / y + y) / 2` while the
/// estimate keeps shrinking. Inputs below 4 short-circuit the same way
/// the contract does.
pub fn integer_sqrt(x: u128) -> u128 {
    if x > 3 {
        let mut z = x;
        let mut y = x / 2 + 1;
        while y < z {
            z = y;
            y = (x / y + y) / 2;
        }
        z
    } else if x != 0 {
        1
    } else {
        0
    }
}

/// Lesser of two values; ties return `b`
pub fn min_of<T: PartialOrd>(a: T, b: T) -> T {
    if a < b {
        a
    } else {
        b
    }
}

/// Square root of a scaled quantity, truncated to the engine scale
///
/// The value is lifted to raw units at twice the engine scale so that the
/// integer root lands back at exactly [`AMOUNT_SCALE`] places:
/// `sqrt(v * 10^(2s)) = sqrt(v) * 10^s`.
pub fn fixed_sqrt(value: Decimal) -> AmmResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(AmmError::InvalidAmount);
    }
    let raw = to_raw(value, 2 * AMOUNT_SCALE).ok_or(AmmError::overflow("sqrt"))?;
    let root = integer_sqrt(raw);
    Decimal::try_from_i128_with_scale(root as i128, AMOUNT_SCALE)
        .map_err(|_| AmmError::overflow("sqrt"))
}

/// Convert an engine amount to raw token units (`parseUnits`)
pub fn to_base_units(amount: Decimal, decimals: u32) -> AmmResult<u128> {
    if amount < Decimal::ZERO {
        return Err(AmmError::InvalidAmount);
    }
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(AmmError::overflow("to_base_units"));
    }
    to_raw(amount, decimals).ok_or(AmmError::overflow("to_base_units"))
}

/// Convert raw token units to an engine amount (`formatUnits`)
pub fn from_base_units(raw: u128, decimals: u32) -> AmmResult<Decimal> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(AmmError::overflow("from_base_units"));
    }
    let raw = i128::try_from(raw).map_err(|_| AmmError::overflow("from_base_units"))?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(quantize)
        .map_err(|_| AmmError::overflow("from_base_units"))
}

/// Non-negative value as an integer count of `10^-scale` units, truncated
pub(crate) fn to_raw(value: Decimal, scale: u32) -> Option<u128> {
    let mantissa = u128::try_from(value.mantissa()).ok()?;
    let current = value.scale();
    if current <= scale {
        mantissa.checked_mul(10u128.checked_pow(scale - current)?)
    } else {
        Some(mantissa / 10u128.checked_pow(current - scale)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_integer_sqrt_small_values() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(2), 1);
        assert_eq!(integer_sqrt(3), 1);
        assert_eq!(integer_sqrt(4), 2);
        assert_eq!(integer_sqrt(15), 3);
        assert_eq!(integer_sqrt(16), 4);
    }

    #[test]
    fn test_integer_sqrt_is_floor() {
        assert_eq!(integer_sqrt(2_500_000_000), 50_000);
        assert_eq!(integer_sqrt(2_500_000_001), 50_000);
        assert_eq!(integer_sqrt(u128::MAX), 18_446_744_073_709_551_615);
    }

    #[test]
    fn test_fixed_sqrt_genesis_shares() {
        let shares = fixed_sqrt(dec!(1000) * dec!(2500000)).unwrap();
        assert_eq!(shares, dec!(50000));
    }

    #[test]
    fn test_fixed_sqrt_fractional() {
        let root = fixed_sqrt(dec!(2)).unwrap();
        assert_eq!(root, dec!(1.414213562));
        assert_eq!(fixed_sqrt(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(fixed_sqrt(dec!(-1)), Err(AmmError::InvalidAmount));
    }

    #[test]
    fn test_div_trunc_truncates_toward_zero() {
        let q = div_trunc(dec!(2), dec!(3), "test").unwrap();
        assert_eq!(q, dec!(0.666666666));
        assert!(div_trunc(dec!(1), Decimal::ZERO, "test").is_err());
    }

    #[test]
    fn test_min_of() {
        assert_eq!(min_of(dec!(1), dec!(2)), dec!(1));
        assert_eq!(min_of(dec!(3), dec!(2)), dec!(2));
        assert_eq!(min_of(5u32, 5u32), 5);
    }

    #[test]
    fn test_base_unit_conversion() {
        assert_eq!(
            to_base_units(dec!(1.5), 18).unwrap(),
            1_500_000_000_000_000_000
        );
        assert_eq!(to_base_units(dec!(2500.123456789), 6).unwrap(), 2_500_123_456);
        assert_eq!(from_base_units(2_500_123_456, 6).unwrap(), dec!(2500.123456));
        assert_eq!(
            from_base_units(1_000_000_000_000_000_001, 18).unwrap(),
            dec!(1.000000000)
        );
        assert_eq!(to_base_units(dec!(-1), 6), Err(AmmError::InvalidAmount));
    }

    #[test]
    fn test_fixed_sqrt_overflow() {
        // 1e21 lifted to 18 places is 1e39, past u128
        assert_eq!(
            fixed_sqrt(dec!(1000000000000000000000)),
            Err(AmmError::overflow("sqrt"))
        );
        assert!(fixed_sqrt(dec!(100000000000000000000)).is_ok());
    }

    #[test]
    fn test_base_unit_overflow() {
        assert_eq!(
            to_base_units(dec!(1), MAX_TOKEN_DECIMALS + 1),
            Err(AmmError::overflow("to_base_units"))
        );
        assert_eq!(
            to_base_units(dec!(1000000000000000000000), 18),
            Err(AmmError::overflow("to_base_units"))
        );
        assert_eq!(
            from_base_units(1, MAX_TOKEN_DECIMALS + 1),
            Err(AmmError::overflow("from_base_units"))
        );
        assert_eq!(
            from_base_units(u128::MAX, 18),
            Err(AmmError::overflow("from_base_units"))
        );
    }
}
