//! Triangulation and load (margin) arithmetic.
//!
//! All functions are pure and return `None` when the result is not
//! representable (division by zero or overflow).

use exrate_common::RateSide;
use rust_decimal::Decimal;

/// Rate from `source` to `target` through a shared reference currency.
///
/// Both rates are quoted against the same reference: `(1 / source) * target`.
pub fn triangulate(source_rate: Decimal, target_rate: Decimal) -> Option<Decimal> {
    Decimal::ONE
        .checked_div(source_rate)?
        .checked_mul(target_rate)
}

/// Multiplier `1 + sign * percent / 100` for a load on `side`.
///
/// Selling lowers the rate, buying raises it. `inverse` flips the sign.
pub fn load_factor(percent: Decimal, side: RateSide, inverse: bool) -> Option<Decimal> {
    let sign = if inverse {
        -side.load_sign()
    } else {
        side.load_sign()
    };
    let fraction = percent.checked_div(Decimal::ONE_HUNDRED)?;
    Decimal::ONE.checked_add(sign.checked_mul(fraction)?)
}

/// Apply a load percentage to a rate.
pub fn apply_load(rate: Decimal, percent: Decimal, side: RateSide, inverse: bool) -> Option<Decimal> {
    rate.checked_mul(load_factor(percent, side, inverse)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_triangulate() {
        assert_eq!(triangulate(dec!(1), dec!(12.56)), Some(dec!(12.56)));
        assert_eq!(triangulate(dec!(2), dec!(3)), Some(dec!(1.5)));
        assert_eq!(triangulate(dec!(11.75), dec!(1)), Some(dec!(1) / dec!(11.75)));
    }

    #[test]
    fn test_triangulate_zero_source() {
        assert_eq!(triangulate(Decimal::ZERO, dec!(1)), None);
    }

    #[test]
    fn test_apply_load_sides() {
        assert_eq!(apply_load(dec!(10), dec!(5), RateSide::Buy, false), Some(dec!(10.5)));
        assert_eq!(apply_load(dec!(10), dec!(5), RateSide::Sell, false), Some(dec!(9.5)));
        assert_eq!(apply_load(dec!(10), dec!(5), RateSide::Mid, false), Some(dec!(10.5)));
        assert_eq!(apply_load(dec!(10), dec!(5), RateSide::Buy, true), Some(dec!(9.5)));
        assert_eq!(apply_load(dec!(10), dec!(5), RateSide::Sell, true), Some(dec!(10.5)));
    }

    #[test]
    fn test_zero_load_is_identity() {
        assert_eq!(apply_load(dec!(1.61), Decimal::ZERO, RateSide::Sell, true), Some(dec!(1.61)));
    }

    proptest! {
        #[test]
        fn prop_inverse_flips_margin_sign(
            rate_units in 1i64..10_000_000,
            percent_bps in 0i64..10_000,
            sell in any::<bool>(),
        ) {
            let rate = Decimal::new(rate_units, 4);
            let percent = Decimal::new(percent_bps, 2);
            let side = if sell { RateSide::Sell } else { RateSide::Buy };

            let normal = load_factor(percent, side, false).unwrap();
            let inverse = load_factor(percent, side, true).unwrap();

            // The two factors are mirror images around one.
            prop_assert_eq!(normal - Decimal::ONE, Decimal::ONE - inverse);
            prop_assert_eq!(
                apply_load(rate, percent, side, true),
                Some(rate * inverse)
            );
        }

        #[test]
        fn prop_buy_never_lowers_sell_never_raises(
            rate_units in 1i64..10_000_000,
            percent_bps in 0i64..10_000,
        ) {
            let rate = Decimal::new(rate_units, 4);
            let percent = Decimal::new(percent_bps, 2);

            prop_assert!(apply_load(rate, percent, RateSide::Buy, false).unwrap() >= rate);
            prop_assert!(apply_load(rate, percent, RateSide::Sell, false).unwrap() <= rate);
        }
    }
}
