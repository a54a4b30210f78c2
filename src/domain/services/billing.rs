//! # Billing Calculator
//!
//! Converts a carrier's negotiated cost into the sale price charged to the
//! client.
//!
//! ```text
//! final = round2(negotiated_cost * (1 + markup_fraction) + fixed_fee)
//! ```
//!
//! Rounding is half away from zero to two decimal places and is applied once,
//! to the full sum.
//!
//! # Examples
//!
//! ```
//! use shipquote::domain::services::BillingCalculator;
//! use rust_decimal::Decimal;
//!
//! let billing = BillingCalculator::default();
//! let price = billing.calculate_final_price(Decimal::TEN).unwrap();
//! assert_eq!(price, Decimal::new(1700, 2));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places of a final price.
pub const PRICE_SCALE: u32 = 2;

/// Default markup fraction (20%).
pub const DEFAULT_MARKUP_FRACTION: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Default fixed fee added to every quote.
pub const DEFAULT_FIXED_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Pure pricing function configured with a markup and a fixed fee.
///
/// Holds no mutable state and is safe to share across tasks.
/// Deserialization goes through [`BillingCalculator::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BillingSettings")]
pub struct BillingCalculator {
    markup_fraction: Decimal,
    fixed_fee: Decimal,
}

#[derive(Deserialize)]
struct BillingSettings {
    markup_fraction: Decimal,
    fixed_fee: Decimal,
}

impl TryFrom<BillingSettings> for BillingCalculator {
    type Error = DomainError;

    fn try_from(settings: BillingSettings) -> DomainResult<Self> {
        Self::new(settings.markup_fraction, settings.fixed_fee)
    }
}

impl BillingCalculator {
    /// Creates a calculator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if the markup or the fee is
    /// negative.
    pub fn new(markup_fraction: Decimal, fixed_fee: Decimal) -> DomainResult<Self> {
        if markup_fraction < Decimal::ZERO {
            return Err(DomainError::invalid_argument("markup cannot be negative"));
        }
        if fixed_fee < Decimal::ZERO {
            return Err(DomainError::invalid_argument("fixed fee cannot be negative"));
        }
        Ok(Self {
            markup_fraction,
            fixed_fee,
        })
    }

    /// Creates a calculator from a markup expressed in percent (20 = 20%).
    ///
    /// # Errors
    ///
    /// Same as [`BillingCalculator::new`].
    pub fn from_percent(markup_percent: Decimal, fixed_fee: Decimal) -> DomainResult<Self> {
        Self::new(markup_percent / Decimal::ONE_HUNDRED, fixed_fee)
    }

    /// Markup as a fraction.
    #[inline]
    #[must_use]
    pub fn markup_fraction(&self) -> Decimal {
        self.markup_fraction
    }

    /// Fixed fee.
    #[inline]
    #[must_use]
    pub fn fixed_fee(&self) -> Decimal {
        self.fixed_fee
    }

    /// Computes the final sale price for a negotiated cost.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `negotiated_cost` is negative.
    pub fn calculate_final_price(&self, negotiated_cost: Decimal) -> DomainResult<Decimal> {
        if negotiated_cost < Decimal::ZERO {
            return Err(DomainError::invalid_argument(format!(
                "negotiated cost cannot be negative: {negotiated_cost}"
            )));
        }

        let gross = Decimal::ONE
            .checked_add(self.markup_fraction)
            .and_then(|factor| negotiated_cost.checked_mul(factor))
            .and_then(|marked_up| marked_up.checked_add(self.fixed_fee))
            .ok_or_else(|| DomainError::invalid_argument("final price overflow"))?;

        Ok(gross.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Default for BillingCalculator {
    fn default() -> Self {
        Self {
            markup_fraction: DEFAULT_MARKUP_FRACTION,
            fixed_fee: DEFAULT_FIXED_FEE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    mod calculate_final_price {
        use super::*;

        #[test]
        fn applies_markup_and_fee() {
            let billing = BillingCalculator::default();
            assert_eq!(billing.calculate_final_price(dec("10.00")).unwrap(), dec("17.00"));
            assert_eq!(billing.calculate_final_price(Decimal::ZERO).unwrap(), dec("5.00"));
            assert_eq!(billing.calculate_final_price(dec("1000")).unwrap(), dec("1205.00"));
        }

        #[test]
        fn rounds_once_on_the_sum() {
            // 12.345 * 1.2 + 5 = 19.814
            let billing = BillingCalculator::default();
            assert_eq!(billing.calculate_final_price(dec("12.345")).unwrap(), dec("19.81"));
        }

        #[test]
        fn midpoint_rounds_up() {
            // 0.0125 * 1.2 + 5 = 5.015
            let billing = BillingCalculator::default();
            assert_eq!(billing.calculate_final_price(dec("0.0125")).unwrap(), dec("5.02"));
        }

        #[test]
        fn rejects_negative_cost() {
            let billing = BillingCalculator::default();
            let err = billing.calculate_final_price(Decimal::NEGATIVE_ONE).unwrap_err();
            assert!(err.is_invalid_argument());
        }

        #[test]
        fn custom_configuration() {
            let billing = BillingCalculator::from_percent(dec("10"), dec("2.50")).unwrap();
            assert_eq!(billing.markup_fraction(), dec("0.10"));
            assert_eq!(billing.calculate_final_price(dec("100")).unwrap(), dec("112.50"));
        }

        #[test]
        fn extreme_markup_is_an_error() {
            let billing = BillingCalculator::new(Decimal::MAX, Decimal::ZERO).unwrap();
            let err = billing.calculate_final_price(Decimal::ONE).unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_negative_markup() {
            assert!(BillingCalculator::new(dec("-0.1"), Decimal::ZERO).is_err());
        }

        #[test]
        fn rejects_negative_fee() {
            assert!(BillingCalculator::new(Decimal::ZERO, dec("-1")).is_err());
        }

        #[test]
        fn deserialization_validates() {
            let billing: BillingCalculator =
                serde_json::from_str(r#"{"markup_fraction":"0.10","fixed_fee":"2.50"}"#).unwrap();
            assert_eq!(billing.fixed_fee(), dec("2.50"));

            let negative =
                serde_json::from_str::<BillingCalculator>(r#"{"markup_fraction":"-0.10","fixed_fee":"2.50"}"#);
            assert!(negative.is_err());

            let negative_fee =
                serde_json::from_str::<BillingCalculator>(r#"{"markup_fraction":"0.10","fixed_fee":"-1"}"#);
            assert!(negative_fee.is_err());
        }

        #[test]
        fn default_values() {
            let billing = BillingCalculator::default();
            assert_eq!(billing.markup_fraction(), dec("0.20"));
            assert_eq!(billing.fixed_fee(), dec("5.00"));
        }
    }

    proptest! {
        #[test]
        fn matches_formula(cents in 0i64..100_000_000) {
            let cost = Decimal::new(cents, 3);
            let billing = BillingCalculator::default();
            let expected = (cost * dec("1.2") + dec("5"))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            prop_assert_eq!(billing.calculate_final_price(cost).unwrap(), expected);
        }

        #[test]
        fn never_below_fixed_fee(cents in 0i64..100_000_000) {
            let billing = BillingCalculator::default();
            let price = billing.calculate_final_price(Decimal::new(cents, 2)).unwrap();
            prop_assert!(price >= billing.fixed_fee());
            prop_assert!(price.scale() <= PRICE_SCALE);
        }

        #[test]
        fn monotonic_in_cost(a in 0i64..10_000_000, b in 0i64..10_000_000) {
            let billing = BillingCalculator::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = billing.calculate_final_price(Decimal::new(lo, 2)).unwrap();
            let p_hi = billing.calculate_final_price(Decimal::new(hi, 2)).unwrap();
            prop_assert!(p_lo <= p_hi);
        }
    }
}
