//! Money type for representing monetary values.
//!
//! The store sells in Chilean pesos, which have no minor unit, so amounts are
//! whole pesos held in an `i64`. Integer arithmetic avoids the floating-point
//! drift that plagues monetary calculations.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;

/// A monetary amount in whole Chilean pesos (CLP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create a new Money value from whole pesos.
    pub const fn new(pesos: i64) -> Self {
        Self(pesos)
    }

    /// Create a Money value from a decimal amount, rounding to the nearest
    /// peso.
    ///
    /// ```
    /// use stuffies_commerce::money::Money;
    /// assert_eq!(Money::from_decimal(9990.4).pesos(), 9990);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        if !amount.is_finite() {
            return Self::ZERO;
        }
        Self(amount.round() as i64)
    }

    /// Amount in whole pesos.
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamp negative amounts to zero.
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Add two amounts, returning None on overflow.
    pub fn try_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum an iterator of amounts, returning None on overflow.
    pub fn try_sum<'a>(iter: impl IntoIterator<Item = &'a Money>) -> Option<Self> {
        iter.into_iter()
            .try_fold(Self::ZERO, |acc, m| acc.try_add(m))
    }

    /// Format the way the storefront prints prices, e.g. `$12.990`.
    pub fn display(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            format!("-${}", grouped)
        } else {
            format!("${}", grouped)
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Add for Money {
    type Output = Money;

    /// Saturating addition. Use [`Money::try_add`] to detect overflow.
    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl From<i64> for Money {
    fn from(pesos: i64) -> Self {
        Self(pesos)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    /// Accepts integers, floats (rounded) and numeric strings, since prices
    /// arrive from forms and loosely typed JSON.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a peso amount")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map(Money)
                    .map_err(|_| E::custom("amount out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                if v.is_finite() {
                    Ok(Money::from_decimal(v))
                } else {
                    Err(E::custom("amount is not finite"))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| E::custom(format!("invalid amount: {v:?}")))
                    .and_then(|f| self.visit_f64(f))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Lenient conversion used at the catalog boundary: anything that is not a
/// usable number becomes `None`.
pub(crate) fn money_from_json(value: &serde_json::Value) -> Option<Money> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Money)
            .or_else(|| n.as_f64().map(Money::from_decimal)),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(Money::from_decimal),
        _ => None,
    }
}
