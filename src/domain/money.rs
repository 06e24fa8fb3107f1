use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A whole amount of Vietnamese dong.
///
/// VND has no minor unit in practice, so prices are plain integers. This is
/// a wrapper around `u64` to keep prices from being mixed up with day counts
/// and revision counts in the pricing rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Vnd(u64);

impl Vnd {
    pub const ZERO: Self = Self(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Vnd {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Vnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{grouped} VND")
    }
}

/// An amount as reported by the payment gateway, in minor units (x100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayAmount(u64);

impl GatewayAmount {
    pub const fn from_minor_units(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// The amount as shown to the user: minor units divided by 100.
    pub fn display_amount(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), 2).normalize()
    }
}
