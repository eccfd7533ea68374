//! Money as integer centavos.
//!
//! All prices and totals flow through this newtype; floating point never
//! enters the ledger. Display renders pesos with two decimals.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// A non-negative peso amount stored in centavos.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_centavos(centavos: u64) -> Self {
        Self(centavos)
    }

    pub fn from_pesos(pesos: u64) -> Self {
        Self(pesos * 100)
    }

    pub fn centavos(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Line total: unit price times quantity.
    pub fn times(&self, quantity: u32) -> Money {
        Money(self.0 * u64::from(quantity))
    }
}

impl core::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl ValueObject for Money {}
