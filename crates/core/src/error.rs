//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type MarketResult<T> = Result<T, MarketError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// stock invariants, conflicts). Every variant is recovered at the boundary
/// of the triggering user action; none of them leaves partial state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation needs an active session and there is none.
    #[error("login required")]
    LoginRequired,

    /// Email/password pair did not match any account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// A requested resource was not found (stale product reference).
    #[error("not found")]
    NotFound,

    /// The product has no stock left and cannot enter a cart.
    #[error("product is out of stock")]
    OutOfStock,

    /// A ledger decrement asked for more units than the product has.
    #[error("insufficient stock (requested {requested}, available {available})")]
    InsufficientStock { requested: u32, available: u32 },

    /// A cart quantity change would pass the product's live stock.
    #[error("stock exceeded (requested {requested}, available {available})")]
    StockExceeded { requested: u32, available: u32 },

    /// Checkout pre-validation found a line its product can no longer cover.
    #[error("stock conflict: {0}")]
    StockConflict(String),

    /// A fulfillment choice the product does not offer.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Checkout on an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A conflict occurred (e.g. duplicate listing id, duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl MarketError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn stock_conflict(msg: impl Into<String>) -> Self {
        Self::StockConflict(msg.into())
    }

    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        Self::InvalidSelection(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
