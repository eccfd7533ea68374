//! `palengke-orders` — the checkout processor.
//!
//! Checkout is the one transaction in the system: every cart line is
//! validated against live stock before a single ledger entry moves.

pub mod checkout;
pub mod summary;

pub use checkout::{CheckoutRequest, PreparedCheckout, prepare};
pub use summary::{OrderLine, OrderSummary};
