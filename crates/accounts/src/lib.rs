//! `palengke-accounts` — mock shopper accounts and sessions.
//!
//! Demo-grade on purpose: presence of a [`Session`] is the entire auth
//! check, and nothing here is hardened.

pub mod account;
pub mod session;

pub use account::{Account, AccountDirectory, RegistrationForm};
pub use session::Session;
