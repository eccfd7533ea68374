//! `palengke-market` — the session-scoped marketplace context.
//!
//! One [`MarketSession`] per browser session owns the account directory, the
//! active login, the catalog, the cart, and the chat board, and publishes
//! [`MarketEvent`]s for the presentation layer to render from.

pub mod event;
pub mod session;

pub use event::MarketEvent;
pub use session::MarketSession;
