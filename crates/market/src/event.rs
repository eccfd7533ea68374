use chrono::{DateTime, Utc};

use palengke_cart::CartLine;
use palengke_catalog::Product;
use palengke_core::{Money, ProductId};
use palengke_events::Event;
use palengke_orders::OrderSummary;

/// Notifications the presentation layer renders from.
///
/// Fired after the corresponding state change has been applied, so a
/// subscriber that re-queries the session instead of reading the payload
/// sees the same picture.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    /// A new listing: append a catalog card.
    ProductListed {
        product: Product,
        occurred_at: DateTime<Utc>,
    },
    /// Cart contents or total changed: re-render the cart panel and badge.
    CartChanged {
        lines: Vec<CartLine>,
        total: Money,
        occurred_at: DateTime<Utc>,
    },
    /// A product's stock moved: update or remove its catalog card.
    StockChanged {
        product_id: ProductId,
        new_stock: u32,
        removed: bool,
        occurred_at: DateTime<Utc>,
    },
    /// Checkout committed: show the order confirmation.
    CheckoutCompleted {
        summary: OrderSummary,
        occurred_at: DateTime<Utc>,
    },
    /// Login state flipped: update the navbar.
    SessionChanged {
        signed_in: bool,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for MarketEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::ProductListed { .. } => "market.product.listed",
            MarketEvent::CartChanged { .. } => "market.cart.changed",
            MarketEvent::StockChanged { .. } => "market.stock.changed",
            MarketEvent::CheckoutCompleted { .. } => "market.checkout.completed",
            MarketEvent::SessionChanged { .. } => "market.session.changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MarketEvent::ProductListed { occurred_at, .. }
            | MarketEvent::CartChanged { occurred_at, .. }
            | MarketEvent::StockChanged { occurred_at, .. }
            | MarketEvent::CheckoutCompleted { occurred_at, .. }
            | MarketEvent::SessionChanged { occurred_at, .. } => *occurred_at,
        }
    }
}
