use std::sync::Arc;

use chrono::Utc;

use palengke_accounts::{AccountDirectory, RegistrationForm, Session};
use palengke_cart::{
    AddToCart, Cart, CartCommand, CartLine, ChangeQuantity, ProductSnapshot, RemoveLine,
    SelectOption, SelectionKind,
};
use palengke_catalog::{
    Catalog, CatalogCommand, CatalogEvent, ListProduct, PriceBand, Product, ProductDraft,
    SellerInfo,
};
use palengke_chat::{ChatBoard, ChatMessage};
use palengke_core::{
    Aggregate, AccountId, MarketError, MarketResult, Money, OrderId, ProductId, execute,
};
use palengke_events::{EventBus, InMemoryEventBus, Subscription};
use palengke_orders::{CheckoutRequest, OrderSummary};

use crate::event::MarketEvent;

/// The session-scoped marketplace context.
///
/// Owns every collection the storefront works against and coordinates the
/// aggregates: it resolves cross-aggregate facts (live stock, snapshots,
/// the login session), builds commands, executes them, and publishes
/// notifications. All operations are synchronous and run to completion per
/// user action; errors are recovered at the call boundary with no partial
/// state left behind.
#[derive(Debug, Default)]
pub struct MarketSession {
    directory: AccountDirectory,
    active: Option<Session>,
    catalog: Catalog,
    cart: Cart,
    chats: ChatBoard,
    bus: Arc<InMemoryEventBus<MarketEvent>>,
}

impl MarketSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to presentation notifications.
    pub fn subscribe(&self) -> Subscription<MarketEvent> {
        self.bus.subscribe()
    }

    // ---- accounts -------------------------------------------------------

    /// Register a new shopper and sign them in.
    pub fn register(&mut self, form: RegistrationForm) -> MarketResult<AccountId> {
        let now = Utc::now();
        let session = self
            .directory
            .register(form, AccountId::new(), now)?
            .open_session(now);
        let account_id = session.account_id;
        self.active = Some(session);
        tracing::info!(%account_id, "account registered");
        self.notify(MarketEvent::SessionChanged {
            signed_in: true,
            occurred_at: now,
        });
        Ok(account_id)
    }

    /// Sign in with an email/password pair, replacing any active session.
    pub fn login(&mut self, email: &str, password: &str) -> MarketResult<()> {
        let now = Utc::now();
        let session = self.directory.authenticate(email, password, now)?;
        self.active = Some(session);
        self.notify(MarketEvent::SessionChanged {
            signed_in: true,
            occurred_at: now,
        });
        Ok(())
    }

    /// Drop the active session, if any.
    pub fn logout(&mut self) {
        if self.active.take().is_some() {
            self.notify(MarketEvent::SessionChanged {
                signed_in: false,
                occurred_at: Utc::now(),
            });
        }
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    fn require_login(&self) -> MarketResult<&Session> {
        self.active.as_ref().ok_or(MarketError::LoginRequired)
    }

    // ---- catalog --------------------------------------------------------

    /// List a product for sale. Requires an active session.
    pub fn list_product(&mut self, draft: ProductDraft) -> MarketResult<Product> {
        self.require_login()?;

        let product_id = ProductId::new();
        let now = Utc::now();
        execute(
            &mut self.catalog,
            &CatalogCommand::ListProduct(ListProduct {
                product_id,
                draft,
                occurred_at: now,
            }),
        )?;

        let product = self.catalog.lookup(product_id)?.clone();
        tracing::info!(%product_id, name = product.name(), "product listed");
        self.notify(MarketEvent::ProductListed {
            product: product.clone(),
            occurred_at: now,
        });
        Ok(product)
    }

    /// Look up a live product; depleted products are gone.
    pub fn product(&self, product_id: ProductId) -> MarketResult<&Product> {
        self.catalog.lookup(product_id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.catalog.products()
    }

    /// Marketplace search: text filter plus optional price band.
    pub fn search(&self, query: &str, band: Option<PriceBand>) -> Vec<&Product> {
        self.catalog.search(query, band)
    }

    // ---- cart -----------------------------------------------------------

    /// Add one unit of a product to the cart. Requires an active session.
    ///
    /// A second add for the same product increments its line instead of
    /// opening another one.
    pub fn add_to_cart(&mut self, product_id: ProductId) -> MarketResult<CartLine> {
        self.require_login()?;

        let product = self.catalog.lookup(product_id)?;
        let snapshot = ProductSnapshot::from(product);
        let available_stock = product.stock();
        let now = Utc::now();

        execute(
            &mut self.cart,
            &CartCommand::AddToCart(AddToCart {
                snapshot,
                available_stock,
                occurred_at: now,
            }),
        )?;

        tracing::debug!(%product_id, "added to cart");
        self.notify_cart_changed();
        self.cart.line(product_id).cloned().ok_or(MarketError::NotFound)
    }

    /// Change a line's quantity by an arbitrary delta, re-validated against
    /// live stock. Dropping below one removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) -> MarketResult<()> {
        let available_stock = self.catalog.lookup(product_id)?.stock();

        execute(
            &mut self.cart,
            &CartCommand::ChangeQuantity(ChangeQuantity {
                product_id,
                delta,
                available_stock,
                occurred_at: Utc::now(),
            }),
        )?;

        self.notify_cart_changed();
        Ok(())
    }

    /// Remove a line. Silently succeeds when the product is not in the cart.
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> MarketResult<()> {
        let events = execute(
            &mut self.cart,
            &CartCommand::RemoveLine(RemoveLine {
                product_id,
                occurred_at: Utc::now(),
            }),
        )?;

        if !events.is_empty() {
            self.notify_cart_changed();
        }
        Ok(())
    }

    /// Pick a payment or logistics option for a line.
    pub fn set_selection(
        &mut self,
        product_id: ProductId,
        kind: SelectionKind,
        value: impl Into<String>,
    ) -> MarketResult<()> {
        execute(
            &mut self.cart,
            &CartCommand::SelectOption(SelectOption {
                product_id,
                kind,
                value: value.into(),
                occurred_at: Utc::now(),
            }),
        )?;

        self.notify_cart_changed();
        Ok(())
    }

    pub fn cart_lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn cart_total(&self) -> Money {
        self.cart.total()
    }

    // ---- checkout -------------------------------------------------------

    /// Check out the whole cart, all-or-nothing.
    ///
    /// Every line is staged against live stock before any ledger entry
    /// moves; a failed line aborts with `StockConflict` and leaves both the
    /// catalog and the cart exactly as they were.
    pub fn checkout(&mut self, delivery_address: &str) -> MarketResult<OrderSummary> {
        let request = CheckoutRequest {
            order_id: OrderId::new(),
            delivery_address: delivery_address.to_string(),
            occurred_at: Utc::now(),
        };

        let prepared = palengke_orders::prepare(&self.catalog, &self.cart, &request)?;

        for event in &prepared.catalog_events {
            self.catalog.apply(event);
            if let CatalogEvent::StockDecremented(e) = event {
                self.notify(MarketEvent::StockChanged {
                    product_id: e.product_id,
                    new_stock: e.new_stock,
                    removed: e.removed,
                    occurred_at: e.occurred_at,
                });
            }
        }
        for event in &prepared.cart_events {
            self.cart.apply(event);
        }

        let summary = prepared.summary;
        tracing::info!(
            order_id = %summary.order_id,
            lines = summary.lines.len(),
            total = %summary.grand_total,
            "checkout completed"
        );
        self.notify_cart_changed();
        self.notify(MarketEvent::CheckoutCompleted {
            summary: summary.clone(),
            occurred_at: summary.placed_at,
        });
        Ok(summary)
    }

    // ---- chat -----------------------------------------------------------

    /// Seller details for the contact-seller modal.
    pub fn contact_seller(&self, product_id: ProductId) -> MarketResult<&SellerInfo> {
        Ok(self.catalog.lookup(product_id)?.seller())
    }

    /// Post a message to the product's thread. The sender is the active
    /// session's display name when signed in.
    pub fn send_chat(&mut self, product_id: ProductId, body: impl Into<String>) -> MarketResult<()> {
        let sender = self
            .active
            .as_ref()
            .map(|s| s.display_name.clone())
            .unwrap_or_else(|| "You".to_string());
        self.chats.post(product_id, sender, body, Utc::now())
    }

    pub fn chat_transcript(&self, product_id: ProductId) -> &[ChatMessage] {
        self.chats.transcript(product_id)
    }

    // ---- notifications --------------------------------------------------

    fn notify_cart_changed(&self) {
        self.notify(MarketEvent::CartChanged {
            lines: self.cart.lines().to_vec(),
            total: self.cart.total(),
            occurred_at: Utc::now(),
        });
    }

    fn notify(&self, event: MarketEvent) {
        // The state change already happened; a full bus is the renderer's
        // problem, not the shopper's.
        if let Err(e) = self.bus.publish(event) {
            tracing::warn!("event publish failed: {e:?}");
        }
    }
}
