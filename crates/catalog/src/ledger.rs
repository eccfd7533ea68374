use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_core::{Aggregate, MarketError, MarketResult, Money, ProductId};
use palengke_events::Event;

use crate::product::{Product, ProductDraft};

/// Command: ListProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListProduct {
    pub product_id: ProductId,
    pub draft: ProductDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DecrementStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecrementStock {
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogCommand {
    ListProduct(ListProduct),
    DecrementStock(DecrementStock),
}

/// Event: ProductListed.
///
/// Carries the fully-built product so `apply` is a plain insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListed {
    pub product: Product,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockDecremented.
///
/// `removed` is decided here so consumers (and the storefront's
/// stock-changed notification) never re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDecremented {
    pub product_id: ProductId,
    pub quantity: u32,
    pub new_stock: u32,
    pub removed: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogEvent {
    ProductListed(ProductListed),
    StockDecremented(StockDecremented),
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::ProductListed(_) => "catalog.product.listed",
            CatalogEvent::StockDecremented(_) => "catalog.product.stock_decremented",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::ProductListed(e) => e.occurred_at,
            CatalogEvent::StockDecremented(e) => e.occurred_at,
        }
    }
}

/// Price band used by the marketplace filter.
///
/// Cut-offs match the storefront's dropdown: below ₱500, ₱500–₱1000, above
/// ₱1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    Low,
    Mid,
    High,
}

impl PriceBand {
    pub fn matches(self, price: Money) -> bool {
        match self {
            PriceBand::Low => price < Money::from_pesos(500),
            PriceBand::Mid => price >= Money::from_pesos(500) && price <= Money::from_pesos(1000),
            PriceBand::High => price > Money::from_pesos(1000),
        }
    }
}

/// The inventory ledger: authoritative record of listed products and stock.
///
/// Ordered by id (UUIDv7 is time-ordered), so iteration follows listing
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    products: BTreeMap<ProductId, Product>,
    version: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live product, failing with `NotFound` for unknown (or
    /// depleted and removed) ids.
    pub fn lookup(&self, product_id: ProductId) -> MarketResult<&Product> {
        self.products.get(&product_id).ok_or(MarketError::NotFound)
    }

    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.products.get(&product_id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Marketplace filter: case-insensitive substring match over name and
    /// description, optionally narrowed to a price band.
    pub fn search(&self, query: &str, band: Option<PriceBand>) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        self.products
            .values()
            .filter(|p| {
                needle.is_empty()
                    || p.name().to_lowercase().contains(&needle)
                    || p.description().to_lowercase().contains(&needle)
            })
            .filter(|p| band.is_none_or(|b| b.matches(p.price())))
            .collect()
    }
}

impl Aggregate for Catalog {
    type Command = CatalogCommand;
    type Event = CatalogEvent;
    type Error = MarketError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CatalogCommand::ListProduct(cmd) => self.handle_list(cmd),
            CatalogCommand::DecrementStock(cmd) => self.handle_decrement(cmd),
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CatalogEvent::ProductListed(e) => {
                self.products.insert(e.product.id_typed(), e.product.clone());
            }
            CatalogEvent::StockDecremented(e) => {
                if e.removed {
                    self.products.remove(&e.product_id);
                } else if let Some(product) = self.products.get_mut(&e.product_id) {
                    product.set_stock(e.new_stock);
                }
            }
        }

        self.version += 1;
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Catalog {
    fn handle_list(&self, cmd: &ListProduct) -> MarketResult<Vec<CatalogEvent>> {
        if self.products.contains_key(&cmd.product_id) {
            return Err(MarketError::conflict("product already listed"));
        }
        cmd.draft.validate()?;

        let product = Product::from_draft(cmd.product_id, cmd.draft.clone(), cmd.occurred_at);
        Ok(vec![CatalogEvent::ProductListed(ProductListed {
            product,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_decrement(&self, cmd: &DecrementStock) -> MarketResult<Vec<CatalogEvent>> {
        let product = self.lookup(cmd.product_id)?;

        if cmd.quantity == 0 {
            return Err(MarketError::validation("quantity must be positive"));
        }

        let available = product.stock();
        if cmd.quantity > available {
            return Err(MarketError::InsufficientStock {
                requested: cmd.quantity,
                available,
            });
        }

        let new_stock = available - cmd.quantity;
        Ok(vec![CatalogEvent::StockDecremented(StockDecremented {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            new_stock,
            removed: new_stock == 0,
            occurred_at: cmd.occurred_at,
        })])
    }
}
