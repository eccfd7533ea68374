use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_core::{Entity, MarketError, MarketResult, Money, ProductId, ValueObject};

/// Seller contact details captured with each listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerInfo {
    pub name: String,
    pub contact: String,
    pub address: String,
}

impl ValueObject for SellerInfo {}

/// Raw listing input as collected by the storefront's sell form.
///
/// The presentation layer hands this over shape-validated only; content
/// rules (blank fields, price, stock, option lists, terms) are enforced here
/// when the draft is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub seller: SellerInfo,
    pub name: String,
    pub price: Money,
    pub stock: u32,
    pub description: String,
    /// Accepted payment-method labels, in the order the seller picked them.
    pub payment_options: Vec<String>,
    /// Accepted logistics-method labels, in the order the seller picked them.
    pub logistics_options: Vec<String>,
    pub image_url: Option<String>,
    pub terms_accepted: bool,
}

impl ProductDraft {
    pub(crate) fn validate(&self) -> MarketResult<()> {
        if self.seller.name.trim().is_empty() {
            return Err(MarketError::validation("seller name cannot be empty"));
        }
        if self.seller.contact.trim().is_empty() {
            return Err(MarketError::validation("seller contact cannot be empty"));
        }
        if self.seller.address.trim().is_empty() {
            return Err(MarketError::validation("seller address cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(MarketError::validation("product name cannot be empty"));
        }
        if self.price.is_zero() {
            return Err(MarketError::validation("price must be positive"));
        }
        if self.stock == 0 {
            return Err(MarketError::validation("stock must be at least 1"));
        }
        if self.payment_options.is_empty() {
            return Err(MarketError::validation(
                "at least one payment option is required",
            ));
        }
        if self.payment_options.iter().any(|p| p.trim().is_empty()) {
            return Err(MarketError::validation("payment options cannot be blank"));
        }
        if self.logistics_options.is_empty() {
            return Err(MarketError::validation(
                "at least one logistics option is required",
            ));
        }
        if self.logistics_options.iter().any(|l| l.trim().is_empty()) {
            return Err(MarketError::validation("logistics options cannot be blank"));
        }
        if !self.terms_accepted {
            return Err(MarketError::validation(
                "the terms and conditions must be accepted",
            ));
        }
        Ok(())
    }
}

/// A product listed on the marketplace.
///
/// Immutable after listing except for `stock`, which the ledger decrements
/// at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    seller: SellerInfo,
    name: String,
    price: Money,
    stock: u32,
    description: String,
    payment_options: Vec<String>,
    logistics_options: Vec<String>,
    image_url: Option<String>,
    listed_at: DateTime<Utc>,
}

impl Product {
    /// Build a product from a validated draft. Callers go through
    /// [`crate::ledger::Catalog::handle`]; this is crate-internal on purpose.
    pub(crate) fn from_draft(
        id: ProductId,
        draft: ProductDraft,
        listed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            seller: draft.seller,
            name: draft.name,
            price: draft.price,
            stock: draft.stock,
            description: draft.description,
            payment_options: draft.payment_options,
            logistics_options: draft.logistics_options,
            image_url: draft.image_url,
            listed_at,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn seller(&self) -> &SellerInfo {
        &self.seller
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn payment_options(&self) -> &[String] {
        &self.payment_options
    }

    pub fn logistics_options(&self) -> &[String] {
        &self.logistics_options
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn listed_at(&self) -> DateTime<Utc> {
        self.listed_at
    }

    pub(crate) fn set_stock(&mut self, stock: u32) {
        self.stock = stock;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
