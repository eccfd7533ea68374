use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_catalog::SellerInfo;
use palengke_core::{Money, OrderId, ProductId, ValueObject};

/// One fulfilled line as it stood at checkout.
///
/// Denormalized on purpose: the products behind an order may leave the
/// catalog (depleted stock removes them), so the receipt carries everything
/// the confirmation screen needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub seller: SellerInfo,
    pub unit_price: Money,
    pub quantity: u32,
    pub payment: String,
    pub logistics: String,
    pub line_total: Money,
}

/// Receipt for a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub delivery_address: String,
    pub lines: Vec<OrderLine>,
    pub grand_total: Money,
}

impl ValueObject for OrderLine {}
impl ValueObject for OrderSummary {}
