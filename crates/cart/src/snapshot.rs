use serde::{Deserialize, Serialize};

use palengke_catalog::{Product, SellerInfo};
use palengke_core::{Money, ProductId, ValueObject};

/// Copy of a listing's display fields, taken when the line is added.
///
/// The `product_id` back-reference exists only for live-stock
/// re-validation; everything else is frozen at add time and never resyncs
/// with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub seller: SellerInfo,
    pub name: String,
    pub price: Money,
    pub description: String,
    pub payment_options: Vec<String>,
    pub logistics_options: Vec<String>,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id_typed(),
            seller: product.seller().clone(),
            name: product.name().to_string(),
            price: product.price(),
            description: product.description().to_string(),
            payment_options: product.payment_options().to_vec(),
            logistics_options: product.logistics_options().to_vec(),
            image_url: product.image_url().map(str::to_string),
        }
    }
}

impl ValueObject for ProductSnapshot {}
