//! `palengke-catalog` — the inventory ledger.
//!
//! Owns the listed products and their stock counts. Stock only ever moves
//! down (checkout decrements); a product whose stock reaches zero leaves the
//! catalog entirely.

pub mod ledger;
pub mod product;

pub use ledger::{
    Catalog, CatalogCommand, CatalogEvent, DecrementStock, ListProduct, PriceBand, ProductListed,
    StockDecremented,
};
pub use product::{Product, ProductDraft, SellerInfo};
