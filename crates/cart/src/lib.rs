//! `palengke-cart` — the cart manager.
//!
//! Lines hold a snapshot of the product taken at add time; only the live
//! stock count is consulted again, at every mutation.

pub mod cart;
pub mod snapshot;

pub use cart::{
    AddToCart, Cart, CartCleared, CartCommand, CartEvent, CartLine, ChangeQuantity, LineOpened,
    LineRemoved, OptionSelected, QuantityChanged, RemoveLine, SelectOption, SelectionKind,
    ClearCart,
};
pub use snapshot::ProductSnapshot;
