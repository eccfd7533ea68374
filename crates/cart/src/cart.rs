use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_core::{Aggregate, MarketError, MarketResult, Money, ProductId};
use palengke_events::Event;

use crate::snapshot::ProductSnapshot;

/// Which fulfillment choice a selection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Payment,
    Logistics,
}

impl SelectionKind {
    fn label(self) -> &'static str {
        match self {
            SelectionKind::Payment => "payment",
            SelectionKind::Logistics => "logistics",
        }
    }
}

/// One cart entry: snapshot + quantity + fulfillment choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    snapshot: ProductSnapshot,
    quantity: u32,
    payment: String,
    logistics: String,
}

impl CartLine {
    /// Open a line at quantity 1 with the default selections: the first
    /// accepted option of each list (listing validation guarantees both
    /// lists are non-empty).
    fn open(snapshot: ProductSnapshot) -> Self {
        let payment = snapshot.payment_options.first().cloned().unwrap_or_default();
        let logistics = snapshot
            .logistics_options
            .first()
            .cloned()
            .unwrap_or_default();
        Self {
            snapshot,
            quantity: 1,
            payment,
            logistics,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.snapshot.product_id
    }

    pub fn snapshot(&self) -> &ProductSnapshot {
        &self.snapshot
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn payment(&self) -> &str {
        &self.payment
    }

    pub fn logistics(&self) -> &str {
        &self.logistics
    }

    pub fn line_total(&self) -> Money {
        self.snapshot.price.times(self.quantity)
    }
}

/// Command: AddToCart.
///
/// `available_stock` is the product's live stock, resolved by the caller —
/// the cart only sees facts handed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub snapshot: ProductSnapshot,
    pub available_stock: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeQuantity (arbitrary signed delta).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQuantity {
    pub product_id: ProductId,
    pub delta: i64,
    pub available_stock: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine (idempotent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectOption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub product_id: ProductId,
    pub kind: SelectionKind,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart (emitted by checkout after the ledger commits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddToCart(AddToCart),
    ChangeQuantity(ChangeQuantity),
    RemoveLine(RemoveLine),
    SelectOption(SelectOption),
    ClearCart(ClearCart),
}

/// Event: LineOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOpened {
    pub line: CartLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OptionSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSelected {
    pub product_id: ProductId,
    pub kind: SelectionKind,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    LineOpened(LineOpened),
    QuantityChanged(QuantityChanged),
    LineRemoved(LineRemoved),
    OptionSelected(OptionSelected),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::LineOpened(_) => "cart.line.opened",
            CartEvent::QuantityChanged(_) => "cart.line.quantity_changed",
            CartEvent::LineRemoved(_) => "cart.line.removed",
            CartEvent::OptionSelected(_) => "cart.line.option_selected",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::LineOpened(e) => e.occurred_at,
            CartEvent::QuantityChanged(e) => e.occurred_at,
            CartEvent::LineRemoved(e) => e.occurred_at,
            CartEvent::OptionSelected(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

/// The cart: one line per product, in add order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    version: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of price × quantity over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = MarketError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddToCart(cmd) => self.handle_add(cmd),
            CartCommand::ChangeQuantity(cmd) => self.handle_change_quantity(cmd),
            CartCommand::RemoveLine(cmd) => self.handle_remove(cmd),
            CartCommand::SelectOption(cmd) => self.handle_select(cmd),
            CartCommand::ClearCart(cmd) => self.handle_clear(cmd),
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::LineOpened(e) => {
                self.lines.push(e.line.clone());
            }
            CartEvent::QuantityChanged(e) => {
                if let Some(line) = self.line_mut(e.product_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::LineRemoved(e) => {
                self.lines.retain(|l| l.product_id() != e.product_id);
            }
            CartEvent::OptionSelected(e) => {
                if let Some(line) = self.line_mut(e.product_id) {
                    match e.kind {
                        SelectionKind::Payment => line.payment = e.value.clone(),
                        SelectionKind::Logistics => line.logistics = e.value.clone(),
                    }
                }
            }
            CartEvent::CartCleared(_) => {
                self.lines.clear();
            }
        }

        self.version += 1;
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Cart {
    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id() == product_id)
    }

    fn handle_add(&self, cmd: &AddToCart) -> MarketResult<Vec<CartEvent>> {
        if cmd.available_stock == 0 {
            return Err(MarketError::OutOfStock);
        }

        if let Some(line) = self.line(cmd.snapshot.product_id) {
            let requested = line.quantity + 1;
            if requested > cmd.available_stock {
                return Err(MarketError::StockExceeded {
                    requested,
                    available: cmd.available_stock,
                });
            }
            return Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
                product_id: cmd.snapshot.product_id,
                quantity: requested,
                occurred_at: cmd.occurred_at,
            })]);
        }

        Ok(vec![CartEvent::LineOpened(LineOpened {
            line: CartLine::open(cmd.snapshot.clone()),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_quantity(&self, cmd: &ChangeQuantity) -> MarketResult<Vec<CartEvent>> {
        let line = self.line(cmd.product_id).ok_or(MarketError::NotFound)?;

        let requested = i64::from(line.quantity) + cmd.delta;
        if requested < 1 {
            return Ok(vec![CartEvent::LineRemoved(LineRemoved {
                product_id: cmd.product_id,
                occurred_at: cmd.occurred_at,
            })]);
        }
        if requested > i64::from(cmd.available_stock) {
            return Err(MarketError::StockExceeded {
                requested: u32::try_from(requested).unwrap_or(u32::MAX),
                available: cmd.available_stock,
            });
        }

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            product_id: cmd.product_id,
            quantity: requested as u32,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveLine) -> MarketResult<Vec<CartEvent>> {
        // Idempotent: removing an absent line is a silent no-op.
        if self.line(cmd.product_id).is_none() {
            return Ok(Vec::new());
        }
        Ok(vec![CartEvent::LineRemoved(LineRemoved {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_select(&self, cmd: &SelectOption) -> MarketResult<Vec<CartEvent>> {
        let line = self.line(cmd.product_id).ok_or(MarketError::NotFound)?;

        let accepted = match cmd.kind {
            SelectionKind::Payment => &line.snapshot.payment_options,
            SelectionKind::Logistics => &line.snapshot.logistics_options,
        };
        if !accepted.iter().any(|option| option == &cmd.value) {
            return Err(MarketError::invalid_selection(format!(
                "{:?} is not an accepted {} option for this product",
                cmd.value,
                cmd.kind.label(),
            )));
        }

        Ok(vec![CartEvent::OptionSelected(OptionSelected {
            product_id: cmd.product_id,
            kind: cmd.kind,
            value: cmd.value.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> MarketResult<Vec<CartEvent>> {
        if self.lines.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![CartEvent::CartCleared(CartCleared {
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palengke_core::execute;

    fn test_snapshot(stock_hint: &str) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(),
            seller: palengke_catalog::SellerInfo {
                name: "Mang Tomas".to_string(),
                contact: "0918 555 0102".to_string(),
                address: "Makati".to_string(),
            },
            name: format!("Secondhand {stock_hint}"),
            price: Money::from_pesos(100),
            description: String::new(),
            payment_options: vec!["GCash".to_string(), "Maya".to_string()],
            logistics_options: vec!["Grab Express".to_string(), "Meet-up".to_string()],
            image_url: None,
        }
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn add(cart: &mut Cart, snapshot: ProductSnapshot, available_stock: u32) -> ProductId {
        let product_id = snapshot.product_id;
        execute(
            cart,
            &CartCommand::AddToCart(AddToCart {
                snapshot,
                available_stock,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        product_id
    }

    #[test]
    fn add_opens_a_line_with_defaults() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);

        let line = cart.line(id).unwrap();
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.payment(), "GCash");
        assert_eq!(line.logistics(), "Grab Express");
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn add_rejects_out_of_stock() {
        let cart = Cart::new();
        let err = cart
            .handle(&CartCommand::AddToCart(AddToCart {
                snapshot: test_snapshot("Guitar"),
                available_stock: 0,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, MarketError::OutOfStock);
        assert!(cart.is_empty());
    }

    #[test]
    fn add_increments_existing_line() {
        let mut cart = Cart::new();
        let snapshot = test_snapshot("Guitar");
        let id = add(&mut cart, snapshot.clone(), 3);

        execute(
            &mut cart,
            &CartCommand::AddToCart(AddToCart {
                snapshot,
                available_stock: 3,
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(id).unwrap().quantity(), 2);
    }

    #[test]
    fn add_increment_respects_live_stock() {
        let mut cart = Cart::new();
        let snapshot = test_snapshot("Guitar");
        add(&mut cart, snapshot.clone(), 1);

        let err = cart
            .handle(&CartCommand::AddToCart(AddToCart {
                snapshot,
                available_stock: 1,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(
            err,
            MarketError::StockExceeded {
                requested: 2,
                available: 1
            }
        );
    }

    #[test]
    fn quantity_climbs_to_stock_then_stops() {
        // Stock 3: two +1 increments from quantity 1 reach 3; the fourth
        // attempt fails and the quantity stays put.
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);

        for expected in [2u32, 3] {
            execute(
                &mut cart,
                &CartCommand::ChangeQuantity(ChangeQuantity {
                    product_id: id,
                    delta: 1,
                    available_stock: 3,
                    occurred_at: test_time(),
                }),
            )
            .unwrap();
            assert_eq!(cart.line(id).unwrap().quantity(), expected);
        }

        let err = cart
            .handle(&CartCommand::ChangeQuantity(ChangeQuantity {
                product_id: id,
                delta: 1,
                available_stock: 3,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(
            err,
            MarketError::StockExceeded {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(cart.line(id).unwrap().quantity(), 3);
    }

    #[test]
    fn quantity_below_one_removes_the_line() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);

        execute(
            &mut cart,
            &CartCommand::ChangeQuantity(ChangeQuantity {
                product_id: id,
                delta: -1,
                available_stock: 3,
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert!(cart.line(id).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn quantity_change_supports_arbitrary_deltas() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 10);

        execute(
            &mut cart,
            &CartCommand::ChangeQuantity(ChangeQuantity {
                product_id: id,
                delta: 7,
                available_stock: 10,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(cart.line(id).unwrap().quantity(), 8);

        execute(
            &mut cart,
            &CartCommand::ChangeQuantity(ChangeQuantity {
                product_id: id,
                delta: -5,
                available_stock: 10,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(cart.line(id).unwrap().quantity(), 3);
    }

    #[test]
    fn quantity_change_rejects_unknown_line() {
        let cart = Cart::new();
        let err = cart
            .handle(&CartCommand::ChangeQuantity(ChangeQuantity {
                product_id: ProductId::new(),
                delta: 1,
                available_stock: 5,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, MarketError::NotFound);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);

        let events = execute(
            &mut cart,
            &CartCommand::RemoveLine(RemoveLine {
                product_id: id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert!(cart.is_empty());

        // Second removal: no error, no events.
        let events = execute(
            &mut cart,
            &CartCommand::RemoveLine(RemoveLine {
                product_id: id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn select_option_commits_accepted_values() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);

        execute(
            &mut cart,
            &CartCommand::SelectOption(SelectOption {
                product_id: id,
                kind: SelectionKind::Logistics,
                value: "Meet-up".to_string(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(cart.line(id).unwrap().logistics(), "Meet-up");
        assert_eq!(cart.line(id).unwrap().payment(), "GCash");
    }

    #[test]
    fn select_option_rejects_unoffered_values() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);

        let err = cart
            .handle(&CartCommand::SelectOption(SelectOption {
                product_id: id,
                kind: SelectionKind::Payment,
                value: "Barter".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidSelection(_)));
        assert_eq!(cart.line(id).unwrap().payment(), "GCash");
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut cart = Cart::new();
        let mut a = test_snapshot("Guitar");
        a.price = Money::from_pesos(100);
        let mut b = test_snapshot("Amp");
        b.price = Money::from_pesos(50);

        let id_a = add(&mut cart, a, 5);
        assert_eq!(cart.total(), Money::from_pesos(100));

        let id_b = add(&mut cart, b, 2);
        assert_eq!(cart.total(), Money::from_pesos(150));

        execute(
            &mut cart,
            &CartCommand::ChangeQuantity(ChangeQuantity {
                product_id: id_a,
                delta: 1,
                available_stock: 5,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(cart.total(), Money::from_pesos(250));

        execute(
            &mut cart,
            &CartCommand::RemoveLine(RemoveLine {
                product_id: id_b,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(cart.total(), Money::from_pesos(200));
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();
        add(&mut cart, test_snapshot("Guitar"), 3);
        add(&mut cart, test_snapshot("Amp"), 2);

        execute(
            &mut cart,
            &CartCommand::ClearCart(ClearCart {
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut cart = Cart::new();
        let id = add(&mut cart, test_snapshot("Guitar"), 3);
        let before = cart.clone();

        let cmd = CartCommand::ChangeQuantity(ChangeQuantity {
            product_id: id,
            delta: 1,
            available_stock: 3,
            occurred_at: test_time(),
        });
        let events1 = cart.handle(&cmd).unwrap();
        let events2 = cart.handle(&cmd).unwrap();

        assert_eq!(cart, before);
        assert_eq!(events1, events2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: after any successful mutation the line quantity is
            /// within [1, available_stock].
            #[test]
            fn quantity_stays_within_bounds(
                stock in 1u32..20,
                deltas in proptest::collection::vec(-3i64..4, 1..30),
            ) {
                let mut cart = Cart::new();
                let snapshot = test_snapshot("Prop");
                let product_id = snapshot.product_id;
                execute(
                    &mut cart,
                    &CartCommand::AddToCart(AddToCart {
                        snapshot,
                        available_stock: stock,
                        occurred_at: Utc::now(),
                    }),
                )
                .unwrap();

                for delta in deltas {
                    let _ = execute(
                        &mut cart,
                        &CartCommand::ChangeQuantity(ChangeQuantity {
                            product_id,
                            delta,
                            available_stock: stock,
                            occurred_at: Utc::now(),
                        }),
                    );

                    match cart.line(product_id) {
                        Some(line) => {
                            prop_assert!(line.quantity() >= 1);
                            prop_assert!(line.quantity() <= stock);
                        }
                        // The line dropped below quantity 1 and was removed.
                        None => break,
                    }
                }
            }
        }
    }
}
