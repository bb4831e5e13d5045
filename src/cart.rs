//! Cart

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    menu::{Customizations, ItemSelection, MenuItemKey},
    uuids::TypedUuid,
};

/// Cart line identifier
pub type LineUuid = TypedUuid<CartLine>;

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (line currency, cart currency).
    #[error("Line has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A line with this id is already in the cart.
    #[error("Line {0} is already in the cart")]
    DuplicateLine(LineUuid),

    /// Unit prices cannot be negative.
    #[error("Line {0} has a negative unit price")]
    NegativePrice(LineUuid),

    /// Lines must hold at least one unit.
    #[error("Line {0} must have a quantity of at least 1")]
    InvalidQuantity(LineUuid),

    /// A line total does not fit in minor units.
    #[error("Line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Outcome of a quantity change request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds the requested quantity.
    Updated,

    /// The requested quantity was below 1; nothing changed.
    Rejected,

    /// No line with that id; nothing changed.
    NotFound,
}

/// One item entry in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: LineUuid,
    menu_item: MenuItemKey,
    name: String,
    unit_price: Money<'static, Currency>,
    quantity: u32,
    customizations: Customizations,
}

impl CartLine {
    /// Create a new line with a fresh id.
    pub fn new(
        menu_item: impl Into<MenuItemKey>,
        name: impl Into<String>,
        unit_price: Money<'static, Currency>,
        quantity: u32,
    ) -> Self {
        Self::with_id(LineUuid::new(), menu_item, name, unit_price, quantity)
    }

    /// Create a new line with the given id.
    pub fn with_id(
        id: LineUuid,
        menu_item: impl Into<MenuItemKey>,
        name: impl Into<String>,
        unit_price: Money<'static, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            menu_item: menu_item.into(),
            name: name.into(),
            unit_price,
            quantity,
            customizations: Customizations::none(),
        }
    }

    /// Attach customizations to the line.
    #[must_use]
    pub fn customized(mut self, customizations: Customizations) -> Self {
        self.customizations = customizations;
        self
    }

    /// Line id
    pub fn id(&self) -> LineUuid {
        self.id
    }

    /// Key of the menu item this line was created from
    pub fn menu_item(&self) -> &str {
        &self.menu_item
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Selected customizations
    pub fn customizations(&self) -> &Customizations {
        &self.customizations
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the product does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'static, Currency>, CartError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(CartError::Overflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }

    fn matches_selection(&self, selection: &ItemSelection) -> bool {
        self.menu_item == selection.item.key && self.customizations == selection.customizations
    }
}

/// Cart
///
/// An ordered set of lines in a single currency. Line order is insertion order.
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create a new empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if any line is invalid for this cart.
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Cart::new(currency);

        lines
            .into_iter()
            .try_for_each(|line| cart.insert_line(line))?;

        Ok(cart)
    }

    /// Append a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` on a currency mismatch, duplicate id, negative
    /// price or zero quantity.
    pub fn insert_line(&mut self, line: CartLine) -> Result<(), CartError> {
        let line_currency = line.unit_price.currency();

        if line_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if line.unit_price.to_minor_units() < 0 {
            return Err(CartError::NegativePrice(line.id));
        }

        if line.quantity < 1 {
            return Err(CartError::InvalidQuantity(line.id));
        }

        if self.get(line.id).is_some() {
            return Err(CartError::DuplicateLine(line.id));
        }

        self.lines.push(line);

        Ok(())
    }

    /// Add a menu selection to the cart.
    ///
    /// A selection matching an existing line's menu item and customizations is
    /// merged into that line. Returns the id of the line holding the selection.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the selection cannot become a valid line.
    pub fn add_item(&mut self, selection: ItemSelection) -> Result<LineUuid, CartError> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches_selection(&selection))
        {
            if selection.quantity < 1 {
                return Err(CartError::InvalidQuantity(line.id));
            }

            line.quantity = line
                .quantity
                .checked_add(selection.quantity)
                .ok_or(CartError::Overflow)?;

            return Ok(line.id);
        }

        let line = CartLine::new(
            selection.item.key,
            selection.item.name,
            selection.item.price,
            selection.quantity,
        )
        .customized(selection.customizations);

        let id = line.id;

        self.insert_line(line)?;

        Ok(id)
    }

    /// Set a line's quantity. Quantities below 1 are rejected.
    pub fn change_quantity(&mut self, id: LineUuid, quantity: u32) -> QuantityChange {
        let Some(line) = self.get_mut(id) else {
            return QuantityChange::NotFound;
        };

        if quantity < 1 {
            return QuantityChange::Rejected;
        }

        line.quantity = quantity;

        QuantityChange::Updated
    }

    /// Add one unit to a line.
    pub fn increment(&mut self, id: LineUuid) -> QuantityChange {
        match self.get(id).map(CartLine::quantity) {
            Some(quantity) => self.change_quantity(id, quantity.saturating_add(1)),
            None => QuantityChange::NotFound,
        }
    }

    /// Take one unit from a line. A line at quantity 1 stays at 1.
    pub fn decrement(&mut self, id: LineUuid) -> QuantityChange {
        match self.get(id).map(CartLine::quantity) {
            Some(quantity) => self.change_quantity(id, quantity.saturating_sub(1)),
            None => QuantityChange::NotFound,
        }
    }

    /// Remove a line. Returns `None` if the line was not in the cart.
    pub fn remove_line(&mut self, id: LineUuid) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.id == id)?;

        Some(self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Look up a line by id.
    pub fn get(&self, id: LineUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    fn get_mut(&mut self, id: LineUuid) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id == id)
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a money arithmetic or overflow error.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, CartError> {
        self.lines
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                Ok(acc.add(line.line_total()?)?)
            })
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
