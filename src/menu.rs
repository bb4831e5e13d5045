//! Menu
//!
//! Menu items and the selections a customer makes when adding one to the cart.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

/// Key identifying a menu item within a restaurant's menu.
pub type MenuItemKey = String;

/// A dish or drink offered on a restaurant menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Menu item key
    pub key: MenuItemKey,

    /// Display name
    pub name: String,

    /// Short description shown on the menu card
    pub description: String,

    /// Base price
    pub price: Money<'static, Currency>,

    /// Whether the item offers customization options
    pub has_customizations: bool,
}

/// A single named customization choice, e.g. `size = large`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizationChoice {
    /// Option name
    pub name: String,

    /// Selected value
    pub value: String,
}

/// Customizations selected for an item.
///
/// Passed explicitly through [`ItemSelection`]; two lines with equal
/// customizations for the same menu item are the same cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customizations {
    choices: SmallVec<[CustomizationChoice; 4]>,
    instructions: Option<String>,
}

impl Customizations {
    /// No customizations.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a named choice, replacing any existing choice with the same name.
    #[must_use]
    pub fn with_choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();

        if let Some(existing) = self.choices.iter_mut().find(|choice| choice.name == name) {
            existing.value = value;
        } else {
            self.choices.push(CustomizationChoice { name, value });
        }

        self
    }

    /// Set special instructions. Blank instructions are dropped.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        let trimmed = instructions.trim();

        self.instructions = (!trimmed.is_empty()).then(|| trimmed.to_string());

        self
    }

    /// Selected choices, in the order they were made.
    pub fn choices(&self) -> &[CustomizationChoice] {
        &self.choices
    }

    /// Special instructions, if any.
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Returns true when nothing was customized.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty() && self.instructions.is_none()
    }
}

/// What the customer asked for when pressing "add to cart".
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSelection {
    /// The menu item being added
    pub item: MenuItem,

    /// Number of units; the menu stepper never goes below 1
    pub quantity: u32,

    /// Explicit customization selections
    pub customizations: Customizations,
}

impl ItemSelection {
    /// A single, uncustomized unit of an item.
    pub fn new(item: MenuItem) -> Self {
        Self {
            item,
            quantity: 1,
            customizations: Customizations::none(),
        }
    }

    /// Set the quantity.
    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Attach customizations.
    #[must_use]
    pub fn customized(mut self, customizations: Customizations) -> Self {
        self.customizations = customizations;
        self
    }
}
