//! Cart Fixtures

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    cart::Cart,
    fixtures::{
        FixtureError,
        menu::{MenuItemFixture, parse_currency},
    },
    menu::{Customizations, ItemSelection, MenuItem},
};

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart currency; taken from the store or the menu when omitted
    #[serde(default)]
    pub currency: Option<String>,

    /// Menu items, keyed by menu item key
    #[serde(default)]
    pub menu: FxHashMap<String, MenuItemFixture>,

    /// Selections, in the order they were added
    #[serde(default)]
    pub lines: Vec<LineFixture>,
}

/// A selection in a cart fixture
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Menu item key
    pub item: String,

    /// Quantity, defaulting to one
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Selected customizations
    #[serde(default)]
    pub customizations: CustomizationsFixture,
}

/// Customizations in a cart fixture
#[derive(Debug, Default, Deserialize)]
pub struct CustomizationsFixture {
    /// Named choices, in display order
    #[serde(default)]
    pub choices: Vec<ChoiceFixture>,

    /// Special instructions
    #[serde(default)]
    pub instructions: Option<String>,
}

/// A single named choice
#[derive(Debug, Deserialize)]
pub struct ChoiceFixture {
    /// Option name
    pub name: String,

    /// Selected value
    pub value: String,
}

fn default_quantity() -> u32 {
    1
}

impl From<CustomizationsFixture> for Customizations {
    fn from(fixture: CustomizationsFixture) -> Self {
        let customizations = fixture
            .choices
            .into_iter()
            .fold(Customizations::none(), |acc, choice| {
                acc.with_choice(choice.name, choice.value)
            });

        match fixture.instructions {
            Some(instructions) => customizations.with_instructions(instructions),
            None => customizations,
        }
    }
}

impl CartFixture {
    /// Build a cart by adding each line's selection in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a line names an unknown item, prices disagree on
    /// currency, or a selection is rejected by the cart.
    pub fn into_cart(self) -> Result<Cart, FixtureError> {
        self.build(None)
    }

    /// Build a cart in the store currency.
    ///
    /// A fixture without its own currency takes the store's. Prices are
    /// never converted.
    ///
    /// # Errors
    ///
    /// As [`CartFixture::into_cart`], and returns
    /// [`FixtureError::CurrencyMismatch`] if the fixture's currency is not
    /// `currency`.
    pub fn into_cart_in(self, currency: &'static Currency) -> Result<Cart, FixtureError> {
        self.build(Some(currency))
    }

    fn build(self, store_currency: Option<&'static Currency>) -> Result<Cart, FixtureError> {
        let menu = self
            .menu
            .into_iter()
            .map(|(key, item)| {
                let item = item.into_menu_item(&key)?;

                Ok((key, item))
            })
            .collect::<Result<FxHashMap<String, MenuItem>, FixtureError>>()?;

        let currency = match (self.currency, store_currency) {
            (Some(code), Some(store)) => {
                let currency = parse_currency(&code)?;

                if currency != store {
                    return Err(FixtureError::CurrencyMismatch(
                        store.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }

                currency
            }
            (Some(code), None) => parse_currency(&code)?,
            (None, Some(store)) => store,
            (None, None) => self
                .lines
                .first()
                .and_then(|line| menu.get(&line.item))
                .map(|item| item.price.currency())
                .ok_or(FixtureError::NoCurrency)?,
        };

        let mut cart = Cart::new(currency);

        for line in self.lines {
            let item = menu
                .get(&line.item)
                .cloned()
                .ok_or_else(|| FixtureError::MenuItemNotFound(line.item.clone()))?;

            if item.price.currency() != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    item.price.currency().iso_alpha_code.to_string(),
                ));
            }

            let selection = ItemSelection::new(item)
                .quantity(line.quantity)
                .customized(line.customizations.into());

            cart.add_item(selection)?;
        }

        Ok(cart)
    }
}
