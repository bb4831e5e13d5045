//! Fixtures
//!
//! Carts, checkout forms and region lists stored as YAML under a base
//! directory:
//!
//! ```text
//! fixtures/
//!   carts/{name}.yml
//!   forms/{name}.yml
//!   regions/{name}.yml
//! ```

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    checkout::{form::CheckoutForm, regions::RegionList},
    fixtures::carts::CartFixture,
};

pub mod carts;
pub mod menu;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Menu item not found
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Currency mismatch between the cart and a menu item
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Neither the fixture nor its lines give a currency
    #[error("No currency given and no lines to infer it from")]
    NoCurrency,

    /// Cart rejected a line
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),
}

/// Wrapper for a region list in YAML
#[derive(Debug, Deserialize)]
struct RegionsFixture {
    regions: Vec<String>,
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a cart from `carts/{name}.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its lines
    /// do not form a valid cart.
    pub fn load_cart(&self, name: &str) -> Result<Cart, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;

        fixture.into_cart()
    }

    /// Load a cart from `carts/{name}.yml` in the store currency
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the cart
    /// is priced in another currency.
    pub fn load_cart_in(
        &self,
        name: &str,
        currency: &'static Currency,
    ) -> Result<Cart, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;

        fixture.into_cart_in(currency)
    }

    /// Load a checkout form from `forms/{name}.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_form(&self, name: &str) -> Result<CheckoutForm, FixtureError> {
        self.read("forms", name)
    }

    /// Load a region list from `regions/{name}.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_regions(&self, name: &str) -> Result<RegionList, FixtureError> {
        let fixture: RegionsFixture = self.read("regions", name)?;

        Ok(RegionList::new(fixture.regions))
    }

    fn read<T: for<'de> Deserialize<'de>>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::checkout::{
        form::PaymentMethod,
        regions::RegionProvider,
        validation::{FieldName, validate},
    };

    use super::*;

    fn write(dir: &TempDir, kind: &str, name: &str, contents: &str) -> TestResult {
        let path = dir.path().join(kind);

        fs::create_dir_all(&path)?;
        fs::write(path.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn loads_cart_form_and_regions() -> TestResult {
        let dir = TempDir::new()?;

        write(
            &dir,
            "carts",
            "lunch",
            "menu:\n  knots:\n    name: Garlic Knots\n    price: 5.00 USD\nlines:\n  - item: knots\n",
        )?;
        write(
            &dir,
            "forms",
            "paypal",
            r"
address:
  fullName: Jane Doe
  streetAddress: 123 Main St
  city: Toronto
  state: Ontario
  postalCode: M5V 2T6
  phoneNumber: '+14165551234'
payment:
  method: paypal
agreeToTerms: true
",
        )?;
        write(&dir, "regions", "canada", "regions:\n  - Ontario\n  - Quebec\n")?;

        let fixture = Fixture::with_base_path(dir.path());

        let cart = fixture.load_cart("lunch")?;
        let form = fixture.load_form("paypal")?;
        let regions = fixture.load_regions("canada")?;

        assert_eq!(cart.subtotal()?, Money::from_minor(5_00, USD));
        assert_eq!(form.payment_method(), Some(PaymentMethod::Paypal));
        assert!(regions.contains("Ontario"), "Ontario should be listed");

        validate(&form, &regions)?;

        let errors = validate(&form, &RegionList::us_states()).err().unwrap_or_default();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FieldName::State]);

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() -> TestResult {
        let dir = TempDir::new()?;
        let result = Fixture::with_base_path(dir.path()).load_cart("nope");

        assert!(matches!(result, Err(FixtureError::Io(_))), "got {result:?}");

        Ok(())
    }

    #[test]
    fn malformed_yaml_is_yaml_error() -> TestResult {
        let dir = TempDir::new()?;
        write(&dir, "forms", "broken", "address: [unclosed\n")?;

        let result = Fixture::with_base_path(dir.path()).load_form("broken");

        assert!(matches!(result, Err(FixtureError::Yaml(_))), "got {result:?}");

        Ok(())
    }

    #[test]
    fn bundled_fixtures_load() -> TestResult {
        let fixture = Fixture::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"));

        let cart = fixture.load_cart("default")?;

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.subtotal()?, Money::from_minor(22_99, USD));
        assert_eq!(fixture.load_cart_in("default", USD)?.subtotal()?, cart.subtotal()?);

        let result = fixture.load_cart_in("default", GBP);

        assert!(
            matches!(result, Err(FixtureError::CurrencyMismatch(_, _))),
            "a USD cart should not load in a GBP store, got {result:?}"
        );

        for name in ["credit_card", "paypal"] {
            let form = fixture.load_form(name)?;

            validate(&form, &RegionList::us_states())?;
        }

        Ok(())
    }
}
