//! Configuration
//!
//! Command line arguments with environment fallbacks. A `.env` file in the
//! working directory is loaded first when present.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    checkout::{CheckoutConfig, regions::RegionList},
    config::logging::LoggingConfig,
    fixtures::{
        Fixture, FixtureError,
        menu::{parse_currency, parse_percentage, parse_price},
    },
    pricing::PricingPolicy,
    promotions::InvalidCodePolicy,
};

pub mod logging;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting could not be parsed or a fixture could not be loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// A setting parsed but is outside its allowed range.
    #[error("{0} out of range: {1}")]
    OutOfRange(&'static str, String),
}

/// Food Fleet checkout configuration
#[derive(Debug, Parser)]
#[command(name = "foodfleet", about = "Food Fleet storefront checkout", long_about = None)]
pub struct Config {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Store pricing and checkout settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a cart, validate a form and place the order.
    Checkout(CheckoutArgs),

    /// List the accepted states/provinces.
    Regions,
}

/// Arguments for `checkout`.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Cart fixture name, read from `carts/{name}.yml`
    #[arg(long, default_value = "default")]
    pub cart: String,

    /// Form fixture name, read from `forms/{name}.yml`
    #[arg(long, default_value = "credit_card")]
    pub form: String,

    /// Promo code to apply before placing the order
    #[arg(long)]
    pub promo: Option<String>,
}

/// Store settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Directory containing cart, form and region fixtures
    #[arg(long, env = "FOODFLEET_FIXTURES", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Region fixture name; the US states are used when omitted
    #[arg(long, env = "FOODFLEET_REGIONS")]
    pub regions: Option<String>,

    /// Store currency code (USD, GBP, EUR)
    #[arg(long, env = "FOODFLEET_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Flat delivery fee, in the store currency
    #[arg(long, env = "FOODFLEET_DELIVERY_FEE", default_value = "5.00")]
    pub delivery_fee: String,

    /// Tax rate on the subtotal, e.g. "8%" or "0.08"
    #[arg(long, env = "FOODFLEET_TAX_RATE", default_value = "8%")]
    pub tax_rate: String,

    /// Keep an applied promo when an unknown code is entered
    #[arg(long, env = "FOODFLEET_KEEP_PROMO_ON_INVALID", default_value_t = false)]
    pub keep_promo_on_invalid: bool,

    /// How long to wait for order submission, in milliseconds
    #[arg(long, env = "FOODFLEET_SUBMIT_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub submit_timeout_ms: u64,
}

impl StoreConfig {
    /// Pricing policy from the configured fee, rate and currency.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed, the fee is negative or
    /// the rate is outside 0-100%.
    pub fn pricing_policy(&self) -> Result<PricingPolicy, ConfigError> {
        let (fee_minor, currency) = parse_price(&format!(
            "{} {}",
            self.delivery_fee.trim(),
            self.currency.trim()
        ))?;

        if fee_minor < 0 {
            return Err(ConfigError::OutOfRange(
                "delivery fee",
                self.delivery_fee.clone(),
            ));
        }

        let tax_rate = parse_percentage(&self.tax_rate)?;
        let fraction = tax_rate * Decimal::ONE;

        if fraction.is_sign_negative() || fraction > Decimal::ONE {
            return Err(ConfigError::OutOfRange("tax rate", self.tax_rate.clone()));
        }

        Ok(PricingPolicy {
            delivery_fee: Money::from_minor(fee_minor, currency),
            tax_rate,
        })
    }

    /// The store currency.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown currency codes.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(parse_currency(&self.currency)?)
    }

    /// What an unknown promo code does to an applied one.
    pub fn invalid_code_policy(&self) -> InvalidCodePolicy {
        if self.keep_promo_on_invalid {
            InvalidCodePolicy::KeepActive
        } else {
            InvalidCodePolicy::ClearActive
        }
    }

    /// Checkout session settings.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
        }
    }

    /// Fixture loader rooted at the configured directory.
    pub fn fixture(&self) -> Fixture {
        Fixture::with_base_path(&self.fixtures_dir)
    }

    /// The accepted regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the region fixture cannot be loaded.
    pub fn region_list(&self) -> Result<RegionList, ConfigError> {
        match &self.regions {
            Some(name) => Ok(self.fixture().load_regions(name)?),
            None => Ok(RegionList::us_states()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{config::logging::LogFormat, discounts::percent_points};

    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("foodfleet").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_storefront() -> TestResult {
        let config = parse(&["checkout"])?;
        let policy = config.store.pricing_policy()?;

        assert_eq!(policy.delivery_fee, Money::from_minor(5_00, USD));
        assert_eq!(percent_points(&policy.tax_rate).to_string(), "8");
        assert_eq!(
            config.store.checkout_config().submit_timeout,
            Duration::from_secs(10)
        );
        assert_eq!(
            config.store.invalid_code_policy(),
            InvalidCodePolicy::ClearActive
        );
        assert_eq!(config.logging.log_format, LogFormat::Compact);

        assert!(
            matches!(config.command, Command::Checkout(_)),
            "expected checkout command, got {:?}",
            config.command
        );

        if let Command::Checkout(args) = config.command {
            assert_eq!(args.cart, "default");
            assert_eq!(args.form, "credit_card");
            assert_eq!(args.promo, None);
        }

        Ok(())
    }

    #[test]
    fn store_settings_are_configurable() -> TestResult {
        let config = parse(&[
            "--currency",
            "GBP",
            "--delivery-fee",
            "3.50",
            "--tax-rate",
            "0.2",
            "--keep-promo-on-invalid",
            "--submit-timeout-ms",
            "250",
            "checkout",
            "--promo",
            "save10",
        ])?;

        let policy = config.store.pricing_policy()?;

        assert_eq!(policy.delivery_fee, Money::from_minor(3_50, GBP));
        assert_eq!(percent_points(&policy.tax_rate).to_string(), "20");
        assert_eq!(config.store.currency()?, GBP);
        assert_eq!(
            config.store.invalid_code_policy(),
            InvalidCodePolicy::KeepActive
        );
        assert_eq!(
            config.store.checkout_config().submit_timeout,
            Duration::from_millis(250)
        );

        Ok(())
    }

    #[test]
    fn out_of_range_values_are_rejected() -> TestResult {
        let config = parse(&["--delivery-fee=-1", "regions"])?;

        assert!(
            matches!(
                config.store.pricing_policy(),
                Err(ConfigError::OutOfRange("delivery fee", _))
            ),
            "negative fee should be rejected"
        );

        let config = parse(&["--tax-rate", "150%", "regions"])?;

        assert!(
            matches!(
                config.store.pricing_policy(),
                Err(ConfigError::OutOfRange("tax rate", _))
            ),
            "tax over 100% should be rejected"
        );

        Ok(())
    }

    #[test]
    fn store_currency_reaches_cart_loading() -> TestResult {
        let fixtures = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

        let config = parse(&["--fixtures-dir", fixtures, "checkout"])?;
        let cart = config
            .store
            .fixture()
            .load_cart_in("default", config.store.currency()?)?;

        assert_eq!(cart.currency(), USD);

        let config = parse(&["--fixtures-dir", fixtures, "--currency", "GBP", "checkout"])?;
        let result = config
            .store
            .fixture()
            .load_cart_in("default", config.store.currency()?);

        assert!(
            matches!(result, Err(FixtureError::CurrencyMismatch(ref expected, _)) if expected == "GBP"),
            "got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() -> TestResult {
        let config = parse(&["--currency", "XYZ", "regions"])?;

        assert!(
            matches!(
                config.store.pricing_policy(),
                Err(ConfigError::Fixture(FixtureError::UnknownCurrency(_)))
            ),
            "XYZ should be rejected"
        );

        Ok(())
    }
}
