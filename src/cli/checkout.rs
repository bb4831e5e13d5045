use std::{io, sync::Arc};

use foodfleet::{
    checkout::{Checkout, CheckoutError, InMemoryOrderSubmitter},
    config::{CheckoutArgs, StoreConfig},
    observer::TracingObserver,
    promotions::PromoEngine,
    receipt::OrderSummary,
};
use tracing::info;

#[expect(clippy::print_stdout, reason = "command output")]
pub(crate) async fn run(store: &StoreConfig, args: CheckoutArgs) -> Result<(), String> {
    let fixture = store.fixture();

    let currency = store
        .currency()
        .map_err(|error| format!("invalid store currency: {error}"))?;

    let cart = fixture
        .load_cart_in(&args.cart, currency)
        .map_err(|error| format!("failed to load cart '{}': {error}", args.cart))?;

    let form = fixture
        .load_form(&args.form)
        .map_err(|error| format!("failed to load form '{}': {error}", args.form))?;

    let policy = store
        .pricing_policy()
        .map_err(|error| format!("invalid pricing settings: {error}"))?;

    let regions = store
        .region_list()
        .map_err(|error| format!("failed to load regions: {error}"))?;

    let submitter = Arc::new(InMemoryOrderSubmitter::new());

    let mut checkout = Checkout::new(cart, submitter.clone())
        .with_pricing_policy(policy)
        .with_promo_engine(PromoEngine::default().with_invalid_code_policy(store.invalid_code_policy()))
        .with_regions(Arc::new(regions))
        .with_form(form)
        .with_config(store.checkout_config())
        .with_observer(TracingObserver);

    if let Some(code) = &args.promo {
        match checkout.apply_promo_code(code) {
            Ok(applied) => println!("{applied}"),
            Err(error) => println!("{error}"),
        }
    }

    let totals = checkout
        .totals()
        .map_err(|error| format!("failed to price cart: {error}"))?;

    OrderSummary::new(checkout.cart().lines(), totals, policy.tax_rate, checkout.promo())
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to write order summary: {error}"))?;

    match checkout.submit().await {
        Ok(confirmation) => {
            info!(placed = submitter.len(), "checkout complete");

            println!("Order placed! Track it at {}", confirmation.tracking_path());

            Ok(())
        }
        Err(CheckoutError::InvalidForm(errors)) => {
            println!("Please fix the following before placing your order:");

            for error in errors.iter() {
                println!("  {}: {}", error.field, error.message);
            }

            Err("order not placed".to_string())
        }
        Err(error) if error.is_retryable() => {
            Err(format!("order not placed, please try again: {error}"))
        }
        Err(error) => Err(format!("order not placed: {error}")),
    }
}
