//! Checkout
//!
//! A checkout session owns the cart, the active promo and the form, and walks
//! an order from editing through submission.

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;
use tracing::Span;

use crate::{
    cart::{Cart, CartError, LineUuid, QuantityChange},
    menu::ItemSelection,
    observer::{CheckoutObserver, NoopObserver},
    pricing::{OrderTotals, PricingError, PricingPolicy, calculate_totals},
    promotions::{AppliedPromo, PromoCode, PromoEngine, PromoError},
};

pub mod form;
pub mod order;
pub mod regions;
pub mod submission;
pub mod validation;

pub use form::{CardDetails, CheckoutForm, DeliveryAddress, PaymentDetails, PaymentMethod};
pub use order::{OrderConfirmation, OrderReceipt, OrderUuid, ValidatedOrder};
pub use regions::{RegionList, RegionProvider};
pub use submission::{InMemoryOrderSubmitter, OrderSubmitter, SubmissionError};
pub use validation::{FieldError, FieldErrors, FieldName};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing in the cart.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// The form has invalid fields.
    #[error(transparent)]
    InvalidForm(#[from] FieldErrors),

    /// An earlier submission is still in flight.
    #[error("order submission already in progress")]
    SubmissionInProgress,

    /// This session already placed an order.
    #[error("order {0} was already placed")]
    AlreadySubmitted(OrderUuid),

    /// The submitter failed or timed out; the order can be placed again.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Errors bubbled up from the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Errors bubbled up from the totals calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CheckoutError {
    /// Whether placing the order again might succeed without changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Submission(error) => error.is_retryable(),
            _ => false,
        }
    }
}

/// Where a checkout session is in placing its order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// The customer is filling in the cart and form.
    #[default]
    Editing,

    /// An order is with the submitter.
    Submitting,

    /// The order was placed.
    Submitted {
        /// Identifier of the placed order
        order_uuid: OrderUuid,
    },
}

/// Tunables for a checkout session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// How long to wait for the submitter before giving up
    pub submit_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(10),
        }
    }
}

/// A single customer's checkout session.
pub struct Checkout<O: CheckoutObserver = NoopObserver> {
    cart: Cart,
    promos: PromoEngine,
    form: CheckoutForm,
    policy: PricingPolicy,
    regions: Arc<dyn RegionProvider>,
    submitter: Arc<dyn OrderSubmitter>,
    config: CheckoutConfig,
    observer: O,
    state: CheckoutState,
}

impl<O: CheckoutObserver> fmt::Debug for Checkout<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("cart", &self.cart)
            .field("promos", &self.promos)
            .field("form", &self.form)
            .field("policy", &self.policy)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Checkout<NoopObserver> {
    /// A session over `cart`, placing orders with `submitter`.
    ///
    /// Starts with the storefront defaults: standard pricing in the cart's
    /// currency, the default promo catalog, US states and an empty form.
    pub fn new(cart: Cart, submitter: Arc<dyn OrderSubmitter>) -> Self {
        Self {
            policy: PricingPolicy::standard(cart.currency()),
            cart,
            promos: PromoEngine::default(),
            form: CheckoutForm::default(),
            regions: Arc::new(RegionList::us_states()),
            submitter,
            config: CheckoutConfig::default(),
            observer: NoopObserver,
            state: CheckoutState::Editing,
        }
    }
}

impl<O: CheckoutObserver> Checkout<O> {
    /// Replace the observer.
    pub fn with_observer<P: CheckoutObserver>(self, observer: P) -> Checkout<P> {
        Checkout {
            cart: self.cart,
            promos: self.promos,
            form: self.form,
            policy: self.policy,
            regions: self.regions,
            submitter: self.submitter,
            config: self.config,
            observer,
            state: self.state,
        }
    }

    /// Replace the pricing policy.
    #[must_use]
    pub fn with_pricing_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the promo engine.
    #[must_use]
    pub fn with_promo_engine(mut self, promos: PromoEngine) -> Self {
        self.promos = promos;
        self
    }

    /// Replace the accepted regions.
    #[must_use]
    pub fn with_regions(mut self, regions: Arc<dyn RegionProvider>) -> Self {
        self.regions = regions;
        self
    }

    /// Replace the form.
    #[must_use]
    pub fn with_form(mut self, form: CheckoutForm) -> Self {
        self.form = form;
        self
    }

    /// Replace the session config.
    #[must_use]
    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    /// The cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The form
    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Mutable access to the form
    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// The observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Accepted regions
    pub fn regions(&self) -> &dyn RegionProvider {
        self.regions.as_ref()
    }

    /// Current state
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Add a menu selection to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the selection cannot be added.
    pub fn add_item(&mut self, selection: ItemSelection) -> Result<LineUuid, CheckoutError> {
        Ok(self.cart.add_item(selection)?)
    }

    /// Set a line's quantity.
    pub fn change_quantity(&mut self, id: LineUuid, quantity: u32) -> QuantityChange {
        self.cart.change_quantity(id, quantity)
    }

    /// Add one to a line's quantity.
    pub fn increment(&mut self, id: LineUuid) -> QuantityChange {
        self.cart.increment(id)
    }

    /// Take one from a line's quantity; never below one.
    pub fn decrement(&mut self, id: LineUuid) -> QuantityChange {
        self.cart.decrement(id)
    }

    /// Remove a line; a no-op for unknown ids.
    pub fn remove_line(&mut self, id: LineUuid) -> bool {
        self.cart.remove_line(id).is_some()
    }

    /// Apply a promo code typed by the customer.
    ///
    /// # Errors
    ///
    /// Returns a [`PromoError`] if the input is blank or unknown.
    pub fn apply_promo_code(&mut self, input: &str) -> Result<AppliedPromo, PromoError> {
        match self.promos.apply(input) {
            Ok(applied) => {
                self.observer.on_promo_applied(&applied);

                Ok(applied)
            }
            Err(error) => {
                self.observer.on_promo_rejected(input, &error);

                Err(error)
            }
        }
    }

    /// Remove the active promo.
    pub fn remove_promo(&mut self) -> Option<PromoCode> {
        self.promos.remove()
    }

    /// The active promo, if any.
    pub fn promo(&self) -> Option<&PromoCode> {
        self.promos.active()
    }

    /// Switch the payment method, keeping typed card details for later.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.form.select_payment_method(method);
    }

    /// Current order totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on currency mismatch or overflow.
    pub fn totals(&self) -> Result<OrderTotals, PricingError> {
        calculate_totals(&self.cart, self.promos.active(), &self.policy)
    }

    /// Validate the whole form.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validation::validate(&self.form, self.regions.as_ref())
    }

    /// Check a single field, returning its message if it fails.
    pub fn validate_field(&self, field: FieldName) -> Option<&'static str> {
        validation::validate_field(&self.form, field, self.regions.as_ref())
    }

    /// Check the cart and form, and snapshot them as an order.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInProgress`] or
    ///   [`CheckoutError::AlreadySubmitted`] outside of editing.
    /// - [`CheckoutError::EmptyCart`] when there is nothing to order.
    /// - [`CheckoutError::InvalidForm`] with every failing field.
    pub fn prepare_order(&mut self) -> Result<ValidatedOrder, CheckoutError> {
        match self.state {
            CheckoutState::Editing => {}
            CheckoutState::Submitting => return Err(CheckoutError::SubmissionInProgress),
            CheckoutState::Submitted { order_uuid } => {
                return Err(CheckoutError::AlreadySubmitted(order_uuid));
            }
        }

        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if let Err(errors) = self.validate() {
            self.observer.on_validation_failed(&errors);

            return Err(errors.into());
        }

        let Some(payment) = self.form.payment.clone() else {
            let errors: FieldErrors = [FieldName::PaymentMethod].into_iter().collect();

            return Err(errors.into());
        };

        let totals = self.totals()?;

        Ok(ValidatedOrder::new(
            self.form.address.clone(),
            payment,
            self.cart.lines().to_vec(),
            totals,
            self.promos.active().map(PromoCode::code),
        ))
    }

    /// Place the order.
    ///
    /// On success the cart and promo are cleared and the session moves to
    /// [`CheckoutState::Submitted`]. On failure, or if this future is
    /// dropped before it completes, the session returns to editing with the
    /// cart and form untouched.
    ///
    /// # Errors
    ///
    /// Returns any [`Checkout::prepare_order`] error, or
    /// [`CheckoutError::Submission`] if the submitter fails or times out.
    #[tracing::instrument(
        name = "checkout.submit",
        skip(self),
        fields(
            order_uuid = tracing::field::Empty,
            line_count = self.cart.len()
        ),
        err(level = "warn")
    )]
    pub async fn submit(&mut self) -> Result<OrderConfirmation, CheckoutError> {
        let order = self.prepare_order()?;

        Span::current().record("order_uuid", tracing::field::display(order.uuid()));

        let Self {
            cart,
            promos,
            submitter,
            config,
            observer,
            state,
            ..
        } = self;

        let guard = SubmissionGuard::enter(state);

        observer.on_submission_started(&order);

        let timeout = config.submit_timeout;

        let result = tokio::time::timeout(timeout, submitter.submit_order(&order))
            .await
            .unwrap_or(Err(SubmissionError::TimedOut(timeout)));

        match result {
            Ok(receipt) => {
                cart.clear();
                promos.remove();
                guard.complete(receipt.order_uuid);

                observer.on_order_placed(receipt.order_uuid);

                Ok(receipt.into())
            }
            Err(error) => {
                observer.on_submission_failed(&order, &error);

                Err(error.into())
            }
        }
    }

    /// Start over with an empty cart and form.
    pub fn start_new_order(&mut self) {
        self.cart.clear();
        self.promos.remove();
        self.form = CheckoutForm::default();
        self.state = CheckoutState::Editing;
    }
}

/// Holds the session in [`CheckoutState::Submitting`] and returns it to
/// editing when dropped without completing.
struct SubmissionGuard<'a> {
    state: &'a mut CheckoutState,
}

impl<'a> SubmissionGuard<'a> {
    fn enter(state: &'a mut CheckoutState) -> Self {
        *state = CheckoutState::Submitting;

        Self { state }
    }

    fn complete(self, order_uuid: OrderUuid) {
        *self.state = CheckoutState::Submitted { order_uuid };
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if *self.state == CheckoutState::Submitting {
            *self.state = CheckoutState::Editing;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{cart::CartLine, checkout::submission::MockOrderSubmitter};

    use super::*;

    fn storefront_cart() -> Result<Cart, CartError> {
        Cart::with_lines(
            [
                CartLine::new("margherita", "Margherita Pizza", Money::from_minor(12_99, USD), 1),
                CartLine::new("cola", "Coca-Cola (2L)", Money::from_minor(2_50, USD), 2),
                CartLine::new("knots", "Garlic Knots (6 pcs)", Money::from_minor(5_00, USD), 1),
            ],
            USD,
        )
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm::new(
            DeliveryAddress {
                full_name: "Jane Doe".to_string(),
                street_address: "123 Main St".to_string(),
                apartment: Some("Apt 4B".to_string()),
                city: "Anytown".to_string(),
                state: "New York".to_string(),
                postal_code: "10001".to_string(),
                phone_number: "+15551234567".to_string(),
            },
            PaymentDetails::CreditCard(CardDetails {
                card_holder_name: "Jane Doe".to_string(),
                card_number: "4111 1111 1111 1111".to_string(),
                expiry_date: "12/29".to_string(),
                cvv: "123".to_string(),
            }),
            true,
        )
    }

    fn accepting_submitter() -> MockOrderSubmitter {
        let mut submitter = MockOrderSubmitter::new();

        submitter.expect_submit_order().once().returning(|order| {
            Ok(OrderReceipt {
                order_uuid: order.uuid(),
            })
        });

        submitter
    }

    fn checkout(submitter: MockOrderSubmitter) -> Result<Checkout, CartError> {
        Ok(Checkout::new(storefront_cart()?, Arc::new(submitter)).with_form(valid_form()))
    }

    struct SlowSubmitter(Duration);

    #[async_trait]
    impl OrderSubmitter for SlowSubmitter {
        async fn submit_order(
            &self,
            order: &ValidatedOrder,
        ) -> Result<OrderReceipt, SubmissionError> {
            tokio::time::sleep(self.0).await;

            Ok(OrderReceipt {
                order_uuid: order.uuid(),
            })
        }
    }

    #[tokio::test]
    async fn successful_submit_clears_cart_and_promo() -> TestResult {
        let mut checkout = checkout(accepting_submitter())?;
        checkout.apply_promo_code("save10")?;

        let confirmation = checkout.submit().await?;

        assert!(checkout.cart().is_empty());
        assert!(checkout.promo().is_none());
        assert_eq!(
            checkout.state(),
            CheckoutState::Submitted {
                order_uuid: confirmation.order_uuid
            }
        );
        assert_eq!(
            confirmation.tracking_path(),
            format!("/order-tracking/{}", confirmation.order_uuid)
        );

        Ok(())
    }

    #[tokio::test]
    async fn submitted_order_carries_totals_and_promo() -> TestResult {
        let mut submitter = MockOrderSubmitter::new();

        submitter
            .expect_submit_order()
            .once()
            .withf(|order| {
                order.totals().total == Money::from_minor(27_53, USD)
                    && order.promo_code() == Some("SAVE10")
                    && order.lines().len() == 3
            })
            .returning(|order| {
                Ok(OrderReceipt {
                    order_uuid: order.uuid(),
                })
            });

        let mut checkout = checkout(submitter)?;
        checkout.apply_promo_code("SAVE10")?;
        checkout.submit().await?;

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_without_submitting() -> TestResult {
        let mut submitter = MockOrderSubmitter::new();
        submitter.expect_submit_order().never();

        let mut checkout = Checkout::new(Cart::new(USD), Arc::new(submitter)).with_form(valid_form());

        let result = checkout.submit().await;

        assert!(
            matches!(result, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
        assert_eq!(checkout.state(), CheckoutState::Editing);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_without_submitting() -> TestResult {
        let mut submitter = MockOrderSubmitter::new();
        submitter.expect_submit_order().never();

        let mut checkout = checkout(submitter)?;
        checkout.form_mut().agree_to_terms = false;

        let result = checkout.submit().await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::InvalidForm(ref errors))
                    if errors.fields().eq([FieldName::AgreeToTerms])
            ),
            "expected only agreeToTerms to be invalid, got {result:?}"
        );

        Ok(())
    }

    /// Collects the level of every event emitted while installed.
    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<std::sync::Mutex<Vec<tracing::Level>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LevelRecorder {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if let Ok(mut levels) = self.0.lock() {
                levels.push(*event.metadata().level());
            }
        }
    }

    #[tokio::test]
    async fn rejected_form_is_logged_as_warning() -> TestResult {
        use tracing_subscriber::layer::SubscriberExt;

        let recorder = LevelRecorder::default();
        let _default = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(recorder.clone()),
        );

        let mut submitter = MockOrderSubmitter::new();
        submitter.expect_submit_order().never();

        let mut checkout = checkout(submitter)?;
        checkout.form_mut().agree_to_terms = false;

        assert!(checkout.submit().await.is_err(), "form should be rejected");

        let levels = recorder.0.lock().map_err(|_err| "recorder poisoned")?.clone();

        assert_eq!(levels, vec![tracing::Level::WARN]);

        Ok(())
    }

    #[tokio::test]
    async fn failed_submit_keeps_everything_and_can_be_retried() -> TestResult {
        let calls = AtomicUsize::new(0);
        let mut submitter = MockOrderSubmitter::new();

        submitter.expect_submit_order().times(2).returning(move |order| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SubmissionError::Unavailable)
            } else {
                Ok(OrderReceipt {
                    order_uuid: order.uuid(),
                })
            }
        });

        let mut checkout = checkout(submitter)?;
        checkout.apply_promo_code("SAVE10")?;

        let result = checkout.submit().await;

        assert!(
            result.as_ref().is_err_and(CheckoutError::is_retryable),
            "unavailable should be a retryable failure, got {result:?}"
        );
        assert_eq!(checkout.state(), CheckoutState::Editing);
        assert_eq!(checkout.cart().len(), 3);
        assert!(checkout.promo().is_some());
        assert_eq!(checkout.form(), &valid_form());

        checkout.submit().await?;

        assert!(checkout.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn slow_submitter_times_out() -> TestResult {
        let mut checkout = Checkout::new(
            storefront_cart()?,
            Arc::new(SlowSubmitter(Duration::from_secs(5))),
        )
        .with_form(valid_form())
        .with_config(CheckoutConfig {
            submit_timeout: Duration::from_millis(20),
        });

        let result = checkout.submit().await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::Submission(SubmissionError::TimedOut(_)))
            ),
            "expected TimedOut, got {result:?}"
        );
        assert_eq!(checkout.state(), CheckoutState::Editing);
        assert_eq!(checkout.cart().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn dropping_submit_returns_to_editing() -> TestResult {
        let mut checkout = Checkout::new(
            storefront_cart()?,
            Arc::new(SlowSubmitter(Duration::from_secs(5))),
        )
        .with_form(valid_form());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), checkout.submit()).await;

        assert!(abandoned.is_err(), "submit should still have been pending");
        assert_eq!(checkout.state(), CheckoutState::Editing);
        assert_eq!(checkout.cart().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn resubmitting_a_placed_order_is_rejected() -> TestResult {
        let mut checkout = checkout(accepting_submitter())?;

        let confirmation = checkout.submit().await?;
        let result = checkout.prepare_order();

        assert!(
            matches!(result, Err(CheckoutError::AlreadySubmitted(uuid)) if uuid == confirmation.order_uuid),
            "expected AlreadySubmitted, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn start_new_order_resets_session() -> TestResult {
        let mut checkout = checkout(accepting_submitter())?;

        checkout.submit().await?;
        checkout.start_new_order();

        assert_eq!(checkout.state(), CheckoutState::Editing);
        assert_eq!(checkout.form(), &CheckoutForm::default());

        Ok(())
    }

    #[test]
    fn totals_follow_promo_state() -> TestResult {
        let mut checkout = checkout(MockOrderSubmitter::new())?;

        assert_eq!(checkout.totals()?.total, Money::from_minor(29_83, USD));

        checkout.apply_promo_code("SAVE10")?;
        assert_eq!(checkout.totals()?.total, Money::from_minor(27_53, USD));

        assert_eq!(checkout.apply_promo_code("BOGUS"), Err(PromoError::InvalidCode));
        assert_eq!(checkout.totals()?.discount, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn cart_edits_pass_through() -> TestResult {
        let mut checkout = checkout(MockOrderSubmitter::new())?;
        let first = checkout
            .cart()
            .iter()
            .next()
            .map(CartLine::id)
            .ok_or("cart should not be empty")?;

        assert_eq!(checkout.increment(first), QuantityChange::Updated);
        assert_eq!(checkout.change_quantity(first, 0), QuantityChange::Rejected);
        assert_eq!(checkout.decrement(first), QuantityChange::Updated);
        assert_eq!(checkout.decrement(first), QuantityChange::Rejected);
        assert_eq!(checkout.cart().get(first).map(CartLine::quantity), Some(1));

        assert!(checkout.remove_line(first), "line should be removed");
        assert!(!checkout.remove_line(first), "second removal should be a no-op");

        Ok(())
    }
}
