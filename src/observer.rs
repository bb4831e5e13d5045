//! Checkout Observer

use tracing::{info, warn};

use crate::{
    checkout::{
        order::{OrderUuid, ValidatedOrder},
        submission::SubmissionError,
        validation::FieldErrors,
    },
    promotions::{AppliedPromo, PromoError},
};

/// Callbacks at the milestones of a checkout session.
///
/// Every method has an empty default, so observers only implement what they
/// care about. With [`NoopObserver`] the calls compile away.
pub trait CheckoutObserver: Send + Sync {
    /// A promo code was applied.
    fn on_promo_applied(&mut self, _applied: &AppliedPromo) {}

    /// A promo code was not applied.
    fn on_promo_rejected(&mut self, _input: &str, _error: &PromoError) {}

    /// The form failed validation when placing the order.
    fn on_validation_failed(&mut self, _errors: &FieldErrors) {}

    /// An order was handed to the submitter.
    fn on_submission_started(&mut self, _order: &ValidatedOrder) {}

    /// The submitter failed or timed out.
    fn on_submission_failed(&mut self, _order: &ValidatedOrder, _error: &SubmissionError) {}

    /// The order was placed.
    fn on_order_placed(&mut self, _order_uuid: OrderUuid) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CheckoutObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CheckoutObserver for TracingObserver {
    fn on_promo_applied(&mut self, applied: &AppliedPromo) {
        info!(code = applied.promo.code(), "promo code applied");
    }

    fn on_promo_rejected(&mut self, input: &str, error: &PromoError) {
        info!(input = input.trim(), %error, "promo code rejected");
    }

    fn on_validation_failed(&mut self, errors: &FieldErrors) {
        info!(count = errors.len(), %errors, "checkout form invalid");
    }

    fn on_submission_started(&mut self, order: &ValidatedOrder) {
        info!(
            order = %order.uuid(),
            lines = order.lines().len(),
            total_minor = order.totals().total.to_minor_units(),
            "submitting order"
        );
    }

    fn on_submission_failed(&mut self, order: &ValidatedOrder, error: &SubmissionError) {
        warn!(
            order = %order.uuid(),
            retryable = error.is_retryable(),
            %error,
            "order submission failed"
        );
    }

    fn on_order_placed(&mut self, order_uuid: OrderUuid) {
        info!(order = %order_uuid, "order placed");
    }
}
