//! Order Submission

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::checkout::order::{OrderReceipt, OrderUuid, ValidatedOrder};

/// Errors returned by an [`OrderSubmitter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The backend refused the order.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("order service unavailable")]
    Unavailable,

    /// No answer arrived in time.
    #[error("order submission timed out after {0:?}")]
    TimedOut(Duration),
}

impl SubmissionError {
    /// Whether submitting the same order again might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable | Self::TimedOut(_))
    }
}

/// Places validated orders with the order backend.
#[automock]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit an order, returning the backend's receipt.
    async fn submit_order(&self, order: &ValidatedOrder) -> Result<OrderReceipt, SubmissionError>;
}

/// Keeps placed orders in memory.
#[derive(Debug, Default)]
pub struct InMemoryOrderSubmitter {
    orders: Mutex<Vec<ValidatedOrder>>,
}

impl InMemoryOrderSubmitter {
    /// An empty submitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers of the orders placed so far, oldest first.
    pub fn placed(&self) -> Vec<OrderUuid> {
        self.orders
            .lock()
            .map(|orders| orders.iter().map(ValidatedOrder::uuid).collect())
            .unwrap_or_default()
    }

    /// Number of orders placed so far.
    pub fn len(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or_default()
    }

    /// Returns true if no orders have been placed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderSubmitter for InMemoryOrderSubmitter {
    async fn submit_order(&self, order: &ValidatedOrder) -> Result<OrderReceipt, SubmissionError> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|_poisoned| SubmissionError::Unavailable)?;

        orders.push(order.clone());

        Ok(OrderReceipt {
            order_uuid: order.uuid(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        checkout::form::{DeliveryAddress, PaymentDetails},
        pricing::OrderTotals,
    };

    use super::*;

    fn order() -> ValidatedOrder {
        let zero = Money::from_minor(0, USD);

        ValidatedOrder::new(
            DeliveryAddress::default(),
            PaymentDetails::Paypal,
            Vec::new(),
            OrderTotals {
                subtotal: zero,
                discount: zero,
                delivery_fee: zero,
                taxes: zero,
                total: zero,
            },
            None,
        )
    }

    #[tokio::test]
    async fn in_memory_submitter_records_orders() -> TestResult {
        let submitter = InMemoryOrderSubmitter::new();
        let order = order();

        let receipt = submitter.submit_order(&order).await?;

        assert_eq!(receipt.order_uuid, order.uuid());
        assert_eq!(submitter.placed(), vec![order.uuid()]);
        assert_eq!(submitter.len(), 1);

        Ok(())
    }

    #[test]
    fn transient_failures_are_retryable() {
        assert!(SubmissionError::Unavailable.is_retryable());
        assert!(SubmissionError::TimedOut(Duration::from_secs(10)).is_retryable());
        assert!(!SubmissionError::Rejected("card declined".to_string()).is_retryable());
    }
}
