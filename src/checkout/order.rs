//! Orders
//!
//! A validated order is an immutable snapshot of the cart, form and totals,
//! taken when the customer places the order.

use jiff::Timestamp;

use crate::{
    cart::CartLine,
    checkout::form::{DeliveryAddress, PaymentDetails},
    pricing::OrderTotals,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<ValidatedOrder>;

/// A checked, priced order ready for submission.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    uuid: OrderUuid,
    address: DeliveryAddress,
    payment: PaymentDetails,
    lines: Vec<CartLine>,
    totals: OrderTotals,
    promo_code: Option<&'static str>,
    prepared_at: Timestamp,
}

impl ValidatedOrder {
    /// Snapshot an order. The caller has already validated the form.
    pub fn new(
        address: DeliveryAddress,
        payment: PaymentDetails,
        lines: Vec<CartLine>,
        totals: OrderTotals,
        promo_code: Option<&'static str>,
    ) -> Self {
        Self {
            uuid: OrderUuid::new(),
            address,
            payment,
            lines,
            totals,
            promo_code,
            prepared_at: Timestamp::now(),
        }
    }

    /// Order-local identifier
    pub fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    /// Delivery address
    pub fn address(&self) -> &DeliveryAddress {
        &self.address
    }

    /// Payment details
    pub fn payment(&self) -> &PaymentDetails {
        &self.payment
    }

    /// Cart lines at the time the order was prepared
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Totals at the time the order was prepared
    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// The promo code applied, if any
    pub fn promo_code(&self) -> Option<&'static str> {
        self.promo_code
    }

    /// When the order was prepared
    pub fn prepared_at(&self) -> Timestamp {
        self.prepared_at
    }
}

/// Acknowledgement from the order backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Identifier assigned to the placed order
    pub order_uuid: OrderUuid,
}

/// Returned to the customer once an order is placed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Identifier of the placed order
    pub order_uuid: OrderUuid,
}

impl OrderConfirmation {
    /// Path of the order tracking page.
    pub fn tracking_path(&self) -> String {
        format!("/order-tracking/{}", self.order_uuid)
    }
}

impl From<OrderReceipt> for OrderConfirmation {
    fn from(receipt: OrderReceipt) -> Self {
        Self {
            order_uuid: receipt.order_uuid,
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn tracking_path_uses_order_uuid() {
        let order_uuid = OrderUuid::from_uuid(Uuid::nil());
        let confirmation = OrderConfirmation::from(OrderReceipt { order_uuid });

        assert_eq!(
            confirmation.tracking_path(),
            "/order-tracking/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn each_order_gets_its_own_uuid() {
        let zero = Money::from_minor(0, USD);
        let totals = OrderTotals {
            subtotal: zero,
            discount: zero,
            delivery_fee: zero,
            taxes: zero,
            total: zero,
        };

        let first = ValidatedOrder::new(
            DeliveryAddress::default(),
            PaymentDetails::Paypal,
            Vec::new(),
            totals,
            None,
        );
        let second = ValidatedOrder::new(
            DeliveryAddress::default(),
            PaymentDetails::Paypal,
            Vec::new(),
            totals,
            Some("SAVE10"),
        );

        assert_ne!(first.uuid(), second.uuid());
        assert_eq!(second.promo_code(), Some("SAVE10"));
        assert!(first.prepared_at() <= second.prepared_at());
    }
}
