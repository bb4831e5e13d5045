//! Food Fleet prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, LineUuid, QuantityChange},
    checkout::{
        CardDetails, Checkout, CheckoutConfig, CheckoutError, CheckoutForm, CheckoutState,
        DeliveryAddress, FieldError, FieldErrors, FieldName, InMemoryOrderSubmitter,
        OrderConfirmation, OrderReceipt, OrderSubmitter, OrderUuid, PaymentDetails,
        PaymentMethod, RegionList, RegionProvider, SubmissionError, ValidatedOrder,
    },
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    menu::{Customizations, ItemSelection, MenuItem},
    observer::{CheckoutObserver, NoopObserver, TracingObserver},
    pricing::{OrderTotals, PricingError, PricingPolicy, calculate_totals},
    promotions::{
        AppliedPromo, InvalidCodePolicy, PromoCatalog, PromoCode, PromoEngine, PromoError,
    },
    receipt::{OrderSummary, ReceiptError},
};
