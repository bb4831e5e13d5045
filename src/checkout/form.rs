//! Checkout Form

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroize;

/// Delivery address fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    /// Recipient's full name
    pub full_name: String,

    /// Street address
    pub street_address: String,

    /// Apartment, suite, etc.
    pub apartment: Option<String>,

    /// City
    pub city: String,

    /// State or province, from the region list
    pub state: String,

    /// Postal code
    pub postal_code: String,

    /// Phone number for delivery updates
    pub phone_number: String,
}

/// Card fields. Zeroized on drop; the number and CVV are never printed.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    /// Name on the card
    #[serde(default)]
    pub card_holder_name: String,

    /// Card number, possibly with spaces
    #[serde(default)]
    pub card_number: String,

    /// Expiry in `MM/YY`
    #[serde(default)]
    pub expiry_date: String,

    /// Card verification value
    #[serde(default)]
    pub cvv: String,
}

impl CardDetails {
    /// The last four digits of the card number, if it has at least four.
    pub fn last_four(&self) -> Option<String> {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        let start = digits.len().checked_sub(4)?;

        digits.get(start..).map(|tail| tail.iter().collect())
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_holder_name", &self.card_holder_name)
            .field("card_number", &"<redacted>")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"<redacted>")
            .finish()
    }
}

impl Drop for CardDetails {
    fn drop(&mut self) {
        self.card_number.zeroize();
        self.cvv.zeroize();
    }
}

/// The payment method discriminant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Pay by credit card
    CreditCard,

    /// Pay with `PayPal`
    Paypal,
}

impl PaymentMethod {
    /// The form value for this method.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "creditCard",
            Self::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unknown payment method value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "creditCard" => Ok(Self::CreditCard),
            "paypal" => Ok(Self::Paypal),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Payment selection. Each variant carries only the fields it requires.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum PaymentDetails {
    /// Credit card, with its card fields
    CreditCard(CardDetails),

    /// `PayPal`; the customer is redirected, so nothing is collected here
    Paypal,
}

impl PaymentDetails {
    /// The discriminant of this selection.
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::CreditCard(_) => PaymentMethod::CreditCard,
            Self::Paypal => PaymentMethod::Paypal,
        }
    }
}

/// Checkout form values as entered by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    /// Delivery address
    pub address: DeliveryAddress,

    /// Selected payment; `None` when nothing is selected
    pub payment: Option<PaymentDetails>,

    /// Whether the customer agreed to the terms and conditions
    pub agree_to_terms: bool,

    /// Card fields kept aside while another method is selected
    #[serde(skip)]
    stashed_card: Option<CardDetails>,
}

impl Default for CheckoutForm {
    /// Empty fields, credit card selected, terms not yet agreed.
    fn default() -> Self {
        Self {
            address: DeliveryAddress::default(),
            payment: Some(PaymentDetails::CreditCard(CardDetails::default())),
            agree_to_terms: false,
            stashed_card: None,
        }
    }
}

impl CheckoutForm {
    /// A form with the given address and payment.
    pub fn new(address: DeliveryAddress, payment: PaymentDetails, agree_to_terms: bool) -> Self {
        Self {
            address,
            payment: Some(payment),
            agree_to_terms,
            stashed_card: None,
        }
    }

    /// The currently selected payment method.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment.as_ref().map(PaymentDetails::method)
    }

    /// Switch the payment method.
    ///
    /// Card fields typed before switching away from credit card are kept and
    /// restored when switching back.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        if self.payment_method() == Some(method) {
            return;
        }

        if let Some(PaymentDetails::CreditCard(card)) = self.payment.take() {
            self.stashed_card = Some(card);
        }

        self.payment = Some(match method {
            PaymentMethod::CreditCard => {
                PaymentDetails::CreditCard(self.stashed_card.take().unwrap_or_default())
            }
            PaymentMethod::Paypal => PaymentDetails::Paypal,
        });
    }

    /// Card fields of the active credit card selection.
    pub fn card(&self) -> Option<&CardDetails> {
        match &self.payment {
            Some(PaymentDetails::CreditCard(card)) => Some(card),
            _ => None,
        }
    }

    /// Mutable card fields of the active credit card selection.
    pub fn card_mut(&mut self) -> Option<&mut CardDetails> {
        match &mut self.payment {
            Some(PaymentDetails::CreditCard(card)) => Some(card),
            _ => None,
        }
    }
}
