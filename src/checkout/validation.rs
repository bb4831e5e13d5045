//! Checkout Validation
//!
//! Field rules for the checkout form. Card rules only apply while credit card
//! is the selected payment method.

use std::fmt;

use smallvec::SmallVec;

use crate::checkout::{
    form::{CardDetails, CheckoutForm, PaymentDetails},
    regions::RegionProvider,
};

/// Form fields, in the order they appear on the page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    /// Recipient's full name
    FullName,
    /// Street address
    StreetAddress,
    /// City
    City,
    /// State or province
    State,
    /// Postal code
    PostalCode,
    /// Phone number
    PhoneNumber,
    /// Payment method selection
    PaymentMethod,
    /// Name on the card
    CardHolderName,
    /// Card number
    CardNumber,
    /// Card expiry
    ExpiryDate,
    /// Card verification value
    Cvv,
    /// Terms and conditions checkbox
    AgreeToTerms,
}

impl FieldName {
    /// Every field, in page order.
    pub const ALL: [FieldName; 12] = [
        Self::FullName,
        Self::StreetAddress,
        Self::City,
        Self::State,
        Self::PostalCode,
        Self::PhoneNumber,
        Self::PaymentMethod,
        Self::CardHolderName,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
        Self::AgreeToTerms,
    ];

    /// The form key of this field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::StreetAddress => "streetAddress",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postalCode",
            Self::PhoneNumber => "phoneNumber",
            Self::PaymentMethod => "paymentMethod",
            Self::CardHolderName => "cardHolderName",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
            Self::AgreeToTerms => "agreeToTerms",
        }
    }

    /// Message shown next to the field when its rule fails.
    pub const fn message(self) -> &'static str {
        match self {
            Self::FullName => "Full name must be at least 2 characters.",
            Self::StreetAddress => "Street address is required.",
            Self::City => "City is required.",
            Self::State => "Please select a state/province.",
            Self::PostalCode => "Valid postal code is required.",
            Self::PhoneNumber => "Invalid phone number format (e.g., +1234567890).",
            Self::PaymentMethod => "Please select a payment method.",
            Self::CardHolderName => "Cardholder name is required for credit card payment.",
            Self::CardNumber => "Invalid card number (must be 13-19 digits).",
            Self::ExpiryDate => "Invalid expiry date (MM/YY format).",
            Self::Cvv => "Invalid CVV (3 or 4 digits).",
            Self::AgreeToTerms => "You must agree to the terms and conditions to proceed.",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed rule for one field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field
    pub field: FieldName,

    /// Human-readable message
    pub message: &'static str,
}

impl From<FieldName> for FieldError {
    fn from(field: FieldName) -> Self {
        Self {
            field,
            message: field.message(),
        }
    }
}

/// Field errors from a validation pass, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: SmallVec<[FieldError; 4]>,
}

impl FieldErrors {
    /// The message for `field`, if it failed.
    pub fn get(&self, field: FieldName) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    /// Whether `field` failed.
    pub fn contains(&self, field: FieldName) -> bool {
        self.get(field).is_some()
    }

    /// The failing fields, in page order.
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.errors.iter().map(|error| error.field)
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: SmallVec<[&str; 4]> = self.fields().map(FieldName::as_str).collect();

        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

impl FromIterator<FieldName> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldName>>(iter: I) -> Self {
        let mut errors: SmallVec<[FieldError; 4]> = iter.into_iter().map(FieldError::from).collect();

        errors.sort_by_key(|error| error.field);
        errors.dedup_by_key(|error| error.field);

        Self { errors }
    }
}

/// Validate the whole form.
///
/// # Errors
///
/// Returns every failing field when any rule fails.
pub fn validate(form: &CheckoutForm, regions: &dyn RegionProvider) -> Result<(), FieldErrors> {
    let errors: FieldErrors = FieldName::ALL
        .into_iter()
        .filter(|&field| !field_is_valid(form, field, regions))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single field, for inline feedback while editing.
///
/// Returns the message to show, or `None` if the field is fine. Card fields
/// are always fine while another payment method is selected.
pub fn validate_field(
    form: &CheckoutForm,
    field: FieldName,
    regions: &dyn RegionProvider,
) -> Option<&'static str> {
    (!field_is_valid(form, field, regions)).then(|| field.message())
}

fn field_is_valid(form: &CheckoutForm, field: FieldName, regions: &dyn RegionProvider) -> bool {
    let address = &form.address;

    match field {
        FieldName::FullName => min_chars(&address.full_name, 2),
        FieldName::StreetAddress => min_chars(&address.street_address, 5),
        FieldName::City => min_chars(&address.city, 2),
        FieldName::State => regions.contains(&address.state),
        FieldName::PostalCode => min_chars(&address.postal_code, 3),
        FieldName::PhoneNumber => is_phone_number(&address.phone_number),
        FieldName::PaymentMethod => form.payment.is_some(),
        FieldName::CardHolderName
        | FieldName::CardNumber
        | FieldName::ExpiryDate
        | FieldName::Cvv => match &form.payment {
            Some(PaymentDetails::CreditCard(card)) => card_field_is_valid(card, field),
            Some(PaymentDetails::Paypal) | None => true,
        },
        FieldName::AgreeToTerms => form.agree_to_terms,
    }
}

fn card_field_is_valid(card: &CardDetails, field: FieldName) -> bool {
    match field {
        FieldName::CardHolderName => min_chars(&card.card_holder_name, 2),
        FieldName::CardNumber => is_card_number(&card.card_number),
        FieldName::ExpiryDate => is_expiry_date(&card.expiry_date),
        FieldName::Cvv => is_cvv(&card.cvv),
        _ => true,
    }
}

fn min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

/// An optional `+`, a leading 1-9, then up to 14 more digits; 2-15 digits in all.
fn is_phone_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);

    let mut chars = digits.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    let len = digits.chars().count();

    matches!(first, '1'..='9')
        && chars.all(|c| c.is_ascii_digit())
        && (2..=15).contains(&len)
}

/// 13-19 digits once whitespace is stripped.
fn is_card_number(value: &str) -> bool {
    let mut count = 0_usize;

    for c in value.chars().filter(|c| !c.is_whitespace()) {
        if !c.is_ascii_digit() {
            return false;
        }

        count += 1;
    }

    (13..=19).contains(&count)
}

/// `MM/YY` with a month from 01 to 12.
fn is_expiry_date(value: &str) -> bool {
    let Some((month, year)) = value.split_once('/') else {
        return false;
    };

    let month_ok = month.len() == 2
        && month.chars().all(|c| c.is_ascii_digit())
        && month
            .parse::<u8>()
            .is_ok_and(|month| (1..=12).contains(&month));

    let year_ok = year.len() == 2 && year.chars().all(|c| c.is_ascii_digit());

    month_ok && year_ok
}

/// Three or four digits.
fn is_cvv(value: &str) -> bool {
    (3..=4).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}
