//! Pricing
//!
//! Order totals derived from the cart, the active promo and the store's fees.

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    discounts::{DiscountError, percent_of},
    promotions::PromoCode,
};

/// Errors that can occur while calculating order totals.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The delivery fee is in a different currency from the cart (fee currency, cart currency).
    #[error("delivery fee has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Errors bubbled up from the cart subtotal.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Errors bubbled up from percentage calculations.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Flat fees and rates applied to every order.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    /// Charged once per non-empty order, regardless of distance or weight
    pub delivery_fee: Money<'static, Currency>,

    /// Applied to the pre-discount subtotal
    pub tax_rate: Percentage,
}

impl PricingPolicy {
    /// The storefront defaults: a flat 5.00 delivery fee and 8% tax.
    pub fn standard(currency: &'static Currency) -> Self {
        Self {
            delivery_fee: Money::from_minor(5_00, currency),
            tax_rate: Percentage::from(0.08),
        }
    }
}

/// Derived order totals, each rounded to minor units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    /// Sum of line totals
    pub subtotal: Money<'static, Currency>,

    /// Promo discount, zero without an active promo
    pub discount: Money<'static, Currency>,

    /// Flat delivery fee, zero for an empty cart
    pub delivery_fee: Money<'static, Currency>,

    /// Tax on the pre-discount subtotal
    pub taxes: Money<'static, Currency>,

    /// `subtotal + delivery_fee + taxes - discount`, never below zero
    pub total: Money<'static, Currency>,
}

/// Calculate the totals for a cart.
///
/// Pure: the same cart, promo and policy always give the same totals.
///
/// # Errors
///
/// Returns a [`PricingError`] on currency mismatch or arithmetic overflow.
pub fn calculate_totals(
    cart: &Cart,
    promo: Option<&PromoCode>,
    policy: &PricingPolicy,
) -> Result<OrderTotals, PricingError> {
    let currency = cart.currency();
    let zero = Money::from_minor(0, currency);

    if policy.delivery_fee.currency() != currency {
        return Err(PricingError::CurrencyMismatch(
            policy.delivery_fee.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    let subtotal = cart.subtotal()?;

    let delivery_fee = if cart.is_empty() {
        zero
    } else {
        policy.delivery_fee
    };

    let taxes = percent_of(&policy.tax_rate, &subtotal)?;

    let discount = match promo {
        Some(promo) => percent_of(&promo.percent_off(), &subtotal)?,
        None => zero,
    };

    let total = subtotal.add(delivery_fee)?.add(taxes)?.sub(discount)?;
    let total = if total.to_minor_units() < 0 { zero } else { total };

    Ok(OrderTotals {
        subtotal,
        discount,
        delivery_fee,
        taxes,
        total,
    })
}
