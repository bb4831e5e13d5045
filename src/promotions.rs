//! Promotions
//!
//! Promo codes a customer can type at checkout. At most one code is active at
//! a time; applying a new one replaces the previous.

use std::fmt;

use decimal_percentage::Percentage;
use thiserror::Error;

use crate::discounts::percent_points;

/// Why a promo code was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    /// The input was empty or whitespace.
    #[error("Please enter a promo code.")]
    MissingCode,

    /// The input did not match any known code.
    #[error("Invalid promo code.")]
    InvalidCode,
}

/// What happens to an active promo when an unknown code is entered.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum InvalidCodePolicy {
    /// The active promo is removed, so the discount reverts to zero.
    #[default]
    ClearActive,

    /// The active promo stays applied.
    KeepActive,
}

/// A recognized promo code and the share of the subtotal it takes off.
#[derive(Debug, Clone, Copy)]
pub struct PromoCode {
    code: &'static str,
    percent_off: Percentage,
}

impl PromoCode {
    /// Create a promo code. Matching against customer input ignores case.
    pub fn new(code: &'static str, percent_off: Percentage) -> Self {
        Self { code, percent_off }
    }

    /// The canonical code
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Share of the subtotal taken off, as a fraction.
    pub fn percent_off(&self) -> Percentage {
        self.percent_off
    }

    fn matches(&self, normalized: &str) -> bool {
        self.code.eq_ignore_ascii_case(normalized)
    }
}

impl PartialEq for PromoCode {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

/// A successfully applied promo, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedPromo {
    /// The code now active
    pub promo: PromoCode,
}

impl fmt::Display for AppliedPromo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Promo code '{}' applied! {}% off subtotal.",
            self.promo.code(),
            percent_points(&self.promo.percent_off()),
        )
    }
}

/// The set of codes the store recognizes.
#[derive(Debug, Clone)]
pub struct PromoCatalog {
    codes: Vec<PromoCode>,
}

impl PromoCatalog {
    /// A catalog holding the given codes.
    pub fn new(codes: impl Into<Vec<PromoCode>>) -> Self {
        Self {
            codes: codes.into(),
        }
    }

    /// Look up a code, ignoring case and surrounding whitespace.
    pub fn find(&self, input: &str) -> Option<&PromoCode> {
        let normalized = input.trim();

        self.codes.iter().find(|code| code.matches(normalized))
    }
}

impl Default for PromoCatalog {
    /// The storefront's single code: `SAVE10`, 10% off the subtotal.
    fn default() -> Self {
        Self::new([PromoCode::new("SAVE10", Percentage::from(0.10))])
    }
}

/// Tracks the active promo code.
#[derive(Debug, Clone, Default)]
pub struct PromoEngine {
    catalog: PromoCatalog,
    policy: InvalidCodePolicy,
    active: Option<PromoCode>,
}

impl PromoEngine {
    /// An engine over the given catalog.
    pub fn new(catalog: PromoCatalog) -> Self {
        Self {
            catalog,
            policy: InvalidCodePolicy::default(),
            active: None,
        }
    }

    /// Choose how unknown codes affect an active promo.
    #[must_use]
    pub fn with_invalid_code_policy(mut self, policy: InvalidCodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply a code typed by the customer.
    ///
    /// # Errors
    ///
    /// - [`PromoError::MissingCode`]: the input was blank; nothing changes.
    /// - [`PromoError::InvalidCode`]: the input is unknown; the active promo is
    ///   cleared or kept according to the [`InvalidCodePolicy`].
    pub fn apply(&mut self, input: &str) -> Result<AppliedPromo, PromoError> {
        if input.trim().is_empty() {
            return Err(PromoError::MissingCode);
        }

        let Some(promo) = self.catalog.find(input).copied() else {
            if self.policy == InvalidCodePolicy::ClearActive {
                self.active = None;
            }

            return Err(PromoError::InvalidCode);
        };

        self.active = Some(promo);

        Ok(AppliedPromo { promo })
    }

    /// Remove the active promo, returning it.
    pub fn remove(&mut self) -> Option<PromoCode> {
        self.active.take()
    }

    /// The active promo, if any.
    pub fn active(&self) -> Option<&PromoCode> {
        self.active.as_ref()
    }
}
