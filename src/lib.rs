//! Food Fleet
//!
//! Food Fleet is the checkout core of a food-delivery storefront: cart
//! management, promo codes, order totals, checkout form validation and
//! order submission.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod discounts;
pub mod fixtures;
pub mod logging;
pub mod menu;
pub mod observer;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod uuids;
