//! Application layer: the services that drive the marketplace workflows.
//!
//! Each service owns one lifecycle and reaches the stores only through the
//! ports in [`crate::domain::ports`]. [`marketplace::Marketplace`] wires them
//! together over a shared set of stores; [`payment::PaymentHandoff`] closes
//! the loop when the payment gateway redirects back.

pub mod marketplace;
pub mod offers;
pub mod payment;
pub mod quotations;
pub mod requests;
