//! Domain layer: identifiers, value objects, state machines and the pricing
//! rules every quotation and offer must satisfy.
//!
//! Nothing in here performs I/O. Services in `application` load aggregates
//! through the `ports` traits and call back into these types to decide every
//! state change.

pub mod ids;
pub mod money;
pub mod offer;
pub mod payment;
pub mod phase;
pub mod ports;
pub mod pricing;
pub mod quotation;
pub mod request;
pub mod rules;
