//! Batch adapters at the edge of the marketplace.

pub mod csv;
