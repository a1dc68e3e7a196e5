//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for presentation layers
//! - Driven Ports (outbound) - Salt and dataset sources the engine reads from

pub mod inbound;
pub mod outbound;

pub use inbound::SpatialFilterApi;
pub use outbound::{Record, RecordSource, SaltSource};
