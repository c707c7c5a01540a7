//! Backend delegating every stage to an OTE service over its REST API

pub mod strategy;
pub mod transport;

pub use strategy::RemoteStrategy;
pub use transport::{Reply, Transport};
