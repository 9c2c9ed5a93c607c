//! Apartment listing marketplace backend.
//!
//! Hexagonal layout: [`domain`] holds entities, services, and port traits;
//! [`inbound`] adapts HTTP and WebSocket traffic onto the services;
//! [`outbound`] implements the ports over PostgreSQL or process memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
