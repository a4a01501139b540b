//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware exported for server wiring.
pub use middleware::Trace;
/// Per-request trace identifier, readable from handlers and log sinks.
pub use domain::TraceId;
