//! # Application Layer Protocols
//!
//! Protocols built on top of the [`TransportBinding`](crate::network::TransportBinding)
//! event model. Each one keeps its state in caller-owned objects with
//! fixed-size buffers and advances only from the stack's periodic driver.
//!
//! - **[`http`]**: HTTP/1.1 request client

/// HTTP request client.
///
/// Issues one request per connection and reports the response status
/// through a completion callback.
pub mod http;
