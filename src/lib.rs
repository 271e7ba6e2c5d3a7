//! # nbhttp - non-blocking HTTP requests for embedded TCP stacks
//!
//! An HTTP/1.1 request client for targets where the TCP/IP stack is driven by
//! callbacks rather than blocking sockets, lwIP's raw API being the typical
//! example. Requests are formatted into fixed-size buffers owned by the
//! caller, no heap is used, and nothing ever blocks: every bit of progress
//! happens inside the periodic driver the application calls from its main
//! loop.
//!
//! ## Layout
//!
//! - [`network`]: the [`TransportBinding`](network::TransportBinding) contract
//!   a TCP stack implements, the [`Stack`](network::stack::Stack) wrapper with
//!   its one-shot initialization guard and driver, configuration and errors
//! - [`network::application::http`]: the request socket, request builder and
//!   status-line parser
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nbhttp::network::application::http::{HeaderBlock, Method, Request, RequestSocket};
//! use nbhttp::network::{SocketId, config::Config, stack::Stack};
//!
//! fn done(status: u16, _arg: ()) {
//!     // 200, 404, ... or 0 on transport error, timeout or garbage
//! }
//!
//! let mut stack = Stack::new(my_binding, Config::default());
//! let mut socket: RequestSocket<_, ()> = RequestSocket::new(SocketId(0), done);
//! socket.set_target(core::net::Ipv4Addr::new(192, 168, 1, 10), 8080);
//! socket.init(&mut stack)?;
//!
//! let mut headers: HeaderBlock<64> = HeaderBlock::new();
//! headers.push("Content-Type", "application/json")?;
//! let request = Request::new(Method::Post, "/telemetry")
//!     .with_headers(headers.as_str())
//!     .with_payload(br#"{"t":21.5}"#);
//! socket.issue_request(&mut stack, &request, ())?;
//!
//! loop {
//!     socket.drive(&mut stack);
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Log through `defmt`
//! - `log`: Log through the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// Must come first so the logging macros are visible to every module.
mod fmt;

/// Transport abstraction, process-wide stack wrapper and the HTTP client.
///
/// The transport contract models a non-blocking TCP stack that reports
/// connection progress through events; the HTTP client is built on it.
pub mod network;
