//! HTTP/1.1 request client for callback-driven TCP stacks.
//!
//! This module provides a request client designed for embedded systems where
//! the TCP stack never blocks and reports progress through events. A
//! [`RequestSocket`] formats one request into its own fixed-size buffer,
//! opens a connection through the [`Stack`](crate::network::stack::Stack) and
//! then advances purely from inside [`Stack::drive`](crate::network::stack::Stack::drive):
//!
//! ```text
//! Idle ──issue_request──▶ Connecting ──Connected──▶ Sending ──Sent──▶ Idle
//!                              │                       │               │
//!                              └──── Error / Idle poll / Received ─────┘
//!                                 close, then callback(code, arg) once
//! ```
//!
//! # Features
//!
//! - Fixed-size request buffer with an up-front length check
//! - Status-line parsing bounded by the bytes actually received
//! - Exactly one completion callback per accepted request
//! - Idle-poll timeout for connections that stall
//! - Header block builder with `Content-Length` and basic auth helpers
//!
//! # Usage
//!
//! ```rust,ignore
//! use nbhttp::network::application::http::{Method, Request, RequestSocket};
//! use nbhttp::network::{SocketId, config::Config, stack::Stack};
//! use core::net::Ipv4Addr;
//!
//! fn on_done(status: u16, tag: u32) {
//!     // status is 0 when no valid response was obtained
//! }
//!
//! let mut stack = Stack::new(binding, Config::default());
//! let mut socket: RequestSocket<_, u32> = RequestSocket::new(SocketId(0), on_done);
//! socket.set_target(Ipv4Addr::new(10, 0, 0, 1), 80);
//! socket.init(&mut stack)?;
//!
//! socket.issue_request(&mut stack, &Request::new(Method::Get, "/status"), 7)?;
//! loop {
//!     socket.drive(&mut stack);
//! }
//! ```

/// Request socket, connection state machine and completion outcome.
pub mod client;

/// Request line, header block and payload formatting.
pub mod request;

/// Status-line parsing.
pub mod response;

pub use client::{Callback, DEFAULT_BUFFER_CAPACITY, Outcome, RequestSocket, State};
pub use request::{HeaderBlock, Method, Request};
pub use response::{NO_STATUS, parse_status_line};
