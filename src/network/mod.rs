//! A transport abstraction layer for callback-driven TCP stacks
//!
//! Embedded TCP/IP stacks such as lwIP's raw API never block: a connection is
//! opened, a connect is initiated, and everything that follows (handshake
//! completion, acknowledged bytes, incoming data, errors, idle polls) arrives
//! later as events for an opaque connection handle. This module describes that
//! contract as the [`TransportBinding`] trait and the receiving side as the
//! [`ConnectionObserver`] capability trait.
//!
//! The [`stack::Stack`] wrapper owns a binding together with the process-wide
//! initialization guard and pumps its events into observers.

#![allow(missing_docs)]
#![deny(unsafe_code)]

use core::net::{Ipv4Addr, SocketAddrV4};

/// Common error types for network operations
pub mod error;

/// Stack-wide configuration
pub mod config;

/// Process-wide transport wrapper and periodic driver
pub mod stack;

/// Application layer protocols built on the transport binding
pub mod application;


/// Re-exports of common traits and types
pub mod prelude {
    pub use super::config::Config;
    pub use super::error::Error;
    pub use super::stack::Stack;
    pub use super::{ConnectionObserver, Event, EventKind, SocketId, TransportBinding, WriteFlags};
}

/// Per-connection routing argument.
///
/// Each connection handle carries the id of the observer that opened it, so
/// the driver can deliver the handle's events to the right observer when
/// several share one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(pub u8);

#[cfg(feature = "defmt")]
impl defmt::Format for SocketId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SocketId({})", self.0)
    }
}

/// Flags for [`TransportBinding::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteFlags(u8);

impl WriteFlags {
    /// No flags. The binding may keep referring to the written bytes until
    /// they are acknowledged; callers keep them unchanged until then.
    pub const NONE: WriteFlags = WriteFlags(0);
    /// The binding must copy the bytes before returning.
    pub const COPY: WriteFlags = WriteFlags(0x01);
    /// More data follows, the binding may delay pushing.
    pub const MORE: WriteFlags = WriteFlags(0x02);

    /// Returns `true` if every flag in `other` is set.
    pub fn contains(self, other: WriteFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw flag bits.
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl core::ops::BitOr for WriteFlags {
    type Output = WriteFlags;

    fn bitor(self, rhs: WriteFlags) -> WriteFlags {
        WriteFlags(self.0 | rhs.0)
    }
}

/// What happened on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<E> {
    /// The handshake completed.
    Connected,
    /// The peer acknowledged this many bytes.
    Sent(u16),
    /// Response bytes are ready to be read with [`TransportBinding::read`].
    Received,
    /// The peer closed its side before sending anything.
    RemoteClosed,
    /// The stack reported a connection-level error.
    Error(E),
    /// The idle-poll interval elapsed without activity.
    Idle,
}

/// A queued transport event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<H, E> {
    /// The connection the event belongs to.
    pub handle: H,
    /// The argument registered with [`TransportBinding::set_argument`].
    pub argument: SocketId,
    /// What happened.
    pub kind: EventKind<E>,
}

/// A non-blocking, event-driven TCP transport.
///
/// None of these methods may block. Connection progress is reported through
/// [`next_event`](TransportBinding::next_event), which the driver drains after
/// every call to [`drive_pending_events`](TransportBinding::drive_pending_events).
///
/// A handle stays allocated until [`close`](TransportBinding::close) is called
/// for it, even after an [`EventKind::Error`] was reported. Once closed, a
/// handle is never passed back to the binding.
pub trait TransportBinding {
    /// Opaque connection handle.
    type Handle: Copy + Eq + core::fmt::Debug;
    /// Binding-specific error, convertible into the crate error.
    type Error: Into<error::Error> + Copy + core::fmt::Debug;

    /// One-time bring-up of the underlying stack.
    fn bring_up(&mut self) -> Result<(), Self::Error>;

    /// Whether the network link is established.
    fn link_up(&self) -> bool;

    /// The local address, once one has been assigned.
    fn local_address(&self) -> Option<Ipv4Addr>;

    /// Allocate a new connection.
    fn open(&mut self) -> Result<Self::Handle, Self::Error>;

    /// Attach the routing argument delivered with every event of `handle`.
    fn set_argument(&mut self, handle: Self::Handle, argument: SocketId);

    /// Register (`Some(ticks)`) or remove (`None`) the idle-poll handler.
    fn set_idle_poll(&mut self, handle: Self::Handle, interval: Option<u8>);

    /// Start connecting. Completion is reported as [`EventKind::Connected`].
    fn connect(&mut self, handle: Self::Handle, remote: SocketAddrV4) -> Result<(), Self::Error>;

    /// Queue bytes for sending.
    fn write(&mut self, handle: Self::Handle, bytes: &[u8], flags: WriteFlags) -> Result<(), Self::Error>;

    /// Push queued bytes onto the wire.
    fn flush(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;

    /// Read received bytes into `buf`, returning how many were copied.
    fn read(&mut self, handle: Self::Handle, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Close and release the connection.
    fn close(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;

    /// Run the stack's timers and input processing.
    fn drive_pending_events(&mut self);

    /// Pop the next queued event.
    fn next_event(&mut self) -> Option<Event<Self::Handle, Self::Error>>;

    /// Monotonic time in milliseconds.
    fn now(&self) -> u32;
}

/// Receiver of connection events.
///
/// Handlers get the transport back so they can write to or close the
/// connection; they must return promptly and must tolerate events for handles
/// they no longer own.
pub trait ConnectionObserver<T: TransportBinding> {
    /// The routing argument this observer registers on its connections.
    fn argument(&self) -> SocketId;

    /// The handshake for `handle` completed.
    fn on_connected(&mut self, transport: &mut T, handle: T::Handle);

    /// The peer acknowledged `len` bytes on `handle`.
    fn on_sent(&mut self, transport: &mut T, handle: T::Handle, len: u16);

    /// Response bytes are waiting on `handle`.
    fn on_received(&mut self, transport: &mut T, handle: T::Handle);

    /// The peer closed `handle` without sending anything.
    fn on_remote_closed(&mut self, transport: &mut T, handle: T::Handle);

    /// The stack reported `error` on `handle`.
    fn on_error(&mut self, transport: &mut T, handle: T::Handle, error: error::Error);

    /// `handle` sat idle for the registered poll interval.
    fn on_idle(&mut self, transport: &mut T, handle: T::Handle);
}
