//! Common error types for network operations

/// A common error type for network operations.
///
/// Every synchronous rejection made by the HTTP client and every error a
/// transport binding hands back is expressed as one of these variants. The
/// type is `Copy` and allocation-free so it can travel through the completion
/// path and be stored in an [`Outcome`](crate::network::application::http::Outcome).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The process-wide transport stack has not been brought up yet.
    NotInitialized,
    /// The network link is down.
    LinkDown,
    /// The link is up but no local address has been assigned yet.
    AddressUnassigned,
    /// A request is still connecting or sending on this socket.
    Busy,
    /// The previous request was delivered and its response has not arrived yet.
    ResponsePending,
    /// The formatted request does not fit into the request buffer.
    RequestTooLarge {
        /// Bytes the formatted request needs.
        required: usize,
        /// Capacity of the request buffer.
        capacity: usize,
    },
    /// The target path contains whitespace or a line break.
    InvalidPath,
    /// A header name, value or header block is malformed.
    InvalidHeader,
    /// The transport could not allocate a new connection.
    OpenFailed,
    /// The transport refused to start connecting.
    ConnectFailed,
    /// An error occurred during a write operation.
    WriteError,
    /// Reading received bytes from a connection failed.
    ReadError,
    /// The handle refers to a connection that is already closed.
    ConnectionClosed,
    /// A configuration blob could not be parsed.
    InvalidConfig,
    /// A transport-specific error code, negative by convention.
    Transport(i8),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotInitialized => defmt::write!(f, "NotInitialized"),
            Error::LinkDown => defmt::write!(f, "LinkDown"),
            Error::AddressUnassigned => defmt::write!(f, "AddressUnassigned"),
            Error::Busy => defmt::write!(f, "Busy"),
            Error::ResponsePending => defmt::write!(f, "ResponsePending"),
            Error::RequestTooLarge { required, capacity } => defmt::write!(
                f,
                "RequestTooLarge {{ required: {}, capacity: {} }}",
                required,
                capacity
            ),
            Error::InvalidPath => defmt::write!(f, "InvalidPath"),
            Error::InvalidHeader => defmt::write!(f, "InvalidHeader"),
            Error::OpenFailed => defmt::write!(f, "OpenFailed"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
            Error::Transport(code) => defmt::write!(f, "Transport({})", code),
        }
    }
}
