use crate::network::application::http::request::{Request, host_string};
use crate::network::application::http::response::{NO_STATUS, STATUS_PREFIX_LEN, parse_status_line, status_class};
use crate::network::error::Error;
use crate::network::stack::Stack;
use crate::network::{ConnectionObserver, SocketId, TransportBinding, WriteFlags};
use core::net::{Ipv4Addr, SocketAddrV4};
use heapless::Vec;

/// Default request buffer capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4000;

/// Completion callback: the status code (or [`NO_STATUS`]) and the argument
/// given to [`RequestSocket::issue_request`].
pub type Callback<A> = fn(result: u16, arg: A);

/// Connection state of a [`RequestSocket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No send in progress.
    Idle,
    /// Waiting for the handshake to complete.
    Connecting,
    /// The request is written and not yet fully acknowledged.
    Sending,
    /// Response bytes are being processed.
    Receiving,
}

/// How the most recent request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A well-formed status line was received.
    Status(u16),
    /// Response bytes arrived but did not start with a valid status line.
    MalformedResponse,
    /// Writing the request to the connection failed.
    WriteFailed(Error),
    /// The peer closed the connection without answering.
    RemoteClosed,
    /// The transport reported a connection error.
    TransportError(Error),
    /// The connection sat idle for the configured number of poll intervals.
    TimedOut,
}

impl Outcome {
    /// The value handed to the completion callback.
    pub fn result_code(&self) -> u16 {
        match self {
            Outcome::Status(code) => *code,
            _ => NO_STATUS,
        }
    }
}

/// One HTTP client endpoint with at most one outstanding request.
///
/// The socket owns its request buffer. Between an accepted
/// [`issue_request`](RequestSocket::issue_request) and the completion callback
/// the buffer is never rewritten: transports handed [`WriteFlags::NONE`] may
/// keep referring to it until the bytes are acknowledged. Callers that share
/// the socket with such a transport must keep it in place (not moved) for that
/// window.
///
/// The completion callback runs exactly once per accepted request, from inside
/// [`Stack::drive`], after the connection has been closed and the socket has
/// returned to [`State::Idle`].
pub struct RequestSocket<T: TransportBinding, A, const N: usize = DEFAULT_BUFFER_CAPACITY> {
    id: SocketId,
    target_address: Ipv4Addr,
    target_port: u16,
    state: State,
    buffer: Vec<u8, N>,
    acked: usize,
    connection: Option<T::Handle>,
    callback: Callback<A>,
    arg: Option<A>,
    last_outcome: Option<Outcome>,
}

impl<T: TransportBinding, A, const N: usize> core::fmt::Debug for RequestSocket<T, A, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestSocket")
            .field("id", &self.id)
            .field("target_address", &self.target_address)
            .field("target_port", &self.target_port)
            .field("state", &self.state)
            .field("request_length", &self.buffer.len())
            .field("connection", &self.connection)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

impl<T: TransportBinding, A, const N: usize> RequestSocket<T, A, N> {
    /// Create an idle socket targeting `0.0.0.0:80`.
    pub fn new(id: SocketId, callback: Callback<A>) -> Self {
        Self {
            id,
            target_address: Ipv4Addr::UNSPECIFIED,
            target_port: 80,
            state: State::Idle,
            buffer: Vec::new(),
            acked: 0,
            connection: None,
            callback,
            arg: None,
            last_outcome: None,
        }
    }

    /// Bring the shared stack up if nobody has yet, and reset to idle.
    pub fn init(&mut self, stack: &mut Stack<T>) -> Result<(), Error> {
        stack.ensure_initialized()?;
        let ip = self.target_address.octets();
        debug!(
            "socket {} target {}.{}.{}.{}:{}",
            self.id.0,
            ip[0],
            ip[1],
            ip[2],
            ip[3],
            self.target_port
        );
        self.state = State::Idle;
        Ok(())
    }

    /// Set the destination of the following requests.
    pub fn set_target(&mut self, address: Ipv4Addr, port: u16) {
        self.target_address = address;
        self.target_port = port;
    }

    pub fn target(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.target_address, self.target_port)
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The formatted request of the current or most recent request.
    pub fn request(&self) -> &[u8] {
        &self.buffer
    }

    pub fn request_length(&self) -> usize {
        self.buffer.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether a request is in flight, i.e. its callback has not run yet.
    pub fn is_outstanding(&self) -> bool {
        self.connection.is_some()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Format `request` and start connecting to the target.
    ///
    /// Every check runs before anything is modified, so a rejected call leaves
    /// the socket as it was and never fires the callback. On `Ok` the outcome
    /// arrives later through the callback, which receives `arg`.
    pub fn issue_request(&mut self, stack: &mut Stack<T>, request: &Request<'_>, arg: A) -> Result<(), Error> {
        if !stack.is_initialized() {
            warn!("stack not initialized");
            return Err(Error::NotInitialized);
        }
        let transport = stack.transport();
        if !transport.link_up() {
            warn!("not connected: link down");
            return Err(Error::LinkDown);
        }
        if transport.local_address().is_none() {
            warn!("not connected: no address assigned");
            return Err(Error::AddressUnassigned);
        }
        if matches!(self.state, State::Connecting | State::Sending) {
            warn!("socket {} busy", self.id.0);
            return Err(Error::Busy);
        }
        if self.connection.is_some() {
            warn!("socket {} still awaiting a response", self.id.0);
            return Err(Error::ResponsePending);
        }
        request.validate()?;

        let host = host_string(self.target_address);
        let required = request.encoded_len(&host);
        if required >= N {
            warn!("request needs {} bytes, buffer holds {}", required, N);
            return Err(Error::RequestTooLarge {
                required,
                capacity: N,
            });
        }

        let idle_poll_ticks = stack.config().idle_poll_ticks;
        let transport = stack.transport_mut();
        let handle = transport.open().map_err(|err| {
            let err: Error = err.into();
            error!("open failed: {:?}", err);
            Error::OpenFailed
        })?;
        transport.set_argument(handle, self.id);
        transport.set_idle_poll(handle, Some(idle_poll_ticks));

        if let Err(err) = transport.connect(handle, self.target()) {
            let err: Error = err.into();
            error!("connect failed: {:?}", err);
            if let Err(err) = transport.close(handle) {
                let err: Error = err.into();
                warn!("close after failed connect: {:?}", err);
            }
            return Err(Error::ConnectFailed);
        }

        // Connected only arrives from a later drive, so the buffer can be
        // filled now that nothing else can fail.
        if let Err(err) = request.encode_into(&host, &mut self.buffer) {
            if let Err(err) = transport.close(handle) {
                let err: Error = err.into();
                warn!("close after failed encode: {:?}", err);
            }
            return Err(err);
        }
        debug!("request length {}", self.buffer.len());

        self.connection = Some(handle);
        self.arg = Some(arg);
        self.acked = 0;
        self.state = State::Connecting;
        debug!("socket {} connecting", self.id.0);
        Ok(())
    }

    /// Pump the stack with this socket as the only observer.
    pub fn drive(&mut self, stack: &mut Stack<T>) {
        let observer: &mut dyn ConnectionObserver<T> = self;
        stack.drive(&mut [observer]);
    }

    fn owns(&self, handle: T::Handle) -> bool {
        self.connection == Some(handle)
    }

    /// Terminal path shared by every handler: close the connection exactly
    /// once, go idle and run the callback exactly once.
    fn finish(&mut self, transport: &mut T, handle: T::Handle, outcome: Outcome) {
        if !self.owns(handle) {
            return;
        }
        // Clearing the reference is the closing mark; it has to happen before
        // close so nothing the transport does during teardown reaches us.
        self.connection = None;
        if let Err(err) = transport.close(handle) {
            let err: Error = err.into();
            warn!("close failed: {:?}", err);
        }
        debug!("socket {} connection closed", self.id.0);

        self.state = State::Idle;
        self.last_outcome = Some(outcome);
        if let Some(arg) = self.arg.take() {
            (self.callback)(outcome.result_code(), arg);
        }
    }
}

impl<T: TransportBinding, A, const N: usize> ConnectionObserver<T> for RequestSocket<T, A, N> {
    fn argument(&self) -> SocketId {
        self.id
    }

    fn on_connected(&mut self, transport: &mut T, handle: T::Handle) {
        if !self.owns(handle) || self.state != State::Connecting {
            return;
        }
        debug!("socket {} connected", self.id.0);
        self.state = State::Sending;

        if let Err(err) = transport.write(handle, &self.buffer, WriteFlags::NONE) {
            let err: Error = err.into();
            error!("write failed: {:?}", err);
            self.finish(transport, handle, Outcome::WriteFailed(err));
            return;
        }
        if let Err(err) = transport.flush(handle) {
            // The data is queued; the stack's timers will push it out.
            let err: Error = err.into();
            warn!("flush failed: {:?}", err);
        }
    }

    fn on_sent(&mut self, _transport: &mut T, handle: T::Handle, len: u16) {
        if !self.owns(handle) {
            return;
        }
        self.acked = self.acked.saturating_add(usize::from(len));
        trace!("sent {} bytes, {} of {} acknowledged", len, self.acked, self.buffer.len());
        if self.state == State::Sending && self.acked >= self.buffer.len() {
            self.state = State::Idle;
        }
    }

    fn on_received(&mut self, transport: &mut T, handle: T::Handle) {
        if !self.owns(handle) {
            return;
        }
        self.state = State::Receiving;

        let mut prefix = [0u8; STATUS_PREFIX_LEN];
        let outcome = match transport.read(handle, &mut prefix) {
            Ok(len) => {
                let received = &prefix[..len.min(STATUS_PREFIX_LEN)];
                debug!("received {:?}", received);
                match parse_status_line(received) {
                    Some(code) => {
                        debug!("status {} ({})", code, status_class(code));
                        Outcome::Status(code)
                    }
                    None => {
                        warn!("malformed status line");
                        Outcome::MalformedResponse
                    }
                }
            }
            Err(err) => {
                let err: Error = err.into();
                error!("read failed: {:?}", err);
                Outcome::TransportError(Error::ReadError)
            }
        };
        self.finish(transport, handle, outcome);
    }

    fn on_remote_closed(&mut self, transport: &mut T, handle: T::Handle) {
        if !self.owns(handle) {
            return;
        }
        warn!("socket {} closed by peer", self.id.0);
        self.finish(transport, handle, Outcome::RemoteClosed);
    }

    fn on_error(&mut self, transport: &mut T, handle: T::Handle, error: Error) {
        if !self.owns(handle) {
            return;
        }
        error!("tcp error: {:?}", error);
        self.finish(transport, handle, Outcome::TransportError(error));
    }

    fn on_idle(&mut self, transport: &mut T, handle: T::Handle) {
        if !self.owns(handle) {
            return;
        }
        warn!("timeout reached, closing connection");
        transport.set_idle_poll(handle, None);
        self.finish(transport, handle, Outcome::TimedOut);
    }
}
