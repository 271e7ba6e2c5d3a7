#![allow(dead_code)]

use nbhttp::network::error::Error;
use nbhttp::network::{Event, EventKind, SocketId, TransportBinding, WriteFlags};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::rc::Rc;

pub type Handle = u16;

/// Bookkeeping for one connection handed out by [`MockTransport`].
#[derive(Debug, Default)]
pub struct MockConnection {
    pub argument: Option<SocketId>,
    pub idle_poll: Option<u8>,
    pub idle_ticks: u8,
    pub remote: Option<SocketAddrV4>,
    pub written: Vec<u8>,
    pub write_flags: Vec<WriteFlags>,
    pub flushes: u32,
    pub rx: Vec<u8>,
    pub closes: u32,
}

/// Scripted transport: tests queue events by hand and inspect every call the
/// client made.
#[derive(Debug)]
pub struct MockTransport {
    pub link_up: bool,
    pub address: Option<Ipv4Addr>,
    pub bring_ups: u32,
    pub fail_open: bool,
    pub fail_connect: bool,
    pub fail_write: bool,
    pub fail_read: bool,
    pub now: u32,
    pub connections: BTreeMap<Handle, MockConnection>,
    /// Calls made with a handle after it was closed.
    pub use_after_close: u32,
    next_handle: Handle,
    queue: VecDeque<Event<Handle, Error>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            link_up: true,
            address: Some(Ipv4Addr::new(10, 0, 0, 2)),
            bring_ups: 0,
            fail_open: false,
            fail_connect: false,
            fail_write: false,
            fail_read: false,
            now: 0,
            connections: BTreeMap::new(),
            use_after_close: 0,
            next_handle: 0,
            queue: VecDeque::new(),
        }
    }
}

impl MockTransport {
    /// The most recently opened handle.
    pub fn last_handle(&self) -> Handle {
        self.next_handle
    }

    pub fn connection(&self, handle: Handle) -> &MockConnection {
        &self.connections[&handle]
    }

    /// Queue an event as the stack would deliver it, tagged with the handle's
    /// registered argument.
    pub fn push(&mut self, handle: Handle, kind: EventKind<Error>) {
        let argument = self
            .connections
            .get(&handle)
            .and_then(|conn| conn.argument)
            .unwrap_or(SocketId(u8::MAX));
        self.queue.push_back(Event {
            handle,
            argument,
            kind,
        });
    }

    /// Make `bytes` readable on `handle` and queue the receive event.
    pub fn respond(&mut self, handle: Handle, bytes: &[u8]) {
        if let Some(conn) = self.connections.get_mut(&handle) {
            conn.rx.extend_from_slice(bytes);
        }
        self.push(handle, EventKind::Received);
    }

    pub fn total_closes(&self) -> u32 {
        self.connections.values().map(|conn| conn.closes).sum()
    }

    fn live(&mut self, handle: Handle) -> Option<&mut MockConnection> {
        match self.connections.get_mut(&handle) {
            Some(conn) if conn.closes == 0 => Some(conn),
            _ => {
                self.use_after_close += 1;
                None
            }
        }
    }
}

impl TransportBinding for MockTransport {
    type Handle = Handle;
    type Error = Error;

    fn bring_up(&mut self) -> Result<(), Error> {
        self.bring_ups += 1;
        Ok(())
    }

    fn link_up(&self) -> bool {
        self.link_up
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    fn open(&mut self) -> Result<Handle, Error> {
        if self.fail_open {
            return Err(Error::Transport(-1));
        }
        self.next_handle += 1;
        self.connections
            .insert(self.next_handle, MockConnection::default());
        Ok(self.next_handle)
    }

    fn set_argument(&mut self, handle: Handle, argument: SocketId) {
        if let Some(conn) = self.live(handle) {
            conn.argument = Some(argument);
        }
    }

    fn set_idle_poll(&mut self, handle: Handle, interval: Option<u8>) {
        if let Some(conn) = self.live(handle) {
            conn.idle_poll = interval;
            conn.idle_ticks = 0;
        }
    }

    fn connect(&mut self, handle: Handle, remote: SocketAddrV4) -> Result<(), Error> {
        let fail = self.fail_connect;
        let conn = self.live(handle).ok_or(Error::ConnectionClosed)?;
        if fail {
            return Err(Error::Transport(-4));
        }
        conn.remote = Some(remote);
        Ok(())
    }

    fn write(&mut self, handle: Handle, bytes: &[u8], flags: WriteFlags) -> Result<(), Error> {
        let fail = self.fail_write;
        let conn = self.live(handle).ok_or(Error::ConnectionClosed)?;
        if fail {
            return Err(Error::Transport(-1));
        }
        conn.written.extend_from_slice(bytes);
        conn.write_flags.push(flags);
        Ok(())
    }

    fn flush(&mut self, handle: Handle) -> Result<(), Error> {
        let conn = self.live(handle).ok_or(Error::ConnectionClosed)?;
        conn.flushes += 1;
        Ok(())
    }

    fn read(&mut self, handle: Handle, buf: &mut [u8]) -> Result<usize, Error> {
        let fail = self.fail_read;
        let conn = self.live(handle).ok_or(Error::ConnectionClosed)?;
        if fail {
            return Err(Error::Transport(-3));
        }
        let len = buf.len().min(conn.rx.len());
        buf[..len].copy_from_slice(&conn.rx[..len]);
        conn.rx.drain(..len);
        Ok(len)
    }

    fn close(&mut self, handle: Handle) -> Result<(), Error> {
        match self.connections.get_mut(&handle) {
            Some(conn) => {
                conn.closes += 1;
                if conn.closes > 1 {
                    return Err(Error::ConnectionClosed);
                }
                Ok(())
            }
            None => Err(Error::ConnectionClosed),
        }
    }

    /// One call is one poll interval: live connections with an idle handler
    /// count it and time out once the registered number of ticks passed.
    fn drive_pending_events(&mut self) {
        let mut expired = Vec::new();
        for (handle, conn) in self.connections.iter_mut() {
            if conn.closes > 0 {
                continue;
            }
            if let Some(interval) = conn.idle_poll {
                conn.idle_ticks = conn.idle_ticks.saturating_add(1);
                if conn.idle_ticks >= interval {
                    conn.idle_ticks = 0;
                    expired.push(*handle);
                }
            }
        }
        for handle in expired {
            self.push(handle, EventKind::Idle);
        }
    }

    fn next_event(&mut self) -> Option<Event<Handle, Error>> {
        let event = self.queue.pop_front()?;
        if let Some(conn) = self.connections.get_mut(&event.handle) {
            if !matches!(event.kind, EventKind::Idle) {
                conn.idle_ticks = 0;
            }
        }
        Some(event)
    }

    fn now(&self) -> u32 {
        self.now
    }
}

/// Callback argument that records every result code it is handed.
pub type Results = Rc<RefCell<Vec<u16>>>;

pub fn record(result: u16, results: Results) {
    results.borrow_mut().push(result);
}

pub fn results() -> Results {
    Rc::new(RefCell::new(Vec::new()))
}
