//! Process-wide transport wrapper.
//!
//! A [`Stack`] owns the [`TransportBinding`] for the whole program. It carries
//! the one-shot bring-up guard that every socket's `init` goes through, the
//! shared [`Config`], and the periodic driver the main loop calls to dispatch
//! transport events into [`ConnectionObserver`]s.
//!
//! ```rust,ignore
//! let mut stack = Stack::new(binding, Config::default());
//! socket.init(&mut stack)?;
//! loop {
//!     socket.drive(&mut stack);
//! }
//! ```

use crate::network::config::Config;
use crate::network::error::Error;
use crate::network::{ConnectionObserver, Event, EventKind, TransportBinding};

/// The transport binding plus its process-wide state.
#[derive(Debug)]
pub struct Stack<T: TransportBinding> {
    transport: T,
    config: Config,
    initialized: bool,
    last_report: Option<u32>,
}

impl<T: TransportBinding> Stack<T> {
    /// Wrap a binding. Nothing is brought up until
    /// [`ensure_initialized`](Stack::ensure_initialized) runs.
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            initialized: false,
            last_report: None,
        }
    }

    /// Bring the transport up the first time this is called; later calls do
    /// nothing. A failed bring-up leaves the guard unset so the next call
    /// retries.
    pub fn ensure_initialized(&mut self) -> Result<(), Error> {
        if self.initialized {
            return Ok(());
        }
        debug!("bringing up transport");
        self.transport.bring_up().map_err(Into::into)?;
        self.initialized = true;
        Ok(())
    }

    /// Whether the transport has been brought up.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The shared configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The wrapped binding.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The wrapped binding, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Pump the transport and dispatch every queued event.
    ///
    /// Call this on every iteration of the main loop. Each event goes to the
    /// observer whose [`argument`](ConnectionObserver::argument) matches the
    /// one registered on the event's handle; events nobody claims are dropped.
    pub fn drive(&mut self, observers: &mut [&mut dyn ConnectionObserver<T>]) {
        self.transport.drive_pending_events();

        while let Some(event) = self.transport.next_event() {
            match observers
                .iter_mut()
                .find(|observer| observer.argument() == event.argument)
            {
                Some(observer) => Self::dispatch(&mut self.transport, &mut **observer, event),
                None => warn!("dropping event for unknown socket {}", event.argument.0),
            }
        }

        self.report();
    }

    fn dispatch(
        transport: &mut T,
        observer: &mut dyn ConnectionObserver<T>,
        event: Event<T::Handle, T::Error>,
    ) {
        let handle = event.handle;
        match event.kind {
            EventKind::Connected => observer.on_connected(transport, handle),
            EventKind::Sent(len) => observer.on_sent(transport, handle, len),
            EventKind::Received => observer.on_received(transport, handle),
            EventKind::RemoteClosed => observer.on_remote_closed(transport, handle),
            EventKind::Error(err) => observer.on_error(transport, handle, err.into()),
            EventKind::Idle => observer.on_idle(transport, handle),
        }
    }

    /// Rate-limited diagnostic line with the local address and uptime.
    fn report(&mut self) {
        let interval = self.config.report_interval_ms;
        if interval == 0 {
            return;
        }
        let now = self.transport.now();
        if let Some(last) = self.last_report {
            if now.wrapping_sub(last) < interval {
                return;
            }
        }
        self.last_report = Some(now);

        let ip = self
            .transport
            .local_address()
            .map(|addr| addr.octets())
            .unwrap_or([0; 4]);
        info!(
            "ip {}.{}.{}.{} link {} uptime {} ms",
            ip[0],
            ip[1],
            ip[2],
            ip[3],
            self.transport.link_up(),
            now
        );
    }

    #[cfg(test)]
    pub(crate) fn last_report(&self) -> Option<u32> {
        self.last_report
    }
}
