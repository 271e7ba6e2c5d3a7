use criterion::{BatchSize, Criterion, Throughput};
use nbhttp::network::application::http::request::host_string;
use nbhttp::network::application::http::{
    HeaderBlock, Method, Request, RequestSocket, parse_status_line,
};
use nbhttp::network::config::Config;
use nbhttp::network::error::Error;
use nbhttp::network::stack::Stack;
use nbhttp::network::{Event, EventKind, SocketId, TransportBinding, WriteFlags};
use std::collections::VecDeque;
use std::hint::black_box;
use std::net::{Ipv4Addr, SocketAddrV4};

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{}";

/// Transport that connects instantly and answers every request with
/// [`RESPONSE`].
#[derive(Default)]
struct InstantTransport {
    next_handle: u32,
    events: VecDeque<Event<u32, Error>>,
}

impl TransportBinding for InstantTransport {
    type Handle = u32;
    type Error = Error;

    fn bring_up(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn link_up(&self) -> bool {
        true
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 168, 1, 2))
    }

    fn open(&mut self) -> Result<u32, Error> {
        self.next_handle = self.next_handle.wrapping_add(1);
        Ok(self.next_handle)
    }

    fn set_argument(&mut self, _handle: u32, _argument: SocketId) {}

    fn set_idle_poll(&mut self, _handle: u32, _interval: Option<u8>) {}

    fn connect(&mut self, handle: u32, _remote: SocketAddrV4) -> Result<(), Error> {
        self.events.push_back(Event {
            handle,
            argument: SocketId(0),
            kind: EventKind::Connected,
        });
        Ok(())
    }

    fn write(&mut self, handle: u32, bytes: &[u8], _flags: WriteFlags) -> Result<(), Error> {
        black_box(bytes);
        self.events.push_back(Event {
            handle,
            argument: SocketId(0),
            kind: EventKind::Sent(bytes.len() as u16),
        });
        self.events.push_back(Event {
            handle,
            argument: SocketId(0),
            kind: EventKind::Received,
        });
        Ok(())
    }

    fn flush(&mut self, _handle: u32) -> Result<(), Error> {
        Ok(())
    }

    fn read(&mut self, _handle: u32, buf: &mut [u8]) -> Result<usize, Error> {
        let len = buf.len().min(RESPONSE.len());
        buf[..len].copy_from_slice(&RESPONSE[..len]);
        Ok(len)
    }

    fn close(&mut self, _handle: u32) -> Result<(), Error> {
        Ok(())
    }

    fn drive_pending_events(&mut self) {}

    fn next_event(&mut self) -> Option<Event<u32, Error>> {
        self.events.pop_front()
    }

    fn now(&self) -> u32 {
        0
    }
}

fn ignore(_result: u16, _arg: ()) {}

pub fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let host = host_string(Ipv4Addr::new(192, 168, 1, 20));
    let payload = br#"{"temperature":23.5,"humidity":41}"#;
    let mut headers: HeaderBlock<128> = HeaderBlock::new();
    headers.push("Content-Type", "application/json").unwrap();
    headers.content_length(payload.len()).unwrap();
    let request = Request::new(Method::Post, "/api/telemetry")
        .with_headers(headers.as_str())
        .with_payload(payload);

    group.throughput(Throughput::Bytes(request.encoded_len(&host) as u64));
    group.bench_function("post_json", |b| {
        let mut buf: heapless::Vec<u8, 512> = heapless::Vec::new();
        b.iter(|| {
            black_box(&request).encode_into(&host, &mut buf).unwrap();
            black_box(&buf);
        })
    });
    group.finish();
}

pub fn bench_parse_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_status");
    group.bench_function("valid", |b| {
        b.iter(|| parse_status_line(black_box(RESPONSE)))
    });
    group.bench_function("malformed", |b| {
        b.iter(|| parse_status_line(black_box(b"HTTP/1.1 2x0 Broken\r\n")))
    });
    group.finish();
}

pub fn bench_exchange(c: &mut Criterion) {
    let mut group = c.benchmark_group("exchange");
    group.throughput(Throughput::Elements(1));
    group.bench_function("get_round_trip", |b| {
        b.iter_batched_ref(
            || {
                let mut stack = Stack::new(InstantTransport::default(), Config::default());
                let mut socket: RequestSocket<InstantTransport, ()> =
                    RequestSocket::new(SocketId(0), ignore);
                socket.set_target(Ipv4Addr::new(192, 168, 1, 20), 80);
                socket.init(&mut stack).unwrap();
                (stack, socket)
            },
            |(stack, socket)| {
                socket
                    .issue_request(stack, &Request::new(Method::Get, "/status"), ())
                    .unwrap();
                socket.drive(stack);
                black_box(socket.last_outcome());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}
