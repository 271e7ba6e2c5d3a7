use crate::network::error::Error;
use base64ct::{Base64, Encoding};
use core::fmt::Write as _;
use core::net::Ipv4Addr;
use heapless::{String, Vec};

const VERSION_AND_HOST: &[u8] = b" HTTP/1.1\r\nHost: ";
const CRLF: &[u8] = b"\r\n";

/// Longest dotted-decimal IPv4 address, `255.255.255.255`.
pub const MAX_HOST_LEN: usize = 15;

const MAX_CREDENTIALS_LEN: usize = 128;
const MAX_CREDENTIALS_B64_LEN: usize = (MAX_CREDENTIALS_LEN + 2) / 3 * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

/// Dotted-decimal form of `addr`, used as the `Host` header value.
pub fn host_string(addr: Ipv4Addr) -> String<MAX_HOST_LEN> {
    let mut host = String::new();
    let [a, b, c, d] = addr.octets();
    // 15 bytes always fit
    let _ = write!(host, "{}.{}.{}.{}", a, b, c, d);
    host
}

/// One HTTP request, borrowed for the duration of the call that issues it.
///
/// `headers` is a caller-formatted block of `Name: value` lines separated by
/// `\r\n`, without a trailing line break; [`HeaderBlock`] builds one. The
/// encoded form is
///
/// ```text
/// METHOD PATH HTTP/1.1\r\nHost: HOST\r\nHEADERS\r\n\r\nPAYLOAD\r\n
/// ```
///
/// where an empty header block contributes no line of its own.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
    pub headers: &'a str,
    pub payload: &'a [u8],
}

impl<'a> Request<'a> {
    /// A request with no headers and no payload.
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            headers: "",
            payload: &[],
        }
    }

    pub fn with_headers(mut self, headers: &'a str) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = payload;
        self
    }

    /// Reject paths and header blocks that would corrupt the request framing.
    pub fn validate(&self) -> Result<(), Error> {
        if self.path.is_empty()
            || self
                .path
                .bytes()
                .any(|b| b == b' ' || b == b'\r' || b == b'\n')
        {
            return Err(Error::InvalidPath);
        }

        let headers = self.headers.as_bytes();
        if headers.starts_with(CRLF)
            || headers.ends_with(b"\r")
            || headers.ends_with(b"\n")
            || find_slice(headers, b"\r\n\r\n").is_some()
        {
            return Err(Error::InvalidHeader);
        }
        Ok(())
    }

    /// Exact number of bytes [`encode_into`](Request::encode_into) writes for
    /// `host`, computed without writing anything.
    pub fn encoded_len(&self, host: &str) -> usize {
        let headers = if self.headers.is_empty() {
            0
        } else {
            self.headers.len() + CRLF.len()
        };

        self.method.as_str().len()
            + 1
            + self.path.len()
            + VERSION_AND_HOST.len()
            + host.len()
            + CRLF.len()
            + headers
            + CRLF.len()
            + self.payload.len()
            + CRLF.len()
    }

    /// Write the wire form into `buf`, replacing its contents.
    ///
    /// The length is measured first and must be strictly below `N`; an
    /// oversize request leaves `buf` untouched.
    pub fn encode_into<const N: usize>(&self, host: &str, buf: &mut Vec<u8, N>) -> Result<usize, Error> {
        let required = self.encoded_len(host);
        if required >= N {
            return Err(Error::RequestTooLarge {
                required,
                capacity: N,
            });
        }

        buf.clear();
        let mut put = |bytes: &[u8]| buf.extend_from_slice(bytes).map_err(|_| Error::WriteError);

        put(self.method.as_str().as_bytes())?;
        put(b" ")?;
        put(self.path.as_bytes())?;
        put(VERSION_AND_HOST)?;
        put(host.as_bytes())?;
        put(CRLF)?;
        if !self.headers.is_empty() {
            put(self.headers.as_bytes())?;
            put(CRLF)?;
        }
        put(CRLF)?;
        put(self.payload)?;
        put(CRLF)?;

        Ok(required)
    }
}

/// Builder for the caller header block of a [`Request`].
///
/// ```rust
/// use nbhttp::network::application::http::{HeaderBlock, Method, Request};
///
/// let mut headers: HeaderBlock<128> = HeaderBlock::new();
/// headers.push("Content-Type", "application/json").unwrap();
/// headers.content_length(2).unwrap();
///
/// let request = Request::new(Method::Post, "/api/data")
///     .with_headers(headers.as_str())
///     .with_payload(b"{}");
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderBlock<const N: usize> {
    block: String<N>,
}

impl<const N: usize> HeaderBlock<N> {
    pub fn new() -> Self {
        Self { block: String::new() }
    }

    /// Append a `name: value` line.
    pub fn push(&mut self, name: &str, value: &str) -> Result<(), Error> {
        if name.is_empty()
            || name.bytes().any(|b| b == b':' || b.is_ascii_whitespace() || b.is_ascii_control())
            || value.bytes().any(|b| b == b'\r' || b == b'\n')
        {
            return Err(Error::InvalidHeader);
        }

        let extra = if self.block.is_empty() { 0 } else { CRLF.len() };
        if self.block.len() + extra + name.len() + 2 + value.len() > N {
            return Err(Error::InvalidHeader);
        }

        if !self.block.is_empty() {
            self.push_raw("\r\n")?;
        }
        self.push_raw(name)?;
        self.push_raw(": ")?;
        self.push_raw(value)
    }

    /// Append a `Content-Length` line.
    pub fn content_length(&mut self, len: usize) -> Result<(), Error> {
        let mut digits: String<20> = String::new();
        write!(digits, "{}", len).map_err(|_| Error::InvalidHeader)?;
        self.push("Content-Length", &digits)
    }

    /// Append an `Authorization: Basic` line for `user:password`.
    pub fn basic_auth(&mut self, user: &str, password: &str) -> Result<(), Error> {
        let mut credentials: String<MAX_CREDENTIALS_LEN> = String::new();
        credentials.push_str(user).map_err(|_| Error::InvalidHeader)?;
        credentials.push(':').map_err(|_| Error::InvalidHeader)?;
        credentials.push_str(password).map_err(|_| Error::InvalidHeader)?;

        let mut encoded = [0u8; MAX_CREDENTIALS_B64_LEN];
        let token = Base64::encode(credentials.as_bytes(), &mut encoded).map_err(|_| Error::InvalidHeader)?;

        let mut value: String<{ MAX_CREDENTIALS_B64_LEN + 6 }> = String::new();
        value.push_str("Basic ").map_err(|_| Error::InvalidHeader)?;
        value.push_str(token).map_err(|_| Error::InvalidHeader)?;
        self.push("Authorization", &value)
    }

    pub fn as_str(&self) -> &str {
        &self.block
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn clear(&mut self) {
        self.block.clear();
    }

    fn push_raw(&mut self, s: &str) -> Result<(), Error> {
        self.block.push_str(s).map_err(|_| Error::InvalidHeader)
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
pub(crate) fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
