//! The collaborator contract for the HTTP request the engine evaluates.
//!
//! The HTTP listener and TLS termination are out of scope for this crate
//! (see spec §1); they hand the evaluator a small, read-only view of the
//! request instead.

/// Minimal read-only view of an inbound HTTP request.
///
/// Implement this over your own request type (e.g. a `hyper::Request` or
/// framework-specific type) rather than converting into `SimpleRequest`
/// when avoidable.
pub trait Request {
    /// Uppercase HTTP method token, e.g. "GET".
    fn method(&self) -> &str;

    /// First value of the named header, if present. Implementations
    /// should perform case-insensitive name lookup.
    fn header(&self, name: &str) -> Option<&str>;

    /// Remote socket address in `host:port` form.
    fn remote_addr(&self) -> &str;

    /// The request path being served, e.g. "/payload".
    fn path(&self) -> &str;

    /// Lowercase 32-hex-char JA3 fingerprint of the TLS ClientHello, if the
    /// listener captured TLS fingerprinting information.
    fn ja3(&self) -> Option<&str>;
}

/// A concrete, owned `Request` implementation for tests and for callers
/// who don't already have their own request type wired up to the trait.
#[derive(Debug, Clone, Default)]
pub struct SimpleRequest {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub remote_addr: String,
    pub path: String,
    pub ja3: Option<String>,
}

impl SimpleRequest {
    /// Create a request for the given method and path, all other fields
    /// empty.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the remote address (`host:port`).
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = addr.into();
        self
    }

    /// Add a header. Does not deduplicate; first match wins on lookup.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the JA3 fingerprint.
    pub fn with_ja3(mut self, ja3: impl Into<String>) -> Self {
        self.ja3 = Some(ja3.into());
        self
    }
}

impl Request for SimpleRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn ja3(&self) -> Option<&str> {
        self.ja3.as_deref()
    }
}

/// Client identity: the request's remote address with the port stripped.
///
/// If the address doesn't parse as `host:port` (e.g. malformed or empty),
/// the raw string is used as the key verbatim.
pub fn client_identity(remote_addr: &str) -> String {
    if let Ok(addr) = remote_addr.parse::<std::net::SocketAddr>() {
        return addr.ip().to_string();
    }
    // "[::1]:54321" with a SocketAddr parse failure (shouldn't happen, but
    // handled defensively) or a bracketed address with no port.
    if let Some(stripped) = remote_addr
        .strip_prefix('[')
        .and_then(|s| s.rfind(']').map(|end| &s[..end]))
    {
        return stripped.to_string();
    }
    match remote_addr.rfind(':') {
        Some(idx) if remote_addr[..idx].parse::<std::net::IpAddr>().is_ok() => {
            remote_addr[..idx].to_string()
        }
        // Ambiguous (e.g. a bare IPv6 address with no brackets/port, or no
        // colon at all) -- only split when what remains before the last
        // colon is itself a valid IP. Otherwise keep the raw string.
        _ => remote_addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_identity_ipv4() {
        assert_eq!(client_identity("127.0.0.1:54321"), "127.0.0.1");
    }

    #[test]
    fn test_client_identity_ipv6_bracketed() {
        assert_eq!(client_identity("[::1]:54321"), "::1");
    }

    #[test]
    fn test_client_identity_no_port() {
        assert_eq!(client_identity("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_client_identity_malformed() {
        assert_eq!(client_identity("not-an-address"), "not-an-address");
    }

    #[test]
    fn test_simple_request_header_case_insensitive() {
        let req = SimpleRequest::new("GET", "/").with_header("X-Test", "value");
        assert_eq!(req.header("x-test"), Some("value"));
        assert_eq!(req.header("X-TEST"), Some("value"));
    }
}
