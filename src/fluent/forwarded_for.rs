//! Client address extraction.
//!
//! Behind a proxy the socket peer is the proxy itself, the real client is the
//! first entry of the forwarded-for header. The address picked here is stored in
//! the request extensions as [`ClientAddr`].

use crate::Error;
use axum::extract::{ConnectInfo, FromRequestParts, OptionalFromRequestParts};
use http::{Extensions, HeaderMap, HeaderName, request::Parts};
use std::{
    convert::Infallible,
    fmt,
    net::{IpAddr, SocketAddr},
};

/// The address of the client that made the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientAddr(pub IpAddr);

impl ClientAddr {
    pub fn ip(&self) -> IpAddr {
        self.0
    }
}

impl fmt::Display for ClientAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<IpAddr> for ClientAddr {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

/// Parses a single address as found in a forwarded-for list.
///
/// Accepts bare addresses (`1.2.3.4`, `::1`), addresses with a port
/// (`1.2.3.4:80`, `[::1]:80`) and bracketed IPv6 without a port (`[::1]`).
fn parse_forwarded_addr(entry: &str) -> Option<IpAddr> {
    if let Ok(ip) = entry.parse::<IpAddr>() {
        return Some(ip);
    }
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    entry
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.parse::<IpAddr>().ok())
}

/// Returns the client address carried by a forwarded-for header value.
///
/// Only the first comma separated entry is considered: that is the address the
/// first proxy saw. Surrounding whitespace is ignored.
///
/// ```
/// use site_middleware::parse_forwarded_for;
/// use std::net::IpAddr;
///
/// let ip: IpAddr = "3.3.3.3".parse().unwrap();
/// assert_eq!(parse_forwarded_for("3.3.3.3, 4.4.4.4"), Some(ip));
/// assert_eq!(parse_forwarded_for("unknown"), None);
/// ```
pub fn parse_forwarded_for(value: &str) -> Option<IpAddr> {
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    parse_forwarded_addr(first)
}

/// Determines the client address of a request.
///
/// When `header` is given and present with a usable first entry, that entry wins.
/// Otherwise the socket peer address recorded by axum's `ConnectInfo` is used.
/// Returns `None` when neither is available.
pub fn resolve_client_addr(
    headers: &HeaderMap,
    extensions: &Extensions,
    header: Option<&HeaderName>,
) -> Option<ClientAddr> {
    if let Some(header) = header
        && let Some(value) = headers.get(header)
    {
        match value.to_str().ok().and_then(parse_forwarded_for) {
            Some(ip) => return Some(ClientAddr(ip)),
            None => tracing::debug!(
                header = %header,
                value = ?value,
                "Ignoring forwarded header without a valid client address"
            ),
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| ClientAddr(addr.ip()))
}

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ClientAddr>().copied().ok_or_else(|| {
            Error::internal(
                "Client address unavailable. Is the forwarded-for middleware enabled?",
            )
        })
    }
}

impl<S> OptionalFromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<ClientAddr>().copied())
    }
}
