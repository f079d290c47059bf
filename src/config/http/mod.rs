mod middleware;

pub use middleware::*;

use {
    crate::{Error, Result},
    http::HeaderName,
    serde::Deserialize,
    std::time::Duration,
};

/// How requests whose path ends in `/` are treated.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// When a path with a trailing slash is not found but the same path without
    /// it is a known route, answer with `301 Moved Permanently` to that path.
    #[default]
    Redirect,
    /// Leave trailing slashes alone.
    Off,
}

///
/// Configuration for deriving the client address from a proxy header.
///
#[derive(Debug, Clone, Deserialize)]
pub struct HttpForwardedForConfig {
    /// Whether the forwarded header is trusted at all. When false the client
    /// address is always the socket peer address.
    /// By default `enabled` is true.
    #[serde(default = "HttpForwardedForConfig::default_enabled")]
    pub enabled: bool,

    /// Name of the header listing the client and proxy addresses.
    /// By default `header` is "x-forwarded-for".
    #[serde(default = "HttpForwardedForConfig::default_header")]
    pub header: String,
}

impl HttpForwardedForConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_header() -> String {
        "x-forwarded-for".into()
    }

    /// Returns the configured header as a `HeaderName`.
    pub fn header_name(&self) -> Result<HeaderName> {
        HeaderName::from_bytes(self.header.trim().as_bytes()).map_err(|_| {
            Error::invalid_input(format!(
                "[http.forwarded_for] header {:?} is not a valid HTTP header name",
                self.header
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.header_name().map(|_| ())
    }
}

impl Default for HttpForwardedForConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            header: Self::default_header(),
        }
    }
}

///
/// Configuration for the HTTP server
///
/// Covers the binding address and port, shutdown behaviour and the settings
/// of the request middleware.
///
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// IP address to bind the HTTP server to
    /// The default `bind_addr` is "127.0.0.1".
    #[serde(default = "HttpConfig::default_bind_addr")]
    pub bind_addr: String,

    /// Port to bind the HTTP server to
    /// The default `bind_port` is 3000.
    #[serde(default = "HttpConfig::default_bind_port")]
    pub bind_port: u16,

    /// Maximum time to wait for graceful shutdown to complete.
    /// After this timeout, the server will force shutdown.
    /// By default `shutdown_timeout` is set to 30 seconds.
    #[serde(
        default = "HttpConfig::default_shutdown_timeout",
        with = "humantime_serde"
    )]
    pub shutdown_timeout: Duration,

    /// Trailing slash handling. By default `trailing_slash` is "redirect".
    #[serde(default)]
    pub trailing_slash: TrailingSlash,

    /// Client address extraction from a forwarded-for header.
    #[serde(default)]
    pub forwarded_for: HttpForwardedForConfig,

    #[serde(flatten)]
    pub middleware: Option<HttpMiddlewareConfig>,
}

impl HttpConfig {
    ///
    /// Returns the full bind address as a string in the format "IP:PORT".
    ///
    pub fn full_bind_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    fn default_bind_addr() -> String {
        "127.0.0.1".into()
    }

    fn default_bind_port() -> u16 {
        3000
    }

    fn default_shutdown_timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(Error::invalid_input(
                "HTTP bind_addr is required. Set [http] bind_addr = \"0.0.0.0\" or \"127.0.0.1\" in config.",
            ));
        }

        if self.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(Error::invalid_input(
                "HTTP bind_addr must be a valid IP address. Examples: \"127.0.0.1\", \"0.0.0.0\", \"::1\"",
            ));
        }

        self.forwarded_for.validate()?;

        if let Some(middleware_config) = &self.middleware {
            middleware_config.validate()?;
        }

        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind_addr: Self::default_bind_addr(),
            bind_port: Self::default_bind_port(),
            shutdown_timeout: Self::default_shutdown_timeout(),
            trailing_slash: TrailingSlash::default(),
            forwarded_for: HttpForwardedForConfig::default(),
            middleware: None,
        }
    }
}
