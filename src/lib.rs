//! # site-middleware
//!
//! Request middleware for Axum web applications that sit behind a proxy:
//!
//! - **Trailing slash redirects**: `GET /docs/files/` answers `301` to `/docs/files`
//!   when that route exists, instead of a `404`.
//! - **Client address**: the first entry of `X-Forwarded-For` becomes the
//!   request's [`ClientAddr`].
//! - **Maintenance-aware sessions**: cookie sessions that persist nothing while
//!   the site is in maintenance mode.
//!
//! All of it is configured through simple TOML.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::routing::get;
//! use site_middleware::{ClientAddr, Config, Result, FluentRouter};
//!
//! async fn hello(ClientAddr(ip): ClientAddr) -> String {
//!     format!("Hello, {ip}!")
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default();  // Loads from config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     FluentRouter::without_state(config)?
//!         .route("/hello", get(hello))
//!         .setup_middleware()?
//!         .start()
//!         .await
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! maintenance_mode = false
//!
//! [http]
//! bind_port = 3000
//! trailing_slash = "redirect"
//!
//! [http.forwarded_for]
//! header = "x-forwarded-for"
//!
//! [session]
//! cookie_name = "sessionid"
//! ```
//!
//! Run with `RUST_ENV=dev cargo run`.
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Configuration loading and validation ([`Config`]) |
//! | `fluent` | Router builder and middleware ([`FluentRouter`]) |
//! | `error` | Error types and handling ([`Error`]) |
//! | `utils` | Environment substitution ([`replace_handlebars_with_env`]) |
//!
//! # Configuration
//!
//! Configuration can be loaded from TOML files, strings, or built programmatically:
//!
//! ```rust
//! use site_middleware::{Config, TrailingSlash};
//!
//! // From string (useful for tests)
//! let config: Config = r#"
//!     maintenance_mode = true
//!     [http]
//!     bind_port = 3000
//! "#.parse().unwrap();
//! assert!(config.maintenance_mode);
//!
//! // With builder methods
//! let config = config
//!     .with_bind_port(8080)
//!     .with_trailing_slash(TrailingSlash::Off)
//!     .with_maintenance_mode(false);
//! ```
//!
//! # Maintenance Mode
//!
//! ```rust,no_run
//! use axum::routing::get;
//! use tower_sessions::Session;
//! # use site_middleware::{Config, FluentRouter, Result};
//!
//! async fn visit(session: Session) -> String {
//!     // `None` while in maintenance mode, even with a session cookie
//!     format!("{:?}", session.id())
//! }
//!
//! # async fn example() -> Result<()> {
//! let router = FluentRouter::without_state(Config::default())?
//!     .route("/visit", get(visit))
//!     .setup_middleware()?;
//!
//! let maintenance = router.maintenance_mode();
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     maintenance.set(true);
//! });
//!
//! router.start().await
//! # }
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type. Errors convert to structured JSON responses:
//!
//! ```json
//! {
//!   "error_code": "INTERNAL_ERROR",
//!   "message": "Client address unavailable. Is the forwarded-for middleware enabled?"
//! }
//! ```
//!
//! # Middleware Control
//!
//! Enable or disable specific middleware:
//!
//! ```toml
//! [http]
//! exclude = ["trailing-slash", "logging"]
//! ```
mod config;
mod error;
mod fluent;
mod utils;

pub use config::*;
pub use error::*;
pub use fluent::*;
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
