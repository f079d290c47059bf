//! FluentRouter and the request middleware it installs.
//!
//! - [`router`] - Core `FluentRouter` struct and initialization
//! - [`trailing_slash`] - `301` redirects from `/path/` to `/path`
//! - [`forwarded_for`] - Client address from the forwarded-for header
//! - [`session`] - Cookie sessions that honour maintenance mode
//! - [`features`] - `setup_*` methods for the three hooks above
//! - [`observability`] - Request logging
//! - [`control`] - Panic catching
//! - [`builder`] - Orchestration (setup_middleware, start, router delegation)

pub mod forwarded_for;
pub mod session;
pub mod trailing_slash;

mod builder;
mod control;
mod features;
mod observability;
mod router;

pub use forwarded_for::{ClientAddr, parse_forwarded_for, resolve_client_addr};
pub use router::FluentRouter;
pub use session::{
    MaintenanceAwareSession, MaintenanceAwareSessionLayer, MaintenanceMode, NullStore,
};
pub use trailing_slash::{
    RouteTable, TrailingSlashRedirect, TrailingSlashRedirectLayer, uri_safe_query,
};

#[cfg(test)]
mod tests;
