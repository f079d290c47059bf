//! Request hooks: trailing slash redirects, client address and sessions.

use super::{
    forwarded_for::resolve_client_addr, router::FluentRouter,
    session::MaintenanceAwareSessionLayer, trailing_slash::TrailingSlashRedirectLayer,
};
use crate::{HttpMiddleware, Result, TrailingSlash};

use axum::{body::Body, middleware::Next};
use http::Request;

impl<State> FluentRouter<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Sets up trailing slash redirects.
    ///
    /// A `GET` or `HEAD` request for `/path/` that would produce a `404` is answered
    /// with `301 Moved Permanently` and `Location: /path` when `/path` is a known
    /// route. The query string is carried over, percent-encoded where needed:
    /// - `/en-US/docs/files/?xxx=Ã` → `/en-US/docs/files?xxx=%C3%83`
    /// - `/en-US/ohnoez/` → `404` (no route `/en-US/ohnoez`)
    ///
    /// Must be called after the routes have been added, since `axum` layers only
    /// wrap routes that already exist.
    ///
    /// # Configuration
    ///
    /// ```toml
    /// [http]
    /// trailing_slash = "redirect"  # Default, or "off"
    /// ```
    #[must_use]
    pub fn setup_trailing_slash(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::TrailingSlash)
            || self.config.http.trailing_slash == TrailingSlash::Off
        {
            return self;
        }

        self.inner = self
            .inner
            .layer(TrailingSlashRedirectLayer::new(self.routes.clone()));
        self
    }

    /// Sets up client address extraction.
    ///
    /// Records a [`crate::ClientAddr`] in the request extensions. The first entry of
    /// the forwarded-for header is used when present and valid:
    /// - `X-Forwarded-For: 1.1.1.1` → `1.1.1.1`
    /// - `X-Forwarded-For: 3.3.3.3, 4.4.4.4` → `3.3.3.3`
    ///
    /// Otherwise the socket peer address is used, when the server was started with
    /// connect info (as [`FluentRouter::start`] does).
    ///
    /// # Configuration
    ///
    /// ```toml
    /// [http.forwarded_for]
    /// enabled = true             # Default
    /// header = "x-forwarded-for" # Default
    /// ```
    pub fn setup_forwarded_for(mut self) -> Result<Self> {
        if !self.is_middleware_enabled(HttpMiddleware::ForwardedFor) {
            return Ok(self);
        }

        let forwarded_for = &self.config.http.forwarded_for;
        let header = if forwarded_for.enabled {
            Some(forwarded_for.header_name()?)
        } else {
            None
        };

        self.inner = self.inner.layer(axum::middleware::from_fn(
            move |mut req: Request<Body>, next: Next| {
                let header = header.clone();
                async move {
                    if let Some(addr) =
                        resolve_client_addr(req.headers(), req.extensions(), header.as_ref())
                    {
                        req.extensions_mut().insert(addr);
                    }
                    next.run(req).await
                }
            },
        ));
        Ok(self)
    }

    /// Sets up cookie sessions that honour maintenance mode.
    ///
    /// Handlers extract a `tower_sessions::Session` as usual. While maintenance
    /// mode is on the session has no key, the session cookie is ignored and the
    /// response is not touched, so nothing is persisted.
    ///
    /// # Configuration
    ///
    /// ```toml
    /// maintenance_mode = false
    ///
    /// [session]
    /// cookie_name = "sessionid"
    /// secure = false
    /// same_site = "lax"
    /// inactivity_timeout = "1h"
    /// ```
    pub fn setup_session_handling(mut self) -> Result<Self> {
        if !self.is_middleware_enabled(HttpMiddleware::Session) {
            return Ok(self);
        }

        let layer =
            MaintenanceAwareSessionLayer::new(&self.config.session, self.maintenance.clone())?;
        self.inner = self.inner.layer(layer);
        Ok(self)
    }
}
