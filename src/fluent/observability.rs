//! Request logging middleware.

use super::{forwarded_for::ClientAddr, router::FluentRouter};
use crate::HttpMiddleware;

use {
    axum::body::Body,
    http::Request,
    tower_http::trace::TraceLayer as TowerHTTPLayer,
};

impl<State> FluentRouter<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Sets up HTTP request/response logging middleware.
    ///
    /// Adds structured tracing for all HTTP requests, logging:
    /// - Request method and URI
    /// - Response status code
    /// - Request duration
    /// - Client address, as resolved by [`FluentRouter::setup_forwarded_for`]
    ///
    /// The client address is only known when the forwarded-for layer wraps this
    /// one, which is the order `setup_middleware()` uses. Log output format is
    /// controlled by the `logging.format` configuration.
    #[must_use]
    pub fn setup_logging(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Logging) {
            return self;
        }

        self.inner = self
            .inner
            .layer(
                TowerHTTPLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let client_addr = request
                        .extensions()
                        .get::<ClientAddr>()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "unknown".to_string());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        client_addr = %client_addr,
                    )
                }),
            );

        self
    }
}
