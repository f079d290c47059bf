//! Orchestration and router delegation: setup_middleware(), start(), layer(), route(), etc.

use super::router::FluentRouter;
use crate::Result;

use {
    axum::{Router, body::Body, routing::Route},
    http::Request,
    std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration},
    tokio::{net::TcpListener, signal, sync::Notify},
    tower::{Layer, Service},
};

impl<State> FluentRouter<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Sets up all standard middleware layers in the correct order.
    ///
    /// Call this after all routes have been added: the trailing slash redirect only
    /// wraps routes that exist when it is installed.
    ///
    /// # Middleware Order
    ///
    /// The **last layer added is the outermost layer** and executes **first** on
    /// incoming requests. From innermost to outermost:
    /// 1. **Trailing slash redirect** - Turns 404s for `/path/` into redirects
    /// 2. **Sessions** - Cookie sessions, detached in maintenance mode
    /// 3. **Logging** - Request span with the client address
    /// 4. **Forwarded-for** - Resolves the client address before logging
    /// 5. **Panic catching** - Catch ALL panics from inner layers (outermost)
    ///
    /// Individual layers can be turned off with `[http] exclude = [...]`.
    ///
    /// ```rust,no_run
    /// use axum::routing::get;
    /// # use site_middleware::{Config, FluentRouter, Result};
    /// # async fn example() -> Result<()> {
    /// FluentRouter::without_state(Config::default())?
    ///     .route("/en-US/docs/files", get(|| async { "files" }))
    ///     .setup_middleware()?
    ///     .start()
    ///     .await
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the forwarded header name or the session configuration
    /// is invalid.
    pub fn setup_middleware(self) -> Result<Self> {
        // Output the current version of the service
        const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
        const VERSION: &str = env!("CARGO_PKG_VERSION");
        tracing::info!("Starting {PACKAGE_NAME} version {VERSION}...");
        tracing::debug!(routes = ?self.routes, "Known routes");

        // Middleware is added from innermost to outermost
        let router = self
            .setup_trailing_slash() // 1. Innermost - sees the router's 404s
            .setup_session_handling()? // 2. Sessions
            .setup_logging() // 3. Request/response logging
            .setup_forwarded_for()? // 4. Client address, before the log span is made
            .setup_catch_panic(); // 5. Outermost - panic recovery

        Ok(router)
    }

    /// Starts the HTTP server based on the current configuration.
    ///
    /// Binds to `http.bind_addr:http.bind_port` and serves until SIGTERM or
    /// SIGINT. In-flight requests then get up to `http.shutdown_timeout` to finish.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.http.full_bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Bound to {}", &bind_addr);
        self.start_with_listener(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// Useful in tests, where binding to port `0` gives an ephemeral port.
    pub async fn start_with_listener(self, listener: TcpListener) -> Result<()> {
        tracing::info!("Waiting for connections");
        if self.maintenance.is_enabled() {
            tracing::warn!("Serving in maintenance mode");
        }

        let service = self
            .inner
            .with_state(self.state)
            .into_make_service_with_connect_info::<SocketAddr>();

        let shutdown_timeout = self.config.http.shutdown_timeout;
        let shutdown_started = Arc::new(Notify::new());

        let serve_future = axum::serve(listener, service)
            .with_graceful_shutdown(shutdown_signal(shutdown_timeout, shutdown_started.clone()));

        // The timeout only starts once a shutdown signal was received
        tokio::select! {
            result = serve_future => {
                tracing::info!("Graceful shutdown completed");
                result?;
            }
            _ = async {
                shutdown_started.notified().await;
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                tracing::warn!("Graceful shutdown timeout expired, forcing shutdown");
            }
        }

        Ok(())
    }

    /// Adds a custom Tower middleware layer to the router.
    ///
    /// This is a low-level method that forwards to `axum::Router::layer()`,
    /// allowing you to add custom middleware that isn't provided by the library.
    ///
    /// ```rust,no_run
    /// use tower_http::trace::TraceLayer;
    /// # use site_middleware::{Config, FluentRouter};
    /// # fn example() -> site_middleware::Result<()> {
    ///
    /// let router = FluentRouter::without_state(Config::default())?
    ///     .layer(TraceLayer::new_for_http());
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request<Body>> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request<Body>>>::Response: axum::response::IntoResponse + 'static,
        <L::Service as Service<Request<Body>>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request<Body>>>::Future: Send + 'static,
    {
        self.inner = self.inner.layer(layer);
        self
    }

    /// Adds a new route to the router at the specified path.
    ///
    /// The path is recorded in the route table, so `path/` redirects to it.
    ///
    /// ```
    /// use site_middleware::{Config, FluentRouter};
    /// use axum::routing::get;
    ///
    /// async fn handler() -> &'static str {
    ///     "Hello, World!"
    /// }
    ///
    /// # async fn example() {
    /// let config = Config::default();
    /// let router = FluentRouter::without_state(config)
    ///     .unwrap()
    ///     .route("/hello", get(handler))
    ///     .into_inner();
    /// # }
    /// ```
    #[must_use]
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter<State>) -> Self {
        self.routes.insert(path);
        self.inner = self.inner.route(path, route);
        self
    }

    /// Adds a middleware layer that only applies to routes, not the fallback.
    ///
    /// Forwards to `axum::Router::route_layer()`.
    #[must_use]
    pub fn route_layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request<Body>> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request<Body>>>::Response: axum::response::IntoResponse + 'static,
        <L::Service as Service<Request<Body>>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request<Body>>>::Future: Send + 'static,
    {
        self.inner = self.inner.route_layer(layer);
        self
    }

    /// Nests another router at a specific path prefix.
    ///
    /// Every path below `path` is treated as known by the trailing slash
    /// redirect, since the nested router cannot be inspected.
    ///
    /// ```rust,no_run
    /// use axum::{Router, routing::get};
    /// # use site_middleware::{Config, FluentRouter};
    /// # fn example() -> site_middleware::Result<()> {
    ///
    /// let api_v1 = Router::new()
    ///     .route("/users", get(|| async { "users" }));
    ///
    /// let app = FluentRouter::without_state(Config::default())?
    ///     .nest("/api/v1", api_v1);  // Routes at /api/v1/users
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn nest(mut self, path: &str, router: Router<State>) -> Self {
        self.routes.insert_nested(path);
        self.inner = self.inner.nest(path, router);
        self
    }

    /// Nests a Tower service at a specific path prefix.
    #[must_use]
    pub fn nest_service<T>(mut self, path: &str, service: T) -> Self
    where
        T: Service<Request<Body>, Response = axum::response::Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        T::Future: Send + 'static,
    {
        self.routes.insert_nested(path);
        self.inner = self.inner.nest_service(path, service);
        self
    }

    /// Merges another router into this one.
    ///
    /// The merged routes are not recorded in the route table. Declare the ones
    /// that should get trailing slash redirects with [`FluentRouter::known_route`].
    ///
    /// ```rust,no_run
    /// use axum::{Router, routing::get};
    /// # use site_middleware::{Config, FluentRouter};
    /// # fn example() -> site_middleware::Result<()> {
    ///
    /// let user_routes = Router::new()
    ///     .route("/users", get(|| async { "users" }));
    ///
    /// let app = FluentRouter::without_state(Config::default())?
    ///     .merge(user_routes)
    ///     .known_route("/users");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn merge(mut self, other: Router<State>) -> Self {
        self.inner = self.inner.merge(other);
        self
    }

    /// Adds a Tower service at a specific route.
    #[must_use]
    pub fn route_service<T>(mut self, path: &str, service: T) -> Self
    where
        T: Service<Request<Body>, Response = axum::response::Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        T::Future: Send + 'static,
    {
        self.routes.insert(path);
        self.inner = self.inner.route_service(path, service);
        self
    }

    /// Consumes the `FluentRouter` and returns the underlying `axum::Router`.
    ///
    /// ```rust,no_run
    /// # use site_middleware::{Config, FluentRouter};
    /// # fn example() -> site_middleware::Result<()> {
    /// let fluent = FluentRouter::without_state(Config::default())?;
    /// let axum_router: axum::Router = fluent.into_inner();
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_inner(self) -> Router<State> {
        self.inner
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C), then wakes `started` and returns so that
/// axum begins its graceful shutdown.
///
/// If signal registration fails, a warning is logged and the function waits
/// forever, so the server keeps running.
async fn shutdown_signal(timeout: Duration, started: Arc<Notify>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::debug!("Ctrl+C signal received");
            }
            Err(err) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal_handler) => {
                signal_handler.recv().await;
                tracing::debug!("SIGTERM signal received");
            }
            Err(err) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!(
        "Shutdown signal received, starting graceful shutdown (timeout: {}s)",
        timeout.as_secs()
    );
    started.notify_one();
}
