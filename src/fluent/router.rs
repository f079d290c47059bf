//! Core FluentRouter struct and initialization methods.

use {
    super::{session::MaintenanceMode, trailing_slash::RouteTable},
    crate::{Config, HttpMiddleware, Result},
    axum::Router,
};

/// Fluent builder for axum::Router with configuration-based middleware setup.
///
/// This wrapper around `axum::Router` provides a fluent API for configuring the
/// request middleware based on the application configuration. Create instances
/// using [`FluentRouter::without_state`] or [`FluentRouter::with_state`].
///
/// Routes added through [`FluentRouter::route`], [`FluentRouter::route_service`],
/// [`FluentRouter::nest`] and [`FluentRouter::nest_service`] are recorded in a
/// [`RouteTable`], which the trailing slash redirect consults. Routers merged with
/// [`FluentRouter::merge`] cannot be inspected; declare their paths with
/// [`FluentRouter::known_route`].
///
/// # Maintenance Mode
///
/// The maintenance flag starts with the value of `config.maintenance_mode` and can
/// be changed while the server runs:
///
/// ```rust,no_run
/// use site_middleware::{Config, FluentRouter};
///
/// # fn example() -> site_middleware::Result<()> {
/// let router = FluentRouter::without_state(Config::default())?;
/// let maintenance = router.maintenance_mode();
///
/// // Later, e.g. from an admin endpoint or a signal handler
/// maintenance.set(true);
/// # Ok(())
/// # }
/// ```
pub struct FluentRouter<State = ()> {
    pub(crate) config: Config,
    pub(crate) state: State,
    pub(crate) inner: Router<State>,
    pub(crate) routes: RouteTable,
    pub(crate) maintenance: MaintenanceMode,
    pub(crate) panic_channel: Option<tokio::sync::mpsc::Sender<String>>,
}

impl FluentRouter {
    /// Creates a new `FluentRouter` without application state.
    pub fn without_state(config: Config) -> Result<FluentRouter<()>> {
        FluentRouter::<()>::with_state(config, ())
    }
}

impl<State> FluentRouter<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Creates a new `FluentRouter` with the provided configuration and state.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_state<S: Clone + Send + Sync + 'static>(
        config: Config,
        state: S,
    ) -> Result<FluentRouter<S>> {
        config.validate()?;

        let maintenance = MaintenanceMode::new(config.maintenance_mode);
        if config.maintenance_mode {
            tracing::warn!("Starting in maintenance mode, sessions will not be persisted");
        }

        Ok(FluentRouter {
            config,
            state,
            inner: Router::new(),
            routes: RouteTable::new(),
            maintenance,
            panic_channel: None,
        })
    }

    /// Returns the configuration this router was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a handle to the maintenance mode flag.
    ///
    /// All handles share the same flag; changes apply to the next request.
    #[must_use]
    pub fn maintenance_mode(&self) -> MaintenanceMode {
        self.maintenance.clone()
    }

    /// Returns the table of known route patterns.
    #[must_use]
    pub fn route_table(&self) -> RouteTable {
        self.routes.clone()
    }

    /// Declares a route pattern that exists without adding a handler for it.
    ///
    /// Use this for routes that come in through [`FluentRouter::merge`] so the
    /// trailing slash redirect knows about them.
    #[must_use]
    pub fn known_route(self, pattern: &str) -> Self {
        self.routes.insert(pattern);
        self
    }

    /// Helper method to check if a middleware is enabled in the configuration.
    /// Returns true if no middleware config is specified (all enabled by default),
    /// or if the middleware is explicitly enabled/not excluded.
    pub(crate) fn is_middleware_enabled(&self, middleware: HttpMiddleware) -> bool {
        self.config
            .http
            .middleware
            .as_ref()
            .map(|config| config.is_enabled(middleware))
            .unwrap_or(true)
    }

    /// Sets a notification channel for panic messages.
    ///
    /// When configured, any panics caught by the panic handler middleware will
    /// send a message to this channel.
    ///
    /// ```rust,no_run
    /// # use site_middleware::{Config, FluentRouter};
    /// # fn example() -> site_middleware::Result<()> {
    /// let (tx, mut rx) = tokio::sync::mpsc::channel(100);
    ///
    /// let router = FluentRouter::without_state(Config::default())?
    ///     .with_panic_notification_channel(tx);
    ///
    /// tokio::spawn(async move {
    ///     while let Some(panic_msg) = rx.recv().await {
    ///         eprintln!("Panic caught: {}", panic_msg);
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_panic_notification_channel(self, ch: tokio::sync::mpsc::Sender<String>) -> Self {
        Self {
            panic_channel: Some(ch),
            ..self
        }
    }
}
