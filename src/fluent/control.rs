//! Panic catching middleware.

use super::router::FluentRouter;
use crate::HttpMiddleware;

use {
    http::{Response, StatusCode},
    tower_http::catch_panic::CatchPanicLayer,
};

impl<State> FluentRouter<State>
where
    State: Clone + Send + Sync + 'static,
{
    /// Sets up panic catching middleware.
    ///
    /// Catches panics in request handlers and returns a `500 Internal Server Error`
    /// response instead of crashing the server. Optionally sends panic details to
    /// a notification channel if configured with `with_panic_notification_channel()`.
    ///
    /// ```rust,no_run
    /// # use site_middleware::{Config, FluentRouter};
    /// # async fn example() -> site_middleware::Result<()> {
    /// let (tx, rx) = tokio::sync::mpsc::channel(100);
    ///
    /// FluentRouter::without_state(Config::default())?
    ///     .with_panic_notification_channel(tx)
    ///     .setup_catch_panic();
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// This middleware is automatically included in `setup_middleware()` as the
    /// outermost layer so that panics in the other layers are caught too.
    #[must_use]
    pub fn setup_catch_panic(mut self) -> Self {
        // Only excluded in tests that want to observe the panic
        if !self.is_middleware_enabled(HttpMiddleware::CatchPanic) {
            return self;
        }

        let panic_channel = self.panic_channel.clone();
        self.inner = self.inner.layer(CatchPanicLayer::custom(
            move |err: Box<dyn std::any::Any + Send + 'static>| {
                let detail = if let Some(s) = err.downcast_ref::<String>() {
                    s.clone()
                } else if let Some(s) = err.downcast_ref::<&str>() {
                    s.to_string()
                } else {
                    "unknown panic payload".to_string()
                };

                tracing::error!(panic = %detail, "Request handler panicked");
                if let Some(ch) = &panic_channel {
                    ch.try_send(format!("Service panicked: {detail}")).ok();
                }

                // No unwrap here: a panic inside the panic handler aborts the task
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
                    .body("Internal Server Error".to_string())
                    .unwrap_or_else(|_| Response::new("Internal Server Error".to_string()))
            },
        ));
        self
    }
}
