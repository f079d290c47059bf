//! Cookie sessions that step aside while the site is in maintenance mode.
//!
//! In normal operation requests go through the `tower-sessions` session manager:
//! the session key comes from the session cookie and modified sessions are saved
//! and sent back in `Set-Cookie`.
//!
//! In maintenance mode handlers still receive a [`Session`], but it has no key,
//! the incoming cookie is ignored, writes go to a [`NullStore`] and the response
//! leaves this layer exactly as the handler produced it.

use crate::{Result, SessionConfig, SessionSameSite};
use async_trait::async_trait;
use axum::{extract::Request, response::Response};
use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration as CookieDuration},
    session::{Id, Record},
    session_store,
};

/// Shared maintenance mode flag.
///
/// Cloning yields a handle to the same flag, so the value can be flipped at
/// runtime and the next request observes it.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceMode(Arc<AtomicBool>);

impl MaintenanceMode {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Sets the flag and returns its previous value.
    pub fn set(&self, enabled: bool) -> bool {
        let previous = self.0.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::info!(maintenance_mode = enabled, "Maintenance mode changed");
        }
        previous
    }
}

/// A session store that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl SessionStore for NullStore {
    async fn create(&self, _record: &mut Record) -> session_store::Result<()> {
        Ok(())
    }

    async fn save(&self, _record: &Record) -> session_store::Result<()> {
        Ok(())
    }

    async fn load(&self, _session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(None)
    }

    async fn delete(&self, _session_id: &Id) -> session_store::Result<()> {
        Ok(())
    }
}

/// Layer installing [`MaintenanceAwareSession`].
#[derive(Clone)]
pub struct MaintenanceAwareSessionLayer {
    sessions: SessionManagerLayer<MemoryStore>,
    maintenance: MaintenanceMode,
}

impl MaintenanceAwareSessionLayer {
    /// Creates the layer with an in-memory store configured from `config`.
    pub fn new(config: &SessionConfig, maintenance: MaintenanceMode) -> Result<Self> {
        config.validate()?;

        let same_site = match config.same_site {
            SessionSameSite::Strict => SameSite::Strict,
            SessionSameSite::Lax => SameSite::Lax,
            SessionSameSite::None => SameSite::None,
        };
        let inactivity = i64::try_from(config.inactivity_timeout.as_secs()).unwrap_or(i64::MAX);

        let sessions = SessionManagerLayer::new(MemoryStore::default())
            .with_name(config.cookie_name.trim().to_owned())
            .with_secure(config.secure)
            .with_same_site(same_site)
            .with_expiry(Expiry::OnInactivity(CookieDuration::seconds(inactivity)));

        Ok(Self {
            sessions,
            maintenance,
        })
    }
}

impl<S: Clone> Layer<S> for MaintenanceAwareSessionLayer {
    type Service = MaintenanceAwareSession<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MaintenanceAwareSession {
            managed: self.sessions.layer(inner.clone()),
            inner,
            maintenance: self.maintenance.clone(),
            detached_store: Arc::new(NullStore),
        }
    }
}

#[derive(Clone)]
pub struct MaintenanceAwareSession<S> {
    inner: S,
    managed: <SessionManagerLayer<MemoryStore> as Layer<S>>::Service,
    maintenance: MaintenanceMode,
    detached_store: Arc<NullStore>,
}

impl<S> Service<Request> for MaintenanceAwareSession<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<std::result::Result<(), Self::Error>> {
        // Either branch may take the call, so both services must be ready.
        std::task::ready!(self.inner.poll_ready(cx))?;
        self.managed.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        req.extensions_mut().insert(self.maintenance.clone());

        if !self.maintenance.is_enabled() {
            let clone = self.managed.clone();
            let mut managed = std::mem::replace(&mut self.managed, clone);
            return Box::pin(async move { managed.call(req).await });
        }

        tracing::debug!("Maintenance mode: session cookie ignored, nothing will be persisted");
        let session = Session::new(None, self.detached_store.clone(), None);
        req.extensions_mut().insert(session);

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}
