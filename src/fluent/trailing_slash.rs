//! Trailing slash redirects.
//!
//! A request for `/docs/files/` that ends up as a `404 Not Found` is answered with
//! `301 Moved Permanently` to `/docs/files` when that path is a known route. The
//! decision is taken after the router has run, so routes that are registered with
//! a trailing slash keep working and unknown paths stay plain 404s.

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, Method, StatusCode, header::LOCATION};
use std::{
    collections::HashSet,
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, LazyLock, RwLock},
    task::{Context, Poll},
};
use tower::{Layer, Service};
use url::Url;

static QUERY_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").unwrap());

/// Percent-encodes the characters of a query string that are not allowed in a URI.
///
/// Non-ASCII characters are encoded as UTF-8 and existing `%XX` escapes are kept,
/// so the result can be placed in a `Location` header as is.
///
/// ```
/// use site_middleware::uri_safe_query;
///
/// assert_eq!(uri_safe_query("xxx=\u{c3}"), "xxx=%C3%83");
/// assert_eq!(uri_safe_query("q=a%20b&page=2"), "q=a%20b&page=2");
/// ```
pub fn uri_safe_query(query: &str) -> String {
    let mut url = QUERY_BASE_URL.clone();
    url.set_query(Some(query));
    url.query().unwrap_or_default().to_string()
}

struct RouteTableInner {
    patterns: HashSet<String>,
    router: matchit::Router<()>,
}

/// The set of route patterns known to a [`crate::FluentRouter`].
///
/// Patterns use the axum syntax (`/users/{id}`, `/files/{*path}`). The table is
/// shared: clones see routes registered after they were taken.
#[derive(Clone)]
pub struct RouteTable {
    inner: Arc<RwLock<RouteTableInner>>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RouteTableInner {
                patterns: HashSet::new(),
                router: matchit::Router::new(),
            })),
        }
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route pattern. Registering a pattern twice is a no-op.
    pub fn insert(&self, pattern: &str) {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if table.patterns.contains(pattern) {
            return;
        }
        match table.router.insert(pattern, ()) {
            Ok(()) => {
                table.patterns.insert(pattern.to_string());
            }
            Err(err) => {
                tracing::warn!(
                    pattern = %pattern,
                    error = %err,
                    "Route pattern not usable for trailing slash redirects"
                );
            }
        }
    }

    /// Registers `prefix` and everything below it, as done by `Router::nest`.
    pub fn insert_nested(&self, prefix: &str) {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            self.insert("/");
            self.insert("/{*rest}");
        } else {
            self.insert(prefix);
            self.insert(&format!("{prefix}/{{*rest}}"));
        }
    }

    /// Returns true if `path` matches one of the registered patterns.
    pub fn matches(&self, path: &str) -> bool {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        table.router.at(path).is_ok()
    }

    pub fn len(&self) -> usize {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        table.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f.debug_set().entries(table.patterns.iter()).finish()
    }
}

/// The path a request would be redirected to, if its response is a 404.
struct RedirectTarget {
    path: String,
    location: String,
}

impl RedirectTarget {
    fn for_request(req: &Request) -> Option<Self> {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            return None;
        }

        let path = req.uri().path().strip_suffix('/')?;
        // "/" itself, and "//host" which browsers read as another origin.
        if path.is_empty() || path.starts_with("//") {
            return None;
        }

        let location = match req.uri().query() {
            Some(query) => format!("{}?{}", path, uri_safe_query(query)),
            None => path.to_string(),
        };

        Some(Self {
            path: path.to_string(),
            location,
        })
    }
}

/// Layer that turns `404` responses for `/path/` into `301` redirects to `/path`.
#[derive(Clone, Debug)]
pub struct TrailingSlashRedirectLayer {
    routes: RouteTable,
}

impl TrailingSlashRedirectLayer {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }
}

impl<S> Layer<S> for TrailingSlashRedirectLayer {
    type Service = TrailingSlashRedirect<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TrailingSlashRedirect {
            inner,
            routes: self.routes.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrailingSlashRedirect<S> {
    inner: S,
    routes: RouteTable,
}

impl<S> Service<Request> for TrailingSlashRedirect<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let target = RedirectTarget::for_request(&req);
        let routes = self.routes.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let response = inner.call(req).await?;
            if response.status() != StatusCode::NOT_FOUND {
                return Ok(response);
            }

            let Some(target) = target else {
                return Ok(response);
            };
            if !routes.matches(&target.path) {
                return Ok(response);
            }

            match HeaderValue::from_str(&target.location) {
                Ok(location) => {
                    tracing::debug!(
                        location = %target.location,
                        "Redirecting to path without trailing slash"
                    );
                    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response())
                }
                Err(err) => {
                    tracing::warn!(
                        location = %target.location,
                        error = %err,
                        "Cannot build redirect location, keeping 404"
                    );
                    Ok(response)
                }
            }
        })
    }
}
