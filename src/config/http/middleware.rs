use crate::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMiddlewareConfig {
    Include(Vec<HttpMiddleware>),
    Exclude(Vec<HttpMiddleware>),
}

impl HttpMiddlewareConfig {
    pub fn is_enabled(&self, middleware: HttpMiddleware) -> bool {
        match self {
            HttpMiddlewareConfig::Include(list) => list.contains(&middleware),
            HttpMiddlewareConfig::Exclude(list) => !list.contains(&middleware),
        }
    }

    /// Validates the middleware list.
    ///
    /// Listing the same middleware twice is almost always a typo in the
    /// configuration file, so it is rejected.
    pub fn validate(&self) -> Result<()> {
        let list = match self {
            HttpMiddlewareConfig::Include(list) | HttpMiddlewareConfig::Exclude(list) => list,
        };
        for (i, middleware) in list.iter().enumerate() {
            if list[i + 1..].contains(middleware) {
                return Err(Error::invalid_input(format!(
                    "Middleware {:?} is listed more than once in [http] include/exclude.",
                    middleware
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum HttpMiddleware {
    TrailingSlash,
    ForwardedFor,
    Session,
    Logging,
    CatchPanic,
}
