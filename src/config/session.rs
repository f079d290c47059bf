use {
    crate::{Error, Result},
    serde::Deserialize,
    std::time::Duration,
};

/// `SameSite` attribute of the session cookie.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionSameSite {
    Strict,
    #[default]
    Lax,
    None,
}

///
/// Configuration for cookie-based sessions.
///
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    /// By default `cookie_name` is "sessionid".
    #[serde(default = "SessionConfig::default_cookie_name")]
    pub cookie_name: String,

    /// Whether the cookie carries the `Secure` attribute.
    /// By default `secure` is false.
    #[serde(default)]
    pub secure: bool,

    /// `SameSite` attribute of the cookie. By default `same_site` is "lax".
    #[serde(default)]
    pub same_site: SessionSameSite,

    /// Sessions expire after this much inactivity.
    /// By default `inactivity_timeout` is one hour.
    #[serde(
        default = "SessionConfig::default_inactivity_timeout",
        with = "humantime_serde"
    )]
    pub inactivity_timeout: Duration,
}

impl SessionConfig {
    fn default_cookie_name() -> String {
        "sessionid".into()
    }

    fn default_inactivity_timeout() -> Duration {
        Duration::from_secs(3600)
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.cookie_name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input(
                "[session] cookie_name must not be empty.",
            ));
        }
        if name
            .bytes()
            .any(|b| b <= b' ' || b >= 0x7f || b"()<>@,;:\\\"/[]?={}".contains(&b))
        {
            return Err(Error::invalid_input(format!(
                "[session] cookie_name {:?} contains characters not allowed in a cookie name.",
                self.cookie_name
            )));
        }
        if self.inactivity_timeout.is_zero() {
            return Err(Error::invalid_input(
                "[session] inactivity_timeout must be greater than zero.",
            ));
        }
        if self.same_site == SessionSameSite::None && !self.secure {
            return Err(Error::invalid_input(
                "[session] same_site = \"none\" requires secure = true.",
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: Self::default_cookie_name(),
            secure: false,
            same_site: SessionSameSite::default(),
            inactivity_timeout: Self::default_inactivity_timeout(),
        }
    }
}
