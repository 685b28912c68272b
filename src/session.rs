//! Portal session
//!
//! One authenticated session per run, created explicitly and passed by
//! parameter into whatever needs it. Read-only after creation; there is no
//! ambient global handle.

use std::time::Duration;

/// Connection parameters for one run.
#[derive(Debug, Clone)]
pub struct PortalSession {
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl PortalSession {
    /// Default per-request timeout. Generous, since service replacement on
    /// the backend can take minutes.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            username: username.into(),
            password: password.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a REST path under the sharing API root.
    pub fn rest_url(&self, path: &str) -> String {
        format!(
            "{}/sharing/rest/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url_normalizes_slashes() {
        let session = PortalSession::new(
            "https://portal.example.com/",
            "publisher",
            "secret",
            Duration::from_secs(600),
        );
        assert_eq!(
            session.rest_url("/search"),
            "https://portal.example.com/sharing/rest/search"
        );
    }
}
