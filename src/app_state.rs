//! The shared state of the dashboard server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    auth::DEFAULT_COOKIE_DURATION,
    config::DashboardConfig,
    merge::DatasetCache,
    pagination::PaginationConfig,
    store::{OverrideStore, TransactionStore},
};

/// The state shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The SHA-512 digest of the shared dashboard password.
    pub password_digest: Vec<u8>,

    /// The config that controls how to display pages of data.
    pub pagination: PaginationConfig,

    /// The static dashboard configuration.
    pub config: Arc<DashboardConfig>,

    /// The read-only base transaction store.
    pub base_store: Arc<dyn TransactionStore>,

    /// The store of the user's manual corrections.
    pub override_store: Arc<OverrideStore>,

    /// The cached merged view shared by every request.
    pub dataset: Arc<Mutex<DatasetCache>>,
}

impl AppState {
    /// Create the server state.
    ///
    /// `cookie_secret` seeds the private-cookie signing key and
    /// `dashboard_password` is the single shared password that unlocks the
    /// dashboard. Both should come from the environment, not from the
    /// command line.
    pub fn new(
        cookie_secret: &str,
        dashboard_password: &str,
        local_timezone: &str,
        config: DashboardConfig,
        pagination: PaginationConfig,
        base_store: Arc<dyn TransactionStore>,
        override_store: OverrideStore,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            password_digest: password_digest(dashboard_password),
            pagination,
            config: Arc::new(config),
            base_store,
            override_store: Arc::new(override_store),
            dataset: Arc::new(Mutex::new(DatasetCache::new())),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a secret string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

/// The digest the submitted password is compared against at log-in.
pub fn password_digest(password: &str) -> Vec<u8> {
    Sha512::digest(password).to_vec()
}

#[cfg(test)]
mod tests {
    use super::password_digest;

    #[test]
    fn equal_passwords_have_equal_digests() {
        assert_eq!(password_digest("hunter2"), password_digest("hunter2"));
        assert_ne!(password_digest("hunter2"), password_digest("hunter3"));
    }
}
