//! Access token sources and the tenant token cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;

/// Tokens are refreshed this long before the service says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// How the client obtains a bearer token.
#[derive(Clone)]
pub enum Credentials {
    /// A pre-issued access token, used as is.
    AccessToken(Secret<String>),
    /// App credentials exchanged for a tenant access token.
    App {
        app_id: String,
        app_secret: Secret<String>,
    },
}

impl Credentials {
    pub fn access_token(token: impl Into<String>) -> Self {
        Credentials::AccessToken(Secret::new(token.into()))
    }

    pub fn app(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Credentials::App {
            app_id: app_id.into(),
            app_secret: Secret::new(app_secret.into()),
        }
    }

    /// Short label safe for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::AccessToken(_) => "access_token",
            Credentials::App { .. } => "app",
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken([REDACTED])"),
            Credentials::App { app_id, .. } => f
                .debug_struct("App")
                .field("app_id", app_id)
                .field("app_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Clone)]
struct CachedToken {
    value: Secret<String>,
    fetched_at: Instant,
    lifetime: Duration,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() + REFRESH_MARGIN >= self.lifetime
    }
}

/// Shared cache for the tenant access token.
#[derive(Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if one is present and not about to expire.
    pub async fn get(&self) -> Option<Secret<String>> {
        let cache = self.inner.read().await;
        cache
            .as_ref()
            .filter(|cached| !cached.is_expired())
            .map(|cached| cached.value.clone())
    }

    pub async fn store(&self, token: String, expires_in_secs: u64) {
        let mut cache = self.inner.write().await;
        *cache = Some(CachedToken {
            value: Secret::new(token),
            fetched_at: Instant::now(),
            lifetime: Duration::from_secs(expires_in_secs),
        });
    }

    /// Drops the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        let mut cache = self.inner.write().await;
        *cache = None;
    }
}

/// Exposes a bearer header value.
pub fn bearer(token: &Secret<String>) -> String {
    format!("Bearer {}", token.expose_secret())
}
