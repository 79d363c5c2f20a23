use folio_cache::CacheInvalidator;
use folio_hashnode::HashnodeClient;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_USERNAME: &str = "maroayman";
pub const DEFAULT_SITE_URL: &str = "https://maroayman.vercel.app";

#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Subject used when a request names none, and the one the webhook revalidates
    pub default_username: String,
    /// Shared secret for the revalidation webhook. Without one the webhook rejects everything.
    pub revalidation_secret: Option<String>,
    /// Advertised to downstream caches through `Cache-Control`
    pub revalidate_interval: Duration,
    pub site_url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            default_username: DEFAULT_USERNAME.to_string(),
            revalidation_secret: None,
            revalidate_interval: Duration::from_secs(3600),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }
}

pub struct AppState {
    pub client: Arc<HashnodeClient>,
    pub invalidator: CacheInvalidator,
    pub config: WebConfig,
}

impl AppState {
    pub fn new(client: Arc<HashnodeClient>, config: WebConfig) -> Self {
        let invalidator = CacheInvalidator::new(client.cache().clone());
        Self {
            client,
            invalidator,
            config,
        }
    }
}
