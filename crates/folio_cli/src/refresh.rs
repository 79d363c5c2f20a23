use folio_cache::CacheInvalidator;
use folio_hashnode::HashnodeClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Page size the articles listing asks for, so warming fills the key it will read.
pub const LISTING_PAGE_SIZE: u32 = 9;

pub struct Refresher {
    client: Arc<HashnodeClient>,
    invalidator: CacheInvalidator,
    subject: String,
}

impl Refresher {
    pub fn new(client: Arc<HashnodeClient>, subject: String) -> Self {
        let invalidator = CacheInvalidator::new(client.cache().clone());
        Self {
            client,
            invalidator,
            subject,
        }
    }

    /// Drops the subject's cached content and fills the first listing page again.
    pub async fn refresh_once(&self) -> usize {
        self.invalidator.clear_for(&self.subject).await;
        let page = self.client.fetch_articles(&self.subject, 1, LISTING_PAGE_SIZE).await;
        let series = self.client.fetch_series(&self.subject).await;
        info!(
            "🔄 Revalidated {}: {} articles, {} series",
            self.subject,
            page.articles.len(),
            series.len()
        );
        page.articles.len()
    }

    pub async fn run(self, interval: Duration) {
        info!("Running scheduled revalidation every {}s", interval.as_secs());
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the cache is cold anyway
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.refresh_once().await;
        }
    }
}
