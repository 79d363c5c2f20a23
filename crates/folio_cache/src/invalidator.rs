use folio_core::{keys, CacheStore};
use std::sync::Arc;

/// Drops everything cached for a subject so the next fetch goes upstream.
#[derive(Clone)]
pub struct CacheInvalidator {
    store: Arc<dyn CacheStore>,
}

impl CacheInvalidator {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// A subject that is empty or carries a wildcard would widen the pattern
    /// past its own keys, so it clears nothing.
    pub async fn clear_for(&self, subject: &str) {
        if subject.is_empty() || subject.contains('*') {
            tracing::warn!("⚠️ Refusing to clear cache for subject {:?}", subject);
            return;
        }

        let pattern = keys::subject_pattern(subject);
        tracing::info!("🧹 Clearing cached content for {} ({})", subject, pattern);
        self.store.invalidate(&pattern).await;
    }
}
