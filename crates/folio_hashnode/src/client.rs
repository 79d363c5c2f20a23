use folio_cache::{get_json, set_json};
use folio_core::{keys, ArticlePage, CacheStore, Pagination, Result, Series, ARTICLES_TTL, SERIES_TTL, SHORT_TTL};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use crate::queries::{self, ArticlesData, GraphQlResponse, SeriesData};
use crate::transport::{GraphQlRequest, GraphQlTransport};
use crate::MAX_UPSTREAM_PAGE_SIZE;

/// Read-through client for a subject's Hashnode articles and series.
///
/// Lookups hit the cache first and only go upstream on a miss. Upstream
/// failures never reach the caller: they are logged and an empty result is
/// returned, which is also left uncached so the next request tries again.
/// A successful answer with nothing in it is kept for `SHORT_TTL` only.
pub struct HashnodeClient {
    transport: Arc<dyn GraphQlTransport>,
    cache: Arc<dyn CacheStore>,
    articles_ttl: Duration,
    series_ttl: Duration,
}

impl HashnodeClient {
    pub fn new(transport: Arc<dyn GraphQlTransport>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            transport,
            cache,
            articles_ttl: ARTICLES_TTL,
            series_ttl: SERIES_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.articles_ttl = ttl;
        self.series_ttl = ttl;
        self
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub async fn fetch_articles(&self, subject: &str, page: u32, page_size: u32) -> ArticlePage {
        let pagination = Pagination::new(page, page_size);
        let key = keys::articles(subject, pagination.page, pagination.page_size);

        if let Some(cached) = get_json::<ArticlePage>(self.cache.as_ref(), &key).await {
            tracing::debug!("Cache hit for {}", key);
            return cached;
        }

        match self.query_articles(subject, pagination).await {
            Ok(result) => {
                let ttl = self.ttl_for(result.articles.is_empty(), self.articles_ttl);
                set_json(self.cache.as_ref(), &key, &result, ttl).await;
                result
            }
            Err(e) => {
                tracing::error!("❌ Error fetching Hashnode articles for {}: {}", subject, e);
                ArticlePage::empty()
            }
        }
    }

    pub async fn fetch_series(&self, subject: &str) -> Vec<Series> {
        let key = keys::series(subject);

        if let Some(cached) = get_json::<Vec<Series>>(self.cache.as_ref(), &key).await {
            tracing::debug!("Cache hit for {}", key);
            return cached;
        }

        match self.query_series(subject).await {
            Ok(result) => {
                let ttl = self.ttl_for(result.is_empty(), self.series_ttl);
                set_json(self.cache.as_ref(), &key, &result, ttl).await;
                result
            }
            Err(e) => {
                tracing::error!("❌ Error fetching Hashnode series for {}: {}", subject, e);
                Vec::new()
            }
        }
    }

    fn ttl_for(&self, empty: bool, ttl: Duration) -> Duration {
        if empty {
            ttl.min(SHORT_TTL)
        } else {
            ttl
        }
    }

    async fn query_articles(&self, subject: &str, pagination: Pagination) -> Result<ArticlePage> {
        let request = GraphQlRequest::new(
            queries::USER_ARTICLES,
            json!({
                "username": subject,
                "pageSize": pagination.page_size.min(MAX_UPSTREAM_PAGE_SIZE),
                "page": pagination.page,
            }),
        );

        let data: ArticlesData = self.execute(&request).await?;
        let posts = data
            .user
            .and_then(|user| user.posts)
            .ok_or_else(|| folio_core::Error::Upstream(format!("No posts returned for {}", subject)))?;

        let (articles, total_count) = posts.into_articles();
        tracing::info!("📰 Fetched {} articles for {} (page {})", articles.len(), subject, pagination.page);
        Ok(ArticlePage::new(articles, total_count, pagination))
    }

    async fn query_series(&self, subject: &str) -> Result<Vec<Series>> {
        let request = GraphQlRequest::new(queries::USER_SERIES, json!({ "username": subject }));
        let data: SeriesData = self.execute(&request).await?;
        let series = data.into_series();
        tracing::info!("📚 Fetched {} series for {}", series.len(), subject);
        Ok(series)
    }

    async fn execute<T: DeserializeOwned>(&self, request: &GraphQlRequest) -> Result<T> {
        let body = self.transport.execute(request).await?;
        let response: GraphQlResponse<T> = serde_json::from_value(body)?;
        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_cache::{CacheInvalidator, MemoryCache};
    use folio_core::Error;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Reply {
        Json(Value),
        NetworkError,
    }

    struct MockTransport {
        reply: Reply,
        calls: AtomicUsize,
        requests: Mutex<Vec<GraphQlRequest>>,
    }

    impl MockTransport {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_variables(&self) -> Value {
            self.requests.lock().unwrap().last().unwrap().variables.clone()
        }
    }

    #[async_trait]
    impl GraphQlTransport for MockTransport {
        async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Reply::Json(body) => Ok(body.clone()),
                Reply::NetworkError => Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }

    fn post(id: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Post {}", id),
            "brief": "A short brief",
            "slug": format!("post-{}", id),
            "publishedAt": "2024-05-01T08:00:00Z",
            "readTimeInMinutes": 3,
            "tags": [{ "name": "Rust", "slug": "rust" }],
            "series": null,
            "coverImage": null,
            "url": format!("https://blog.example.com/post-{}", id),
            "content": { "markdown": "# Hi", "html": "<h1>Hi</h1>" }
        })
    }

    fn articles_body(count: usize, total: u64) -> Value {
        let nodes: Vec<Value> = (1..=count).map(|i| post(&i.to_string())).collect();
        json!({
            "data": {
                "user": {
                    "posts": {
                        "totalDocuments": total,
                        "nodes": nodes
                    }
                }
            }
        })
    }

    fn client_with(transport: Arc<MockTransport>, cache: &MemoryCache) -> HashnodeClient {
        HashnodeClient::new(transport, Arc::new(cache.clone()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_articles_populates_cache() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(3, 3)));
        let client = client_with(transport.clone(), &cache);

        let page = client.fetch_articles("alice", 1, 9).await;

        assert_eq!(page.articles.len(), 3);
        assert_eq!(page.total_count, 3);
        assert!(!page.has_next_page);
        assert!(!page.has_previous_page);
        assert_eq!(transport.calls(), 1);
        assert_eq!(
            cache.expires_in("hashnode:articles:alice:1:9").await,
            Some(Duration::from_secs(3600))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_answers_are_kept_briefly() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(0, 0)));
        let client = client_with(transport.clone(), &cache);

        let page = client.fetch_articles("quiet", 1, 9).await;
        assert!(page.articles.is_empty());
        assert_eq!(
            cache.expires_in("hashnode:articles:quiet:1:9").await,
            Some(SHORT_TTL)
        );

        tokio::time::advance(SHORT_TTL).await;
        client.fetch_articles("quiet", 1, 9).await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(2, 2)));
        let client = client_with(transport.clone(), &cache);

        let first = client.fetch_articles("alice", 1, 9).await;
        let second = client.fetch_articles("alice", 1, 9).await;

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_for_forces_refetch() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(2, 2)));
        let client = client_with(transport.clone(), &cache);
        let invalidator = CacheInvalidator::new(client.cache().clone());

        client.fetch_articles("alice", 1, 9).await;
        invalidator.clear_for("alice").await;
        client.fetch_articles("alice", 1, 9).await;

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_goes_upstream_again() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(1, 1)));
        let client = client_with(transport.clone(), &cache).with_ttl(Duration::from_secs(1));

        client.fetch_articles("alice", 1, 9).await;
        tokio::time::advance(Duration::from_millis(1001)).await;
        client.fetch_articles("alice", 1, 9).await;

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_network_error_yields_empty_page() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::NetworkError);
        let client = client_with(transport.clone(), &cache);

        let page = client.fetch_articles("alice", 1, 9).await;

        assert_eq!(page, ArticlePage::empty());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_api_errors_yield_empty_results() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(json!({
            "data": null,
            "errors": [{ "message": "rate limited" }]
        })));
        let client = client_with(transport.clone(), &cache);

        assert_eq!(client.fetch_articles("alice", 1, 9).await, ArticlePage::empty());
        assert!(client.fetch_series("alice").await.is_empty());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_user_yields_empty_page() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(json!({ "data": { "user": null } })));
        let client = client_with(transport, &cache);

        assert_eq!(client.fetch_articles("nobody", 1, 9).await, ArticlePage::empty());
    }

    #[tokio::test]
    async fn test_page_size_is_clamped_upstream() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(20, 45)));
        let client = client_with(transport.clone(), &cache);

        let page = client.fetch_articles("alice", 2, 100).await;

        let variables = transport.last_variables();
        assert_eq!(variables["pageSize"], 20);
        assert_eq!(variables["page"], 2);
        assert_eq!(variables["username"], "alice");
        // Pagination flags follow what the caller asked for
        assert!(!page.has_next_page);
        assert!(page.has_previous_page);
        assert!(cache.get("hashnode:articles:alice:2:100").await.is_some());
    }

    #[tokio::test]
    async fn test_has_next_page_from_total() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(articles_body(9, 10)));
        let client = client_with(transport, &cache);

        let page = client.fetch_articles("alice", 1, 9).await;
        assert!(page.has_next_page);
    }

    #[tokio::test]
    async fn test_fetch_series_is_cached() {
        let cache = MemoryCache::new();
        let transport = MockTransport::new(Reply::Json(json!({
            "data": {
                "user": {
                    "publications": {
                        "edges": [{
                            "node": {
                                "seriesList": {
                                    "edges": [{
                                        "node": {
                                            "name": "Rust Notes",
                                            "slug": "rust-notes",
                                            "description": { "text": "Notes" },
                                            "posts": { "totalDocuments": 2 }
                                        }
                                    }]
                                }
                            }
                        }]
                    }
                }
            }
        })));
        let client = client_with(transport.clone(), &cache);

        let series = client.fetch_series("alice").await;
        let again = client.fetch_series("alice").await;

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].slug, "rust-notes");
        assert_eq!(series, again);
        assert_eq!(transport.calls(), 1);
        assert!(cache.get("hashnode:series:alice").await.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_empty_page() {
        let transport = crate::HttpTransport::new("http://127.0.0.1:9/", Duration::from_millis(500)).unwrap();
        let client = HashnodeClient::new(Arc::new(transport), Arc::new(MemoryCache::new()));

        let page = client.fetch_articles("alice", 1, 9).await;
        assert_eq!(page, ArticlePage::empty());
    }
}
