use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use folio_core::{Article, ArticlePage, Series};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use crate::error::ApiError;
use crate::{sitemap, AppState};

const GET_PAGE_SIZE: u32 = 9;
const POST_PAGE_SIZE: u32 = 20;
const STALE_WHILE_REVALIDATE_SECS: u64 = 86400;
const REVALIDATED_PATHS: [&str; 2] = ["/articles", "/"];

/// Query string of `GET /api/hashnode`. Kept as raw strings so bad numbers
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesQuery {
    pub username: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub include_series: Option<String>,
    pub bypass_cache: Option<String>,
}

/// JSON body of `POST /api/hashnode`. Fields stay loosely typed so that a
/// well-formed body with odd values still gets the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesBody {
    pub username: Option<Value>,
    pub page: Option<Value>,
    pub page_size: Option<Value>,
    pub include_series: Option<Value>,
    pub bypass_cache: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ArticlesRequest {
    username: String,
    page: u32,
    page_size: u32,
    include_series: bool,
    bypass_cache: bool,
}

impl ArticlesRequest {
    fn from_query(query: ArticlesQuery, default_username: &str) -> Self {
        Self {
            username: non_empty(query.username).unwrap_or_else(|| default_username.to_string()),
            page: parse_positive(query.page.as_deref(), 1),
            page_size: parse_positive(query.page_size.as_deref(), GET_PAGE_SIZE),
            include_series: query.include_series.as_deref() == Some("true"),
            bypass_cache: query.bypass_cache.as_deref() == Some("true"),
        }
    }

    fn from_body(body: ArticlesBody, default_username: &str) -> Self {
        Self {
            username: non_empty(body.username.as_ref().and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| default_username.to_string()),
            page: coerce_positive(body.page.as_ref(), 1),
            page_size: coerce_positive(body.page_size.as_ref(), POST_PAGE_SIZE),
            include_series: coerce_flag(body.include_series.as_ref(), true),
            bypass_cache: coerce_flag(body.bypass_cache.as_ref(), false),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_positive(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Accepts a JSON number or a numeric string.
fn coerce_positive(value: Option<&Value>, default: u32) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(default),
        Some(Value::String(s)) => parse_positive(Some(s.as_str()), default),
        _ => default,
    }
}

fn coerce_flag(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.as_str() {
            "true" => true,
            "false" => false,
            _ => default,
        },
        _ => default,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticlesResponse {
    success: bool,
    data: ArticlesData,
    metadata: Metadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticlesData {
    articles: Vec<Article>,
    total_count: u64,
    series: Vec<Series>,
    page: u32,
    page_size: u32,
    has_next_page: bool,
    has_previous_page: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    timestamp: DateTime<Utc>,
    username: String,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_type: Option<&'static str>,
    cache_enabled: bool,
    cache_backend: String,
    cache_bypass: bool,
    revalidate_interval: u64,
}

async fn load_articles(
    state: &AppState,
    request: &ArticlesRequest,
    request_type: Option<&'static str>,
) -> ArticlesResponse {
    if request.bypass_cache {
        state.invalidator.clear_for(&request.username).await;
    }

    let ArticlePage {
        articles,
        total_count,
        has_next_page,
        has_previous_page,
    } = state
        .client
        .fetch_articles(&request.username, request.page, request.page_size)
        .await;

    let series = if request.include_series {
        state.client.fetch_series(&request.username).await
    } else {
        Vec::new()
    };

    ArticlesResponse {
        success: true,
        data: ArticlesData {
            articles,
            total_count,
            series,
            page: request.page,
            page_size: request.page_size,
            has_next_page,
            has_previous_page,
        },
        metadata: Metadata {
            timestamp: Utc::now(),
            username: request.username.clone(),
            source: "hashnode",
            request_type,
            cache_enabled: true,
            cache_backend: state.client.cache().name().to_string(),
            cache_bypass: request.bypass_cache,
            revalidate_interval: state.config.revalidate_interval.as_secs(),
        },
    }
}

pub async fn get_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticlesQuery>,
) -> Response {
    let request = ArticlesRequest::from_query(query, &state.config.default_username);
    let response = load_articles(&state, &request, None).await;

    let interval = state.config.revalidate_interval.as_secs();
    let headers = [
        (
            header::CACHE_CONTROL,
            format!(
                "public, s-maxage={}, stale-while-revalidate={}",
                interval, STALE_WHILE_REVALIDATE_SECS
            ),
        ),
        (HeaderName::from_static("x-generated-at"), response.metadata.timestamp.to_rfc3339()),
        (HeaderName::from_static("x-articles-count"), response.data.articles.len().to_string()),
        (HeaderName::from_static("x-total-count"), response.data.total_count.to_string()),
        (HeaderName::from_static("x-current-page"), response.data.page.to_string()),
    ];

    (StatusCode::OK, headers, Json(response)).into_response()
}

pub async fn post_articles(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: ArticlesBody = if body.iter().all(u8::is_ascii_whitespace) {
        ArticlesBody::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let request = ArticlesRequest::from_body(body, &state.config.default_username);
    let response = load_articles(&state, &request, Some("POST")).await;
    Ok(Json(response).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct SecretQuery {
    pub secret: Option<String>,
}

fn is_authorized(state: &AppState, provided: Option<&str>) -> bool {
    match (state.config.revalidation_secret.as_deref(), provided) {
        (Some(expected), Some(given)) => !expected.is_empty() && secrets_match(expected, given),
        _ => false,
    }
}

/// Compares every byte regardless of where the first difference sits.
fn secrets_match(expected: &str, given: &str) -> bool {
    let (expected, given) = (expected.as_bytes(), given.as_bytes());
    if expected.len() != given.len() {
        return false;
    }
    expected
        .iter()
        .zip(given)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn unauthorized() -> Response {
    tracing::warn!("⚠️ Rejected revalidation request with invalid secret");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Invalid secret" })),
    )
        .into_response()
}

async fn revalidate(state: &AppState) {
    state.invalidator.clear_for(&state.config.default_username).await;
    tracing::info!("✅ Revalidation triggered successfully");
}

pub async fn revalidate_webhook(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SecretQuery>,
    body: Bytes,
) -> Response {
    if !is_authorized(&state, query.secret.as_deref()) {
        return unauthorized();
    }

    // Some webhook types arrive without a payload
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => {
            let event = payload.get("event").and_then(Value::as_str).unwrap_or("unknown event");
            tracing::info!("🔄 Hashnode webhook received: {}", event);
        }
        Err(_) => tracing::info!("🔄 Hashnode webhook received (no payload)"),
    }

    revalidate(&state).await;

    Json(json!({
        "success": true,
        "revalidated": true,
        "timestamp": Utc::now(),
        "paths": REVALIDATED_PATHS,
    }))
    .into_response()
}

pub async fn revalidate_manual(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SecretQuery>,
) -> Response {
    if !is_authorized(&state, query.secret.as_deref()) {
        return unauthorized();
    }

    revalidate(&state).await;

    Json(json!({
        "success": true,
        "revalidated": true,
        "timestamp": Utc::now(),
        "paths": REVALIDATED_PATHS,
        "message": "Manual revalidation triggered",
    }))
    .into_response()
}

pub async fn get_sitemap(State(state): State<Arc<AppState>>) -> Response {
    let xml = sitemap::render(&state.config.site_url, Utc::now());
    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}
