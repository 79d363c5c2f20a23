use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod sitemap;
pub mod state;

pub use state::{AppState, WebConfig};

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/hashnode", get(handlers::get_articles).post(handlers::post_articles))
        .route("/api/revalidate", get(handlers::revalidate_manual).post(handlers::revalidate_webhook))
        .route("/sitemap.xml", get(handlers::get_sitemap))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use folio_core::{Article, Series, Result, Error};
    pub use crate::{AppState, WebConfig};
}
