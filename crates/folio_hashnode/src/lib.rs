pub mod client;
pub mod format;
pub mod queries;
pub mod transport;

pub use client::HashnodeClient;
pub use format::{format_date, format_read_time};
pub use transport::{GraphQlRequest, GraphQlTransport, HttpTransport};

pub const DEFAULT_API_URL: &str = "https://gql.hashnode.com/";

/// Largest page the upstream is asked for, whatever the caller requested.
pub const MAX_UPSTREAM_PAGE_SIZE: u32 = 20;

pub mod prelude {
    pub use super::{HashnodeClient, GraphQlTransport, HttpTransport};
    pub use folio_core::{Article, ArticlePage, Series, Result, Error};
}
