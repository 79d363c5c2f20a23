pub mod cache;
pub mod error;
pub mod keys;
pub mod types;

pub use cache::{CacheStore, ARTICLES_TTL, SERIES_TTL, SHORT_TTL};
pub use error::Error;
pub use types::{Article, ArticleContent, ArticlePage, Pagination, Series, SeriesRef, Tag};

pub type Result<T> = std::result::Result<T, Error>;
