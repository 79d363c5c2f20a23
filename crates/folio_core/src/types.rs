use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub brief: Option<String>,
    pub slug: String,
    pub published_at: DateTime<Utc>,
    pub read_time_in_minutes: Option<u32>,
    #[serde(rename = "coverImage", with = "cover_image", default)]
    pub cover_image_url: Option<String>,
    pub url: String,
    pub series: Option<SeriesRef>,
    pub tags: Vec<Tag>,
    pub content: Option<ArticleContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRef {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub markdown: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(rename = "posts", with = "post_count", default)]
    pub total_posts: u64,
}

/// `coverImage: { url }` on the wire, a plain optional URL in Rust.
mod cover_image {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct CoverImage {
        url: Option<String>,
    }

    pub fn serialize<S: Serializer>(url: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        url.as_ref()
            .map(|url| CoverImage { url: Some(url.clone()) })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let image = Option::<CoverImage>::deserialize(deserializer)?;
        Ok(image.and_then(|image| image.url))
    }
}

/// `posts: { totalDocuments }` on the wire, a plain count in Rust.
mod post_count {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Posts {
        #[serde(default)]
        total_documents: u64,
    }

    pub fn serialize<S: Serializer>(count: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        Posts { total_documents: *count }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let posts = Option::<Posts>::deserialize(deserializer)?;
        Ok(posts.map_or(0, |posts| posts.total_documents))
    }
}

/// One page of a subject's articles as seen by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl ArticlePage {
    /// The page returned whenever the upstream could not be reached.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(articles: Vec<Article>, total_count: u64, pagination: Pagination) -> Self {
        Self {
            articles,
            total_count,
            has_next_page: pagination.has_next_page(total_count),
            has_previous_page: pagination.has_previous_page(),
        }
    }
}

/// Caller-facing pagination. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn has_next_page(&self, total_count: u64) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < total_count
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}
