//! GraphQL documents sent to Hashnode and the raw shapes they come back in.
//!
//! Every raw field is optional: the upstream may omit or null anything, and
//! normalization fills the gaps with defaults instead of failing.

use chrono::{DateTime, Utc};
use folio_core::{Article, ArticleContent, Error, Result, Series, SeriesRef, Tag};
use serde::Deserialize;

pub const USER_ARTICLES: &str = r#"
  query GetUserArticles($username: String!, $pageSize: Int!, $page: Int!) {
    user(username: $username) {
      posts(pageSize: $pageSize, page: $page) {
        totalDocuments
        nodes {
          id
          title
          brief
          slug
          publishedAt
          readTimeInMinutes
          tags {
            name
            slug
          }
          series {
            name
            slug
          }
          coverImage {
            url
          }
          url
          content {
            markdown
            html
          }
        }
      }
    }
  }
"#;

pub const USER_SERIES: &str = r#"
  query GetUserSeries($username: String!) {
    user(username: $username) {
      publications(first: 1) {
        edges {
          node {
            seriesList(first: 10) {
              edges {
                node {
                  name
                  slug
                  description {
                    text
                  }
                  posts(first: 1) {
                    totalDocuments
                  }
                }
              }
            }
          }
        }
      }
    }
  }
"#;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// In-band errors win over any partial data.
    pub fn into_result(self) -> Result<T> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Upstream(format!("API reported errors: {}", messages)));
        }
        self.data
            .ok_or_else(|| Error::Upstream("Response carried no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ArticlesData {
    pub user: Option<UserPosts>,
}

#[derive(Debug, Deserialize)]
pub struct UserPosts {
    pub posts: Option<PostConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostConnection {
    pub total_documents: Option<u64>,
    pub nodes: Option<Vec<RawPost>>,
}

impl PostConnection {
    pub fn into_articles(self) -> (Vec<Article>, u64) {
        let articles: Vec<Article> = self
            .nodes
            .unwrap_or_default()
            .into_iter()
            .map(Article::from)
            .collect();
        (articles, self.total_documents.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub id: Option<String>,
    pub title: Option<String>,
    pub brief: Option<String>,
    pub slug: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub read_time_in_minutes: Option<u32>,
    pub tags: Option<Vec<RawTag>>,
    pub series: Option<RawSeriesRef>,
    pub cover_image: Option<RawCoverImage>,
    pub url: Option<String>,
    pub content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
pub struct RawTag {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSeriesRef {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCoverImage {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawContent {
    pub markdown: Option<String>,
    pub html: Option<String>,
}

impl From<RawPost> for Article {
    fn from(raw: RawPost) -> Self {
        Article {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            brief: raw.brief,
            slug: raw.slug.unwrap_or_default(),
            published_at: raw.published_at.unwrap_or_default(),
            read_time_in_minutes: raw.read_time_in_minutes,
            cover_image_url: raw.cover_image.and_then(|c| c.url),
            url: raw.url.unwrap_or_default(),
            series: raw.series.map(|s| SeriesRef {
                name: s.name.unwrap_or_default(),
                slug: s.slug.unwrap_or_default(),
            }),
            tags: raw
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| Tag {
                    name: t.name.unwrap_or_default(),
                    slug: t.slug.unwrap_or_default(),
                })
                .collect(),
            content: raw.content.map(|c| ArticleContent {
                markdown: c.markdown,
                html: c.html,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeriesData {
    pub user: Option<UserPublications>,
}

#[derive(Debug, Deserialize)]
pub struct UserPublications {
    pub publications: Option<Connection<Publication>>,
}

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub edges: Option<Vec<Edge<T>>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: Option<T>,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges
            .unwrap_or_default()
            .into_iter()
            .filter_map(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub series_list: Option<Connection<RawSeries>>,
}

#[derive(Debug, Deserialize)]
pub struct RawSeries {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<RawDescription>,
    pub posts: Option<RawPostCount>,
}

#[derive(Debug, Deserialize)]
pub struct RawDescription {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostCount {
    pub total_documents: Option<u64>,
}

impl From<RawSeries> for Series {
    fn from(raw: RawSeries) -> Self {
        Series {
            name: raw.name.unwrap_or_default(),
            slug: raw.slug.unwrap_or_default(),
            description: raw.description.and_then(|d| d.text),
            total_posts: raw.posts.and_then(|p| p.total_documents).unwrap_or_default(),
        }
    }
}

impl SeriesData {
    /// Series of the user's first publication. A user without publications has none.
    pub fn into_series(self) -> Vec<Series> {
        self.user
            .and_then(|u| u.publications)
            .and_then(|p| p.into_nodes().next())
            .and_then(|publication| publication.series_list)
            .map(|list| list.into_nodes().map(Series::from).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_normalization_fills_gaps() {
        let raw: RawPost = serde_json::from_value(json!({
            "id": "p1",
            "title": "Hello",
            "slug": "hello",
            "publishedAt": "2024-03-01T12:00:00.000Z",
            "tags": null,
            "url": "https://blog.example.com/hello"
        }))
        .unwrap();

        let article = Article::from(raw);
        assert_eq!(article.id, "p1");
        assert_eq!(article.brief, None);
        assert_eq!(article.read_time_in_minutes, None);
        assert_eq!(article.cover_image_url, None);
        assert_eq!(article.series, None);
        assert!(article.tags.is_empty());
        assert_eq!(article.published_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn test_post_normalization_keeps_tag_order() {
        let raw: RawPost = serde_json::from_value(json!({
            "id": "p2",
            "title": "Tags",
            "slug": "tags",
            "publishedAt": "2024-03-01T12:00:00Z",
            "readTimeInMinutes": 4,
            "tags": [
                { "name": "Rust", "slug": "rust" },
                { "name": "Web", "slug": "web" },
                { "name": "Rust", "slug": "rust" }
            ],
            "series": { "name": "Notes", "slug": "notes" },
            "coverImage": { "url": "https://cdn.example.com/c.png" },
            "url": "https://blog.example.com/tags"
        }))
        .unwrap();

        let article = Article::from(raw);
        let slugs: Vec<&str> = article.tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["rust", "web", "rust"]);
        assert_eq!(article.read_time_in_minutes, Some(4));
        assert_eq!(article.cover_image_url.as_deref(), Some("https://cdn.example.com/c.png"));
        assert_eq!(article.series.map(|s| s.slug), Some("notes".to_string()));
    }

    #[test]
    fn test_series_normalization() {
        let data: SeriesData = serde_json::from_value(json!({
            "user": {
                "publications": {
                    "edges": [{
                        "node": {
                            "seriesList": {
                                "edges": [
                                    { "node": {
                                        "name": "Rust Notes",
                                        "slug": "rust-notes",
                                        "description": { "text": "Learning Rust" },
                                        "posts": { "totalDocuments": 5 }
                                    }},
                                    { "node": { "name": "Drafts", "slug": "drafts" } }
                                ]
                            }
                        }
                    }]
                }
            }
        }))
        .unwrap();

        let series = data.into_series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].description.as_deref(), Some("Learning Rust"));
        assert_eq!(series[0].total_posts, 5);
        assert_eq!(series[1].description, None);
        assert_eq!(series[1].total_posts, 0);
    }

    #[test]
    fn test_series_without_publications() {
        let data: SeriesData =
            serde_json::from_value(json!({ "user": { "publications": { "edges": [] } } })).unwrap();
        assert!(data.into_series().is_empty());
    }

    #[test]
    fn test_in_band_errors() {
        let response: GraphQlResponse<ArticlesData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "User not found" }]
        }))
        .unwrap();

        match response.into_result() {
            Err(Error::Upstream(message)) => assert!(message.contains("User not found")),
            other => panic!("expected upstream error, got {:?}", other.map(|_| ())),
        }
    }
}
