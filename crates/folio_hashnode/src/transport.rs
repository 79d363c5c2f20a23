use async_trait::async_trait;
use folio_core::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn new(query: &'static str, variables: Value) -> Self {
        Self { query, variables }
    }
}

/// Sends a GraphQL document upstream and hands back the raw JSON body.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid GraphQL endpoint {}: {}", endpoint, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
        let response = self.client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }
}
