//! Query feeds over the Cosmos DB REST gateway.
//!
//! A [`QueryFeed`] posts one SQL query and follows the `x-ms-continuation`
//! header until the service stops returning one.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use super::Credentials;
use super::auth;
use crate::error::{ErrorInfo, QueryError, Result};
use crate::export::PagedFeed;

pub(crate) const CONTINUATION: &str = "x-ms-continuation";

/// Where a query is sent and how it is signed.
#[derive(Debug, Clone)]
pub(crate) struct QueryTarget {
    /// Full request URL, path segments already escaped
    pub url: Url,
    /// Resource type used in the signature (`colls` or `docs`)
    pub resource_type: &'static str,
    /// Unescaped link of the parent resource used in the signature
    pub resource_link: String,
    /// Name of the array holding the results in the response body
    pub items_key: &'static str,
    /// Whether the query may fan out across physical partitions
    pub cross_partition: bool,
}

/// A paginated query whose results are deserialized into `T`.
pub struct QueryFeed<T> {
    credentials: Credentials,
    target: QueryTarget,
    query: &'static str,
    continuation: Option<String>,
    exhausted: bool,
    pages_read: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> QueryFeed<T> {
    pub(crate) fn new(credentials: Credentials, target: QueryTarget, query: &'static str) -> Self {
        Self {
            credentials,
            target,
            query,
            continuation: None,
            exhausted: false,
            pages_read: 0,
            _marker: PhantomData,
        }
    }

    /// Whether the service has reported the last page
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn resource_label(&self) -> String {
        format!("{}/{}", self.target.resource_link, self.target.resource_type)
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let date = auth::rfc1123(chrono::Utc::now());
        let token = auth::master_key_token(
            &self.credentials.key,
            "POST",
            self.target.resource_type,
            &self.target.resource_link,
            &date,
        );

        let body = json!({ "query": self.query, "parameters": [] });

        let mut request = self
            .credentials
            .http
            .post(self.target.url.clone())
            .header("authorization", token)
            .header("x-ms-date", date)
            .header("x-ms-version", &*self.credentials.api_version)
            .header("x-ms-documentdb-isquery", "True")
            .header(CONTENT_TYPE, "application/query+json")
            .header(ACCEPT, "application/json")
            .body(body.to_string());

        if self.target.cross_partition {
            request = request.header("x-ms-documentdb-query-enablecrosspartition", "True");
        }

        if let Some(count) = self.credentials.max_item_count {
            request = request.header("x-ms-max-item-count", count.to_string());
        }

        if let Some(token) = &self.continuation {
            request = request.header(CONTINUATION, token.as_str());
        }

        request
    }

    fn decode_page(&self, body: &[u8]) -> std::result::Result<Vec<T>, QueryError>
    where
        T: DeserializeOwned,
    {
        let malformed = |reason: String| QueryError::MalformedResponse {
            resource: self.resource_label(),
            reason,
        };

        let mut value: Value = serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
        let items = value
            .get_mut(self.target.items_key)
            .map(Value::take)
            .ok_or_else(|| malformed(format!("missing '{}' array", self.target.items_key)))?;

        serde_json::from_value(items).map_err(|e| malformed(e.to_string()))
    }
}

fn next_continuation(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTINUATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[async_trait]
impl<T> PagedFeed<T> for QueryFeed<T>
where
    T: DeserializeOwned + Send,
{
    async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.exhausted {
            return Ok(None);
        }

        debug!(
            "Fetching page #{} of {}",
            self.pages_read + 1,
            self.resource_label()
        );

        let response = self.request().send().await.inspect_err(|_| {
            self.exhausted = true;
        })?;

        let status = response.status();
        if !status.is_success() {
            self.exhausted = true;
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                resource: self.resource_label(),
                info: ErrorInfo::from_response_body(&body),
            }
            .into());
        }

        self.continuation = next_continuation(response.headers());
        self.exhausted = self.continuation.is_none();

        let body = response.bytes().await.inspect_err(|_| {
            self.exhausted = true;
        })?;
        let page = self.decode_page(&body).inspect_err(|_| {
            self.exhausted = true;
        })?;

        self.pages_read += 1;
        debug!(
            "Received {} item(s) from {} (more pages: {})",
            page.len(),
            self.resource_label(),
            !self.exhausted
        );

        Ok(Some(page))
    }
}
