//! Connection to a Cosmos DB account
//!
//! This module provides:
//! - Connection string parsing (`AccountEndpoint=...;AccountKey=...;`)
//! - An HTTP client signed with the account master key
//! - Database and container handles exposing paginated query feeds

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result};
use crate::export::{Document, DocumentSource, PagedFeed};

pub mod auth;
pub mod feed;

pub use feed::QueryFeed;

use feed::QueryTarget;

const LIST_CONTAINERS_QUERY: &str = "SELECT VALUE c.id FROM c";
const LIST_DOCUMENTS_QUERY: &str = "SELECT * FROM c";

/// Parsed Cosmos DB connection string
///
/// Only `AccountEndpoint` and `AccountKey` are read; any other entry is
/// ignored. Key names are matched case-insensitively.
#[derive(Clone)]
pub struct ConnectionString {
    endpoint: Url,
    key: Vec<u8>,
}

impl ConnectionString {
    /// Account endpoint URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("key", &"***")
            .finish()
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut key = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // Keys are base64 and may end with '=', so only split once.
            let (name, value) = segment.split_once('=').ok_or_else(|| {
                ConnectionError::InvalidConnectionString(
                    "expected entries of the form Key=Value separated by ';'".to_string(),
                )
            })?;

            match name.trim().to_ascii_lowercase().as_str() {
                "accountendpoint" => endpoint = Some(value.trim()),
                "accountkey" => key = Some(value.trim()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConnectionError::MissingField("AccountEndpoint".to_string()))?;
        let key = key
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConnectionError::MissingField("AccountKey".to_string()))?;

        let endpoint =
            Url::parse(endpoint).map_err(|e| ConnectionError::InvalidEndpoint(e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.cannot_be_a_base() {
            return Err(ConnectionError::InvalidEndpoint(format!(
                "'{endpoint}' is not an http(s) URL"
            )));
        }

        let key = STANDARD
            .decode(key)
            .map_err(|e| ConnectionError::InvalidKey(e.to_string()))?;

        Ok(Self { endpoint, key })
    }
}

/// Everything needed to sign and send a request, shared by all handles
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) http: reqwest::Client,
    pub(crate) key: Arc<[u8]>,
    pub(crate) api_version: Arc<str>,
    pub(crate) max_item_count: Option<u32>,
}

/// Client for one Cosmos DB account
#[derive(Clone)]
pub struct CosmosClient {
    endpoint: Url,
    credentials: Credentials,
}

impl CosmosClient {
    /// Create a client from a raw connection string
    ///
    /// No request is made here. Bad credentials or a missing database only
    /// show up on the first query.
    pub fn new(connection_string: &str, config: &ConnectionConfig) -> Result<Self> {
        let parsed: ConnectionString = connection_string.parse()?;
        Self::from_connection_string(parsed, config)
    }

    /// Create a client from an already parsed connection string
    pub fn from_connection_string(
        connection: ConnectionString,
        config: &ConnectionConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("cosmos-dump/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConnectionError::ClientBuild(e.to_string()))?;

        debug!("Created client for {}", connection.endpoint);

        Ok(Self {
            endpoint: connection.endpoint,
            credentials: Credentials {
                http,
                key: connection.key.into(),
                api_version: config.api_version.as_str().into(),
                max_item_count: config.max_item_count,
            },
        })
    }

    /// Account endpoint URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve a handle to a database by name
    pub fn database(&self, name: &str) -> Database {
        Database {
            client: self.clone(),
            name: name.to_string(),
        }
    }

    /// Build `{endpoint}/seg1/seg2/...`, escaping each segment
    fn resource_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Handle to one database
#[derive(Clone)]
pub struct Database {
    client: CosmosClient,
    name: String,
}

impl Database {
    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve a handle to a container by id
    pub fn container(&self, id: &str) -> Container {
        Container {
            database: self.clone(),
            id: id.to_string(),
        }
    }

    /// Paginated feed of every container id in this database
    pub fn list_containers(&self) -> QueryFeed<String> {
        let target = QueryTarget {
            url: self.client.resource_url(&["dbs", &self.name, "colls"]),
            resource_type: "colls",
            resource_link: format!("dbs/{}", self.name),
            items_key: "DocumentCollections",
            cross_partition: false,
        };
        QueryFeed::new(self.client.credentials.clone(), target, LIST_CONTAINERS_QUERY)
    }
}

/// Handle to one container
#[derive(Clone)]
pub struct Container {
    database: Database,
    id: String,
}

impl Container {
    /// Container id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Paginated feed of every document in this container
    pub fn list_documents(&self) -> QueryFeed<Document> {
        let client = &self.database.client;
        let target = QueryTarget {
            url: client.resource_url(&["dbs", &self.database.name, "colls", &self.id, "docs"]),
            resource_type: "docs",
            resource_link: format!("dbs/{}/colls/{}", self.database.name, self.id),
            items_key: "Documents",
            cross_partition: true,
        };
        QueryFeed::new(client.credentials.clone(), target, LIST_DOCUMENTS_QUERY)
    }
}

impl DocumentSource for Database {
    fn database_name(&self) -> &str {
        &self.name
    }

    fn container_ids(&self) -> Box<dyn PagedFeed<String> + '_> {
        Box::new(self.list_containers())
    }

    fn documents(&self, container_id: &str) -> Box<dyn PagedFeed<Document> + '_> {
        Box::new(self.container(container_id).list_documents())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DumpError, QueryError};
    use crate::export::collect_all;
    use mockito::Matcher;
    use serde_json::json;

    const KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM=";

    fn connect(server: &mockito::Server) -> Database {
        let conn = format!("AccountEndpoint={}/;AccountKey={KEY};", server.url());
        CosmosClient::new(&conn, &ConnectionConfig::default())
            .unwrap()
            .database("shop")
    }

    #[test]
    fn test_parse_connection_string() {
        let conn: ConnectionString = format!(
            "AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey={KEY};"
        )
        .parse()
        .unwrap();

        assert_eq!(conn.endpoint().host_str(), Some("acct.documents.azure.com"));
        assert_eq!(conn.key, b"secret-key-for-tests");
    }

    #[test]
    fn test_parse_connection_string_ignores_unknown_and_case() {
        let conn: ConnectionString = format!(
            " accountendpoint=https://acct.documents.azure.com/ ; ACCOUNTKEY={KEY} ; Database=x"
        )
        .parse()
        .unwrap();
        assert_eq!(conn.endpoint().scheme(), "https");
    }

    #[test]
    fn test_parse_connection_string_missing_key() {
        let err = "AccountEndpoint=https://acct.documents.azure.com/;"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(matches!(err, ConnectionError::MissingField(f) if f == "AccountKey"));
    }

    #[test]
    fn test_parse_connection_string_garbage() {
        let err = "not a connection string".parse::<ConnectionString>().unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_parse_connection_string_bad_key() {
        let err = "AccountEndpoint=https://acct.documents.azure.com/;AccountKey=***"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidKey(_)));
    }

    #[test]
    fn test_parse_connection_string_bad_endpoint() {
        let err = format!("AccountEndpoint=ftp://acct/;AccountKey={KEY}")
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let conn: ConnectionString =
            format!("AccountEndpoint=https://acct.documents.azure.com/;AccountKey={KEY}")
                .parse()
                .unwrap();
        assert!(!format!("{conn:?}").contains(KEY));
    }

    #[test]
    fn test_resource_url_escapes_segments() {
        let client = CosmosClient::new(
            &format!("AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey={KEY}"),
            &ConnectionConfig::default(),
        )
        .unwrap();

        let url = client.resource_url(&["dbs", "my db", "colls"]);
        assert_eq!(url.as_str(), "https://acct.documents.azure.com/dbs/my%20db/colls");
    }

    #[tokio::test]
    async fn test_list_containers_follows_continuation() {
        let mut server = mockito::Server::new_async().await;

        let first = server
            .mock("POST", "/dbs/shop/colls")
            .match_header("x-ms-documentdb-isquery", "True")
            .match_header("content-type", "application/query+json")
            .match_header("x-ms-version", "2018-12-31")
            .match_header("authorization", Matcher::Regex("^type%3Dmaster".to_string()))
            .match_header("x-ms-continuation", Matcher::Missing)
            .match_body(Matcher::PartialJson(json!({ "query": "SELECT VALUE c.id FROM c" })))
            .with_status(200)
            .with_header("x-ms-continuation", "page-2")
            .with_body(r#"{"_rid":"x","DocumentCollections":["orders","users"],"_count":2}"#)
            .expect(1)
            .create_async()
            .await;

        let second = server
            .mock("POST", "/dbs/shop/colls")
            .match_header("x-ms-continuation", "page-2")
            .with_status(200)
            .with_body(r#"{"_rid":"x","DocumentCollections":["audit"],"_count":1}"#)
            .expect(1)
            .create_async()
            .await;

        let database = connect(&server);
        let mut feed = database.list_containers();
        let ids = collect_all(&mut feed).await.unwrap();

        assert_eq!(ids, vec!["orders", "users", "audit"]);
        assert!(feed.is_exhausted());
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_documents_is_cross_partition_and_preserves_order() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/dbs/shop/colls/orders/docs")
            .match_header("x-ms-documentdb-query-enablecrosspartition", "True")
            .match_body(Matcher::PartialJson(json!({ "query": "SELECT * FROM c" })))
            .with_status(200)
            .with_body(r#"{"Documents":[{"z":1,"id":"a","m":{"y":2,"b":3}}],"_count":1}"#)
            .expect(1)
            .create_async()
            .await;

        let database = connect(&server);
        let mut feed = database.container("orders").list_documents();
        let page = feed.next_page().await.unwrap().unwrap();

        assert_eq!(page.len(), 1);
        let keys: Vec<&str> = page[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "id", "m"]);
        assert!(feed.next_page().await.unwrap().is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_page_size_header() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/dbs/shop/colls")
            .match_header("x-ms-max-item-count", "50")
            .with_status(200)
            .with_body(r#"{"DocumentCollections":[]}"#)
            .create_async()
            .await;

        let config = ConnectionConfig {
            max_item_count: Some(50),
            ..ConnectionConfig::default()
        };
        let conn = format!("AccountEndpoint={}/;AccountKey={KEY};", server.url());
        let database = CosmosClient::new(&conn, &config).unwrap().database("shop");

        let ids = collect_all(&mut database.list_containers()).await.unwrap();
        assert!(ids.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_database_reports_status() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/dbs/shop/colls")
            .with_status(404)
            .with_body(r#"{"code":"NotFound","message":"Message: {\"Errors\":[\"Resource Not Found\"]}\r\nActivityId: 1234-abcd"}"#)
            .create_async()
            .await;

        let database = connect(&server);
        let mut feed = database.list_containers();
        let err = feed.next_page().await.unwrap_err();

        match &err {
            DumpError::Query(QueryError::Status { status, info, .. }) => {
                assert_eq!(*status, 404);
                assert_eq!(info.message.as_deref(), Some("Resource Not Found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(feed.is_exhausted());
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/dbs/shop/colls")
            .with_status(200)
            .with_body(r#"{"Documents":[]}"#)
            .create_async()
            .await;

        let database = connect(&server);
        let err = database.list_containers().next_page().await.unwrap_err();
        assert!(matches!(
            err,
            DumpError::Query(QueryError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_truncated_body_ends_feed() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nx-ms-continuation: next\r\nContent-Length: 100\r\n\r\n{\"Docu",
                )
                .await
                .unwrap();
        });

        let conn = format!("AccountEndpoint=http://{addr}/;AccountKey={KEY};");
        let database = CosmosClient::new(&conn, &ConnectionConfig::default())
            .unwrap()
            .database("shop");
        let mut feed = database.container("orders").list_documents();

        assert!(feed.next_page().await.is_err());
        assert!(feed.is_exhausted());
        assert!(feed.next_page().await.unwrap().is_none());

        server.await.unwrap();
    }
}
