//! Paginated feed abstractions for export operations
//!
//! The exporter never talks to the database directly. It pulls pages from a
//! [`PagedFeed`] obtained through a [`DocumentSource`], which keeps the
//! pipeline independent of the wire protocol and lets tests drive it with
//! in-memory data.

use async_trait::async_trait;

use crate::error::Result;

/// A schema-less document, keys kept in the order the service returned them.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Trait for reading a server-side cursor one page at a time
#[async_trait]
pub trait PagedFeed<T: Send>: Send {
    /// Fetch the next page of results
    ///
    /// # Returns
    /// * `Result<Option<Vec<T>>>` - Next page, or None once the feed reports
    ///   no more pages. A page may be empty while more pages remain.
    async fn next_page(&mut self) -> Result<Option<Vec<T>>>;
}

/// A database that can enumerate its containers and their documents
pub trait DocumentSource: Sync {
    /// Name of the database being read
    fn database_name(&self) -> &str;

    /// Feed of every container id in the database
    fn container_ids(&self) -> Box<dyn PagedFeed<String> + '_>;

    /// Feed of every document in one container
    fn documents(&self, container_id: &str) -> Box<dyn PagedFeed<Document> + '_>;
}

/// Drain a feed into one vector, preserving page and item order
pub async fn collect_all<T: Send>(feed: &mut (dyn PagedFeed<T> + '_)) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while let Some(page) = feed.next_page().await? {
        items.extend(page);
    }
    Ok(items)
}
