//! Container enumeration

use tracing::debug;

use crate::error::Result;

use super::streaming::{DocumentSource, collect_all};

/// List every container id of a database, in the order the service returns
/// them. An empty database yields an empty list.
pub async fn list_containers(source: &dyn DocumentSource) -> Result<Vec<String>> {
    let mut feed = source.container_ids();
    let ids = collect_all(feed.as_mut()).await?;

    debug!(
        "Database '{}' has {} container(s)",
        source.database_name(),
        ids.len()
    );
    Ok(ids)
}
