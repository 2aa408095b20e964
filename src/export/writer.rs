//! Per-document JSON file writer
//!
//! Each document becomes one file named after its id inside the container
//! folder. Existing files are truncated, so a repeated id in the same
//! container leaves the last document read.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{DataError, Result};

use super::layout;
use super::streaming::Document;

/// Writes the documents of one container to its folder
pub struct DocumentWriter {
    /// Folder of the container being exported
    dir: PathBuf,
    /// Container id, used in error messages
    container: String,
    /// Indent output files
    pretty: bool,
    /// Number of documents written
    written: u64,
    /// Bytes written across all files
    bytes: u64,
}

impl DocumentWriter {
    /// Create the container folder (if needed) and a writer for it
    ///
    /// # Arguments
    /// * `backup_dir` - Backup folder of the run, already created
    /// * `container` - Container id, used as the folder name
    /// * `pretty` - Indent output files
    pub async fn create(backup_dir: &Path, container: &str, pretty: bool) -> Result<Self> {
        let dir = backup_dir.join(layout::checked_component("container", container)?);
        tokio::fs::create_dir_all(&dir).await?;

        debug!("Created container folder {}", dir.display());

        Ok(Self {
            dir,
            container: container.to_string(),
            pretty,
            written: 0,
            bytes: 0,
        })
    }

    /// Folder the documents are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of documents written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Number of bytes written so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Serialize one document to `<id>.json`
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Path of the file written
    pub async fn write(&mut self, doc: &Document) -> Result<PathBuf> {
        let id = layout::document_id(doc, &self.container)?;
        let path = layout::document_path(&self.dir, &id)?;

        debug!("Downloading item with id {}", id);

        let json = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        }
        .map_err(DataError::Serialize)?;

        write_file(&path, &json).await?;

        self.written += 1;
        self.bytes += json.len() as u64;
        Ok(path)
    }

    /// Write every document of a page, in order
    ///
    /// # Returns
    /// * `Result<usize>` - Number of documents written
    pub async fn write_batch(&mut self, docs: &[Document]) -> Result<usize> {
        for doc in docs {
            self.write(doc).await?;
        }
        Ok(docs.len())
    }
}

async fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let failed = |source| DataError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).await.map_err(failed)?;
    file.write_all(content).await.map_err(failed)?;
    file.flush().await.map_err(failed)?;
    Ok(())
}
