//! Backup coordinator
//!
//! Brings together container enumeration, document feeds and the file
//! writer. Containers are exported one after another and each feed is
//! drained page by page; the first error ends the run and whatever was
//! already written stays on disk.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;

use super::enumerator::list_containers;
use super::progress::ProgressTracker;
use super::streaming::DocumentSource;
use super::writer::DocumentWriter;

/// Result of a backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    /// Backup folder that was populated
    pub directory: PathBuf,
    /// Number of containers exported
    pub containers: usize,
    /// Number of documents written
    pub documents: u64,
    /// Bytes written across all document files
    pub bytes_written: u64,
    /// Time taken for the run
    pub elapsed_ms: u64,
}

/// Result of exporting one container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSummary {
    pub documents: u64,
    pub bytes_written: u64,
}

/// Coordinator for one backup run
pub struct BackupCoordinator<'a> {
    /// Database being exported
    source: &'a dyn DocumentSource,
    /// Dated backup folder
    backup_dir: PathBuf,
    /// Indent document files
    pretty: bool,
    /// Show a spinner per container
    show_progress: bool,
}

impl<'a> BackupCoordinator<'a> {
    /// Create a coordinator writing into `backup_dir`
    pub fn new(source: &'a dyn DocumentSource, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            backup_dir: backup_dir.into(),
            pretty: true,
            show_progress: false,
        }
    }

    /// Choose between indented and compact document files
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Enable the per-container spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Execute the backup
    ///
    /// 1. Enumerate containers
    /// 2. Create the backup folder
    /// 3. Export each container in enumeration order
    ///
    /// # Returns
    /// * `Result<BackupSummary>` - Run statistics or the first error
    pub async fn execute(&self) -> Result<BackupSummary> {
        let start_time = Instant::now();

        let containers = list_containers(self.source).await?;
        info!("Found {} container(s).", containers.len());

        info!("Creating backup folder: {}", self.backup_dir.display());
        tokio::fs::create_dir_all(&self.backup_dir).await?;

        let mut documents = 0u64;
        let mut bytes_written = 0u64;

        for container in &containers {
            let summary = self.export_container(container).await?;
            documents += summary.documents;
            bytes_written += summary.bytes_written;
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Backup completed: {} container(s), {} document(s), {} bytes, {} ms",
            containers.len(),
            documents,
            bytes_written,
            elapsed_ms
        );

        Ok(BackupSummary {
            directory: self.backup_dir.clone(),
            containers: containers.len(),
            documents,
            bytes_written,
            elapsed_ms,
        })
    }

    /// Export every document of one container into its folder
    pub async fn export_container(&self, container: &str) -> Result<ContainerSummary> {
        info!("Creating container folder {}.", container);
        let mut writer = DocumentWriter::create(&self.backup_dir, container, self.pretty).await?;

        let tracker = ProgressTracker::new(container, self.show_progress);
        let mut feed = self.source.documents(container);
        let mut page_count = 0u32;

        while let Some(page) = feed.next_page().await? {
            page_count += 1;
            debug!("Writing page #{} ({} documents)", page_count, page.len());

            writer.write_batch(&page).await?;
            tracker.update(writer.written());
        }

        tracker.finish();
        info!(
            "Exported {} document(s) from {} in {} ms",
            writer.written(),
            container,
            tracker.elapsed_ms()
        );

        Ok(ContainerSummary {
            documents: writer.written(),
            bytes_written: writer.bytes(),
        })
    }
}
