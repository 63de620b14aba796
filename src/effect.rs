//! Deferred file writes
//!
//! A [`WriteEffect`] is a file write that has not happened yet: the data, the
//! destination, and the means to perform it. Building one touches nothing;
//! only [`WriteEffect::perform`] does I/O.

use crate::error::FsResult;
use crate::fs::{FileSystem, StdFileSystem};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Callback run after a successful write.
pub type Notification = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct WriteEffect {
    data: String,
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    notification: Option<Notification>,
}

impl WriteEffect {
    /// An effect that writes `data` to `path` on the real file system.
    pub fn new(data: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            path: path.into(),
            fs: Arc::new(StdFileSystem),
            notification: None,
        }
    }

    /// Like [`WriteEffect::new`], running `notification` after each successful write.
    pub fn with_notification(
        data: impl Into<String>,
        path: impl Into<PathBuf>,
        notification: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::new(data, path).notify(Arc::new(notification))
    }

    /// Replace the post-write notification.
    pub fn notify(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Perform the write through `fs` instead of the real file system.
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// The text that will be written.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// The exact destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_notification(&self) -> bool {
        self.notification.is_some()
    }

    /// Write the data.
    ///
    /// Creates the parent directory if needed, then creates or overwrites the
    /// file, then runs the notification. A file system failure is returned
    /// and the notification is skipped. Every call writes again and notifies
    /// again.
    pub fn perform(&self) -> FsResult<()> {
        if let Some(parent) = self.path.parent() {
            self.fs.ensure_directory(parent)?;
        }
        self.fs.write_all_text(&self.path, &self.data)?;

        if let Some(notification) = &self.notification {
            notification();
        }
        Ok(())
    }

    /// Consume the effect and perform it.
    pub fn run(self) -> FsResult<PathBuf> {
        self.perform()?;
        Ok(self.path)
    }
}

impl fmt::Debug for WriteEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteEffect")
            .field("path", &self.path)
            .field("data_len", &self.data.len())
            .field("has_notification", &self.notification.is_some())
            .finish_non_exhaustive()
    }
}
