use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

/// Where generated report files are written and how they are served.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
    url_prefix: String,
    file_prefix: String,
}

/// A published report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub path: PathBuf,
    pub public_path: String,
}

/// A report being written. The renderer writes to a hidden staging file
/// that only becomes visible under its public name on `commit`; dropping
/// an uncommitted report removes whatever was staged.
#[derive(Debug)]
pub struct PendingReport {
    staging: PathBuf,
    file: ReportFile,
    committed: bool,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>, file_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Creates the directory if needed and names a new
    /// `<prefix>-<epoch-millis>.pdf` file in it. Nothing is written yet.
    pub async fn allocate(&self) -> io::Result<PendingReport> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}-{}.pdf", self.file_prefix, Utc::now().timestamp_millis());
        Ok(PendingReport {
            staging: self.dir.join(format!(".{file_name}.part")),
            file: ReportFile {
                path: self.dir.join(&file_name),
                public_path: format!("{}/{}", self.url_prefix, file_name),
            },
            committed: false,
        })
    }
}

impl PendingReport {
    /// Path the renderer should write to.
    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    /// Moves the staged output to its public name.
    pub async fn commit(mut self) -> io::Result<ReportFile> {
        tokio::fs::rename(&self.staging, &self.file.path).await?;
        self.committed = true;
        Ok(self.file.clone())
    }
}

impl Drop for PendingReport {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.staging) {
            Ok(()) => warn!(path = %self.staging.display(), "Discarded unfinished report"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.staging.display(), error = %e, "Could not discard unfinished report"),
        }
    }
}
