//! Headless browser printing.
//!
//! Each render launches its own browser process and prints a temporary HTML
//! file to the requested path. The process is killed if the render future is
//! dropped, and the temporary file is removed on every exit path.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use derive_more::Display;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Browser executables tried, in order, when no binary is configured.
const BROWSER_CANDIDATES: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "google-chrome-stable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub size: &'static str,
    pub landscape: bool,
    pub margin_mm: u32,
}

pub const WAGE_REGISTER_PAGE: PageSetup = PageSetup {
    size: "A4",
    landscape: true,
    margin_mm: 10,
};

impl PageSetup {
    /// The `@page` rule the browser's print pipeline honours.
    pub fn css(&self) -> String {
        let orientation = if self.landscape { "landscape" } else { "portrait" };
        format!(
            "@page {{ size: {} {}; margin: {}mm; }}",
            self.size, orientation, self.margin_mm
        )
    }
}

#[derive(Debug, Display)]
pub enum RenderError {
    #[display(fmt = "no headless browser found; set CHROME_BIN or install chromium")]
    BrowserNotFound,
    #[display(fmt = "failed to launch {}: {}", binary, source)]
    Launch { binary: String, source: io::Error },
    #[display(fmt = "browser exited with {}: {}", status, stderr)]
    Failed { status: String, stderr: String },
    #[display(fmt = "browser produced no output at {}", _0)]
    MissingOutput(String),
    #[display(fmt = "render io error: {}", _0)]
    Io(io::Error),
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Launch { source, .. } => Some(source),
            RenderError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(e: io::Error) -> Self {
        RenderError::Io(e)
    }
}

/// Prints an HTML document to a PDF file.
pub trait PdfRenderer: Send + Sync {
    fn render<'a>(&'a self, html: &'a str, output: &'a Path) -> BoxFuture<'a, Result<(), RenderError>>;
}

#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    binary: Option<PathBuf>,
    budget_ms: u64,
}

impl ChromiumRenderer {
    /// `budget_ms` is the virtual-time budget the browser grants the page to
    /// finish loading resources before it prints.
    pub fn new(binary: Option<PathBuf>, budget_ms: u64) -> Self {
        Self { binary, budget_ms }
    }

    fn resolve_binary(&self) -> Result<PathBuf, RenderError> {
        if let Some(binary) = &self.binary {
            return Ok(binary.clone());
        }
        BROWSER_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or(RenderError::BrowserNotFound)
    }

    fn command(&self, binary: &Path, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(binary);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--hide-scrollbars")
            .arg("--no-pdf-header-footer")
            .arg("--print-to-pdf-no-header")
            .arg("--run-all-compositor-stages-before-draw")
            .arg(format!("--virtual-time-budget={}", self.budget_ms))
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn print(&self, html: &str, output: &Path) -> Result<(), RenderError> {
        let binary = self.resolve_binary()?;
        let output = std::path::absolute(output)?;
        let input = ScratchFile::write(html).await?;

        let started = Instant::now();
        debug!(binary = %binary.display(), output = %output.display(), "Launching headless browser");

        let result = self
            .command(&binary, input.path(), &output)
            .output()
            .await
            .map_err(|source| RenderError::Launch {
                binary: binary.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            error!(status = %result.status, stderr = %stderr, "Headless browser failed");
            return Err(RenderError::Failed {
                status: result.status.to_string(),
                stderr,
            });
        }

        match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => {}
            _ => return Err(RenderError::MissingOutput(output.display().to_string())),
        }

        info!(
            output = %output.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "PDF rendered"
        );
        Ok(())
    }
}

impl PdfRenderer for ChromiumRenderer {
    fn render<'a>(&'a self, html: &'a str, output: &'a Path) -> BoxFuture<'a, Result<(), RenderError>> {
        self.print(html, output).boxed()
    }
}

/// Temporary HTML input, deleted when dropped.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    async fn write(html: &str) -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!("wage-register-{}.html", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, html).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
