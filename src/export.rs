// Handles saving generated pages to local files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures_util::future::join_all;
use regex::{Captures, Regex};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::DEFAULT_EXPORT_STAGGER;
use crate::error::ExportError;

pub const SVG_MIME: &str = "image/svg+xml";
pub const DEFAULT_PATTERN: &str = "handwriting-page-{page}.svg";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(page|total|date)\}").expect("placeholder regex"));
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("filename regex"));

/// Host capability that persists one exported file.
pub trait FileExporter: Send + Sync {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), ExportError>;
}

/// Writes exports into a folder picked by the user.
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    dir: PathBuf,
}

impl DirectoryExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileExporter for DirectoryExporter {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), ExportError> {
        let io_err = |source| ExportError::Io {
            filename: filename.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(self.dir.join(filename), bytes).map_err(io_err)
    }
}

/// Page markup wrapped as a downloadable object.
///
/// Released when dropped, whichever way the save went.
#[derive(Debug)]
pub struct PageBlob {
    bytes: Vec<u8>,
    mime: &'static str,
}

impl PageBlob {
    pub fn from_markup(markup: &str) -> Result<Self, ExportError> {
        let trimmed = markup.trim();
        if trimmed.is_empty() {
            return Err(ExportError::EmptyMarkup);
        }
        if !trimmed.contains("<svg") {
            return Err(ExportError::NotMarkup);
        }

        Ok(Self {
            bytes: markup.as_bytes().to_vec(),
            mime: SVG_MIME,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }
}

impl Drop for PageBlob {
    fn drop(&mut self) {
        trace!(len = self.bytes.len(), "page blob released");
    }
}

/// Saves a single page.
pub fn export_one(exporter: &dyn FileExporter, markup: &str, filename: &str) -> Result<(), ExportError> {
    let blob = PageBlob::from_markup(markup)?;
    let saved = exporter.save(blob.bytes(), filename);
    drop(blob);

    match &saved {
        Ok(()) => debug!(filename, "page exported"),
        Err(err) => warn!(filename, error = %err, "page export failed"),
    }
    saved
}

/// File name template for multi-page export.
///
/// Placeholders: `{page}` (1-based), `{total}`, `{date}` (local `YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern(String);

impl Default for FilenamePattern {
    fn default() -> Self {
        Self(DEFAULT_PATTERN.to_string())
    }
}

impl FilenamePattern {
    pub fn new(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Self::default();
        }
        if pattern.contains("{page}") {
            return Self(pattern.to_string());
        }

        // Keep names distinct across pages.
        match pattern.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Self(format!("{stem}-{{page}}.{ext}")),
            _ => Self(format!("{pattern}-{{page}}")),
        }
    }

    /// Name for a single-page export: used as given apart from placeholders
    /// and sanitizing. Blank falls back to the default pattern.
    pub fn single(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return Self::default();
        }
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for the page at `index` of `total`.
    pub fn render(&self, index: usize, total: usize, date: &str) -> String {
        let name = PLACEHOLDER.replace_all(&self.0, |caps: &Captures| match &caps[1] {
            "page" => (index + 1).to_string(),
            "total" => total.to_string(),
            _ => date.to_string(),
        });
        UNSAFE_CHARS.replace_all(&name, "_").into_owned()
    }
}

/// One export slot handed out by [`ExportSequencer::schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledExport {
    pub index: usize,
    pub filename: String,
    #[serde(serialize_with = "serialize_millis")]
    pub delay: Duration,
}

fn serialize_millis<S: serde::Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(delay.as_millis())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedExport {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub exported: Vec<String>,
    pub failed: Vec<FailedExport>,
    pub cancelled: usize,
}

enum Outcome {
    Exported(String),
    Failed(FailedExport),
    Cancelled,
}

/// Staggers multi-page exports so the host does not drop any of them.
pub struct ExportSequencer {
    exporter: Arc<dyn FileExporter>,
    stagger: Duration,
}

impl ExportSequencer {
    pub fn new(exporter: Arc<dyn FileExporter>) -> Self {
        Self::with_stagger(exporter, DEFAULT_EXPORT_STAGGER)
    }

    pub fn with_stagger(exporter: Arc<dyn FileExporter>, stagger: Duration) -> Self {
        Self { exporter, stagger }
    }

    pub fn export_one(&self, markup: &str, filename: &str) -> Result<(), ExportError> {
        export_one(self.exporter.as_ref(), markup, filename)
    }

    /// Export slots in ascending page order, `index × stagger` apart.
    pub fn schedule(&self, total: usize, pattern: &FilenamePattern) -> Vec<ScheduledExport> {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        (0..total)
            .map(|index| ScheduledExport {
                index,
                filename: pattern.render(index, total, &date),
                delay: self.stagger * u32::try_from(index).unwrap_or(u32::MAX),
            })
            .collect()
    }

    /// Exports every page on its own timer.
    ///
    /// A page that fails is reported and skipped; the others still run.
    /// Timers that have not fired when `cancel` trips are counted as cancelled.
    pub async fn export_all(
        &self,
        pages: &[String],
        pattern: &FilenamePattern,
        cancel: &CancellationToken,
    ) -> ExportSummary {
        let slots = self.schedule(pages.len(), pattern);
        info!(count = slots.len(), "exporting pages");

        let (filenames, tasks): (Vec<String>, Vec<_>) = slots
            .into_iter()
            .zip(pages.iter().cloned())
            .map(|(slot, markup)| {
                let exporter = Arc::clone(&self.exporter);
                let cancel = cancel.clone();
                let filename = slot.filename.clone();
                let task = tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Outcome::Cancelled,
                        () = tokio::time::sleep(slot.delay) => {}
                    }
                    match export_one(exporter.as_ref(), &markup, &slot.filename) {
                        Ok(()) => Outcome::Exported(slot.filename),
                        Err(err) => Outcome::Failed(FailedExport {
                            filename: slot.filename,
                            reason: err.to_string(),
                        }),
                    }
                });
                (filename, task)
            })
            .unzip();

        let mut summary = ExportSummary::default();
        for (filename, joined) in filenames.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(Outcome::Exported(filename)) => summary.exported.push(filename),
                Ok(Outcome::Failed(failed)) => summary.failed.push(failed),
                Ok(Outcome::Cancelled) => summary.cancelled += 1,
                Err(err) => summary.failed.push(FailedExport {
                    filename,
                    reason: err.to_string(),
                }),
            }
        }

        info!(
            exported = summary.exported.len(),
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "export finished"
        );
        summary
    }
}

/// Cancellation handles for the export runs in flight.
///
/// Each run owns its own entry, so one run finishing never drops another's token.
#[derive(Debug, Default)]
pub struct ExportRuns {
    inner: Mutex<RunSlots>,
}

#[derive(Debug, Default)]
struct RunSlots {
    next_id: u64,
    active: HashMap<u64, CancellationToken>,
}

impl ExportRuns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a run; pass the id back to [`ExportRuns::finish`].
    pub async fn begin(&self) -> (u64, CancellationToken) {
        let mut slots = self.inner.lock().await;
        slots.next_id += 1;
        let id = slots.next_id;
        let token = CancellationToken::new();
        slots.active.insert(id, token.clone());
        (id, token)
    }

    pub async fn finish(&self, id: u64) {
        self.inner.lock().await.active.remove(&id);
    }

    /// Cancels every active run. Returns false when nothing was running.
    pub async fn cancel_all(&self) -> bool {
        let mut slots = self.inner.lock().await;
        let cancelled = !slots.active.is_empty();
        for (_, token) in slots.active.drain() {
            token.cancel();
        }
        cancelled
    }

    pub async fn active(&self) -> usize {
        self.inner.lock().await.active.len()
    }
}
