// Handles Tauri command definitions

use std::path::PathBuf;
use std::sync::Arc;

use kalam::config::export_stagger_from_env;
use kalam::types::{StyleDetail, StyleList};
use kalam::{
    ApiClient, DirectoryExporter, ExportRuns, ExportSequencer, ExportSummary, FilenamePattern,
    Lifecycle, LineParams, Orchestrator, PageCompletion, PageParams, PageView, Pagination,
    StyleCatalog, Submission,
};
use serde::Serialize;
use tauri::api::dialog::blocking::FileDialogBuilder;
use tauri::{command, State};
use tokio::sync::Mutex;

/// Export runs in progress, for `cancel_export`.
#[derive(Default)]
pub struct ExportState {
    runs: ExportRuns,
}

/// What the frontend gets back from a generate call.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerateReply<T> {
    Skipped,
    Completed { result: T },
    Superseded,
}

#[derive(Debug, Serialize)]
pub struct PagesReply {
    pub message: String,
    pub line_count: u32,
    pub view: PageView,
}

fn into_reply<T, R>(submission: Submission<T>, map: impl FnOnce(T) -> R) -> Result<GenerateReply<R>, String> {
    match submission {
        Submission::Skipped => Ok(GenerateReply::Skipped),
        Submission::Completed(value) => Ok(GenerateReply::Completed { result: map(value) }),
        Submission::Superseded => Ok(GenerateReply::Superseded),
        Submission::Failed(failure) => Err(failure.message),
    }
}

#[command]
pub async fn check_backend(client: State<'_, Arc<ApiClient>>) -> Result<String, String> {
    client
        .service_info()
        .await
        .map(|info| info.message)
        .map_err(|e| e.to_string())
}

#[command]
pub async fn load_styles(catalog: State<'_, StyleCatalog>) -> Result<StyleList, String> {
    catalog.list_styles().await.map_err(|e| e.to_string())
}

// -1 from the style picker means nothing selected
#[command]
pub async fn get_style_detail(
    style_id: Option<i64>,
    catalog: State<'_, StyleCatalog>,
) -> Result<Option<StyleDetail>, String> {
    catalog.style_detail(style_id).await.map_err(|e| e.to_string())
}

/// Line mode: returns the rendered SVG.
#[command]
pub async fn generate_lines(
    params: LineParams,
    orchestrator: State<'_, Orchestrator>,
) -> Result<GenerateReply<String>, String> {
    let submission = orchestrator.submit_lines(&params).await;
    into_reply(submission, |response| response.svg_content)
}

/// Page mode: pagination is reset to the first page of the new result.
#[command]
pub async fn generate_pages(
    params: PageParams,
    orchestrator: State<'_, Orchestrator>,
) -> Result<GenerateReply<PagesReply>, String> {
    let submission = orchestrator.submit_pages(&params).await;
    into_reply(submission, |completion: PageCompletion| PagesReply {
        message: completion.response.message,
        line_count: completion.response.line_count,
        view: completion.view,
    })
}

#[command]
pub async fn abort_generation(orchestrator: State<'_, Orchestrator>) -> Result<bool, String> {
    Ok(orchestrator.abort().await)
}

#[command]
pub async fn get_lifecycle(orchestrator: State<'_, Orchestrator>) -> Result<Lifecycle, String> {
    Ok(orchestrator.lifecycle().await)
}

#[command]
pub async fn current_page(pagination: State<'_, Arc<Mutex<Pagination>>>) -> Result<PageView, String> {
    Ok(pagination.lock().await.view())
}

#[command]
pub async fn go_to_page(
    index: i64,
    pagination: State<'_, Arc<Mutex<Pagination>>>,
) -> Result<PageView, String> {
    let mut pagination = pagination.lock().await;
    pagination.go_to(index);
    Ok(pagination.view())
}

/// Page number typed into the page box, 1-based.
#[command]
pub async fn go_to_page_input(
    input: String,
    pagination: State<'_, Arc<Mutex<Pagination>>>,
) -> Result<PageView, String> {
    let mut pagination = pagination.lock().await;
    pagination.go_to_input(&input);
    Ok(pagination.view())
}

#[command]
pub async fn next_page(pagination: State<'_, Arc<Mutex<Pagination>>>) -> Result<PageView, String> {
    let mut pagination = pagination.lock().await;
    pagination.next();
    Ok(pagination.view())
}

#[command]
pub async fn previous_page(pagination: State<'_, Arc<Mutex<Pagination>>>) -> Result<PageView, String> {
    let mut pagination = pagination.lock().await;
    pagination.previous();
    Ok(pagination.view())
}

fn pick_export_folder() -> Option<PathBuf> {
    FileDialogBuilder::new()
        .set_title("Export handwriting")
        .pick_folder()
}

/// Returns the saved file name, or `None` when the user dismissed the dialog.
#[command]
pub async fn export_current_page(
    filename: Option<String>,
    pagination: State<'_, Arc<Mutex<Pagination>>>,
) -> Result<Option<String>, String> {
    let (markup, index, total) = {
        let pagination = pagination.lock().await;
        let Some(markup) = pagination.current().map(str::to_string) else {
            return Err("No page to export".to_string());
        };
        let index = usize::try_from(pagination.current_index()).unwrap_or_default();
        (markup, index, pagination.len())
    };

    let Some(dir) = pick_export_folder() else {
        return Ok(None);
    };

    let pattern = FilenamePattern::single(filename.as_deref().unwrap_or_default());
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let filename = pattern.render(index, total, &date);

    let sequencer = ExportSequencer::new(Arc::new(DirectoryExporter::new(dir)));
    sequencer
        .export_one(&markup, &filename)
        .map_err(|e| e.to_string())?;
    Ok(Some(filename))
}

#[command]
pub async fn export_all_pages(
    pattern: Option<String>,
    pagination: State<'_, Arc<Mutex<Pagination>>>,
    export: State<'_, ExportState>,
) -> Result<Option<ExportSummary>, String> {
    let pages = pagination.lock().await.pages().to_vec();
    if pages.is_empty() {
        return Err("No pages to export".to_string());
    }

    let Some(dir) = pick_export_folder() else {
        return Ok(None);
    };

    let (run, cancel) = export.runs.begin().await;

    let sequencer = ExportSequencer::with_stagger(
        Arc::new(DirectoryExporter::new(dir)),
        export_stagger_from_env(),
    );
    let pattern = FilenamePattern::new(pattern.as_deref().unwrap_or_default());
    let summary = sequencer.export_all(&pages, &pattern, &cancel).await;

    export.runs.finish(run).await;
    Ok(Some(summary))
}

#[command]
pub async fn cancel_export(export: State<'_, ExportState>) -> Result<bool, String> {
    Ok(export.runs.cancel_all().await)
}
