mod commands;

use std::sync::Arc;

use kalam::{ApiClient, Orchestrator, Pagination, StyleCatalog};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

// application entry point
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kalam=info")),
        )
        .init();

    let client = match ApiClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "invalid backend configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = client.config().base_url(), "using handwriting backend");

    let pagination = Arc::new(Mutex::new(Pagination::new()));
    let orchestrator = Orchestrator::new(Arc::clone(&client), Arc::clone(&pagination));
    let catalog = StyleCatalog::new(Arc::clone(&client));

    tauri::Builder::default()
        .manage(client)
        .manage(orchestrator)
        .manage(catalog)
        .manage(pagination)
        .manage(commands::ExportState::default())
        .invoke_handler(tauri::generate_handler![
            commands::check_backend,
            commands::load_styles,
            commands::get_style_detail,
            commands::generate_lines,
            commands::generate_pages,
            commands::abort_generation,
            commands::get_lifecycle,
            commands::current_page,
            commands::go_to_page,
            commands::go_to_page_input,
            commands::next_page,
            commands::previous_page,
            commands::export_current_page,
            commands::export_all_pages,
            commands::cancel_export
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
