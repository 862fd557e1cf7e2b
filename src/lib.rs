// Handwriting client core: backend calls, generation lifecycle, pagination and export

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod pagination;
pub mod params;
pub mod session;
pub mod types;

pub use api::ApiClient;
pub use catalog::StyleCatalog;
pub use config::ApiConfig;
pub use error::{ApiError, ExportError, FailureKind, GenerationFailure};
pub use export::{
    DirectoryExporter, ExportRuns, ExportSequencer, ExportSummary, FileExporter, FilenamePattern,
};
pub use generation::{Orchestrator, PageCompletion, Submission};
pub use pagination::{PageView, Pagination};
pub use params::{LineParams, PageParams};
pub use session::{GenerationOutput, Lifecycle};
