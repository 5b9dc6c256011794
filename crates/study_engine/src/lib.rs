//! Study engine: backend IO, timers and report output.
mod backend;
mod document;
mod engine;
mod filename;
mod persist;
mod store;
mod timers;
mod types;

pub use backend::{BackendSettings, JobBackend, ReqwestBackend};
pub use document::{build_report_document, report_body};
pub use engine::{EngineHandle, EngineSettings};
pub use filename::report_filename;
pub use persist::{ensure_output_dir, PersistError, ReportWriter};
pub use store::{
    RestSubmissionStore, SortSubmission, StoreError, StoreSettings, StoredSubmission,
    SubmissionStore, DEFAULT_TABLE,
};
pub use timers::TimerRegistry;
pub use types::{BackendError, EngineEvent, JobStatus, StatusResponse};
