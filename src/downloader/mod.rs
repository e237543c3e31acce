pub mod core;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod planner;

pub use self::core::{DEFAULT_CONCURRENCY, DownloadCore};
pub use error::DownloadError;
pub use fetcher::{Fetcher, HttpFetcher};
pub use models::{DownloadOutcome, DownloadSummary, DownloadTask, TaskKind};
pub use planner::{DownloadPlan, plan_downloads};
