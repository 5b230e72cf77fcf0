pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod remote;
pub mod types;
pub mod utils;

pub use config::Config;
pub use controller::{
    Bucket, BucketedCollection, ConfirmationGate, DeleteTarget, ListController, PaginatedStore,
    SearchSession, Submission, SubmissionOutcome, SubmissionState,
};
pub use error::{DeskError, Failure, FailureKind, Result};
pub use export::{ExportFormat, export_reports};
pub use filter::DateRange;
pub use remote::{HttpClient, MemoryClient, Page, Resource, ResourceClient};
pub use types::{Certificate, EntityId, Report, Ship};
