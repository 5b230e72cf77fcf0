//! Controllers for the list, fetch, filter and mutate cycle each view runs.

pub mod bucket;
pub mod confirm;
pub mod forms;
pub mod list;
pub mod notice;
pub mod search;
pub mod store;
pub mod submission;

pub use bucket::{Bucket, BucketedCollection, bucket};
pub use confirm::ConfirmationGate;
pub use forms::{CertificateForm, Form, ReportForm, ShipForm};
pub use list::{DeleteTarget, ListController};
pub use notice::{Notice, NoticeLevel};
pub use search::{SearchSession, Suggestion};
pub use store::{LoadOutcome, PaginatedStore};
pub use submission::{Submission, SubmissionOutcome, SubmissionState};
