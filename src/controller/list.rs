//! The page controller every collection view instantiates.
//!
//! `ListController<T>` composes the paginated store, the optional recency
//! buckets, one submission state machine and one confirmation gate. The
//! entity type carries everything collection specific (endpoint, create
//! payload, whether it is bucketed), so ships, certificates and reports all
//! run through the same code.

use std::fmt;
use std::sync::Arc;

use jiff::Zoned;
use tracing::{debug, warn};

use crate::error::{DeskError, Result};
use crate::remote::{RemoteEntity, ResourceClient};
use crate::types::{Entity, EntityId};

use super::bucket::{BucketedCollection, bucket};
use super::confirm::ConfirmationGate;
use super::forms::Form;
use super::notice::Notice;
use super::store::{LoadOutcome, PaginatedStore};
use super::submission::{Submission, SubmissionOutcome};

/// Source of the reference instant used for bucketing
pub type Clock = Arc<dyn Fn() -> Zoned + Send + Sync>;

/// Record a delete is pending confirmation for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: EntityId,
    pub label: String,
}

impl DeleteTarget {
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn of<T: Entity>(entity: &T) -> Self {
        Self {
            id: entity.id().clone(),
            label: entity.label(),
        }
    }
}

impl From<&str> for DeleteTarget {
    fn from(id: &str) -> Self {
        Self::new(id, id)
    }
}

pub struct ListController<T: RemoteEntity> {
    store: PaginatedStore<T>,
    buckets: Option<BucketedCollection<T>>,
    submission: Submission,
    gate: ConfirmationGate<DeleteTarget>,
    notice: Option<Notice>,
    clock: Clock,
}

impl<T: RemoteEntity> fmt::Debug for ListController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("resource", &T::RESOURCE)
            .field("store", &self.store)
            .field("submission", &self.submission)
            .field("gate", &self.gate)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl<T: RemoteEntity> Default for ListController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RemoteEntity> ListController<T> {
    pub fn new() -> Self {
        Self {
            store: PaginatedStore::default(),
            buckets: None,
            submission: Submission::new(),
            gate: ConfirmationGate::new(),
            notice: None,
            clock: Arc::new(Zoned::now),
        }
    }

    /// Bucket against a custom clock instead of the system time
    pub fn with_clock(mut self, clock: impl Fn() -> Zoned + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &PaginatedStore<T> {
        &self.store
    }

    pub fn items(&self) -> &[T] {
        self.store.items()
    }

    /// Recency buckets of the current page, for bucketed collections
    pub fn buckets(&self) -> Option<&BucketedCollection<T>> {
        self.buckets.as_ref()
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn gate(&self) -> &ConfirmationGate<DeleteTarget> {
        &self.gate
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.submission.dismiss();
    }

    fn settle_load(&mut self, result: Result<LoadOutcome>) -> Result<LoadOutcome> {
        match result {
            Ok(LoadOutcome::Applied) => {
                if T::BUCKETED {
                    let now = (self.clock)();
                    self.buckets = Some(bucket(self.store.items().to_vec(), &now));
                }
                Ok(LoadOutcome::Applied)
            }
            Ok(LoadOutcome::Superseded) => Ok(LoadOutcome::Superseded),
            Err(err) => {
                self.notice = Some(Notice::from(&err.to_failure()));
                Err(err)
            }
        }
    }

    /// Load the first page
    pub async fn mount<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let result = self.store.load(client, 1).await;
        self.settle_load(result)
    }

    pub async fn go_to<C: ResourceClient>(&mut self, client: &C, page: u32) -> Result<LoadOutcome> {
        let result = self.store.go_to(client, page).await;
        self.settle_load(result)
    }

    pub async fn next<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let result = self.store.next(client).await;
        self.settle_load(result)
    }

    pub async fn prev<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let result = self.store.prev(client).await;
        self.settle_load(result)
    }

    /// Reload the current page
    pub async fn refresh<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let result = self.store.invalidate(client).await;
        self.settle_load(result)
    }

    /// Reload after a successful mutation, keeping the mutation's notice
    async fn invalidate_after_mutation<C: ResourceClient>(&mut self, client: &C) {
        let notice = self.notice.take();
        if let Err(err) = self.refresh(client).await {
            warn!(error = %err, "reload after mutation failed");
        }
        self.notice = notice;
    }

    /// Validate `form` and create the record it describes.
    ///
    /// A submit while another is in flight is ignored. Invalid input fails
    /// without a request. On success the form is reset and the current page
    /// reloaded once; on failure nothing is reloaded.
    pub async fn submit<C, F>(&mut self, client: &C, form: &mut F) -> SubmissionOutcome
    where
        C: ResourceClient,
        F: Form<Draft = T::Draft>,
    {
        if self.submission.is_busy() {
            return SubmissionOutcome::Ignored;
        }
        let draft = match form.draft() {
            Ok(draft) => draft,
            Err(err) => {
                let outcome = self.submission.reject(err.to_failure());
                self.notice_for(&outcome);
                return outcome;
            }
        };

        self.submission.begin();
        let result = client.create::<T>(&draft).await;
        let outcome = self.submission.finish(result);
        self.notice_for(&outcome);

        if outcome.is_success() {
            form.reset();
            self.invalidate_after_mutation(client).await;
        }
        outcome
    }

    /// Open the confirmation gate for deleting `target`
    pub fn request_delete(&mut self, target: DeleteTarget) {
        debug!(resource = %T::RESOURCE, id = %target.id, "delete requested");
        self.gate.open(target);
    }

    pub fn cancel_delete(&mut self) {
        self.gate.cancel();
    }

    /// Run the delete the gate was opened for.
    ///
    /// Without a prior `request_delete` nothing is sent.
    pub async fn confirm_delete<C: ResourceClient>(&mut self, client: &C) -> SubmissionOutcome {
        if !self.gate.armed() || !self.submission.begin() {
            return SubmissionOutcome::Ignored;
        }
        let result = self
            .gate
            .confirm(|target| async move { client.delete::<T>(&target.id).await })
            .await
            .unwrap_or_else(|| Err(DeskError::Validation("nothing to delete".to_string())));

        let outcome = self.submission.finish(result);
        self.notice_for(&outcome);
        if outcome.is_success() {
            self.invalidate_after_mutation(client).await;
        }
        outcome
    }

    fn notice_for(&mut self, outcome: &SubmissionOutcome) {
        match outcome {
            SubmissionOutcome::Succeeded(message) => {
                self.notice = Some(Notice::success(message.clone()));
            }
            SubmissionOutcome::Failed(failure) => {
                self.notice = Some(Notice::from(failure));
            }
            SubmissionOutcome::Ignored => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::bucket::Bucket;
    use crate::controller::forms::{CertificateForm, ShipForm};
    use crate::controller::notice::NoticeLevel;
    use crate::controller::submission::SubmissionState;
    use crate::error::{Failure, FailureKind};
    use crate::remote::{MemoryClient, Resource};
    use crate::types::{Certificate, Report, Ship};
    use serde_json::json;

    fn ship_form() -> ShipForm {
        ShipForm {
            imo: "9074729".to_string(),
            name: "MV Test".to_string(),
            kind: "Ship".to_string(),
            flag: "Panama".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_success_resets_form_and_reloads_once() {
        let client = MemoryClient::new();
        let mut ships: ListController<Ship> = ListController::new();
        ships.mount(&client).await.unwrap();
        let loads = client.list_calls(Resource::Ships);

        let mut form = ship_form();
        let outcome = ships.submit(&client, &mut form).await;

        assert!(outcome.is_success());
        assert_eq!(client.list_calls(Resource::Ships), loads + 1);
        assert!(form.imo.is_empty());
        assert_eq!(ships.items().len(), 1);
        let notice = ships.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_submit_failure_does_not_reload() {
        let client = MemoryClient::new();
        let mut certs: ListController<Certificate> = ListController::new();
        certs.mount(&client).await.unwrap();
        client.fail_next(Failure {
            kind: FailureKind::Application,
            reason: "certificate already exists".to_string(),
        });

        let mut form = CertificateForm {
            name: "Load Line".to_string(),
        };
        let outcome = certs.submit(&client, &mut form).await;

        assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
        assert_eq!(client.list_calls(Resource::Certificates), 1);
        assert_eq!(form.name, "Load Line", "form keeps input on failure");
        assert_eq!(certs.notice().unwrap().message, "certificate already exists");
    }

    #[tokio::test]
    async fn test_invalid_form_issues_no_request() {
        let client = MemoryClient::new();
        let mut ships: ListController<Ship> = ListController::new();
        let mut form = ShipForm::default();

        let outcome = ships.submit(&client, &mut form).await;
        match outcome {
            SubmissionOutcome::Failed(f) => assert_eq!(f.kind, FailureKind::Validation),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(client.create_calls(), 0);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_returns_to_idle() {
        let client = MemoryClient::new();
        let mut ships: ListController<Ship> = ListController::new();
        ships.submit(&client, &mut ship_form()).await;
        ships.dismiss_notice();
        assert_eq!(ships.submission().state(), &SubmissionState::Idle);
        assert!(ships.notice().is_none());
    }

    #[tokio::test]
    async fn test_confirm_without_request_does_not_delete() {
        let client = MemoryClient::new();
        client
            .seed(Resource::Ships, &[json!({"id": 1, "name": "A", "imo": "1", "type": "Ship"})])
            .unwrap();
        let mut ships: ListController<Ship> = ListController::new();

        let outcome = ships.confirm_delete(&client).await;
        assert_eq!(outcome, SubmissionOutcome::Ignored);
        assert_eq!(client.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_confirmed_delete_reloads() {
        let client = MemoryClient::new();
        client
            .seed(
                Resource::Ships,
                &[
                    json!({"id": 1, "name": "A", "imo": "1", "type": "Ship"}),
                    json!({"id": 2, "name": "B", "imo": "2", "type": "Ship"}),
                ],
            )
            .unwrap();
        let mut ships: ListController<Ship> = ListController::new();
        ships.mount(&client).await.unwrap();

        let target = DeleteTarget::of(&ships.items()[0]);
        ships.request_delete(target);
        let outcome = ships.confirm_delete(&client).await;

        assert!(outcome.is_success());
        assert_eq!(client.delete_calls(), 1);
        assert_eq!(ships.items().len(), 1);
        assert!(!ships.gate().is_open());
    }

    #[tokio::test]
    async fn test_failed_delete_closes_gate_and_keeps_page() {
        let client = MemoryClient::new();
        client
            .seed(Resource::Ships, &[json!({"id": 1, "name": "A", "imo": "1", "type": "Ship"})])
            .unwrap();
        let mut ships: ListController<Ship> = ListController::new();
        ships.mount(&client).await.unwrap();

        ships.request_delete(DeleteTarget::from("99"));
        let outcome = ships.confirm_delete(&client).await;

        assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
        assert!(!ships.gate().is_open());
        assert_eq!(client.list_calls(Resource::Ships), 1);
        assert_eq!(ships.items().len(), 1);
    }

    #[tokio::test]
    async fn test_reports_are_bucketed_on_load() {
        let client = MemoryClient::new();
        client
            .seed(
                Resource::Reports,
                &[
                    json!({"id": "r1", "name": "A", "createdAt": "2024-03-13T08:00:00Z"}),
                    json!({"id": "r2", "name": "B", "createdAt": "2024-03-12T08:00:00Z"}),
                    json!({"id": "r3", "name": "C", "createdAt": "2023-06-01T08:00:00Z"}),
                    json!({"id": "r4", "name": "D"}),
                ],
            )
            .unwrap();
        let now: Zoned = "2024-03-13T12:00:00+00:00[UTC]".parse().unwrap();
        let mut reports: ListController<Report> =
            ListController::new().with_clock(move || now.clone());
        reports.mount(&client).await.unwrap();

        let buckets = reports.buckets().unwrap();
        assert_eq!(buckets.get(Bucket::Today).len(), 1);
        assert_eq!(buckets.get(Bucket::Yesterday).len(), 1);
        assert_eq!(buckets.get(Bucket::Older).len(), 2);
        assert_eq!(buckets.len(), reports.items().len());
    }

    #[tokio::test]
    async fn test_ships_are_not_bucketed() {
        let client = MemoryClient::new();
        let mut ships: ListController<Ship> = ListController::new();
        ships.mount(&client).await.unwrap();
        assert!(ships.buckets().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_sets_notice() {
        let client = MemoryClient::new();
        client.fail_next(Failure {
            kind: FailureKind::Transport,
            reason: "connection refused".to_string(),
        });
        let mut ships: ListController<Ship> = ListController::new();
        assert!(ships.mount(&client).await.is_err());
        assert_eq!(ships.notice().unwrap().level, NoticeLevel::Error);
    }
}
