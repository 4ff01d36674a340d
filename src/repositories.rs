pub(crate) mod submissions;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::FailedSubmission;

/// Read and write access the retirement sweep needs from the submission store.
#[async_trait]
pub(crate) trait SubmissionStore: Send + Sync {
    async fn list_failed(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<FailedSubmission>, sqlx::Error>;

    /// Returns false when the row was no longer active at write time.
    async fn save_retirement(&self, submission: &FailedSubmission) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl SubmissionStore for PgPool {
    async fn list_failed(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<FailedSubmission>, sqlx::Error> {
        submissions::list_failed_active(self, queue_name).await
    }

    async fn save_retirement(&self, submission: &FailedSubmission) -> Result<bool, sqlx::Error> {
        submissions::save_retirement(self, submission.id, submission.retired, submission.lms_ack)
            .await
    }
}
