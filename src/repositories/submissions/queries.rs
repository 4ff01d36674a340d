use sqlx::PgPool;

use crate::db::models::FailedSubmission;

use super::types::COLUMNS;

/// Active submissions with at least one recorded failure, optionally
/// restricted to one queue.
pub(crate) async fn list_failed_active(
    pool: &PgPool,
    queue_name: Option<&str>,
) -> Result<Vec<FailedSubmission>, sqlx::Error> {
    sqlx::query_as::<_, FailedSubmission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE retired = FALSE
           AND num_failures > 0
           AND ($1::text IS NULL OR queue_name = $1)
         ORDER BY id"
    ))
    .bind(queue_name)
    .fetch_all(pool)
    .await
}
