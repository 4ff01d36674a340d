use sqlx::PgPool;

/// Persists `retired` and `lms_ack` for one submission. The write only
/// applies while the row is still active; returns false when another
/// sweeper retired it first.
pub(crate) async fn save_retirement(
    pool: &PgPool,
    submission_id: i64,
    retired: bool,
    lms_ack: Option<bool>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE submissions
         SET retired = $1,
             lms_ack = $2
         WHERE id = $3
           AND retired = FALSE",
    )
    .bind(retired)
    .bind(lms_ack)
    .bind(submission_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
