use sqlx::Row;

fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();

    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

#[tokio::test]
async fn migrations_apply_and_sweep_query_runs() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("DATABASE_URL is not set; skipping migrations smoke test");
        return Ok(());
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new("migrations")).await?;
    migrator.run(&pool).await?;

    let row = sqlx::query("SELECT to_regclass('submissions')::text").fetch_one(&pool).await?;
    let regclass: Option<String> = row.try_get(0)?;
    assert!(regclass.is_some(), "expected table submissions to exist after migrations");

    let columns: Vec<String> = sqlx::query_scalar(
        "SELECT column_name::text FROM information_schema.columns
         WHERE table_name = 'submissions'",
    )
    .fetch_all(&pool)
    .await?;
    for column in ["id", "queue_name", "xqueue_header", "num_failures", "retired", "lms_ack"] {
        assert!(columns.iter().any(|c| c == column), "missing column {column}");
    }

    let queue = format!("smoke-{}", std::process::id());
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO submissions (queue_name, xqueue_header, num_failures)
         VALUES ($1, '{}', 4)
         RETURNING id",
    )
    .bind(&queue)
    .fetch_one(&pool)
    .await?;

    let updated = sqlx::query(
        "UPDATE submissions SET retired = TRUE, lms_ack = TRUE WHERE id = $1 AND retired = FALSE",
    )
    .bind(id)
    .execute(&pool)
    .await?;
    assert_eq!(updated.rows_affected(), 1);

    let again = sqlx::query(
        "UPDATE submissions SET retired = TRUE, lms_ack = TRUE WHERE id = $1 AND retired = FALSE",
    )
    .bind(id)
    .execute(&pool)
    .await?;
    assert_eq!(again.rows_affected(), 0, "retired rows must not be rewritten");

    let remaining: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM submissions
         WHERE retired = FALSE AND num_failures > 0 AND queue_name = $1",
    )
    .bind(&queue)
    .fetch_one(&pool)
    .await?;
    assert_eq!(remaining, 0);

    sqlx::query("DELETE FROM submissions WHERE id = $1").bind(id).execute(&pool).await?;

    Ok(())
}
