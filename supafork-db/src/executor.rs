//! Sequential migration execution
//!
//! Applies migration files one at a time, in the caller's order, over a
//! single connection. Execution is fail-fast: the first failing file stops
//! the run and nothing after it is attempted. Files already applied stay
//! applied; there is no cross-file transaction, matching how the files were
//! applied in the source project one deploy at a time.

use sqlx::{Connection, PgConnection};
use tracing::{debug, info, warn};

use supafork_core::types::{ExecutionFailure, ExecutionOutcome, MigrationBlob};

use crate::{Result, TargetDatabase};

impl TargetDatabase {
    /// Apply the selected migration files in the given order
    ///
    /// `selected_paths` is the execution order; `blobs` holds the fetched
    /// contents the paths are looked up in. Per-file failures do not surface
    /// as errors: the returned outcome records what was applied and what
    /// stopped the run. An error return means no connection could be
    /// established and nothing was executed.
    pub async fn apply_migrations(
        &self,
        selected_paths: &[String],
        blobs: &[MigrationBlob],
    ) -> Result<ExecutionOutcome> {
        let mut conn = self.connect().await?;

        let mut applied = Vec::new();
        let mut failure = None;

        for path in selected_paths {
            match apply_one(&mut conn, path, blobs).await {
                Ok(()) => {
                    debug!(path = %path, "Migration applied");
                    applied.push(path.clone());
                }
                Err(reason) => {
                    failure = Some(ExecutionFailure {
                        path: path.clone(),
                        reason,
                    });
                    break;
                }
            }
        }

        if let Err(e) = conn.close().await {
            debug!(error = %e, "Error closing migration connection");
        }

        match &failure {
            None => info!(count = applied.len(), "All selected migrations applied"),
            Some(f) => warn!(
                path = %f.path,
                reason = %f.reason,
                applied = applied.len(),
                "Migration run stopped"
            ),
        }

        Ok(ExecutionOutcome { applied, failure })
    }
}

/// Apply a single migration file; the error is the human-readable cause
/// recorded in the outcome
async fn apply_one(
    conn: &mut PgConnection,
    path: &str,
    blobs: &[MigrationBlob],
) -> std::result::Result<(), String> {
    let blob = find_blob(blobs, path).ok_or_else(|| "content not found".to_string())?;
    let sql = blob.decoded_text().map_err(|e| e.to_string())?;

    sqlx::raw_sql(&sql)
        .execute(conn)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

fn find_blob<'a>(blobs: &'a [MigrationBlob], path: &str) -> Option<&'a MigrationBlob> {
    blobs.iter().find(|b| b.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn blob(path: &str, sql: &str) -> MigrationBlob {
        MigrationBlob {
            path: path.to_string(),
            content: STANDARD.encode(sql),
            encoding: "base64".to_string(),
        }
    }

    #[test]
    fn test_find_blob() {
        let blobs = vec![blob("a.sql", "select 1;"), blob("b.sql", "select 2;")];
        assert!(find_blob(&blobs, "a.sql").is_some());
        assert!(find_blob(&blobs, "missing.sql").is_none());
    }

    // The tests below need a real Postgres server. Point
    // SUPAFORK_TEST_DATABASE_URL at a scratch database and run with
    // `cargo test -- --ignored`.

    fn test_database() -> TargetDatabase {
        let url = std::env::var("SUPAFORK_TEST_DATABASE_URL")
            .expect("set SUPAFORK_TEST_DATABASE_URL to run this test");
        TargetDatabase::new(url)
    }

    async fn drop_table(db: &TargetDatabase, table: &str) {
        let mut conn = db.connect().await.unwrap();
        sqlx::raw_sql(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a Postgres server
    async fn test_validate() {
        test_database().validate().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a Postgres server
    async fn test_apply_migrations_in_order() {
        let db = test_database();
        let table = format!("supafork_test_order_{}", std::process::id());

        let paths = vec!["001_create.sql".to_string(), "002_insert.sql".to_string()];
        let blobs = vec![
            blob(
                "001_create.sql",
                &format!("CREATE TABLE {} (id int primary key);", table),
            ),
            blob(
                "002_insert.sql",
                &format!("INSERT INTO {} VALUES (1); INSERT INTO {} VALUES (2);", table, table),
            ),
        ];

        let outcome = db.apply_migrations(&paths, &blobs).await.unwrap();

        drop_table(&db, &table).await;

        assert!(outcome.success());
        assert_eq!(outcome.applied, paths);
    }

    #[tokio::test]
    #[ignore] // Requires a Postgres server
    async fn test_apply_stops_at_first_failure() {
        let db = test_database();
        let table = format!("supafork_test_failfast_{}", std::process::id());

        let paths = vec![
            "001_create.sql".to_string(),
            "002_broken.sql".to_string(),
            "003_never_runs.sql".to_string(),
        ];
        let blobs = vec![
            blob(
                "001_create.sql",
                &format!("CREATE TABLE {} (id int);", table),
            ),
            blob("002_broken.sql", "THIS IS NOT SQL;"),
            blob(
                "003_never_runs.sql",
                &format!("CREATE TABLE {}_other (id int);", table),
            ),
        ];

        let outcome = db.apply_migrations(&paths, &blobs).await.unwrap();

        drop_table(&db, &table).await;
        drop_table(&db, &format!("{}_other", table)).await;

        assert!(!outcome.success());
        assert_eq!(outcome.applied, vec!["001_create.sql".to_string()]);

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.path, "002_broken.sql");
        assert!(failure.reason.contains("syntax"));
    }

    #[tokio::test]
    #[ignore] // Requires a Postgres server
    async fn test_missing_content_recorded_as_failure() {
        let db = test_database();

        let paths = vec!["001_present.sql".to_string(), "002_missing.sql".to_string()];
        let blobs = vec![blob("001_present.sql", "SELECT 1;")];

        let outcome = db.apply_migrations(&paths, &blobs).await.unwrap();

        assert_eq!(outcome.applied, vec!["001_present.sql".to_string()]);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.path, "002_missing.sql");
        assert!(failure.reason.contains("content not found"));
    }
}
