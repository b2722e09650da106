//! Database schema migrations.
//!
//! Applied versions are recorded in a `_migrations` table so that opening
//! an existing database only runs what is new.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Ordered migration list: (version, SQL).
///
/// Versions must be strictly increasing. Every batch uses
/// `CREATE ... IF NOT EXISTS` so a partially recorded run can be repeated.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_assets.sql"))];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns an error if the version table cannot be read or a migration
/// batch fails to execute.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tracing::debug!(version, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
