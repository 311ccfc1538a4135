//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::error::Res;

/// A database migration with up and down SQL.
struct Migration {
    /// The version this migration brings the database to (when going up).
    version: i32,
    /// SQL to execute when upgrading to this version.
    up_sql: &'static str,
    /// SQL to execute when downgrading from this version.
    down_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// The schema version this build of the ledger expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

/// Moves the schema from `from` to `to`, one version at a time.
///
/// Upgrades apply each `up_sql` in ascending order and downgrades apply each `down_sql` in
/// descending order. Every step commits together with its `schema_version` row, and all required
/// steps are checked to exist before the first one runs.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Res<()> {
    if from == to {
        debug!("Ledger schema already at version {to}");
        return Ok(());
    }
    validate_migrations(from, to)?;

    if from < to {
        for version in (from + 1)..=to {
            debug!("Applying ledger migration {version:02} (up)");
            run_single_migration(pool, find(version)?.up_sql, version).await?;
        }
    } else {
        for version in ((to + 1)..=from).rev() {
            debug!("Reverting ledger migration {version:02} (down)");
            run_single_migration(pool, find(version)?.down_sql, version - 1).await?;
        }
    }

    debug!("Ledger schema now at version {to}");
    Ok(())
}

fn find(version: i32) -> Res<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

/// Executes a single migration's SQL and updates schema_version, all within a transaction.
async fn run_single_migration(pool: &SqlitePool, sql: &str, new_version: i32) -> Res<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    // Execute the migration SQL (supports multiple statements)
    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    // Update schema_version
    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Failed to clear schema_version")?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}

/// Validates that migrations are available for all versions needed to go from
/// `current_version` to `target_version`.
fn validate_migrations(current_version: i32, target_version: i32) -> Res<()> {
    let (start, end) = if current_version < target_version {
        (current_version + 1, target_version)
    } else {
        (target_version + 1, current_version)
    };

    if let Some(version) = (start..=end).find(|v| !MIGRATIONS.iter().any(|m| m.version == *v)) {
        bail!(
            "Migration {version} is missing but required to migrate from version {current_version} to {target_version}"
        );
    }
    Ok(())
}
