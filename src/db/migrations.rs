//! Versioned, additive schema migrations for the notes database.
//!
//! Applied versions are recorded in `schema_migrations`; each pending
//! migration runs in its own transaction. Steps tolerate databases created by
//! earlier releases that had no version table: tables use `IF NOT EXISTS` and
//! columns are only added when `pragma_table_info` does not list them.

use std::time::Instant;

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::note::format_created_at;

const CREATE_VERSION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        description TEXT NOT NULL,
        applied_at TEXT NOT NULL
    )
"#;

#[derive(Debug, Clone, Copy)]
enum Step {
    Sql(&'static str),
    AddColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: i64,
    description: &'static str,
    steps: &'static [Step],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create notes table",
        steps: &[Step::Sql(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                mood TEXT,
                background_color TEXT NOT NULL DEFAULT '#ffffff',
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )
            "#,
        )],
    },
    Migration {
        version: 2,
        description: "add columns missing from early notes tables",
        steps: &[
            Step::AddColumn {
                table: "notes",
                column: "title",
                definition: "TEXT NOT NULL DEFAULT ''",
            },
            Step::AddColumn {
                table: "notes",
                column: "mood",
                definition: "TEXT",
            },
            Step::AddColumn {
                table: "notes",
                column: "background_color",
                definition: "TEXT NOT NULL DEFAULT '#ffffff'",
            },
        ],
    },
    Migration {
        version: 3,
        description: "index notes by creation time",
        steps: &[Step::Sql(
            "CREATE INDEX IF NOT EXISTS idx_notes_created_at ON notes (created_at DESC, id DESC)",
        )],
    },
];

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: i64, latest_supported: i64 },

    #[error("migration {version} ({description}) failed: {source}")]
    Step {
        version: i64,
        description: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: i64,
    pub to_version: i64,
    pub applied: Vec<i64>,
}

/// Latest schema version known by this binary.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Applies every pending migration. Running it again is a no-op.
pub async fn run(pool: &SqlitePool) -> Result<MigrationReport, MigrationError> {
    let started_at = Instant::now();
    sqlx::query(CREATE_VERSION_TABLE).execute(pool).await?;

    let from_version = current_version(pool).await?;
    let latest = latest_version();

    if from_version > latest {
        tracing::error!(
            db_version = from_version,
            latest_supported = latest,
            "Database schema is newer than this binary"
        );
        return Err(MigrationError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        if let Err(source) = apply(pool, migration).await {
            tracing::error!(
                version = migration.version,
                description = migration.description,
                error = %source,
                "Migration failed"
            );
            return Err(MigrationError::Step {
                version: migration.version,
                description: migration.description,
                source,
            });
        }
        tracing::info!(
            version = migration.version,
            description = migration.description,
            "Migration applied"
        );
        applied.push(migration.version);
    }

    let report = MigrationReport {
        from_version,
        to_version: latest,
        applied,
    };
    tracing::info!(
        from_version = report.from_version,
        to_version = report.to_version,
        applied = report.applied.len(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "Schema up to date"
    );
    Ok(report)
}

async fn current_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
        .fetch_one(pool)
        .await
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for step in migration.steps {
        match *step {
            Step::Sql(sql) => {
                sqlx::query(sql).execute(&mut *tx).await?;
            }
            Step::AddColumn {
                table,
                column,
                definition,
            } => add_column_if_missing(&mut tx, table, column, definition).await?,
        }
    }

    sqlx::query("INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)")
        .bind(migration.version)
        .bind(migration.description)
        .bind(format_created_at(Utc::now()))
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

async fn add_column_if_missing(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<(), sqlx::Error> {
    let matching = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
    )
    .bind(table)
    .bind(column)
    .fetch_one(&mut **tx)
    .await?;

    if matching > 0 {
        tracing::debug!(table, column, "Column already present");
        return Ok(());
    }

    sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
        .execute(&mut **tx)
        .await?;
    tracing::info!(table, column, "Column added");
    Ok(())
}
