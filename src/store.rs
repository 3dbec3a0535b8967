use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::migrations::{self, MigrationError, MigrationReport};
use crate::models::note::format_created_at;
use crate::models::{NewNote, Note};

/// Columns read back for every note. Rows written before the schema was
/// tightened may hold NULLs, which are coalesced to their defaults.
const NOTE_COLUMNS: &str = r#"
    id,
    COALESCE(title, '') AS title,
    COALESCE(content, '') AS content,
    NULLIF(mood, '') AS mood,
    COALESCE(background_color, '#ffffff') AS background_color,
    created_at
"#;

/// Durable note persistence backed by SQLite.
#[derive(Clone)]
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn initialize(&self) -> Result<MigrationReport, MigrationError> {
        migrations::run(&self.pool).await
    }

    /// Persists a note, assigning its id and creation time.
    pub async fn insert(&self, note: &NewNote) -> Result<Note, sqlx::Error> {
        let created_at = format_created_at(Utc::now());

        let sql = format!(
            r#"
            INSERT INTO notes (title, content, mood, background_color, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {NOTE_COLUMNS}
            "#
        );
        let stored = sqlx::query_as::<_, Note>(&sql)
            .bind(&note.title)
            .bind(&note.content)
            .bind(&note.mood)
            .bind(&note.background_color)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(note_id = stored.id, "Note inserted");
        Ok(stored)
    }

    /// Every note, newest first. Notes created in the same instant come back
    /// in reverse insertion order.
    pub async fn list_all(&self) -> Result<Vec<Note>, sqlx::Error> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Note>(&sql).fetch_all(&self.pool).await
    }

    /// Removes the note with `id`, returning the number of rows deleted (0 or 1).
    pub async fn delete_by_id(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    async fn store() -> NoteStore {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let store = NoteStore::new(pool);
        store.initialize().await.unwrap();
        store
    }

    fn new_note(title: &str) -> NewNote {
        NewNote {
            title: title.into(),
            content: "content".into(),
            mood: None,
            background_color: "#ffffff".into(),
        }
    }

    #[tokio::test]
    async fn test_insert_returns_generated_fields() {
        let store = store().await;
        let before = Utc::now();

        let note = store
            .insert(&NewNote {
                mood: Some("happy".into()),
                background_color: "#fceabb".into(),
                ..new_note("Monday")
            })
            .await
            .unwrap();

        assert!(note.id > 0);
        assert_eq!(note.title, "Monday");
        assert_eq!(note.mood.as_deref(), Some("happy"));
        assert_eq!(note.background_color, "#fceabb");
        assert!(note.created_at >= before - chrono::Duration::milliseconds(1));
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = store().await;
        let a = store.insert(&new_note("a")).await.unwrap();
        let b = store.insert(&new_note("b")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_list_all_is_newest_first() {
        let store = store().await;
        for title in ["first", "second", "third"] {
            store.insert(&new_note(title)).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_timestamp_ties_fall_back_to_insertion_order() {
        let store = store().await;
        for title in ["early", "late"] {
            sqlx::query("INSERT INTO notes (title, content, created_at) VALUES (?1, 'x', '2026-01-01T00:00:00.000000Z')")
                .bind(title)
                .execute(&store.pool)
                .await
                .unwrap();
        }

        let notes = store.list_all().await.unwrap();
        assert_eq!(notes[0].title, "late");
        assert_eq!(notes[1].title, "early");
    }

    #[tokio::test]
    async fn test_delete_by_id_counts_rows() {
        let store = store().await;
        let note = store.insert(&new_note("gone")).await.unwrap();

        assert_eq!(store.delete_by_id(note.id).await.unwrap(), 1);
        assert_eq!(store.delete_by_id(note.id).await.unwrap(), 0);
        assert_eq!(store.delete_by_id(9999).await.unwrap(), 0);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_rows_written_by_older_releases() {
        let store = store().await;
        sqlx::query("INSERT INTO notes (title, content, mood, created_at) VALUES ('old', 'x', '', '2024-05-01 10:00:00')")
            .execute(&store.pool)
            .await
            .unwrap();

        let notes = store.list_all().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].mood, None);
        assert_eq!(notes[0].background_color, "#ffffff");
        assert_eq!(notes[0].created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }
}
