use crate::db::migrations::{MigrationError, MigrationReport};
use crate::dto::CreateNoteRequest;
use crate::error::{AppError, AppResult};
use crate::models::Note;
use crate::store::NoteStore;

pub const NOTE_NOT_FOUND: &str = "Note not found";

/// Validation and orchestration between API requests and the note store.
#[derive(Clone)]
pub struct NoteService {
    store: NoteStore,
}

impl NoteService {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    pub async fn initialize(&self) -> Result<MigrationReport, MigrationError> {
        self.store.initialize().await
    }

    pub async fn create_note(&self, req: CreateNoteRequest) -> AppResult<Note> {
        let new_note = req.into_new_note()?;
        let note = self.store.insert(&new_note).await?;

        tracing::info!(note_id = note.id, mood = ?note.mood, "Note created");
        Ok(note)
    }

    pub async fn list_notes(&self) -> AppResult<Vec<Note>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn delete_note(&self, id: i64) -> AppResult<()> {
        if self.store.delete_by_id(id).await? == 0 {
            return Err(AppError::NotFound(NOTE_NOT_FOUND.into()));
        }

        tracing::info!(note_id = id, "Note deleted");
        Ok(())
    }
}
