//! Client side of the diary: the repository capability and the view-model
//! that renders notes and turns user actions into repository calls.
//!
//! The view depends only on [`NoteRepository`]; which backend is active is
//! decided by whoever constructs it.

use async_trait::async_trait;

use crate::dto::CreateNoteRequest;
use crate::error::AppResult;
use crate::models::Note;
use crate::services::NoteService;

pub mod local;
pub mod remote;
pub mod view;

pub use local::LocalNoteRepository;
pub use remote::RemoteNoteRepository;
pub use view::{Confirm, DiaryView, NoteCard, NoteForm, Notice};

/// Create/list/delete over some note backend.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create(&self, req: CreateNoteRequest) -> AppResult<Note>;

    /// All notes, newest first.
    async fn list(&self) -> AppResult<Vec<Note>>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[async_trait]
impl<R: NoteRepository + ?Sized> NoteRepository for Box<R> {
    async fn create(&self, req: CreateNoteRequest) -> AppResult<Note> {
        (**self).create(req).await
    }

    async fn list(&self) -> AppResult<Vec<Note>> {
        (**self).list().await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        (**self).delete(id).await
    }
}

/// In-process backend: talks to the service directly, no transport.
#[async_trait]
impl NoteRepository for NoteService {
    async fn create(&self, req: CreateNoteRequest) -> AppResult<Note> {
        self.create_note(req).await
    }

    async fn list(&self) -> AppResult<Vec<Note>> {
        self.list_notes().await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.delete_note(id).await
    }
}
