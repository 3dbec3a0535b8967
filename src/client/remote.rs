use async_trait::async_trait;
use reqwest::{Client, Response};

use super::NoteRepository;
use crate::dto::{CreateNoteRequest, ErrorResponse};
use crate::error::{AppError, AppResult};
use crate::models::Note;

/// Repository backed by a diary server's JSON API.
#[derive(Debug, Clone)]
pub struct RemoteNoteRepository {
    http: Client,
    base_url: String,
}

impl RemoteNoteRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn notes_url(&self) -> String {
        format!("{}/api/notes", self.base_url)
    }
}

#[async_trait]
impl NoteRepository for RemoteNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> AppResult<Note> {
        let resp = self.http.post(self.notes_url()).json(&req).send().await?;
        let resp = error_for_status(resp).await?;
        Ok(resp.json::<Note>().await?)
    }

    async fn list(&self) -> AppResult<Vec<Note>> {
        let resp = self.http.get(self.notes_url()).send().await?;
        let resp = error_for_status(resp).await?;
        Ok(resp.json::<Vec<Note>>().await?)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let url = format!("{}/{}", self.notes_url(), id);
        let resp = self.http.delete(url).send().await?;
        error_for_status(resp).await?;
        Ok(())
    }
}

/// Turns a non-success response into the matching error, keeping the
/// server's message. Bodies that are not the `{error}` envelope are used as
/// plain text.
async fn error_for_status(resp: Response) -> AppResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(envelope) => envelope.error,
        Err(_) if !text.trim().is_empty() => text,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    tracing::debug!(status = status.as_u16(), message = %message, "Diary server returned an error");

    Err(match status.as_u16() {
        400 => AppError::Validation(message),
        404 => AppError::NotFound(message),
        code => AppError::Remote {
            status: code,
            message,
        },
    })
}
