use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::dto::{CreateNoteRequest, MessageResponse};
use crate::error::{AppError, AppResult};
use crate::models::Note;
use crate::services::notes::NOTE_NOT_FOUND;
use crate::AppState;

pub async fn list_notes(State(state): State<AppState>) -> AppResult<Json<Vec<Note>>> {
    let notes = state.notes.list_notes().await?;
    Ok(Json(notes))
}

pub async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let Json(body) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let note = state.notes.create_note(body).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    // A non-numeric id cannot name a stored note.
    let id = raw_id
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(NOTE_NOT_FOUND.into()))?;

    state.notes.delete_note(id).await?;

    Ok(Json(MessageResponse {
        message: "Note deleted".into(),
    }))
}
