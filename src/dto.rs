//! # Diary — Request/Response DTOs
//!
//! API contract types shared by the HTTP handlers and the client
//! repositories.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros; the same rules
//!   run server-side and as the renderer's pre-flight check

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::models::{Mood, NewNote, DEFAULT_BACKGROUND_COLOR};

pub const TITLE_REQUIRED: &str = "title required";
pub const CONTENT_OR_MOOD_REQUIRED: &str = "content or mood required";
pub const INVALID_COLOR: &str = "background_color must be a hex color";

/// Fields are reported in this order; the first failing one wins.
const FIELD_PRIORITY: [&str; 4] = ["title", "__all__", "mood", "background_color"];

// ============================================================================
// Common
// ============================================================================

/// Standard success message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error envelope — every error response uses this shape
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Notes
// ============================================================================

/// POST /api/notes
///
/// Every field is optional on the wire so that missing values surface as
/// validation messages instead of JSON rejections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_content_or_mood", skip_on_field_errors = false))]
pub struct CreateNoteRequest {
    #[validate(required(message = "title required"), custom = "validate_title")]
    pub title: Option<String>,

    pub content: Option<String>,

    #[validate(custom = "validate_mood")]
    pub mood: Option<String>,

    #[validate(custom = "validate_background_color")]
    pub background_color: Option<String>,
}

impl CreateNoteRequest {
    /// Runs the create-note rules, collapsing failures into one message.
    pub fn ensure_valid(&self) -> AppResult<()> {
        self.validate()
            .map_err(|errors| AppError::Validation(first_message(&errors)))
    }

    /// Validates and normalizes: mood is stored as its trimmed lowercase key
    /// (empty becomes `None`), empty or missing color becomes white.
    pub fn into_new_note(self) -> AppResult<NewNote> {
        self.ensure_valid()?;

        Ok(NewNote {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            mood: self
                .mood
                .map(|mood| mood.trim().to_lowercase())
                .filter(|mood| !mood.is_empty()),
            background_color: self
                .background_color
                .filter(|color| !color.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string()),
        })
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn error_with_message(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(error_with_message("required", TITLE_REQUIRED));
    }
    Ok(())
}

fn validate_mood(mood: &str) -> Result<(), ValidationError> {
    if mood.trim().is_empty() {
        return Ok(());
    }
    mood.parse::<Mood>()
        .map(|_| ())
        .map_err(|err| error_with_message("mood", err.to_string()))
}

fn validate_background_color(color: &str) -> Result<(), ValidationError> {
    if color.trim().is_empty() || is_hex_color(color) {
        return Ok(());
    }
    Err(error_with_message("color", INVALID_COLOR))
}

fn validate_content_or_mood(req: &CreateNoteRequest) -> Result<(), ValidationError> {
    if is_blank(req.content.as_ref()) && is_blank(req.mood.as_ref()) {
        return Err(error_with_message("content_or_mood", CONTENT_OR_MOOD_REQUIRED));
    }
    Ok(())
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    FIELD_PRIORITY
        .iter()
        .filter_map(|field| fields.get(field))
        .chain(fields.values())
        .flat_map(|errs| errs.iter())
        .map(|err| {
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string())
        })
        .next()
        .unwrap_or_else(|| "invalid request".to_string())
}
