use std::fmt;

use super::NoteRepository;
use crate::dto::{is_hex_color, CreateNoteRequest};
use crate::error::AppResult;
use crate::models::{Mood, Note, DEFAULT_BACKGROUND_COLOR};

/// Shown in place of the list when there is nothing to show.
pub const EMPTY_PLACEHOLDER: &str = "No entries yet.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this entry?";

/// Card background used when a stored color cannot be rendered.
const FALLBACK_CARD_COLOR: &str = "#f9f9f9";
const DATE_LABEL_FORMAT: &str = "%-d %B %Y, %H:%M";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// The entry form as the user filled it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
    /// Empty when no mood is picked.
    pub mood: String,
    pub background_color: String,
}

impl Default for NoteForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            mood: String::new(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
        }
    }
}

impl NoteForm {
    pub fn to_request(&self) -> CreateNoteRequest {
        CreateNoteRequest {
            title: Some(self.title.trim().to_string()),
            content: Some(self.content.trim().to_string()),
            mood: Some(self.mood.clone()),
            background_color: Some(self.background_color.clone()),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Display node for one note. Built only from the note record, so the same
/// record always yields the same card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub date_label: String,
    pub mood_label: String,
    pub background_color: String,
    pub open: bool,
}

impl NoteCard {
    pub fn from_note(note: &Note) -> Self {
        let background_color = if is_hex_color(&note.background_color) {
            note.background_color.clone()
        } else {
            FALLBACK_CARD_COLOR.to_string()
        };

        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            date_label: note.created_at.format(DATE_LABEL_FORMAT).to_string(),
            mood_label: Mood::display(note.mood.as_deref()),
            background_color,
            open: false,
        }
    }

    pub fn to_html(&self) -> String {
        let class = if self.open { "note-item open" } else { "note-item" };
        format!(
            concat!(
                r#"<div class="{class}" data-id="{id}" style="background-color: {color}">"#,
                r#"<div class="note-header"><h3>{title}</h3>"#,
                r#"<p><strong>Date:</strong> {date} | <strong>Mood:</strong> {mood}</p>"#,
                r#"<button class="delete-button" data-id="{id}">Delete</button></div>"#,
                r#"<div class="note-content"><p>{content}</p></div>"#,
                "</div>"
            ),
            class = class,
            id = self.id,
            color = self.background_color,
            title = escape_html(&self.title),
            date = escape_html(&self.date_label),
            mood = escape_html(&self.mood_label),
            content = escape_html(&self.content),
        )
    }
}

impl fmt::Display for NoteCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {}", self.id, self.title)?;
        write!(f, "   {} | Mood: {}", self.date_label, self.mood_label)?;
        for line in self.content.lines() {
            write!(f, "\n   {line}")?;
        }
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// View-model for the diary page: the visible cards, the entry form and the
/// last notice. The visible list only changes after a successful call.
pub struct DiaryView<R> {
    repo: R,
    pub form: NoteForm,
    cards: Vec<NoteCard>,
    notice: Option<Notice>,
}

impl<R: NoteRepository> DiaryView<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            form: NoteForm::default(),
            cards: Vec::new(),
            notice: None,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn cards(&self) -> &[NoteCard] {
        &self.cards
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Replaces the visible list with the repository's, in the order given.
    pub async fn load(&mut self) -> AppResult<()> {
        match self.repo.list().await {
            Ok(notes) => {
                self.cards = notes.iter().map(NoteCard::from_note).collect();
                self.notice = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load notes");
                self.notice = Some(Notice::Error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Submits the form. Invalid input never reaches the repository.
    pub async fn submit(&mut self) -> AppResult<()> {
        let req = self.form.to_request();
        if let Err(err) = req.ensure_valid() {
            self.notice = Some(Notice::Error(err.user_message()));
            return Err(err);
        }

        match self.repo.create(req).await {
            Ok(note) => {
                self.cards.insert(0, NoteCard::from_note(&note));
                self.form.clear();
                self.notice = Some(Notice::Info("Entry saved.".into()));
                Ok(())
            }
            Err(err) => {
                self.notice = Some(Notice::Error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Deletes after confirmation. Returns `Ok(false)` when the user declined.
    pub async fn request_delete(&mut self, id: i64, confirm: &dyn Confirm) -> AppResult<bool> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        match self.repo.delete(id).await {
            Ok(()) => {
                self.cards.retain(|card| card.id != id);
                self.notice = Some(Notice::Info("Entry deleted.".into()));
                Ok(true)
            }
            Err(err) => {
                self.notice = Some(Notice::Error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Flips a card between open and closed. Returns the new state, or
    /// `None` when no card has that id.
    pub fn toggle(&mut self, id: i64) -> Option<bool> {
        let card = self.cards.iter_mut().find(|card| card.id == id)?;
        card.open = !card.open;
        Some(card.open)
    }

    pub fn render_html(&self) -> String {
        if self.cards.is_empty() {
            return format!(r#"<p class="empty">{EMPTY_PLACEHOLDER}</p>"#);
        }
        self.cards.iter().map(NoteCard::to_html).collect()
    }

    pub fn render_text(&self) -> String {
        if self.cards.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        self.cards
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::dto::{CONTENT_OR_MOOD_REQUIRED, TITLE_REQUIRED};
    use crate::error::AppError;

    /// Repository that records calls and can be told to fail.
    #[derive(Default)]
    struct FakeRepo {
        notes: Mutex<Vec<Note>>,
        calls: AtomicUsize,
        fail_with: Mutex<Option<String>>,
    }

    impl FakeRepo {
        fn with_notes(notes: Vec<Note>) -> Self {
            Self {
                notes: Mutex::new(notes),
                ..Default::default()
            }
        }

        fn fail_next(&self, message: &str) {
            *self.fail_with.lock().unwrap() = Some(message.to_string());
        }

        fn check_failure(&self) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with.lock().unwrap().take() {
                Some(message) => Err(AppError::Remote { status: 500, message }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl NoteRepository for FakeRepo {
        async fn create(&self, req: CreateNoteRequest) -> AppResult<Note> {
            self.check_failure()?;
            let new_note = req.into_new_note()?;
            let mut notes = self.notes.lock().unwrap();
            let note = Note {
                id: notes.len() as i64 + 100,
                title: new_note.title,
                content: new_note.content,
                mood: new_note.mood,
                background_color: new_note.background_color,
                created_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap(),
            };
            notes.insert(0, note.clone());
            Ok(note)
        }

        async fn list(&self) -> AppResult<Vec<Note>> {
            self.check_failure()?;
            Ok(self.notes.lock().unwrap().clone())
        }

        async fn delete(&self, id: i64) -> AppResult<()> {
            self.check_failure()?;
            let mut notes = self.notes.lock().unwrap();
            let before = notes.len();
            notes.retain(|n| n.id != id);
            if notes.len() == before {
                return Err(AppError::NotFound("Note not found".into()));
            }
            Ok(())
        }
    }

    fn note(id: i64, title: &str, mood: Option<&str>) -> Note {
        Note {
            id,
            title: title.into(),
            content: format!("{title} content"),
            mood: mood.map(String::from),
            background_color: "#fceabb".into(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap(),
        }
    }

    fn fill(view: &mut DiaryView<FakeRepo>, title: &str, content: &str, mood: &str) {
        view.form.title = title.into();
        view.form.content = content.into();
        view.form.mood = mood.into();
    }

    #[tokio::test]
    async fn test_load_keeps_service_order() {
        let repo = FakeRepo::with_notes(vec![note(2, "newer", None), note(1, "older", None)]);
        let mut view = DiaryView::new(repo);

        view.load().await.unwrap();
        let ids: Vec<i64> = view.cards().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_cards() {
        let mut view = DiaryView::new(FakeRepo::with_notes(vec![note(1, "kept", None)]));
        view.load().await.unwrap();

        view.repository().fail_next("Internal server error");
        assert!(view.load().await.is_err());
        assert_eq!(view.cards().len(), 1);
        assert_eq!(view.notice(), Some(&Notice::Error("Internal server error".into())));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_repository() {
        let mut view = DiaryView::new(FakeRepo::default());

        fill(&mut view, "   ", "text", "");
        assert!(view.submit().await.is_err());
        assert_eq!(view.notice().map(Notice::message), Some(TITLE_REQUIRED));

        fill(&mut view, "Monday", "  ", "");
        assert!(view.submit().await.is_err());
        assert_eq!(view.notice().map(Notice::message), Some(CONTENT_OR_MOOD_REQUIRED));

        assert_eq!(view.repository().calls.load(Ordering::SeqCst), 0);
        assert_eq!(view.form.title, "Monday", "form stays populated");
    }

    #[tokio::test]
    async fn test_submit_prepends_card_and_clears_form() {
        let mut view = DiaryView::new(FakeRepo::with_notes(vec![note(1, "old", None)]));
        view.load().await.unwrap();

        fill(&mut view, " Monday ", "Good day", "mutlu");
        view.form.background_color = "#fceabb".into();
        view.submit().await.unwrap();

        assert_eq!(view.cards()[0].title, "Monday");
        assert_eq!(view.cards()[0].mood_label, "Happy 😊");
        assert_eq!(view.cards().len(), 2);
        assert_eq!(view.form, NoteForm::default());
        assert!(!view.notice().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form_and_list() {
        let mut view = DiaryView::new(FakeRepo::default());
        fill(&mut view, "Monday", "Good day", "");
        view.repository().fail_next("disk full");

        assert!(view.submit().await.is_err());
        assert!(view.is_empty());
        assert_eq!(view.form.title, "Monday");
        assert_eq!(view.notice(), Some(&Notice::Error("disk full".into())));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut view = DiaryView::new(FakeRepo::with_notes(vec![note(1, "keep", None)]));
        view.load().await.unwrap();
        let calls_after_load = view.repository().calls.load(Ordering::SeqCst);

        let declined = view.request_delete(1, &|_: &str| false).await.unwrap();
        assert!(!declined);
        assert_eq!(view.cards().len(), 1);
        assert_eq!(view.repository().calls.load(Ordering::SeqCst), calls_after_load);
    }

    #[tokio::test]
    async fn test_delete_removes_only_matching_card_then_shows_placeholder() {
        let repo = FakeRepo::with_notes(vec![note(2, "b", None), note(1, "a", None)]);
        let mut view = DiaryView::new(repo);
        view.load().await.unwrap();

        assert!(view.request_delete(1, &|_: &str| true).await.unwrap());
        let ids: Vec<i64> = view.cards().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);

        assert!(view.request_delete(2, &|_: &str| true).await.unwrap());
        assert!(view.is_empty());
        assert_eq!(view.render_text(), EMPTY_PLACEHOLDER);
        assert!(view.render_html().contains(EMPTY_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_delete_failure_surfaces_message() {
        let mut view = DiaryView::new(FakeRepo::with_notes(vec![note(1, "a", None)]));
        view.load().await.unwrap();

        assert!(view.request_delete(9999, &|_: &str| true).await.is_err());
        assert_eq!(view.notice(), Some(&Notice::Error("Note not found".into())));
        assert_eq!(view.cards().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_is_local_only() {
        let mut view = DiaryView::new(FakeRepo::with_notes(vec![note(1, "a", None)]));
        view.load().await.unwrap();
        let calls = view.repository().calls.load(Ordering::SeqCst);

        assert_eq!(view.toggle(1), Some(true));
        assert!(view.render_html().contains(r#"class="note-item open""#));
        assert_eq!(view.toggle(1), Some(false));
        assert_eq!(view.toggle(42), None);
        assert_eq!(view.repository().calls.load(Ordering::SeqCst), calls);
    }

    #[test]
    fn test_card_rendering_is_deterministic_and_escaped() {
        let mut n = note(7, "<b>Monday</b>", Some("sakin"));
        n.content = "a & b".into();

        let card = NoteCard::from_note(&n);
        assert_eq!(card, NoteCard::from_note(&n));
        assert_eq!(card.date_label, "19 October 2026, 14:05");
        assert_eq!(card.mood_label, "Calm 😌");

        let html = card.to_html();
        assert!(html.contains("&lt;b&gt;Monday&lt;/b&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains(r#"data-id="7""#));
        assert!(html.contains("background-color: #fceabb"));
    }

    #[test]
    fn test_card_falls_back_for_missing_mood_and_bad_color() {
        let mut n = note(3, "t", None);
        n.background_color = "red;position:fixed".into();

        let card = NoteCard::from_note(&n);
        assert_eq!(card.mood_label, "Not specified");
        assert_eq!(card.background_color, FALLBACK_CARD_COLOR);
    }
}
