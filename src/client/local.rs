use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::NoteRepository;
use crate::dto::CreateNoteRequest;
use crate::error::{AppError, AppResult};
use crate::models::Note;
use crate::services::notes::NOTE_NOT_FOUND;

/// On-disk layout. `next_id` only moves forward, so a deleted note's id is
/// never handed out again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DiaryFile {
    next_id: i64,
    notes: Vec<Note>,
}

/// Files written before `next_id` existed hold a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDiary {
    Current(DiaryFile),
    Bare(Vec<Note>),
}

impl From<StoredDiary> for DiaryFile {
    fn from(stored: StoredDiary) -> Self {
        let (next_id, mut notes) = match stored {
            StoredDiary::Current(file) => (file.next_id, file.notes),
            StoredDiary::Bare(notes) => (0, notes),
        };
        let floor = notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        sort_newest_first(&mut notes);
        DiaryFile {
            next_id: next_id.max(floor),
            notes,
        }
    }
}

/// Repository that keeps every note in a single JSON file on this machine,
/// newest first. Applies the same rules as the server.
pub struct LocalNoteRepository {
    path: PathBuf,
    diary: Mutex<DiaryFile>,
}

impl LocalNoteRepository {
    /// Loads the file at `path`; a missing file is an empty diary.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();

        let diary: DiaryFile = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => StoredDiary::Bare(Vec::new()),
            Ok(bytes) => serde_json::from_slice::<StoredDiary>(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredDiary::Bare(Vec::new()),
            Err(err) => return Err(err.into()),
        }
        .into();

        tracing::debug!(
            path = %path.display(),
            count = diary.notes.len(),
            next_id = diary.next_id,
            "Local diary loaded"
        );
        Ok(Self {
            path,
            diary: Mutex::new(diary),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a sibling temp file and renames it over the diary, so a crash
    /// mid-write leaves the previous file intact.
    async fn persist(&self, diary: &DiaryFile) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(diary)?;

        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl NoteRepository for LocalNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> AppResult<Note> {
        let new_note = req.into_new_note()?;
        let mut diary = self.diary.lock().await;

        let note = Note {
            id: diary.next_id,
            title: new_note.title,
            content: new_note.content,
            mood: new_note.mood,
            background_color: new_note.background_color,
            created_at: Utc::now(),
        };

        let mut updated = diary.clone();
        updated.next_id += 1;
        updated.notes.insert(0, note.clone());
        self.persist(&updated).await?;
        *diary = updated;

        Ok(note)
    }

    async fn list(&self) -> AppResult<Vec<Note>> {
        Ok(self.diary.lock().await.notes.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut diary = self.diary.lock().await;
        if !diary.notes.iter().any(|n| n.id == id) {
            return Err(AppError::NotFound(NOTE_NOT_FOUND.into()));
        }

        let updated = DiaryFile {
            next_id: diary.next_id,
            notes: diary.notes.iter().filter(|n| n.id != id).cloned().collect(),
        };
        self.persist(&updated).await?;
        *diary = updated;
        Ok(())
    }
}
