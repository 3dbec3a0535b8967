pub mod mood;
pub mod note;

pub use mood::Mood;
pub use note::{NewNote, Note, DEFAULT_BACKGROUND_COLOR};
