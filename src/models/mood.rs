use std::fmt;
use std::str::FromStr;

/// Label shown for notes without a recognized mood.
pub const MOOD_NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Tired,
    Anxious,
    Calm,
    Excited,
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Tired,
        Mood::Anxious,
        Mood::Calm,
        Mood::Excited,
        Mood::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Tired => "tired",
            Mood::Anxious => "anxious",
            Mood::Calm => "calm",
            Mood::Excited => "excited",
            Mood::Neutral => "neutral",
        }
    }

    /// Key used by diaries written with the Turkish mood picker.
    pub fn legacy_key(self) -> &'static str {
        match self {
            Mood::Happy => "mutlu",
            Mood::Sad => "uzgun",
            Mood::Angry => "sinirli",
            Mood::Tired => "yorgun",
            Mood::Anxious => "endise",
            Mood::Calm => "sakin",
            Mood::Excited => "heyecanli",
            Mood::Neutral => "normal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Tired => "Tired",
            Mood::Anxious => "Anxious",
            Mood::Calm => "Calm",
            Mood::Excited => "Excited",
            Mood::Neutral => "Neutral",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Tired => "😴",
            Mood::Anxious => "😟",
            Mood::Calm => "😌",
            Mood::Excited => "🤩",
            Mood::Neutral => "🙂",
        }
    }

    /// Display text for a stored mood value: label plus glyph, or the
    /// "Not specified" fallback for absent and unrecognized values.
    pub fn display(value: Option<&str>) -> String {
        match value.and_then(|raw| raw.parse::<Mood>().ok()) {
            Some(mood) => format!("{} {}", mood.label(), mood.glyph()),
            None => MOOD_NOT_SPECIFIED.to_string(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == key || mood.legacy_key() == key)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}
