use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of translation targets. Reaction names double as trigger
/// words, so every language carries its trigger, its provider code, and a
/// human-readable name for acknowledgement text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ja,
    Vn,
}

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
            Self::Vn => "vn",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ja => "Japanese",
            Self::Vn => "Vietnamese",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "ja" => Some(Self::Ja),
            "vn" => Some(Self::Vn),
            _ => None,
        }
    }

    /// Resolves a reaction name to its target language. Reaction names
    /// arrive bare and lowercase from Slack, so matching is exact.
    pub fn from_trigger(reaction: &str) -> Option<Self> {
        match reaction {
            "english" => Some(Self::En),
            "japanese" => Some(Self::Ja),
            "vietnamese" => Some(Self::Vn),
            _ => None,
        }
    }

    /// Reads a language out of a stored subscription value. Disabled
    /// subscriptions are stored as `false` and map to `None`.
    pub fn from_stored(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::from_code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
