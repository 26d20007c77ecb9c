//! User-facing notifications for session outcomes

use capsule_core::CapsuleError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

/// Toast-style notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Level::Success, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Level::Info, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Level::Error, title, description)
    }

    fn new(level: Level, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Shown when the contract has nothing stored for the owner
    pub fn no_capsule() -> Self {
        Self::info(
            "No time capsule found",
            "You haven't stored a message yet. Create your first capsule!",
        )
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl From<&CapsuleError> for Notification {
    fn from(err: &CapsuleError) -> Self {
        Self::error(err.title(), err.to_string())
    }
}
