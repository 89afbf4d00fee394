use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of AI operation. Decides which plan limit and counter apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Chat,
    Embedding,
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskTypeError {
    #[error("task type must not be blank")]
    Blank,
    #[error("unknown task type: {0}")]
    Unknown(String),
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Chat => "chat",
            TaskType::Embedding => "embedding",
            TaskType::Image => "image",
            TaskType::Video => "video",
        }
    }

    /// Chat and embedding are metered in tokens; image and video in media units.
    pub fn is_token_metered(&self) -> bool {
        matches!(self, TaskType::Chat | TaskType::Embedding)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = TaskTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" => Err(TaskTypeError::Blank),
            "chat" => Ok(TaskType::Chat),
            "embedding" => Ok(TaskType::Embedding),
            "image" => Ok(TaskType::Image),
            "video" => Ok(TaskType::Video),
            _ => Err(TaskTypeError::Unknown(s.to_string())),
        }
    }
}
