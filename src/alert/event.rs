//! Alert event types delivered by the alerting engine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Ok,
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Ok => "OK",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// State of an alert at the time the event fired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventState {
    pub message: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "Utc::now")]
    pub time: DateTime<Utc>,
}

/// An alert event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Alert ID
    #[serde(default)]
    pub id: String,
    pub state: EventState,
}

impl Event {
    pub fn new(id: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: EventState {
                message: message.into(),
                level,
                time: Utc::now(),
            },
        }
    }
}
