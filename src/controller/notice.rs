//! Transient notifications shown after an action settles.

use std::fmt;
use std::time::{Duration, Instant};

use owo_colors::OwoColorize;

use crate::error::{Failure, FailureKind};

/// How long a notice stays relevant before a view may drop it
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// A notification message
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub created: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created: Instant::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Error)
    }

    pub fn is_expired(&self) -> bool {
        self.created.elapsed() >= NOTICE_TTL
    }

    /// Print to stderr, coloured by level
    pub fn print(&self) {
        let label = match self.level {
            NoticeLevel::Success => "ok:".green().to_string(),
            NoticeLevel::Warning => "warning:".yellow().to_string(),
            NoticeLevel::Error => "error:".red().to_string(),
        };
        eprintln!("{label} {}", self.message);
    }
}

impl From<&Failure> for Notice {
    fn from(failure: &Failure) -> Self {
        let level = match failure.kind {
            FailureKind::Validation => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        Notice::new(failure.reason.clone(), level)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
