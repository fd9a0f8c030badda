//! Announcement drafts and their validation rules.

use serde::{Deserialize, Serialize};

/// Mailing lists an announcement can be addressed to.
pub const RECIPIENTS: [&str; 3] = [
    "professores@escola.com",
    "alunos@escola.com",
    "responsaveis@escola.com",
];

pub const TITLE_MIN_CHARS: usize = 4;
pub const TITLE_MAX_CHARS: usize = 40;

/// Message used when a draft is submitted without a body.
pub const DEFAULT_MESSAGE: &str = ".";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnnouncementDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single rejected field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// A draft that passed validation, with defaults applied.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidAnnouncement {
    pub title: String,
    pub recipient: String,
    pub message: String,
}

impl AnnouncementDraft {
    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<ValidAnnouncement, Vec<FieldError>> {
        let mut errors = Vec::new();

        // Surrounding whitespace counts toward the length.
        let title_len = self.title.chars().count();
        if title_len < TITLE_MIN_CHARS {
            errors.push(FieldError {
                field: "title",
                message: format!("title must have at least {TITLE_MIN_CHARS} characters"),
            });
        } else if title_len > TITLE_MAX_CHARS {
            errors.push(FieldError {
                field: "title",
                message: format!("title must have at most {TITLE_MAX_CHARS} characters"),
            });
        }

        let recipient = self.recipient.as_deref().map(str::trim).unwrap_or_default();
        if recipient.is_empty() {
            errors.push(FieldError {
                field: "recipient",
                message: "select a recipient".to_owned(),
            });
        } else if !is_valid_email(recipient) {
            errors.push(FieldError {
                field: "recipient",
                message: format!("'{recipient}' is not a valid email address"),
            });
        } else if !RECIPIENTS.iter().any(|known| *known == recipient) {
            errors.push(FieldError {
                field: "recipient",
                message: format!("'{recipient}' is not a known recipient"),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let message = self
            .message
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_owned());

        Ok(ValidAnnouncement {
            title: self.title.clone(),
            recipient: recipient.to_owned(),
            message,
        })
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
