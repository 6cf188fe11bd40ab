use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant};

use crate::error::FieldError;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 200;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Current time at the millisecond precision timestamps are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// RFC 3339 with exactly three fractional digits, e.g. `2024-05-01T10:00:00.000Z`.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(at: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(d)
        }
    }
}

impl Task {
    /// Builds a fresh open task with a new identifier, stamped `now`.
    pub fn new(title: String, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
            title,
            description,
            completed: false,
            created_at: now,
            updated_at: None,
        }
    }

    /// Merges the supplied fields. `None` keeps the current value.
    pub fn apply(&mut self, patch: ValidPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = Some(now);
    }
}

/// Body of a create request. A missing title deserializes as empty and is
/// rejected by validation rather than by the JSON extractor.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of an update request. Absent and `null` fields are both `None`;
/// `Some(false)` and `Some("")` are real overwrites.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidNewTask {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl NewTask {
    pub fn validate(self) -> Result<ValidNewTask, Vec<FieldError>> {
        let mut errors = Vec::new();
        let title = check_title(&self.title, &mut errors);
        let description = self
            .description
            .map(|d| check_description(&d, &mut errors))
            .unwrap_or_default();
        if errors.is_empty() {
            Ok(ValidNewTask { title, description })
        } else {
            Err(errors)
        }
    }
}

impl TaskPatch {
    pub fn validate(self) -> Result<ValidPatch, Vec<FieldError>> {
        let mut errors = Vec::new();
        let title = self.title.map(|t| check_title(&t, &mut errors));
        let description = self.description.map(|d| check_description(&d, &mut errors));
        if errors.is_empty() {
            Ok(ValidPatch { title, description, completed: self.completed })
        } else {
            Err(errors)
        }
    }
}

fn check_title(raw: &str, errors: &mut Vec<FieldError>) -> String {
    let title = raw.trim();
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.push(FieldError::new(
            "title",
            format!("Title must be between 1 and {} characters", TITLE_MAX_CHARS),
        ));
    }
    title.to_string()
}

fn check_description(raw: &str, errors: &mut Vec<FieldError>) -> String {
    let description = raw.trim();
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(FieldError::new(
            "description",
            format!("Description must be at most {} characters", DESCRIPTION_MAX_CHARS),
        ));
    }
    description.to_string()
}

/// Accepts hyphenated UUIDs in any case and returns the canonical lowercase
/// form tasks are stored under. Version must be 1-8 with the RFC 4122
/// variant; the nil and max UUIDs are also accepted.
pub fn parse_id(raw: &str) -> Option<String> {
    if raw.len() != 36 {
        return None;
    }
    let id = Uuid::try_parse(raw).ok()?;
    let versioned = matches!(id.get_version_num(), 1..=8) && id.get_variant() == Variant::RFC4122;
    if versioned || id.is_nil() || id.as_u128() == u128::MAX {
        Some(id.hyphenated().to_string())
    } else {
        None
    }
}
