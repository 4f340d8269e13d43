use serde::Deserialize;
use serde_json::Value;
use time::PrimitiveDateTime;
use validator::Validate;

use crate::core::time::parse_timestamp;
use crate::domain::types::{AnswerSheet, MarkingScheme};
use crate::errors::IngestError;

/// One attempt as delivered by the upstream event feed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttemptEvent {
    #[serde(default)]
    pub source_event_id: Option<String>,
    #[validate(nested)]
    pub student: StudentPayload,
    #[validate(nested)]
    pub test: TestPayload,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub answers: Option<AnswerSheet>,
    /// The event exactly as received.
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentPayload {
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestPayload {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub max_marks: Option<i64>,
    #[serde(default)]
    pub negative_marking: Option<Value>,
}

impl AttemptEvent {
    /// Decodes and validates a raw event.
    pub fn decode(raw: &Value) -> Result<Self, IngestError> {
        let mut event = AttemptEvent::deserialize(raw)
            .map_err(|err| IngestError::InvalidPayload(err.to_string()))?;
        event.raw = raw.clone();
        event.validate().map_err(|err| IngestError::Validation(err.to_string()))?;
        Ok(event)
    }

    pub fn marking_scheme(&self) -> Result<MarkingScheme, IngestError> {
        let raw = self
            .test
            .negative_marking
            .as_ref()
            .ok_or_else(|| IngestError::InvalidScheme("negative_marking is missing".to_string()))?;
        let scheme = MarkingScheme::deserialize(raw)
            .map_err(|err| IngestError::InvalidScheme(err.to_string()))?;
        if let Some(name) = scheme.out_of_range_weight() {
            return Err(IngestError::InvalidScheme(format!(
                "{name} weight exceeds {}",
                MarkingScheme::MAX_WEIGHT
            )));
        }
        Ok(scheme)
    }

    pub fn started_at(&self) -> Option<PrimitiveDateTime> {
        self.started_at.as_deref().and_then(parse_timestamp)
    }

    pub fn submitted_at(&self) -> Option<PrimitiveDateTime> {
        self.submitted_at.as_deref().and_then(parse_timestamp)
    }

    pub fn answer_sheet(&self) -> AnswerSheet {
        self.answers.clone().unwrap_or_default()
    }
}
