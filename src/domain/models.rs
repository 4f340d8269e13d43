use serde::Serialize;
use serde_json::Value;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::domain::types::{AnswerSheet, AttemptStatus, IdentityKey, MarkingScheme};
use crate::services::scoring::ScoreBreakdown;

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub identity_key: IdentityKey,
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestPaper {
    pub id: Uuid,
    pub name: String,
    pub max_marks: Option<i64>,
    pub marking: MarkingScheme,
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub id: Uuid,
    pub student_id: Uuid,
    pub test_id: Uuid,
    pub source_event_id: Option<String>,
    pub started_at: Option<PrimitiveDateTime>,
    pub submitted_at: Option<PrimitiveDateTime>,
    pub answers: AnswerSheet,
    pub raw_payload: Value,
    pub status: AttemptStatus,
    pub duplicate_of: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptScore {
    pub attempt_id: Uuid,
    pub breakdown: ScoreBreakdown,
    pub computed_at: PrimitiveDateTime,
}
