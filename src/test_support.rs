use std::sync::{Mutex, MutexGuard, OnceLock};

use serde_json::{json, Map, Value};
use time::macros::datetime;
use time::{Duration, PrimitiveDateTime};
use uuid::Uuid;

use crate::domain::models::Attempt;
use crate::domain::types::{AnswerSheet, AnswerToken, AttemptStatus};
use crate::services::dedup::DedupCandidate;

const ENV_KEYS: &[&str] = &[
    "ENVIRONMENT",
    "ASSESSMENT_STRICT_CONFIG",
    "ASSESSMENT_LOG_LEVEL",
    "ASSESSMENT_LOG_JSON",
    "DEDUP_WINDOW_MINUTES",
    "DEDUP_SIMILARITY_THRESHOLD",
    "ATTEMPT_EVENTS_PATH",
    "ASSESSMENT_REPORT_PATH",
];

pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Mutex::new(()));
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn set_test_env() {
    std::env::set_var("ASSESSMENT_ENV", "test");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

pub(crate) fn at_minute(minute: i64) -> PrimitiveDateTime {
    datetime!(2025-03-01 09:00) + Duration::minutes(minute)
}

pub(crate) fn sheet(answers: &[(&str, &str)]) -> AnswerSheet {
    answers.iter().map(|(question, raw)| (*question, AnswerToken::from_raw(raw))).collect()
}

/// Bare dedup candidate for detector tests.
#[derive(Debug)]
pub(crate) struct Sample {
    started_at: Option<PrimitiveDateTime>,
    answers: AnswerSheet,
}

impl Sample {
    pub(crate) fn new(started_at: Option<PrimitiveDateTime>, answers: AnswerSheet) -> Self {
        Self { started_at, answers }
    }
}

impl DedupCandidate for Sample {
    fn started_at(&self) -> Option<PrimitiveDateTime> {
        self.started_at
    }

    fn answers(&self) -> &AnswerSheet {
        &self.answers
    }
}

pub(crate) fn attempt_for(
    student_id: Uuid,
    test_id: Uuid,
    started_at: Option<PrimitiveDateTime>,
    answers: AnswerSheet,
) -> Attempt {
    Attempt {
        id: Uuid::new_v4(),
        student_id,
        test_id,
        source_event_id: None,
        started_at,
        submitted_at: started_at.map(|value| value + Duration::minutes(30)),
        answers,
        raw_payload: Value::Null,
        status: AttemptStatus::Ingested,
        duplicate_of: None,
    }
}

/// Event for "Physics mock 1" under a +4 / -1 / 0 scheme.
pub(crate) fn event_json(
    source_event_id: &str,
    email: &str,
    started_at: &str,
    answers: &[(&str, &str)],
) -> Value {
    let answers: Map<String, Value> = answers
        .iter()
        .map(|(question, raw)| (question.to_string(), Value::String(raw.to_string())))
        .collect();

    json!({
        "source_event_id": source_event_id,
        "student": {"full_name": "Asha Rao", "email": email, "phone": null},
        "test": {
            "name": "Physics mock 1",
            "max_marks": 40,
            "negative_marking": {"correct": 4, "wrong": -1, "skip": 0}
        },
        "started_at": started_at,
        "submitted_at": started_at,
        "answers": answers,
    })
}
