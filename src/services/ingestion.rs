use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::models::Attempt;
use crate::domain::types::{AttemptStatus, MarkingScheme};
use crate::errors::IngestError;
use crate::repositories::{attempts, papers, scores, students, Ledger};
use crate::schemas::event::AttemptEvent;
use crate::services::dedup::DedupPolicy;
use crate::services::identity;
use crate::services::scoring::{self, ScoreBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Scored { attempt_id: Uuid, score: i64 },
    Deduped { attempt_id: Uuid, duplicate_of: Uuid },
}

impl IngestOutcome {
    pub fn attempt_id(&self) -> Uuid {
        match self {
            IngestOutcome::Scored { attempt_id, .. } | IngestOutcome::Deduped { attempt_id, .. } => {
                *attempt_id
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub index: usize,
    pub source_event_id: Option<String>,
    pub reason: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub received: usize,
    pub scored: usize,
    pub deduped: usize,
    pub rejected: usize,
    pub failures: Vec<IngestFailure>,
}

/// Ingests raw events one by one. A bad event is recorded in the report and
/// never stops the batch.
pub fn ingest_batch(ledger: &mut Ledger, policy: &DedupPolicy, events: &[Value]) -> IngestReport {
    let mut report = IngestReport { received: events.len(), ..IngestReport::default() };

    for (index, raw) in events.iter().enumerate() {
        let result = AttemptEvent::decode(raw).and_then(|event| ingest_event(ledger, policy, event));

        match result {
            Ok(IngestOutcome::Scored { .. }) => report.scored += 1,
            Ok(IngestOutcome::Deduped { .. }) => report.deduped += 1,
            Err(err) => {
                let source_event_id =
                    raw.get("source_event_id").and_then(Value::as_str).map(str::to_string);
                tracing::warn!(
                    target: "ingest",
                    index,
                    source_event_id = source_event_id.as_deref().unwrap_or("-"),
                    reason = err.reason(),
                    error = %err,
                    "Attempt event rejected"
                );
                metrics::counter!("attempts_rejected_total", "reason" => err.reason()).increment(1);
                report.rejected += 1;
                report.failures.push(IngestFailure {
                    index,
                    source_event_id,
                    reason: err.reason(),
                    detail: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        target: "ingest",
        received = report.received,
        scored = report.scored,
        deduped = report.deduped,
        rejected = report.rejected,
        "Batch ingested"
    );

    report
}

/// Resolve identity, upsert student, store the attempt, then either point it
/// at an earlier duplicate or score it.
///
/// Every check that can fail runs before the first write, so a rejected event
/// leaves the ledger untouched.
pub fn ingest_event(
    ledger: &mut Ledger,
    policy: &DedupPolicy,
    event: AttemptEvent,
) -> Result<IngestOutcome, IngestError> {
    let identity_key =
        identity::resolve(event.student.email.as_deref(), event.student.phone.as_deref())
            .ok_or(IngestError::MissingIdentity)?;
    let marking = event.marking_scheme()?;

    if let Some(source_event_id) = event.source_event_id.as_deref() {
        if attempts::exists_for_source_event(ledger, source_event_id) {
            return Err(IngestError::AlreadyIngested(source_event_id.to_string()));
        }
    }

    let student_id = students::upsert(
        ledger,
        identity_key,
        &event.student.full_name,
        event.student.email.as_deref(),
        event.student.phone.as_deref(),
    );
    let test_id = papers::find_or_create(ledger, &event.test.name, event.test.max_marks, marking);
    let marking = papers::find_by_id(ledger, test_id)
        .map(|paper| paper.marking)
        .ok_or(IngestError::UnknownTest(test_id))?;

    let attempt = Attempt {
        id: Uuid::new_v4(),
        student_id,
        test_id,
        source_event_id: event.source_event_id.clone(),
        started_at: event.started_at(),
        submitted_at: event.submitted_at(),
        answers: event.answer_sheet(),
        raw_payload: event.raw.clone(),
        status: AttemptStatus::Ingested,
        duplicate_of: None,
    };
    let attempt_id = attempts::insert(ledger, attempt);
    metrics::counter!("attempts_ingested_total").increment(1);

    let duplicate_of = {
        let new_attempt =
            attempts::find_by_id(ledger, attempt_id).ok_or(IngestError::UnknownAttempt(attempt_id))?;
        let siblings = attempts::siblings(ledger, student_id, test_id, attempt_id);
        policy.find_duplicate(new_attempt, siblings.iter().copied()).map(|canonical| canonical.id)
    };

    if let Some(canonical) = duplicate_of {
        attempts::set_status(ledger, attempt_id, AttemptStatus::Deduped, Some(canonical));
        metrics::counter!("attempts_deduped_total").increment(1);
        tracing::info!(
            target: "dedup",
            attempt_id = %attempt_id,
            duplicate_of = %canonical,
            "Duplicate detected"
        );
        return Ok(IngestOutcome::Deduped { attempt_id, duplicate_of: canonical });
    }

    let breakdown = store_score(ledger, attempt_id, marking)?;
    Ok(IngestOutcome::Scored { attempt_id, score: breakdown.score })
}

/// Scores an attempt again from its stored answers and its test's scheme,
/// replacing the stored breakdown. The attempt ends up `Scored` even if it
/// was a duplicate before; its duplicate pointer is kept.
pub fn recompute(ledger: &mut Ledger, attempt_id: Uuid) -> Result<ScoreBreakdown, IngestError> {
    let test_id = attempts::find_by_id(ledger, attempt_id)
        .map(|attempt| attempt.test_id)
        .ok_or(IngestError::UnknownAttempt(attempt_id))?;
    let marking = papers::find_by_id(ledger, test_id)
        .map(|paper| paper.marking)
        .ok_or(IngestError::UnknownTest(test_id))?;

    store_score(ledger, attempt_id, marking)
}

fn store_score(
    ledger: &mut Ledger,
    attempt_id: Uuid,
    marking: MarkingScheme,
) -> Result<ScoreBreakdown, IngestError> {
    let attempt =
        attempts::find_by_id(ledger, attempt_id).ok_or(IngestError::UnknownAttempt(attempt_id))?;
    let duplicate_of = attempt.duplicate_of;
    let breakdown = scoring::score(&attempt.answers, marking);

    scores::upsert(ledger, attempt_id, breakdown);
    attempts::set_status(ledger, attempt_id, AttemptStatus::Scored, duplicate_of);
    metrics::counter!("attempts_scored_total").increment(1);
    tracing::info!(
        target: "scoring",
        attempt_id = %attempt_id,
        score = breakdown.score,
        "Scoring completed"
    );

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AnswerToken;
    use crate::test_support::event_json;
    use serde_json::json;

    const ANSWERS: &[(&str, &str)] = &[("q1", "A"), ("q2", "A"), ("q3", "B"), ("q4", "SKIP")];

    fn ingest(ledger: &mut Ledger, raw: Value) -> Result<IngestOutcome, IngestError> {
        let event = AttemptEvent::decode(&raw)?;
        ingest_event(ledger, &DedupPolicy::default(), event)
    }

    #[test]
    fn first_event_is_scored() {
        let mut ledger = Ledger::new();
        let outcome =
            ingest(&mut ledger, event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS))
                .expect("ingest");

        assert!(matches!(outcome, IngestOutcome::Scored { score: 7, .. }));
        let attempt = attempts::find_by_id(&ledger, outcome.attempt_id()).expect("attempt");
        assert_eq!(attempt.status, AttemptStatus::Scored);
        assert_eq!(attempt.duplicate_of, None);
        assert_eq!(attempt.raw_payload["source_event_id"], json!("e1"));
        assert_eq!(
            attempt.raw_payload["test"]["negative_marking"],
            json!({"correct": 4, "wrong": -1, "skip": 0})
        );
        assert_eq!(attempt.raw_payload["test"]["max_marks"], json!(40));
        let stored = scores::find_by_attempt(&ledger, attempt.id).expect("score");
        assert_eq!(stored.breakdown.accuracy, 66);
    }

    #[test]
    fn near_identical_resubmission_points_at_the_first() {
        let mut ledger = Ledger::new();
        let first =
            ingest(&mut ledger, event_json("e1", "A.Sha@gmail.com", "2025-03-01T09:00:00Z", ANSWERS))
                .expect("first");
        let second = ingest(
            &mut ledger,
            event_json("e2", "asha+retry@gmail.com", "2025-03-01T09:05:00Z", ANSWERS),
        )
        .expect("second");

        assert_eq!(
            second,
            IngestOutcome::Deduped {
                attempt_id: second.attempt_id(),
                duplicate_of: first.attempt_id()
            }
        );
        assert_eq!(ledger.students().len(), 1);
        assert!(scores::find_by_attempt(&ledger, second.attempt_id()).is_none());
        let stored = attempts::find_by_id(&ledger, second.attempt_id()).expect("attempt");
        assert_eq!(stored.status, AttemptStatus::Deduped);
    }

    #[test]
    fn resubmission_outside_the_window_is_scored() {
        let mut ledger = Ledger::new();
        ingest(&mut ledger, event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS))
            .expect("first");
        let later =
            ingest(&mut ledger, event_json("e2", "asha@example.com", "2025-03-01T09:08:00Z", ANSWERS))
                .expect("second");

        assert!(matches!(later, IngestOutcome::Scored { .. }));
    }

    #[test]
    fn duplicates_are_not_re_pointed() {
        let mut ledger = Ledger::new();
        let a = ingest(&mut ledger, event_json("a", "x@example.com", "2025-03-01T09:00:00Z", ANSWERS))
            .expect("a");
        let b = ingest(&mut ledger, event_json("b", "x@example.com", "2025-03-01T09:06:00Z", ANSWERS))
            .expect("b");
        let c = ingest(&mut ledger, event_json("c", "x@example.com", "2025-03-01T09:12:00Z", ANSWERS))
            .expect("c");

        assert_eq!(
            b,
            IngestOutcome::Deduped { attempt_id: b.attempt_id(), duplicate_of: a.attempt_id() }
        );
        // Outside a's window but inside b's; b is a candidate like any other.
        assert_eq!(
            c,
            IngestOutcome::Deduped { attempt_id: c.attempt_id(), duplicate_of: b.attempt_id() }
        );
    }

    #[test]
    fn rejected_events_leave_no_records() {
        let mut ledger = Ledger::new();
        let mut raw = event_json("e1", "", "2025-03-01T09:00:00Z", ANSWERS);
        raw["student"]["email"] = Value::Null;
        raw["student"]["phone"] = json!("n/a");

        let err = ingest(&mut ledger, raw).expect_err("no identity");
        assert!(matches!(err, IngestError::MissingIdentity));

        let mut raw = event_json("e2", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS);
        raw["test"]["negative_marking"] = json!({"correct": 4, "wrong": -1});
        let err = ingest(&mut ledger, raw).expect_err("bad scheme");
        assert!(matches!(err, IngestError::InvalidScheme(_)));

        assert!(ledger.students().is_empty());
        assert!(ledger.papers().is_empty());
        assert!(ledger.attempts().is_empty());
    }

    #[test]
    fn redelivered_event_is_skipped() {
        let mut ledger = Ledger::new();
        let raw = event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS);
        ingest(&mut ledger, raw.clone()).expect("first delivery");

        let err = ingest(&mut ledger, raw).expect_err("second delivery");
        assert!(matches!(err, IngestError::AlreadyIngested(ref id) if id == "e1"));
        assert_eq!(ledger.attempts().len(), 1);
    }

    #[test]
    fn batch_reports_each_outcome() {
        let mut ledger = Ledger::new();
        let events = vec![
            event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS),
            event_json("e2", "asha@example.com", "2025-03-01T09:03:00Z", ANSWERS),
            json!({"source_event_id": "e3", "student": {"full_name": "Nobody"}}),
            event_json("e4", "ravi@example.com", "2025-03-01T09:03:00Z", ANSWERS),
        ];

        let report = ingest_batch(&mut ledger, &DedupPolicy::default(), &events);

        assert_eq!(report.received, 4);
        assert_eq!(report.scored, 2);
        assert_eq!(report.deduped, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.failures[0].source_event_id.as_deref(), Some("e3"));
        assert_eq!(report.failures[0].reason, "invalid_payload");
    }

    #[test]
    fn recompute_is_idempotent_and_scores_duplicates() {
        let mut ledger = Ledger::new();
        let first =
            ingest(&mut ledger, event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS))
                .expect("first");
        let dup =
            ingest(&mut ledger, event_json("e2", "asha@example.com", "2025-03-01T09:01:00Z", ANSWERS))
                .expect("dup");

        let once = recompute(&mut ledger, first.attempt_id()).expect("recompute");
        let twice = recompute(&mut ledger, first.attempt_id()).expect("recompute");
        assert_eq!(once, twice);
        assert_eq!(once.score, 7);

        recompute(&mut ledger, dup.attempt_id()).expect("recompute duplicate");
        let stored = attempts::find_by_id(&ledger, dup.attempt_id()).expect("attempt");
        assert_eq!(stored.status, AttemptStatus::Scored);
        assert_eq!(stored.duplicate_of, Some(first.attempt_id()));

        let missing = Uuid::new_v4();
        assert!(matches!(
            recompute(&mut ledger, missing),
            Err(IngestError::UnknownAttempt(id)) if id == missing
        ));
    }

    #[test]
    fn raw_payload_keeps_numeric_answers_and_unknown_fields() {
        let mut ledger = Ledger::new();
        let mut raw = event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS);
        raw["answers"]["q5"] = json!(3);
        raw["proctor"] = json!({"room": "B-12"});

        let outcome = ingest(&mut ledger, raw.clone()).expect("ingest");
        let attempt = attempts::find_by_id(&ledger, outcome.attempt_id()).expect("attempt");
        assert_eq!(attempt.raw_payload, raw);
        assert_eq!(attempt.answers.get("q5"), Some(&AnswerToken::Scalar(json!(3))));
    }

    #[test]
    fn blank_answers_are_stored_but_not_scored() {
        let mut ledger = Ledger::new();
        let mut raw = event_json("e1", "asha@example.com", "2025-03-01T09:00:00Z", ANSWERS);
        raw["answers"]["q5"] = Value::Null;

        let outcome = ingest(&mut ledger, raw).expect("ingest");
        let attempt = attempts::find_by_id(&ledger, outcome.attempt_id()).expect("attempt");
        assert_eq!(attempt.answers.get("q5"), Some(&AnswerToken::Blank));
        assert!(matches!(outcome, IngestOutcome::Scored { score: 7, .. }));
    }
}
