use uuid::Uuid;

use crate::core::time::format_primitive;
use crate::domain::models::Attempt;
use crate::domain::types::AttemptStatus;
use crate::repositories::{attempts, papers, scores, students, Ledger};
use crate::schemas::attempt::{
    AttemptDetail, AttemptFilter, AttemptListItem, AttemptPage, LeaderboardEntry, RunSummary,
    TestSummary,
};
use crate::schemas::student::StudentListItem;
use crate::services::ingestion::IngestReport;
use crate::services::leaderboard::{self, Standing};

pub fn list_attempts(ledger: &Ledger, filter: &AttemptFilter) -> AttemptPage {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);

    let matching: Vec<AttemptListItem> = ledger
        .attempts()
        .iter()
        .filter(|attempt| filter.test_id.map_or(true, |id| attempt.test_id == id))
        .filter(|attempt| filter.student_id.map_or(true, |id| attempt.student_id == id))
        .filter(|attempt| filter.status.map_or(true, |status| attempt.status == status))
        .filter(|attempt| {
            filter.has_duplicates.map_or(true, |wanted| attempt.duplicate_of.is_some() == wanted)
        })
        .filter_map(|attempt| {
            let student = students::find_by_id(ledger, attempt.student_id)?;
            let paper = papers::find_by_id(ledger, attempt.test_id)?;
            if let Some(needle) = &needle {
                if !student.full_name.to_lowercase().contains(needle) {
                    return None;
                }
            }
            Some(AttemptListItem {
                attempt_id: attempt.id.to_string(),
                student_id: student.id.to_string(),
                student_name: student.full_name.clone(),
                test_id: paper.id.to_string(),
                test_name: paper.name.clone(),
                status: attempt.status,
                score: scores::find_by_attempt(ledger, attempt.id)
                    .map(|stored| stored.breakdown.score),
                duplicate_of_attempt_id: attempt.duplicate_of.map(|id| id.to_string()),
            })
        })
        .collect();

    let total = matching.len();
    let data = matching.into_iter().skip(filter.offset).take(filter.effective_limit()).collect();

    AttemptPage { total, data }
}

pub fn attempt_detail(ledger: &Ledger, attempt_id: Uuid) -> Option<AttemptDetail> {
    let attempt = attempts::find_by_id(ledger, attempt_id)?;
    let student = students::find_by_id(ledger, attempt.student_id);
    let paper = papers::find_by_id(ledger, attempt.test_id);
    let breakdown = scores::find_by_attempt(ledger, attempt.id).map(|stored| stored.breakdown);

    Some(AttemptDetail {
        attempt_id: attempt.id.to_string(),
        student_name: student.map(|student| student.full_name.clone()),
        student_email: student.and_then(|student| student.email.clone()),
        test_name: paper.map(|paper| paper.name.clone()),
        status: attempt.status,
        started_at: attempt.started_at.map(format_primitive),
        submitted_at: attempt.submitted_at.map(format_primitive),
        duplicate_of_attempt_id: attempt.duplicate_of.map(|id| id.to_string()),
        raw_payload: attempt.raw_payload.clone(),
        score: breakdown.map(|value| value.score),
        correct: breakdown.map(|value| value.correct),
        wrong: breakdown.map(|value| value.wrong),
        skipped: breakdown.map(|value| value.skipped),
        accuracy: breakdown.map(|value| value.accuracy),
        net_correct: breakdown.map(|value| value.net_correct),
    })
}

/// Best scored attempt per student for one test, ranked.
pub fn leaderboard(ledger: &Ledger, test_id: Uuid) -> Vec<LeaderboardEntry> {
    let standings = attempts::list_by_test(ledger, test_id)
        .into_iter()
        .filter(|attempt| attempt.status == AttemptStatus::Scored)
        .filter_map(|attempt| standing_for(ledger, attempt));

    leaderboard::rank(standings).into_iter().map(LeaderboardEntry::from).collect()
}

/// Every known student, in the order they were first seen.
pub fn list_students(ledger: &Ledger) -> Vec<StudentListItem> {
    ledger.students().iter().map(StudentListItem::from).collect()
}

pub fn summarize(ledger: &Ledger, ingest: IngestReport) -> RunSummary {
    let tests = ledger
        .papers()
        .iter()
        .map(|paper| TestSummary {
            test_id: paper.id.to_string(),
            name: paper.name.clone(),
            max_marks: paper.max_marks,
            attempts: attempts::list_by_test(ledger, paper.id).len(),
            leaderboard: leaderboard(ledger, paper.id),
        })
        .collect();

    RunSummary { ingest, tests }
}

fn standing_for(ledger: &Ledger, attempt: &Attempt) -> Option<Standing> {
    let breakdown = scores::find_by_attempt(ledger, attempt.id)?.breakdown;
    let student = students::find_by_id(ledger, attempt.student_id)?;

    Some(Standing {
        student_id: student.id,
        student_name: student.full_name.clone(),
        attempt_id: attempt.id,
        score: breakdown.score,
        accuracy: breakdown.accuracy,
        net_correct: breakdown.net_correct,
        submitted_at: attempt.submitted_at,
    })
}
