use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::domain::models::AttemptScore;
use crate::repositories::Ledger;
use crate::services::scoring::ScoreBreakdown;

pub fn find_by_attempt(ledger: &Ledger, attempt_id: Uuid) -> Option<&AttemptScore> {
    ledger.scores.get(&attempt_id)
}

/// Stores the breakdown for an attempt, replacing any previous one.
pub fn upsert(ledger: &mut Ledger, attempt_id: Uuid, breakdown: ScoreBreakdown) {
    ledger
        .scores
        .insert(attempt_id, AttemptScore { attempt_id, breakdown, computed_at: primitive_now_utc() });
}
