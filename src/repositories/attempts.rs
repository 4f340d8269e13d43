use uuid::Uuid;

use crate::domain::models::Attempt;
use crate::domain::types::AttemptStatus;
use crate::repositories::Ledger;

pub fn insert(ledger: &mut Ledger, attempt: Attempt) -> Uuid {
    let id = attempt.id;
    ledger.attempts.push(attempt);
    id
}

pub fn find_by_id(ledger: &Ledger, id: Uuid) -> Option<&Attempt> {
    ledger.attempts.iter().find(|attempt| attempt.id == id)
}

pub fn exists_for_source_event(ledger: &Ledger, source_event_id: &str) -> bool {
    ledger
        .attempts
        .iter()
        .any(|attempt| attempt.source_event_id.as_deref() == Some(source_event_id))
}

/// Same student, same test, excluding `exclude`, in ingestion order.
pub fn siblings(ledger: &Ledger, student_id: Uuid, test_id: Uuid, exclude: Uuid) -> Vec<&Attempt> {
    ledger
        .attempts
        .iter()
        .filter(|attempt| {
            attempt.student_id == student_id && attempt.test_id == test_id && attempt.id != exclude
        })
        .collect()
}

pub fn list_by_test(ledger: &Ledger, test_id: Uuid) -> Vec<&Attempt> {
    ledger.attempts.iter().filter(|attempt| attempt.test_id == test_id).collect()
}

/// Returns false when the attempt does not exist.
pub fn set_status(
    ledger: &mut Ledger,
    id: Uuid,
    status: AttemptStatus,
    duplicate_of: Option<Uuid>,
) -> bool {
    match ledger.attempts.iter_mut().find(|attempt| attempt.id == id) {
        Some(attempt) => {
            attempt.status = status;
            attempt.duplicate_of = duplicate_of;
            true
        }
        None => false,
    }
}
