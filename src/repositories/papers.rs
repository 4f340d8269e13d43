use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::domain::models::TestPaper;
use crate::domain::types::MarkingScheme;
use crate::repositories::Ledger;

pub fn find_by_id(ledger: &Ledger, id: Uuid) -> Option<&TestPaper> {
    ledger.papers.iter().find(|paper| paper.id == id)
}

pub fn find_by_name<'a>(ledger: &'a Ledger, name: &str) -> Option<&'a TestPaper> {
    ledger.papers.iter().find(|paper| paper.name == name)
}

/// Tests are keyed by name; the first scheme seen for a name is kept.
pub fn find_or_create(
    ledger: &mut Ledger,
    name: &str,
    max_marks: Option<i64>,
    marking: MarkingScheme,
) -> Uuid {
    if let Some(existing) = find_by_name(ledger, name) {
        return existing.id;
    }

    let paper = TestPaper {
        id: Uuid::new_v4(),
        name: name.to_string(),
        max_marks,
        marking,
        created_at: primitive_now_utc(),
    };
    let id = paper.id;
    ledger.papers.push(paper);
    id
}
