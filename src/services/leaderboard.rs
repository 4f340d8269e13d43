use std::cmp::Ordering;
use std::collections::HashMap;

use time::PrimitiveDateTime;
use uuid::Uuid;

/// One scored attempt competing for a student's leaderboard slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub student_id: Uuid,
    pub student_name: String,
    pub attempt_id: Uuid,
    pub score: i64,
    pub accuracy: u32,
    pub net_correct: i64,
    pub submitted_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedStanding {
    pub rank: usize,
    pub standing: Standing,
}

/// Keeps each student's best attempt and orders them.
///
/// A later attempt replaces the kept one only with a strictly higher score.
pub fn rank(standings: impl IntoIterator<Item = Standing>) -> Vec<RankedStanding> {
    let mut best: Vec<Standing> = Vec::new();
    let mut slot_by_student: HashMap<Uuid, usize> = HashMap::new();

    for standing in standings {
        match slot_by_student.get(&standing.student_id) {
            Some(&slot) => {
                if standing.score > best[slot].score {
                    best[slot] = standing;
                }
            }
            None => {
                slot_by_student.insert(standing.student_id, best.len());
                best.push(standing);
            }
        }
    }

    best.sort_by(compare_standings);

    best.into_iter()
        .enumerate()
        .map(|(index, standing)| RankedStanding { rank: index + 1, standing })
        .collect()
}

/// Score, accuracy and net correct descending, then earliest submission.
/// Attempts without a submission time sort after every timed one.
pub fn compare_standings(left: &Standing, right: &Standing) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| right.accuracy.cmp(&left.accuracy))
        .then_with(|| right.net_correct.cmp(&left.net_correct))
        .then_with(|| match (left.submitted_at, right.submitted_at) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
