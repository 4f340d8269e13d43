use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::time::format_primitive;
use crate::domain::types::AttemptStatus;
use crate::services::ingestion::IngestReport;
use crate::services::leaderboard::RankedStanding;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptFilter {
    #[serde(default)]
    pub test_id: Option<Uuid>,
    #[serde(default)]
    pub student_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<AttemptStatus>,
    #[serde(default)]
    pub has_duplicates: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl AttemptFilter {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptListItem {
    pub attempt_id: String,
    pub student_id: String,
    pub student_name: String,
    pub test_id: String,
    pub test_name: String,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub duplicate_of_attempt_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptPage {
    pub total: usize,
    pub data: Vec<AttemptListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptDetail {
    pub attempt_id: String,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub test_name: Option<String>,
    pub status: AttemptStatus,
    pub started_at: Option<String>,
    pub submitted_at: Option<String>,
    pub duplicate_of_attempt_id: Option<String>,
    pub raw_payload: Value,
    pub score: Option<i64>,
    pub correct: Option<u32>,
    pub wrong: Option<u32>,
    pub skipped: Option<u32>,
    pub accuracy: Option<u32>,
    pub net_correct: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student_id: String,
    pub student_name: String,
    pub score: i64,
    pub accuracy: u32,
    pub net_correct: i64,
    pub submitted_at: Option<String>,
}

impl From<RankedStanding> for LeaderboardEntry {
    fn from(ranked: RankedStanding) -> Self {
        let standing = ranked.standing;
        Self {
            rank: ranked.rank,
            student_id: standing.student_id.to_string(),
            student_name: standing.student_name,
            score: standing.score,
            accuracy: standing.accuracy,
            net_correct: standing.net_correct,
            submitted_at: standing.submitted_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSummary {
    pub test_id: String,
    pub name: String,
    pub max_marks: Option<i64>,
    pub attempts: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// What a replay run writes out.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ingest: IngestReport,
    pub tests: Vec<TestSummary>,
}
