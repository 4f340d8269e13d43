pub mod dedup;
pub mod identity;
pub mod ingestion;
pub mod leaderboard;
pub mod queries;
pub mod scoring;
