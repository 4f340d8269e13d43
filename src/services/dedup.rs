use time::{Duration, PrimitiveDateTime};

use crate::domain::models::Attempt;
use crate::domain::types::AnswerSheet;

pub const SIMILARITY_THRESHOLD: f64 = 0.92;
pub const TIME_WINDOW_MINUTES: i64 = 7;

/// What the detector needs to know about an attempt.
pub trait DedupCandidate {
    fn started_at(&self) -> Option<PrimitiveDateTime>;
    fn answers(&self) -> &AnswerSheet;
}

impl DedupCandidate for Attempt {
    fn started_at(&self) -> Option<PrimitiveDateTime> {
        self.started_at
    }

    fn answers(&self) -> &AnswerSheet {
        &self.answers
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupPolicy {
    pub window: Duration,
    pub similarity_threshold: f64,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            window: Duration::minutes(TIME_WINDOW_MINUTES),
            similarity_threshold: SIMILARITY_THRESHOLD,
        }
    }
}

impl DedupPolicy {
    pub(crate) fn from_settings(settings: &crate::core::config::Settings) -> Self {
        let dedup = settings.dedup();
        // Settings cap the window at a year, so the conversion cannot fail.
        let minutes = i64::try_from(dedup.window_minutes).unwrap_or(TIME_WINDOW_MINUTES);
        Self {
            window: Duration::minutes(minutes),
            similarity_threshold: dedup.similarity_threshold,
        }
    }

    /// Returns the first candidate, in the order given, that started close
    /// enough to `new` and shares enough identical answers with it.
    ///
    /// Candidates must not contain `new` itself.
    pub fn find_duplicate<'a, N, C, I>(&self, new: &N, candidates: I) -> Option<&'a C>
    where
        N: DedupCandidate + ?Sized,
        C: DedupCandidate + 'a,
        I: IntoIterator<Item = &'a C>,
    {
        candidates.into_iter().find(|candidate| {
            within_time_window(new.started_at(), candidate.started_at(), self.window)
                && similarity(new.answers(), candidate.answers()) >= self.similarity_threshold
        })
    }
}

/// [`DedupPolicy::find_duplicate`] with the default 7 minute / 92% policy.
pub fn find_duplicate<'a, N, C, I>(new: &N, candidates: I) -> Option<&'a C>
where
    N: DedupCandidate + ?Sized,
    C: DedupCandidate + 'a,
    I: IntoIterator<Item = &'a C>,
{
    DedupPolicy::default().find_duplicate(new, candidates)
}

/// A missing timestamp on either side never matches.
pub fn within_time_window(
    first: Option<PrimitiveDateTime>,
    second: Option<PrimitiveDateTime>,
    window: Duration,
) -> bool {
    match (first, second) {
        (Some(first), Some(second)) => (first - second).abs() <= window,
        _ => false,
    }
}

/// Share of commonly answered questions with identical answers.
pub fn similarity(first: &AnswerSheet, second: &AnswerSheet) -> f64 {
    if first.is_empty() || second.is_empty() {
        return 0.0;
    }

    let (smaller, larger) = if first.len() <= second.len() { (first, second) } else { (second, first) };

    let mut common = 0usize;
    let mut same = 0usize;
    for (question, token) in smaller.iter() {
        let Some(other) = larger.get(question) else {
            continue;
        };
        common += 1;
        if token == other {
            same += 1;
        }
    }

    if common == 0 {
        return 0.0;
    }

    same as f64 / common as f64
}
