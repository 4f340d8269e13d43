use serde::{Deserialize, Serialize};

use crate::domain::types::{AnswerSheet, AnswerToken, MarkingScheme};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCounts {
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
}

/// Enough to recompute the score without the answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub config: MarkingScheme,
    pub counts: ScoreCounts,
}

impl ScoreExplanation {
    pub fn recompute(&self) -> i64 {
        weighted_score(self.counts, self.config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub accuracy: u32,
    pub net_correct: i64,
    pub score: i64,
    pub explanation: ScoreExplanation,
}

/// Scores an answer sheet under a marking scheme.
///
/// Only the correct, wrong and skip marks are counted; any other answer is
/// left out of every bucket. Accuracy is truncated, not rounded.
pub fn score(answers: &AnswerSheet, scheme: MarkingScheme) -> ScoreBreakdown {
    let counts = count_tokens(answers.tokens());

    let answered = counts.correct + counts.wrong;
    let accuracy = if answered == 0 {
        0
    } else {
        (u64::from(counts.correct) * 100 / u64::from(answered)) as u32
    };

    ScoreBreakdown {
        correct: counts.correct,
        wrong: counts.wrong,
        skipped: counts.skipped,
        accuracy,
        net_correct: i64::from(counts.correct) - i64::from(counts.wrong),
        score: weighted_score(counts, scheme),
        explanation: ScoreExplanation { config: scheme, counts },
    }
}

fn count_tokens<'a>(tokens: impl Iterator<Item = &'a AnswerToken>) -> ScoreCounts {
    let mut counts = ScoreCounts::default();
    for token in tokens {
        match token {
            AnswerToken::Correct => counts.correct += 1,
            AnswerToken::Wrong => counts.wrong += 1,
            AnswerToken::Skip => counts.skipped += 1,
            AnswerToken::Other(_) | AnswerToken::Scalar(_) | AnswerToken::Blank => {}
        }
    }
    counts
}

// Saturates at the i64 bounds.
fn weighted_score(counts: ScoreCounts, scheme: MarkingScheme) -> i64 {
    i64::from(counts.correct)
        .saturating_mul(scheme.correct)
        .saturating_add(i64::from(counts.wrong).saturating_mul(scheme.wrong))
        .saturating_add(i64::from(counts.skipped).saturating_mul(scheme.skip))
}
