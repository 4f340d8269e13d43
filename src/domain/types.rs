use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Raw token recorded for a correct selection.
pub const CORRECT_MARK: &str = "A";
/// Raw token recorded for a wrong selection.
pub const WRONG_MARK: &str = "B";
/// Raw token recorded for an explicit skip.
pub const SKIP_MARK: &str = "SKIP";

/// One answer as decided at the ingestion boundary.
///
/// Only the three marks are scored. `Other` keeps the raw text so that two
/// different unrecognised answers never compare equal during duplicate
/// detection. `Scalar` keeps a non-string JSON answer as sent, so `3` and
/// `"3"` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerToken {
    Correct,
    Wrong,
    Skip,
    Other(String),
    Scalar(Value),
    Blank,
}

impl AnswerToken {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            CORRECT_MARK => AnswerToken::Correct,
            WRONG_MARK => AnswerToken::Wrong,
            SKIP_MARK => AnswerToken::Skip,
            other => AnswerToken::Other(other.to_string()),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AnswerToken::Blank,
            Value::String(raw) => AnswerToken::from_raw(raw),
            other => AnswerToken::Scalar(other.clone()),
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            AnswerToken::Correct => Some(CORRECT_MARK),
            AnswerToken::Wrong => Some(WRONG_MARK),
            AnswerToken::Skip => Some(SKIP_MARK),
            AnswerToken::Other(raw) => Some(raw),
            AnswerToken::Scalar(_) | AnswerToken::Blank => None,
        }
    }
}

impl Serialize for AnswerToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnswerToken::Scalar(value) => value.serialize(serializer),
            token => match token.as_raw() {
                Some(raw) => serializer.serialize_str(raw),
                None => serializer.serialize_none(),
            },
        }
    }
}

impl<'de> Deserialize<'de> for AnswerToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(AnswerToken::from_json(&value))
    }
}

/// Answers of one attempt keyed by question identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<String, AnswerToken>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, token: AnswerToken) {
        self.0.insert(question.into(), token);
    }

    pub fn get(&self, question: &str) -> Option<&AnswerToken> {
        self.0.get(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerToken)> {
        self.0.iter().map(|(question, token)| (question.as_str(), token))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &AnswerToken> {
        self.0.values()
    }
}

impl<Q: Into<String>> FromIterator<(Q, AnswerToken)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (Q, AnswerToken)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(question, token)| (question.into(), token)).collect())
    }
}

/// Per-test weights. `wrong` is normally zero or negative; it is applied as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingScheme {
    pub correct: i64,
    pub wrong: i64,
    pub skip: i64,
}

impl MarkingScheme {
    /// Largest absolute weight accepted from an event.
    pub const MAX_WEIGHT: i64 = 1_000_000;

    /// Name of the first weight outside `-MAX_WEIGHT..=MAX_WEIGHT`, if any.
    pub fn out_of_range_weight(&self) -> Option<&'static str> {
        [("correct", self.correct), ("wrong", self.wrong), ("skip", self.skip)]
            .into_iter()
            .find(|(_, weight)| weight.unsigned_abs() > Self::MAX_WEIGHT.unsigned_abs())
            .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Ingested,
    Deduped,
    Scored,
}

impl AttemptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptStatus::Ingested => "INGESTED",
            AttemptStatus::Deduped => "DEDUPED",
            AttemptStatus::Scored => "SCORED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Email,
    Phone,
}

/// Canonical student identity, `email:<address>` or `phone:<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub(crate) fn email(normalized: &str) -> Self {
        Self(format!("email:{normalized}"))
    }

    pub(crate) fn phone(digits: &str) -> Self {
        Self(format!("phone:{digits}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> IdentityKind {
        if self.0.starts_with("phone:") {
            IdentityKind::Phone
        } else {
            IdentityKind::Email
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
