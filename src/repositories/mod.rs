pub mod attempts;
pub mod papers;
pub mod scores;
pub mod students;

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::models::{Attempt, AttemptScore, Student, TestPaper};

/// In-memory record store. Insertion order is kept and is the order sibling
/// attempts are handed to the duplicate detector.
#[derive(Debug, Default)]
pub struct Ledger {
    students: Vec<Student>,
    papers: Vec<TestPaper>,
    attempts: Vec<Attempt>,
    scores: HashMap<Uuid, AttemptScore>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn papers(&self) -> &[TestPaper] {
        &self.papers
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }
}
