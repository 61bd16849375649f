use std::collections::HashSet;
use std::ops::AddAssign;

/// How a single question was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionOutcome {
    /// Cached answer typed and confirmed by the site.
    Correct,
    /// Cached answer typed but the site disclosed a different one.
    Corrected,
    /// A different stored answer was typed on purpose.
    IntentionalError,
    /// Nothing cached; the answer was read from the site's disclosure.
    Learned,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_questions: usize,
    pub unique_questions: usize,
    pub first_time_correct: usize,
    pub intentional_errors: usize,
    pub learned: usize,
    pub corrected: usize,
}

impl Summary {
    pub fn rows(&self) -> [(&'static str, usize); 6] {
        [
            ("Total questions", self.total_questions),
            ("Unique questions", self.unique_questions),
            ("First time correct", self.first_time_correct),
            ("Intentional errors", self.intentional_errors),
            ("Learned answers", self.learned),
            ("Corrected answers", self.corrected),
        ]
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Summary) {
        self.total_questions += other.total_questions;
        self.unique_questions += other.unique_questions;
        self.first_time_correct += other.first_time_correct;
        self.intentional_errors += other.intentional_errors;
        self.learned += other.learned;
        self.corrected += other.corrected;
    }
}

/// Per-session counters. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct SessionTracker {
    seen: HashSet<String>,
    summary: Summary,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: &str, outcome: QuestionOutcome) {
        let s = &mut self.summary;
        s.total_questions += 1;

        if self.seen.insert(question.to_string()) {
            s.unique_questions += 1;
            if outcome == QuestionOutcome::Correct {
                s.first_time_correct += 1;
            }
        }

        match outcome {
            QuestionOutcome::IntentionalError => s.intentional_errors += 1,
            QuestionOutcome::Learned => s.learned += 1,
            QuestionOutcome::Corrected => s.corrected += 1,
            QuestionOutcome::Correct => {}
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }
}
