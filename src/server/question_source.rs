//! In-memory question source.
//!
//! Stands in for the external question-bank provider: hands out a sampled,
//! fixed-size question list per subject and validates submitted answers.
//! Both operations go through actor messages, so callers treat it as an
//! asynchronous collaborator and re-check session state when replies land.

use actix::prelude::*;
use std::collections::HashMap;
use log::info;
use rand::seq::IndexedRandom;
use thiserror::Error;
use uuid::Uuid;

use crate::quiz::types::Question;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuestionSourceError {
    #[error("unknown subject \"{0}\"")]
    UnknownSubject(String),
    #[error("no questions available for subject \"{0}\"")]
    EmptySubject(String),
    #[error("unknown question {0}")]
    UnknownQuestion(Uuid),
}

/// Per-subject question storage.
pub struct QuestionBank {
    banks: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self { banks: HashMap::new() }
    }

    /// Replace the questions stored for a subject.
    pub fn insert_subject(&mut self, subject: &str, questions: Vec<Question>) {
        self.banks.insert(subject.to_string(), questions);
    }

    /// A bank seeded with the built-in demo subjects.
    pub fn with_default_subjects() -> Self {
        let mut bank = Self::new();
        bank.insert_subject("general", make_questions(GENERAL_SEED));
        bank.insert_subject("rust", make_questions(RUST_SEED));
        bank
    }

    fn fetch(&self, subject: &str, count: usize) -> Result<Vec<Question>, QuestionSourceError> {
        let bank = self
            .banks
            .get(subject)
            .ok_or_else(|| QuestionSourceError::UnknownSubject(subject.to_string()))?;
        if bank.is_empty() {
            return Err(QuestionSourceError::EmptySubject(subject.to_string()));
        }
        let mut rng = rand::rng();
        Ok(bank.choose_multiple(&mut rng, count).cloned().collect())
    }

    fn validate(
        &self,
        subject: &str,
        question_id: Uuid,
        choice_index: usize,
    ) -> Result<bool, QuestionSourceError> {
        let bank = self
            .banks
            .get(subject)
            .ok_or_else(|| QuestionSourceError::UnknownSubject(subject.to_string()))?;
        let question = bank
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(QuestionSourceError::UnknownQuestion(question_id))?;
        Ok(question.correct_index == choice_index)
    }
}

/// Message: sample a fixed-size ordered question list for a subject.
#[derive(Message)]
#[rtype(result = "Result<Vec<Question>, QuestionSourceError>")]
pub struct FetchQuestions {
    pub subject: String,
    pub count: usize,
}

/// Message: check a submitted choice against the stored answer.
#[derive(Message)]
#[rtype(result = "Result<bool, QuestionSourceError>")]
pub struct ValidateAnswer {
    pub subject: String,
    pub question_id: Uuid,
    pub choice_index: usize,
}

impl Actor for QuestionBank {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[QuestionBank] serving {} subjects", self.banks.len());
    }
}

impl Handler<FetchQuestions> for QuestionBank {
    type Result = Result<Vec<Question>, QuestionSourceError>;

    fn handle(&mut self, msg: FetchQuestions, _ctx: &mut Self::Context) -> Self::Result {
        self.fetch(&msg.subject, msg.count)
    }
}

impl Handler<ValidateAnswer> for QuestionBank {
    type Result = Result<bool, QuestionSourceError>;

    fn handle(&mut self, msg: ValidateAnswer, _ctx: &mut Self::Context) -> Self::Result {
        self.validate(&msg.subject, msg.question_id, msg.choice_index)
    }
}

fn make_questions(entries: &[(&str, &[&str], usize)]) -> Vec<Question> {
    entries
        .iter()
        .map(|(text, options, correct)| Question {
            id: Uuid::new_v4(),
            text: (*text).to_string(),
            options: options.iter().map(|o| (*o).to_string()).collect(),
            correct_index: *correct,
        })
        .collect()
}

const GENERAL_SEED: &[(&str, &[&str], usize)] = &[
    ("What is the capital of Australia?", &["Sydney", "Canberra", "Melbourne", "Perth"], 1),
    ("Which planet is known as the Red Planet?", &["Venus", "Jupiter", "Mars", "Saturn"], 2),
    ("How many continents are there?", &["five", "six", "seven", "eight"], 2),
    ("Which ocean is the largest?", &["Atlantic", "Indian", "Arctic", "Pacific"], 3),
    ("Who painted the Mona Lisa?", &["Michelangelo", "Da Vinci", "Raphael", "Rembrandt"], 1),
    ("What is the chemical symbol for gold?", &["Au", "Ag", "Go", "Gd"], 0),
    ("In which year did the Berlin Wall fall?", &["1987", "1989", "1991", "1993"], 1),
    ("What is the longest river in the world?", &["Amazon", "Yangtze", "Nile", "Mississippi"], 2),
    ("How many strings does a standard violin have?", &["four", "five", "six", "seven"], 0),
    ("Which gas do plants absorb from the atmosphere?", &["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"], 2),
    ("What is the smallest prime number?", &["zero", "one", "two", "three"], 2),
    ("Which country hosts the city of Marrakesh?", &["Egypt", "Morocco", "Tunisia", "Algeria"], 1),
];

const RUST_SEED: &[(&str, &[&str], usize)] = &[
    ("Which keyword declares an immutable binding?", &["let", "mut", "const fn", "static mut"], 0),
    ("What does the ? operator do?", &["panics", "propagates errors", "loops", "borrows"], 1),
    ("Which type owns a heap-allocated string?", &["&str", "String", "char", "str"], 1),
    ("How many mutable references to a value can exist at once?", &["zero", "one", "two", "unlimited"], 1),
    ("Which trait enables shallow bitwise copies?", &["Clone", "Send", "Copy", "Sized"], 2),
    ("What does cargo test do?", &["formats code", "runs tests", "builds docs", "publishes"], 1),
    ("Which collection is a growable array?", &["HashMap", "Vec", "BTreeSet", "VecDeque"], 1),
    ("What is the unit type written as?", &["()", "[]", "{}", "!"], 0),
    ("Which enum models an optional value?", &["Result", "Either", "Option", "Maybe"], 2),
    ("What does the borrow checker enforce?", &["naming rules", "aliasing rules", "style rules", "imports"], 1),
    ("Which keyword starts a pattern match?", &["switch", "case", "match", "when"], 2),
    ("What is the default integer type?", &["i64", "u32", "i32", "isize"], 2),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_samples_the_requested_count() {
        let bank = QuestionBank::with_default_subjects();
        let questions = bank.fetch("general", 10).unwrap();
        assert_eq!(questions.len(), 10);

        // sampling never duplicates a question
        let mut ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn fetch_unknown_subject_fails() {
        let bank = QuestionBank::with_default_subjects();
        assert_eq!(
            bank.fetch("philately", 10),
            Err(QuestionSourceError::UnknownSubject("philately".to_string()))
        );
    }

    #[test]
    fn validate_checks_the_stored_answer() {
        let mut bank = QuestionBank::new();
        bank.insert_subject("testing", make_questions(&[("q", &["a", "b"], 1)]));
        let id = bank.banks["testing"][0].id;

        assert_eq!(bank.validate("testing", id, 1), Ok(true));
        assert_eq!(bank.validate("testing", id, 0), Ok(false));
        assert_eq!(
            bank.validate("testing", Uuid::nil(), 0),
            Err(QuestionSourceError::UnknownQuestion(Uuid::nil()))
        );
    }
}
