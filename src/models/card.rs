//! Card is a <question, answer> pair as served by the study backend.
//! Scheduling metadata is owned by the server and only ever read here.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub i64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
    #[serde(default = "default_efactor")]
    efactor: f64,
    #[serde(default)]
    interval: i64,
    #[serde(default)]
    repetitions: i64,
}

fn default_efactor() -> f64 {
    2.5
}

impl Card {
    /// Card as freshly created on the server, before any review.
    pub fn new(id: i64, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: CardId(id),
            question: question.into(),
            answer: answer.into(),
            efactor: default_efactor(),
            interval: 0,
            repetitions: 0,
        }
    }

    pub fn efactor(&self) -> f64 {
        self.efactor
    }

    /// Days until the next review, as last computed by the scheduler.
    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn repetitions(&self) -> i64 {
        self.repetitions
    }

    pub fn schedule_summary(&self) -> String {
        format!(
            "E-Factor: {:.2} | Interval: {} days | Repetitions: {}",
            self.efactor, self.interval, self.repetitions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_from_backend_json() {
        let json = r#"{
            "id": 7,
            "question": "What is $\\pi$?",
            "answer": "About 3.14",
            "efactor": 2.36,
            "interval": 6,
            "repetitions": 2,
            "next_review": "2024-05-01"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, CardId(7));
        assert_eq!(card.question, "What is $\\pi$?");
        assert_eq!(card.interval(), 6);
        assert_eq!(card.repetitions(), 2);
        assert!((card.efactor() - 2.36).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_schedule_uses_defaults() {
        let json = r#"{"id": 1, "question": "q", "answer": "a"}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card, Card::new(1, "q", "a"));
    }

    #[test]
    fn test_schedule_summary() {
        let card = Card::new(3, "cześć", "hello");
        assert_eq!(
            card.schedule_summary(),
            "E-Factor: 2.50 | Interval: 0 days | Repetitions: 0"
        );
    }

    #[test]
    fn test_card_id_display() {
        assert_eq!(CardId(42).to_string(), "#42");
    }
}
