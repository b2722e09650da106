//! Question and answer shapes accepted by the text rewriter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A quiz question with its answer options, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    /// Question text; may embed image URLs.
    pub text: String,
    /// Answer options; may be empty for free-form questions.
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// One answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    /// Answer text; may embed image URLs.
    pub text: String,
}

impl Question {
    pub fn new(text: impl Into<String>, answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { text: text.into(), answers: answers.into_iter().map(|a| Answer { text: a.into() }).collect() }
    }

    /// The question text followed by every answer text.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.text.as_str()).chain(self.answers.iter().map(|a| a.text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_shape() {
        let q: Question =
            serde_json::from_str(r#"{"text": "Which?", "answers": [{"text": "a.com/1.png"}, {"text": "b"}]}"#).unwrap();
        assert_eq!(q, Question::new("Which?", ["a.com/1.png", "b"]));
    }

    #[test]
    fn test_answers_default_to_empty() {
        let q: Question = serde_json::from_str(r#"{"text": "Free form"}"#).unwrap();
        assert!(q.answers.is_empty());
    }

    #[test]
    fn test_rejects_malformed_shape() {
        assert!(serde_json::from_str::<Question>(r#"{"text": 42}"#).is_err());
        assert!(serde_json::from_str::<Question>(r#"{"answers": []}"#).is_err());
        assert!(serde_json::from_str::<Question>(r#"{"text": "q", "answers": ["bare"]}"#).is_err());
    }

    #[test]
    fn test_texts_order() {
        let q = Question::new("q", ["a1", "a2"]);
        assert_eq!(q.texts().collect::<Vec<_>>(), vec!["q", "a1", "a2"]);
    }
}
