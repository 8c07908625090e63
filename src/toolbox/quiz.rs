//! True/false quiz
//!
//! Questions are asked in order; each answer is checked and scored.
//! Question banks load from plain JSON or from trivia API responses
//! (`{"results": [{"question": ..., "correct_answer": "True"}]}`).

use serde::{Deserialize, Serialize};
use super::{Result, ToolboxError};

/// One true/false question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub answer: bool,
}

impl Question {
    pub fn new(text: &str, answer: bool) -> Self {
        Self { text: text.to_string(), answer }
    }
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    results: Vec<TriviaQuestion>,
}

#[derive(Debug, Deserialize)]
struct TriviaQuestion {
    question: String,
    correct_answer: String,
}

/// Parse a user answer: `true`, `t`, `false` or `f`, any case
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "true" | "t" => Some(true),
        "false" | "f" => Some(false),
        _ => None,
    }
}

/// Decode the HTML entities trivia APIs put in question text
pub fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Load questions from a JSON array of `{text, answer}`
pub fn questions_from_json(json: &str) -> Result<Vec<Question>> {
    Ok(serde_json::from_str(json)?)
}

/// Load questions from a trivia API response body
///
/// Entries whose answer is neither "True" nor "False" are skipped.
pub fn questions_from_trivia_json(json: &str) -> Result<Vec<Question>> {
    let response: TriviaResponse = serde_json::from_str(json)?;
    Ok(response.results
        .into_iter()
        .filter_map(|q| {
            parse_answer(&q.correct_answer).map(|answer| Question {
                text: unescape_html(&q.question),
                answer,
            })
        })
        .collect())
}

/// Quiz state: current position and score
#[derive(Debug, Clone)]
pub struct QuizBrain {
    questions: Vec<Question>,
    question_number: usize,
    score: usize,
    answered_current: bool,
}

impl QuizBrain {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            question_number: 0,
            score: 0,
            answered_current: true,
        }
    }

    /// True while questions remain
    pub fn has_more(&self) -> bool {
        self.question_number < self.questions.len()
    }

    /// Advance to the next question and return its prompt, `Q.1: text`
    pub fn next_question(&mut self) -> Result<String> {
        if !self.has_more() {
            return Err(ToolboxError::Exhausted("no questions left".to_string()));
        }
        let question = &self.questions[self.question_number];
        self.question_number += 1;
        self.answered_current = false;
        Ok(format!("Q.{}: {}", self.question_number, question.text))
    }

    /// Check an answer for the question last returned by `next_question`
    ///
    /// Unparsable input is an error so the caller can ask again; the
    /// question stays open in that case.
    pub fn check_answer(&mut self, input: &str) -> Result<bool> {
        if self.question_number == 0 || self.answered_current {
            return Err(ToolboxError::InvalidMove("no open question".to_string()));
        }
        let answer = parse_answer(input)
            .ok_or_else(|| ToolboxError::InvalidMove(format!("'{}' is not true or false", input.trim())))?;

        let correct = answer == self.questions[self.question_number - 1].answer;
        if correct {
            self.score += 1;
        }
        self.answered_current = true;
        Ok(correct)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// Number of questions asked so far
    pub fn question_number(&self) -> usize {
        self.question_number
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}
