//! Practice question types and the plain-text question parser.

use serde::{Deserialize, Deserializer, Serialize};

/// Prefixes that start a new question in plain-text output
const QUESTION_PREFIXES: [&str; 6] = ["Question", "Q", "1.", "2.", "3.", "#"];
/// Prefixes that open an option list
const FIRST_OPTION_PREFIXES: [&str; 5] = ["A.", "B.", "1.", "*", "-"];
/// Prefixes that continue an option list
const OPTION_PREFIXES: [&str; 8] = ["A.", "B.", "C.", "D.", "1.", "2.", "*", "-"];

/// A practice or quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeQuestion {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl PracticeQuestion {
    /// Filler question used to reach the requested count
    pub fn placeholder(number: usize) -> Self {
        Self {
            text: format!("Additional question {number}"),
            options: vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
            ],
            answer: "Option A".to_string(),
            explanation: "This is a placeholder question.".to_string(),
        }
    }
}

/// Models sometimes answer with an option index instead of its text.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Answer {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Answer::deserialize(deserializer)? {
        Answer::Text(s) => s,
        Answer::Number(n) => n.to_string(),
        Answer::Flag(b) => b.to_string(),
    })
}

#[derive(Default)]
struct Draft {
    text: Option<String>,
    options: Option<Vec<String>>,
    answer: Option<String>,
    explanation: Option<String>,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.options.is_none()
            && self.answer.is_none()
            && self.explanation.is_none()
    }

    fn finish(self) -> PracticeQuestion {
        PracticeQuestion {
            text: self.text.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            answer: self.answer.unwrap_or_default(),
            explanation: self.explanation.unwrap_or_default(),
        }
    }

    fn absorb(&mut self, line: &str) {
        let lowered = line.to_lowercase();

        if self.text.is_none() {
            self.text = Some(line.to_string());
        } else if self.options.is_none() && starts_with_any(line, &FIRST_OPTION_PREFIXES) {
            self.options = Some(vec![line.to_string()]);
        } else if self.options.is_some() && starts_with_any(line, &OPTION_PREFIXES) {
            self.options.get_or_insert_with(Vec::new).push(line.to_string());
        } else if self.answer.is_none() && (lowered.contains("answer") || lowered.contains("correct"))
        {
            self.answer = Some(line.to_string());
        } else if self.explanation.is_none()
            && (lowered.contains("explanation") || lowered.contains("reason"))
        {
            self.explanation = Some(line.to_string());
        } else if let Some(explanation) = self.explanation.as_mut() {
            explanation.push(' ');
            explanation.push_str(line);
        }
    }
}

fn starts_with_any(line: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| line.starts_with(p))
}

/// Best-effort parse of questions written as plain text.
///
/// A line starting with a question marker closes the current question. Within
/// a question the first line is the text, marked lines are options, and
/// lines mentioning an answer or an explanation fill those fields. Blank
/// lines are ignored. Questions without an answer keep an empty one.
pub fn parse_questions_from_text(text: &str) -> Vec<PracticeQuestion> {
    let mut questions = Vec::new();
    let mut current = Draft::default();

    let lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    for (index, line) in lines.enumerate() {
        if index > 0 && starts_with_any(line, &QUESTION_PREFIXES) && !current.is_empty() {
            questions.push(std::mem::take(&mut current).finish());
        }
        current.absorb(line);
    }

    if !current.is_empty() {
        questions.push(current.finish());
    }

    questions
}

/// Pad with placeholder questions up to `count`, then truncate to `count`.
pub fn fit_to_count(mut questions: Vec<PracticeQuestion>, count: usize) -> Vec<PracticeQuestion> {
    while questions.len() < count {
        questions.push(PracticeQuestion::placeholder(questions.len() + 1));
    }
    questions.truncate(count);
    questions
}
