//! Quiz types and grading.

use super::questions::PracticeQuestion;
use serde::{Deserialize, Serialize};

/// A generated quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub topic: String,
    pub difficulty: String,
    pub questions: Vec<PracticeQuestion>,
}

/// Grade of one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedAnswer {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Grade of a whole quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
    pub feedback: String,
    pub answers: Vec<GradedAnswer>,
}

/// Drop a leading `A. ` or `A) ` option marker
pub fn strip_option_prefix(option: &str) -> &str {
    let trimmed = option.trim();
    let mut chars = trimmed.char_indices();

    match (chars.next(), chars.next(), chars.next()) {
        (Some((_, letter)), Some((_, mark)), Some((_, ' ')))
            if letter.is_alphabetic() && (mark == '.' || mark == ')') =>
        {
            &trimmed[letter.len_utf8() + 2..]
        }
        _ => trimmed,
    }
}

/// Options with their markers removed, as shown to the learner
pub fn display_options(question: &PracticeQuestion) -> Vec<String> {
    question
        .options
        .iter()
        .map(|o| strip_option_prefix(o).to_string())
        .collect()
}

/// Case-insensitive match in either direction, after removing the option
/// marker from the expected answer.
pub fn is_correct(user_answer: &str, correct_answer: &str) -> bool {
    if user_answer.trim().is_empty() || correct_answer.trim().is_empty() {
        return false;
    }

    let expected = strip_option_prefix(correct_answer).to_lowercase();
    let given = user_answer.trim().to_lowercase();
    if expected.is_empty() {
        return false;
    }
    expected.contains(&given) || given.contains(&expected)
}

/// Feedback for a score percentage
pub fn feedback_for(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        "Great job! You have a strong understanding of this topic!"
    } else if percentage >= 60.0 {
        "Good effort! You understand most of this topic."
    } else {
        "Keep studying! This topic might need more review."
    }
}

impl Quiz {
    /// Grade responses given in question order; missing responses count as
    /// unanswered.
    pub fn grade(&self, responses: &[String]) -> QuizResult {
        let answers: Vec<GradedAnswer> = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let user_answer = responses.get(i).cloned().unwrap_or_default();
                GradedAnswer {
                    is_correct: is_correct(&user_answer, &q.answer),
                    question: q.text.clone(),
                    user_answer,
                    correct_answer: q.answer.clone(),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        let total = answers.len();
        let correct = answers.iter().filter(|a| a.is_correct).count();
        let percentage = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };

        QuizResult {
            correct,
            total,
            percentage,
            feedback: feedback_for(percentage).to_string(),
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> PracticeQuestion {
        PracticeQuestion {
            text: "q".into(),
            options: vec!["A. Paris".into(), "B) London".into(), "Rome".into()],
            answer: answer.into(),
            explanation: String::new(),
        }
    }

    #[test]
    fn test_strip_option_prefix() {
        assert_eq!(strip_option_prefix("A. Paris"), "Paris");
        assert_eq!(strip_option_prefix("  b) London "), "London");
        assert_eq!(strip_option_prefix("Rome"), "Rome");
        assert_eq!(strip_option_prefix("A.Paris"), "A.Paris");
        assert_eq!(strip_option_prefix("Ä. Umlaut"), "Umlaut");
        assert_eq!(strip_option_prefix(""), "");
    }

    #[test]
    fn test_display_options() {
        assert_eq!(display_options(&question("A")), vec!["Paris", "London", "Rome"]);
    }

    #[test]
    fn test_is_correct_matches_both_directions() {
        assert!(is_correct("Paris", "A. Paris"));
        assert!(is_correct("paris, france", "Paris"));
        assert!(is_correct("Paris", "Paris, the capital"));
        assert!(!is_correct("London", "A. Paris"));
        assert!(!is_correct("", "Paris"));
        assert!(!is_correct("Paris", ""));
    }

    #[test]
    fn test_grade_and_feedback() {
        let quiz = Quiz {
            topic: "Geography".into(),
            difficulty: "Beginner".into(),
            questions: vec![
                question("A. Paris"),
                question("B) London"),
                question("Rome"),
                question("A. Paris"),
                question("Rome"),
            ],
        };

        let responses: Vec<String> = ["Paris", "London", "Rome", "Berlin"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = quiz.grade(&responses);

        assert_eq!(result.total, 5);
        assert_eq!(result.correct, 3);
        assert!((result.percentage - 60.0).abs() < 1e-9);
        assert_eq!(result.feedback, "Good effort! You understand most of this topic.");
        assert!(!result.answers[4].is_correct);
    }

    #[test]
    fn test_feedback_tiers() {
        assert!(feedback_for(80.0).starts_with("Great job!"));
        assert!(feedback_for(59.9).starts_with("Keep studying!"));

        let empty = Quiz {
            topic: "t".into(),
            difficulty: "d".into(),
            questions: vec![],
        };
        assert_eq!(empty.grade(&[]).percentage, 0.0);
    }
}
