//! crates/docstudy_core/src/grading.rs
//!
//! Deterministic, side-effect-free scoring of a submitted answer set against
//! a quiz's answer key. Grading is a pure function of its inputs so results
//! are fully reproducible.

use std::collections::HashMap;

use crate::domain::{GradedAnswer, GradingResult, Question, SubmittedAnswer};

/// Percentage at or above which an attempt counts as passed.
pub const PASS_THRESHOLD: f64 = 60.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GradingError {
    /// A quiz with no questions cannot be graded; question_count is
    /// validated to be at least 5 upstream, so hitting this means the stored
    /// quiz is internally inconsistent.
    #[error("Cannot grade a quiz with no questions")]
    NoQuestions,
}

/// Grades `user_answers` against `questions`.
///
/// Every question is classified exactly once, in original order: unanswered
/// when no submission references its id, otherwise correct or incorrect by
/// value equality with the answer key. Duplicate submissions for one
/// question id are not rejected; the last one wins. Submissions referencing
/// unknown question ids are ignored entirely.
pub fn grade(
    questions: &[Question],
    user_answers: &[SubmittedAnswer],
) -> Result<GradingResult, GradingError> {
    if questions.is_empty() {
        return Err(GradingError::NoQuestions);
    }

    let mut answer_map: HashMap<u32, u32> = HashMap::with_capacity(user_answers.len());
    for answer in user_answers {
        answer_map.insert(answer.question_id, answer.answer_index);
    }

    let mut correct_answers = 0u32;
    let mut incorrect_answers = 0u32;
    let mut unanswered = 0u32;
    let mut detailed_answers = Vec::with_capacity(questions.len());

    for question in questions {
        let user_answer = answer_map.get(&question.id).copied();

        let is_correct = match user_answer {
            None => {
                unanswered += 1;
                false
            }
            Some(index) => {
                let correct = index == question.correct_answer;
                if correct {
                    correct_answers += 1;
                } else {
                    incorrect_answers += 1;
                }
                correct
            }
        };

        detailed_answers.push(GradedAnswer {
            question_id: question.id,
            question: question.question.clone(),
            options: question.options.clone(),
            user_answer,
            correct_answer: question.correct_answer,
            is_correct,
            explanation: question.explanation.clone().unwrap_or_default(),
        });
    }

    let total_questions = questions.len() as u32;
    let score = f64::from(correct_answers) / f64::from(total_questions) * 100.0;
    // Round half-up to two decimal places.
    let percentage = (score * 100.0).round() / 100.0;
    let passed = percentage >= PASS_THRESHOLD;

    Ok(GradingResult {
        score,
        total_questions,
        correct_answers,
        incorrect_answers,
        unanswered,
        percentage,
        passed,
        detailed_answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiple_choice_quiz(correct_indices: &[u32]) -> Vec<Question> {
        correct_indices
            .iter()
            .enumerate()
            .map(|(i, &correct_answer)| Question {
                id: i as u32 + 1,
                question: format!("Question {}", i + 1),
                kind: None,
                options: vec![
                    "Option A".to_string(),
                    "Option B".to_string(),
                    "Option C".to_string(),
                    "Option D".to_string(),
                ],
                correct_answer,
                explanation: Some(format!("Explanation {}", i + 1)),
            })
            .collect()
    }

    fn answers(pairs: &[(u32, u32)]) -> Vec<SubmittedAnswer> {
        pairs
            .iter()
            .map(|&(question_id, answer_index)| SubmittedAnswer {
                question_id,
                answer_index,
            })
            .collect()
    }

    #[test]
    fn three_of_five_correct_passes_at_sixty_percent() {
        // First three answered correctly, last two incorrectly.
        let questions = multiple_choice_quiz(&[0, 1, 2, 3, 0]);
        let submitted = answers(&[(1, 0), (2, 1), (3, 2), (4, 1), (5, 1)]);

        let result = grade(&questions, &submitted).unwrap();

        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.incorrect_answers, 2);
        assert_eq!(result.unanswered, 0);
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.percentage, 60.00);
        assert!(result.passed);
    }

    #[test]
    fn omitted_questions_count_as_unanswered_and_fail_below_threshold() {
        let questions = multiple_choice_quiz(&[0, 1, 2, 3, 0]);
        let submitted = answers(&[(1, 0), (2, 1)]);

        let result = grade(&questions, &submitted).unwrap();

        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.incorrect_answers, 0);
        assert_eq!(result.unanswered, 3);
        assert_eq!(result.percentage, 40.00);
        assert!(!result.passed);

        for graded in &result.detailed_answers[2..] {
            assert_eq!(graded.user_answer, None);
            assert!(!graded.is_correct);
        }
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = multiple_choice_quiz(&[1, 2, 0, 3, 1, 2, 0]);
        let submitted = answers(&[(1, 1), (3, 0), (5, 2), (7, 0)]);

        let first = grade(&questions, &submitted).unwrap();
        let second = grade(&questions, &submitted).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn counts_always_sum_to_total() {
        let questions = multiple_choice_quiz(&[0, 1, 2, 3, 0, 1, 2]);
        let submitted = answers(&[(1, 0), (2, 0), (4, 3), (9, 1)]);

        let result = grade(&questions, &submitted).unwrap();

        assert_eq!(
            result.correct_answers + result.incorrect_answers + result.unanswered,
            result.total_questions
        );
        assert_eq!(result.total_questions, questions.len() as u32);
    }

    #[test]
    fn extraneous_question_ids_are_ignored() {
        let questions = multiple_choice_quiz(&[0, 1, 2, 3, 0]);
        // Ids 99 and 100 do not exist in the quiz.
        let submitted = answers(&[(1, 0), (2, 1), (3, 2), (4, 3), (5, 0), (99, 0), (100, 2)]);

        let result = grade(&questions, &submitted).unwrap();

        assert_eq!(result.total_questions, 5);
        assert_eq!(result.correct_answers, 5);
        assert_eq!(result.percentage, 100.00);
        assert_eq!(result.detailed_answers.len(), 5);
    }

    #[test]
    fn duplicate_submissions_last_one_wins() {
        let questions = multiple_choice_quiz(&[2]);
        let submitted = answers(&[(1, 0), (1, 2)]);

        let result = grade(&questions, &submitted).unwrap();

        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.detailed_answers[0].user_answer, Some(2));
    }

    #[test]
    fn zero_question_quiz_fails_fast() {
        let result = grade(&[], &answers(&[(1, 0)]));
        assert_eq!(result.unwrap_err(), GradingError::NoQuestions);
    }

    #[test]
    fn percentage_rounds_half_up_to_two_decimals() {
        // 5 of 7 correct = 71.42857...% -> 71.43
        let questions = multiple_choice_quiz(&[0, 0, 0, 0, 0, 0, 0]);
        let submitted = answers(&[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 1), (7, 1)]);

        let result = grade(&questions, &submitted).unwrap();

        assert_eq!(result.percentage, 71.43);
        assert!(result.passed);
    }

    #[test]
    fn percentage_stays_within_bounds() {
        let questions = multiple_choice_quiz(&[0, 1, 2, 3, 0]);

        let none = grade(&questions, &[]).unwrap();
        assert_eq!(none.percentage, 0.00);
        assert!(!none.passed);

        let all = grade(
            &questions,
            &answers(&[(1, 0), (2, 1), (3, 2), (4, 3), (5, 0)]),
        )
        .unwrap();
        assert_eq!(all.percentage, 100.00);
        assert!(all.passed);
    }

    #[test]
    fn graded_answers_preserve_question_order_and_snapshot() {
        let questions = multiple_choice_quiz(&[3, 2, 1]);
        let submitted = answers(&[(3, 1), (1, 3)]);

        let result = grade(&questions, &submitted).unwrap();

        let ids: Vec<u32> = result.detailed_answers.iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(result.detailed_answers[0].question, "Question 1");
        assert_eq!(result.detailed_answers[0].correct_answer, 3);
        assert_eq!(result.detailed_answers[0].explanation, "Explanation 1");
        assert_eq!(result.detailed_answers[0].options.len(), 4);
    }
}
