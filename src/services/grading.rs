use crate::db::models::{Answer, Question};

/// Grading outcome for a single submitted response. `is_correct` stays
/// `None` for question types that require instructor review.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradedResponse {
    pub(crate) is_correct: Option<bool>,
    pub(crate) points_earned: f64,
}

impl GradedResponse {
    fn ungraded() -> Self {
        Self { is_correct: None, points_earned: 0.0 }
    }
}

/// Mechanically grades one response against its question definition.
///
/// Only `multiple_choice` and `true_false` are auto-gradable: the response
/// is correct iff the selected answer carries the correctness flag, earning
/// the full point value or zero. Free-text types and choice responses
/// without a selection are left ungraded.
pub(crate) fn grade_response(
    question: &Question,
    answers: &[Answer],
    selected_answer_id: Option<&str>,
) -> GradedResponse {
    if !question.question_type.is_auto_gradable() {
        return GradedResponse::ungraded();
    }

    let Some(selected_answer_id) = selected_answer_id else {
        return GradedResponse::ungraded();
    };

    let correct = answers
        .iter()
        .find(|answer| answer.id == selected_answer_id)
        .is_some_and(|answer| answer.is_correct);

    GradedResponse {
        is_correct: Some(correct),
        points_earned: if correct { question.points } else { 0.0 },
    }
}

/// Final score on the 0-100 scale. A submission whose gradable questions
/// contribute zero total points scores 0 rather than dividing by zero.
pub(crate) fn final_score(earned_points: f64, total_points: f64) -> f64 {
    if total_points > 0.0 {
        round2(earned_points / total_points * 100.0)
    } else {
        0.0
    }
}

/// Two-decimal precision, the storage precision for scores and progress
/// percentages.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db::types::QuestionType;

    fn question(question_type: QuestionType, points: f64) -> Question {
        let now = primitive_now_utc();
        Question {
            id: "q1".to_string(),
            quiz_id: "quiz1".to_string(),
            question_text: "?".to_string(),
            question_type,
            explanation: None,
            points,
            order_index: 0,
            is_required: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn answer(id: &str, is_correct: bool) -> Answer {
        Answer {
            id: id.to_string(),
            question_id: "q1".to_string(),
            answer_text: "a".to_string(),
            is_correct,
            order_index: 0,
            feedback: None,
        }
    }

    #[test]
    fn correct_choice_earns_full_points() {
        let question = question(QuestionType::MultipleChoice, 5.0);
        let answers = vec![answer("a1", false), answer("a2", true)];

        let graded = grade_response(&question, &answers, Some("a2"));
        assert_eq!(graded.is_correct, Some(true));
        assert_eq!(graded.points_earned, 5.0);
    }

    #[test]
    fn wrong_choice_earns_zero() {
        let question = question(QuestionType::TrueFalse, 2.0);
        let answers = vec![answer("a1", false), answer("a2", true)];

        let graded = grade_response(&question, &answers, Some("a1"));
        assert_eq!(graded.is_correct, Some(false));
        assert_eq!(graded.points_earned, 0.0);
    }

    #[test]
    fn missing_selection_stays_ungraded() {
        let question = question(QuestionType::MultipleChoice, 5.0);
        let answers = vec![answer("a1", true)];

        let graded = grade_response(&question, &answers, None);
        assert_eq!(graded.is_correct, None);
        assert_eq!(graded.points_earned, 0.0);
    }

    #[test]
    fn essay_is_never_auto_graded() {
        let question = question(QuestionType::Essay, 10.0);

        let graded = grade_response(&question, &[], Some("a1"));
        assert_eq!(graded.is_correct, None);
        assert_eq!(graded.points_earned, 0.0);
    }

    #[test]
    fn final_score_half_correct() {
        assert_eq!(final_score(5.0, 10.0), 50.0);
    }

    #[test]
    fn final_score_rounds_to_two_decimals() {
        assert_eq!(final_score(1.0, 3.0), 33.33);
        assert_eq!(final_score(2.0, 3.0), 66.67);
    }

    #[test]
    fn final_score_zero_total_is_zero() {
        assert_eq!(final_score(0.0, 0.0), 0.0);
    }
}
