use std::collections::HashMap;

use crate::db::models::{QuizAnswer, QuizQuestion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GradedQuestion {
    /// `None` when the question was never answered.
    pub(crate) answer_id: Option<String>,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Grade {
    pub(crate) earned_points: i64,
    pub(crate) total_points: i64,
    pub(crate) score: i32,
    pub(crate) passed: bool,
    pub(crate) questions: Vec<GradedQuestion>,
}

impl Grade {
    /// Correctness for the answers that exist, as parallel id/flag columns.
    pub(crate) fn answer_correctness(&self) -> (Vec<String>, Vec<bool>) {
        self.questions
            .iter()
            .filter_map(|graded| graded.answer_id.clone().map(|id| (id, graded.is_correct)))
            .unzip()
    }
}

/// Integer percentage rounded half away from zero. Zero total scores zero.
pub(crate) fn percentage(earned: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let earned = earned.clamp(0, total);
    ((200 * earned + total) / (2 * total)) as i32
}

/// Every question counts; unanswered or skipped questions earn nothing.
pub(crate) fn grade(questions: &[QuizQuestion], answers: &[QuizAnswer], passing_score: i32) -> Grade {
    let by_question: HashMap<&str, &QuizAnswer> =
        answers.iter().map(|answer| (answer.question_id.as_str(), answer)).collect();

    let mut earned_points = 0_i64;
    let mut total_points = 0_i64;
    let mut graded = Vec::with_capacity(questions.len());

    for question in questions {
        total_points += i64::from(question.points);
        let answer = by_question.get(question.id.as_str());
        let is_correct =
            answer.is_some_and(|answer| answer.selected_answer == question.correct_answer);
        if is_correct {
            earned_points += i64::from(question.points);
        }
        graded.push(GradedQuestion {
            answer_id: answer.map(|answer| answer.id.clone()),
            is_correct,
        });
    }

    let score = percentage(earned_points, total_points);
    Grade {
        earned_points,
        total_points,
        score,
        passed: score >= passing_score,
        questions: graded,
    }
}

#[cfg(test)]
mod tests {
    use sqlx::types::Json;
    use time::macros::datetime;

    use super::*;
    use crate::db::models::QuestionOption;

    fn question(id: &str, correct: &str, points: i32) -> QuizQuestion {
        QuizQuestion {
            id: id.to_string(),
            quiz_id: "quiz-1".to_string(),
            text: format!("Question {id}"),
            options: Json(vec![
                QuestionOption { label: "A".to_string(), value: "a".to_string() },
                QuestionOption { label: "B".to_string(), value: "b".to_string() },
            ]),
            correct_answer: correct.to_string(),
            points,
            order_index: 0,
        }
    }

    fn answer(question_id: &str, selected: &str) -> QuizAnswer {
        QuizAnswer {
            id: format!("ans-{question_id}"),
            attempt_id: "att-1".to_string(),
            question_id: question_id.to_string(),
            selected_answer: selected.to_string(),
            is_correct: None,
            answered_at: datetime!(2026-02-01 10:00),
        }
    }

    #[test]
    fn half_correct_fails_seventy_percent_bar() {
        let questions = [question("q1", "a", 1), question("q2", "a", 1)];
        let answers = [answer("q1", "a"), answer("q2", "b")];

        let grade = grade(&questions, &answers, 70);

        assert_eq!(grade.score, 50);
        assert!(!grade.passed);
    }

    #[test]
    fn all_correct_passes() {
        let questions = [question("q1", "a", 1), question("q2", "a", 1)];
        let answers = [answer("q1", "a"), answer("q2", "a")];

        let grade = grade(&questions, &answers, 70);

        assert_eq!(grade.score, 100);
        assert!(grade.passed);
    }

    #[test]
    fn missing_and_skipped_answers_count_as_wrong() {
        let questions = [question("q1", "a", 2), question("q2", "a", 1), question("q3", "b", 1)];
        let answers = [answer("q1", "a"), answer("q3", "")];

        let grade = grade(&questions, &answers, 50);

        assert_eq!((grade.earned_points, grade.total_points), (2, 4));
        assert_eq!(grade.score, 50);
        assert!(grade.passed);
        let (ids, flags) = grade.answer_correctness();
        assert_eq!(ids, vec!["ans-q1".to_string(), "ans-q3".to_string()]);
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn zero_passing_score_always_passes() {
        let grade = grade(&[question("q1", "a", 1)], &[], 0);
        assert_eq!(grade.score, 0);
        assert!(grade.passed);
    }
}
