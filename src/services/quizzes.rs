use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::core::metrics;
use crate::db::is_unique_violation;
use crate::db::models::{
    Opportunity, QuestionOption, Quiz, QuizAnswer, QuizAttempt, QuizQuestion,
};
use crate::db::types::{ApplicationStatus, UserRole};
use crate::repositories;
use crate::schemas::quiz::{QuizCreate, QuizUpdate};
use crate::services::attempt_timing;
use crate::services::errors::ServiceError;
use crate::services::events::{DomainEvent, EventPublisher};
use crate::services::opportunities;
use crate::services::paging::{Page, PageRequest};
use crate::services::policy::{self, Actor, Operation};
use crate::services::quiz_grading;
use crate::services::quiz_validation;

const UNIQUE_ATTEMPT: &str = "uq_quiz_attempts_quiz_candidate";
const UNIQUE_QUESTION_ORDER: &str = "uq_quiz_questions_order";

#[derive(Debug)]
pub(crate) struct QuizView {
    pub(crate) quiz: Quiz,
    pub(crate) questions: Vec<QuizQuestion>,
    pub(crate) reveal_answers: bool,
}

#[derive(Debug)]
pub(crate) struct AttemptResult {
    pub(crate) attempt: QuizAttempt,
    pub(crate) questions: Vec<QuizQuestion>,
    pub(crate) answers: Vec<QuizAnswer>,
}

async fn load_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Quiz, ServiceError> {
    repositories::quizzes::find_by_id(executor, quiz_id).await?.ok_or(ServiceError::NotFound("Quiz"))
}

async fn load_quiz_with_opportunity(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<(Quiz, Opportunity), ServiceError> {
    let quiz = load_quiz(pool, quiz_id).await?;
    let opportunity = opportunities::load(pool, &quiz.opportunity_id).await?;
    Ok((quiz, opportunity))
}

/// A candidate may take an opportunity's quiz while their application is still live.
async fn holds_live_application(
    pool: &PgPool,
    opportunity_id: &str,
    candidate_id: &str,
) -> Result<bool, ServiceError> {
    let application = repositories::applications::find_by_opportunity_and_candidate(
        pool,
        opportunity_id,
        candidate_id,
    )
    .await?;
    Ok(application.is_some_and(|application| {
        !matches!(application.status, ApplicationStatus::Withdrawn | ApplicationStatus::Rejected)
    }))
}

pub(crate) async fn create_quiz(
    pool: &PgPool,
    actor: &Actor,
    opportunity_id: &str,
    input: QuizCreate,
    now: PrimitiveDateTime,
) -> Result<QuizView, ServiceError> {
    input.validate().map_err(|e| ServiceError::validation(e.to_string()))?;
    quiz_validation::validate_questions(&input.questions)?;

    let opportunity = opportunities::load(pool, opportunity_id).await?;
    policy::require_owner(actor, Operation::ManageQuiz, &opportunity.recruiter_id)?;

    let quiz_id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    let quiz = repositories::quizzes::create(
        &mut *tx,
        repositories::quizzes::CreateQuiz {
            id: &quiz_id,
            opportunity_id,
            title: input.title.trim(),
            description: input.description.as_deref().map(str::trim),
            duration_minutes: input.duration_minutes,
            passing_score: input.passing_score,
            now,
        },
    )
    .await?;

    let mut questions = Vec::with_capacity(input.questions.len());
    for question in input.questions {
        let question_id = Uuid::new_v4().to_string();
        let options: Vec<QuestionOption> = question
            .options
            .into_iter()
            .map(|mut option| {
                option.value = option.value.trim().to_string();
                QuestionOption::from(option)
            })
            .collect();
        let created = repositories::quiz_questions::create(
            &mut *tx,
            repositories::quiz_questions::CreateQuestion {
                id: &question_id,
                quiz_id: &quiz_id,
                text: question.text.trim(),
                options,
                correct_answer: question.correct_answer.trim(),
                points: question.points,
                order_index: question.order_index,
            },
        )
        .await
        .map_err(|err| {
            if is_unique_violation(&err, UNIQUE_QUESTION_ORDER) {
                ServiceError::validation("duplicate order_index")
            } else {
                ServiceError::Database(err)
            }
        })?;
        questions.push(created);
    }

    tx.commit().await?;
    questions.sort_by_key(|question| question.order_index);

    tracing::info!(
        quiz_id = %quiz.id,
        opportunity_id = %quiz.opportunity_id,
        questions = questions.len(),
        "Quiz created"
    );
    Ok(QuizView { quiz, questions, reveal_answers: true })
}

/// Metadata only. Stored grades of submitted attempts are never recomputed.
/// The duration is frozen while any attempt is in progress.
pub(crate) async fn update_quiz(
    pool: &PgPool,
    actor: &Actor,
    quiz_id: &str,
    patch: QuizUpdate,
    now: PrimitiveDateTime,
) -> Result<QuizView, ServiceError> {
    patch.validate().map_err(|e| ServiceError::validation(e.to_string()))?;
    let (_, opportunity) = load_quiz_with_opportunity(pool, quiz_id).await?;
    policy::require_owner(actor, Operation::ManageQuiz, &opportunity.recruiter_id)?;

    let mut tx = pool.begin().await?;
    // Row lock also blocks attempt inserts through their foreign key.
    let current = repositories::quizzes::find_by_id_for_update(&mut *tx, quiz_id)
        .await?
        .ok_or(ServiceError::NotFound("Quiz"))?;
    if let Some(duration) = patch.duration_minutes {
        if duration != current.duration_minutes
            && repositories::quiz_attempts::count_in_progress(&mut *tx, quiz_id).await? > 0
        {
            return Err(ServiceError::validation(
                "duration_minutes cannot change while attempts are in progress",
            ));
        }
    }

    let quiz = repositories::quizzes::update(
        &mut *tx,
        quiz_id,
        repositories::quizzes::UpdateQuiz {
            title: patch.title.map(|title| title.trim().to_string()),
            description: patch.description.map(|description| description.trim().to_string()),
            duration_minutes: patch.duration_minutes,
            passing_score: patch.passing_score,
            is_active: patch.is_active,
        },
        now,
    )
    .await?
    .ok_or(ServiceError::NotFound("Quiz"))?;
    tx.commit().await?;
    let questions = repositories::quiz_questions::list_by_quiz(pool, quiz_id).await?;

    tracing::info!(quiz_id = %quiz.id, actor_id = %actor.id, "Quiz updated");
    Ok(QuizView { quiz, questions, reveal_answers: true })
}

pub(crate) async fn get_quiz(
    pool: &PgPool,
    actor: &Actor,
    quiz_id: &str,
) -> Result<QuizView, ServiceError> {
    let (quiz, opportunity) = load_quiz_with_opportunity(pool, quiz_id).await?;

    let reveal_answers = match actor.role {
        UserRole::Candidate => {
            if !holds_live_application(pool, &opportunity.id, &actor.id).await? {
                return Err(ServiceError::Forbidden);
            }
            false
        }
        UserRole::Recruiter | UserRole::Admin => {
            policy::require_owner(actor, Operation::ManageQuiz, &opportunity.recruiter_id)?;
            true
        }
    };

    let questions = repositories::quiz_questions::list_by_quiz(pool, quiz_id).await?;
    Ok(QuizView { quiz, questions, reveal_answers })
}

pub(crate) async fn start_attempt(
    pool: &PgPool,
    events: &EventPublisher,
    actor: &Actor,
    quiz_id: &str,
    now: PrimitiveDateTime,
) -> Result<QuizAttempt, ServiceError> {
    policy::require(actor, Operation::TakeQuiz)?;
    let quiz = load_quiz(pool, quiz_id).await?;
    if !quiz.is_active {
        return Err(ServiceError::QuizInactive);
    }
    if !holds_live_application(pool, &quiz.opportunity_id, &actor.id).await? {
        return Err(ServiceError::Forbidden);
    }

    let attempt_id = Uuid::new_v4().to_string();
    let inserted =
        repositories::quiz_attempts::insert_if_absent(pool, &attempt_id, quiz_id, &actor.id, now)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, UNIQUE_ATTEMPT) {
                    ServiceError::DuplicateAttempt
                } else {
                    ServiceError::Database(err)
                }
            })?;
    if !inserted {
        return Err(ServiceError::DuplicateAttempt);
    }

    let attempt = repositories::quiz_attempts::find_by_id(pool, &attempt_id)
        .await?
        .ok_or(ServiceError::NotFound("Attempt"))?;
    tracing::info!(
        attempt_id = %attempt.id,
        quiz_id = %attempt.quiz_id,
        candidate_id = %attempt.candidate_id,
        "Quiz attempt started"
    );
    events
        .publish(DomainEvent::QuizAttemptStarted {
            attempt_id: attempt.id.clone(),
            quiz_id: attempt.quiz_id.clone(),
            candidate_id: attempt.candidate_id.clone(),
        })
        .await;
    Ok(attempt)
}

pub(crate) async fn record_answer(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: &str,
    question_id: &str,
    selected_answer: &str,
    now: PrimitiveDateTime,
) -> Result<QuizAnswer, ServiceError> {
    let mut tx = pool.begin().await?;

    let attempt = repositories::quiz_attempts::find_by_id_for_update(&mut *tx, attempt_id)
        .await?
        .ok_or(ServiceError::NotFound("Attempt"))?;
    policy::require_owner(actor, Operation::TakeQuiz, &attempt.candidate_id)?;
    if attempt.submitted_at.is_some() {
        return Err(ServiceError::AttemptAlreadySubmitted);
    }

    let quiz = load_quiz(&mut *tx, &attempt.quiz_id).await?;
    if attempt_timing::is_expired(attempt.started_at, quiz.duration_minutes, now) {
        return Err(ServiceError::AttemptExpired);
    }

    let question = repositories::quiz_questions::find_in_quiz(&mut *tx, &quiz.id, question_id)
        .await?
        .ok_or_else(|| ServiceError::validation("question does not belong to this quiz"))?;
    quiz_validation::validate_answer(&question, selected_answer)?;

    let answer_id = Uuid::new_v4().to_string();
    let answer = repositories::quiz_answers::upsert(
        &mut *tx,
        repositories::quiz_answers::UpsertAnswer {
            id: &answer_id,
            attempt_id,
            question_id,
            selected_answer,
            now,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::debug!(attempt_id, question_id, "Quiz answer recorded");
    Ok(answer)
}

pub(crate) async fn record_tab_switch(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: &str,
) -> Result<i32, ServiceError> {
    let attempt = repositories::quiz_attempts::find_by_id(pool, attempt_id)
        .await?
        .ok_or(ServiceError::NotFound("Attempt"))?;
    policy::require_owner(actor, Operation::TakeQuiz, &attempt.candidate_id)?;

    let count = repositories::quiz_attempts::increment_tab_switch(pool, attempt_id)
        .await?
        .ok_or(ServiceError::AttemptAlreadySubmitted)?;
    tracing::info!(attempt_id, tab_switch_count = count, "Tab switch recorded");
    Ok(count)
}

/// Grades and closes the attempt in one transaction. A second submission fails
/// and leaves the stored grade untouched.
pub(crate) async fn submit_attempt(
    pool: &PgPool,
    events: &EventPublisher,
    actor: &Actor,
    attempt_id: &str,
    grace_seconds: u64,
    now: PrimitiveDateTime,
) -> Result<QuizAttempt, ServiceError> {
    let mut tx = pool.begin().await?;

    let attempt = repositories::quiz_attempts::find_by_id_for_update(&mut *tx, attempt_id)
        .await?
        .ok_or(ServiceError::NotFound("Attempt"))?;
    policy::require_owner(actor, Operation::TakeQuiz, &attempt.candidate_id)?;
    if attempt.submitted_at.is_some() {
        return Err(ServiceError::AttemptAlreadySubmitted);
    }

    let quiz = load_quiz(&mut *tx, &attempt.quiz_id).await?;
    if !attempt_timing::can_submit(attempt.started_at, quiz.duration_minutes, grace_seconds, now) {
        tracing::info!(attempt_id, started_at = %attempt.started_at, "Late quiz submission rejected");
        return Err(ServiceError::AttemptExpired);
    }

    let questions = repositories::quiz_questions::list_by_quiz(&mut *tx, &quiz.id).await?;
    let answers = repositories::quiz_answers::list_by_attempt(&mut *tx, attempt_id).await?;
    let grade = quiz_grading::grade(&questions, &answers, quiz.passing_score);

    let (answer_ids, correctness) = grade.answer_correctness();
    if !answer_ids.is_empty() {
        repositories::quiz_answers::set_correctness(&mut *tx, answer_ids, correctness).await?;
    }
    let graded =
        repositories::quiz_attempts::finalize(&mut *tx, attempt_id, grade.score, grade.passed, now)
            .await?
            .ok_or(ServiceError::AttemptAlreadySubmitted)?;
    tx.commit().await?;

    metrics::record_attempt_graded(grade.passed);
    tracing::info!(
        attempt_id = %graded.id,
        quiz_id = %graded.quiz_id,
        score = grade.score,
        passed = grade.passed,
        earned_points = grade.earned_points,
        total_points = grade.total_points,
        "Quiz attempt graded"
    );
    events
        .publish(DomainEvent::QuizAttemptSubmitted {
            attempt_id: graded.id.clone(),
            quiz_id: graded.quiz_id.clone(),
            candidate_id: graded.candidate_id.clone(),
            score: grade.score,
            passed: grade.passed,
        })
        .await;
    Ok(graded)
}

pub(crate) async fn get_attempt_result(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: &str,
) -> Result<AttemptResult, ServiceError> {
    let attempt = repositories::quiz_attempts::find_by_id(pool, attempt_id)
        .await?
        .ok_or(ServiceError::NotFound("Attempt"))?;

    if actor.role == UserRole::Candidate {
        if actor.id != attempt.candidate_id {
            return Err(ServiceError::Forbidden);
        }
    } else {
        let (_, opportunity) = load_quiz_with_opportunity(pool, &attempt.quiz_id).await?;
        policy::require_owner(actor, Operation::ViewQuizAttempts, &opportunity.recruiter_id)?;
    }

    let questions = repositories::quiz_questions::list_by_quiz(pool, &attempt.quiz_id).await?;
    let answers = repositories::quiz_answers::list_by_attempt(pool, attempt_id).await?;
    Ok(AttemptResult { attempt, questions, answers })
}

pub(crate) async fn list_quiz_attempts(
    pool: &PgPool,
    actor: &Actor,
    quiz_id: &str,
    page: PageRequest,
) -> Result<Page<QuizAttempt>, ServiceError> {
    let (_, opportunity) = load_quiz_with_opportunity(pool, quiz_id).await?;
    policy::require_owner(actor, Operation::ViewQuizAttempts, &opportunity.recruiter_id)?;

    let items =
        repositories::quiz_attempts::list_by_quiz(pool, quiz_id, page.skip, page.limit).await?;
    let total_count = repositories::quiz_attempts::count_by_quiz(pool, quiz_id).await?;
    Ok(Page { items, total_count, request: page })
}
