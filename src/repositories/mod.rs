pub(crate) mod applications;
pub(crate) mod opportunities;
pub(crate) mod quiz_answers;
pub(crate) mod quiz_attempts;
pub(crate) mod quiz_questions;
pub(crate) mod quizzes;
pub(crate) mod users;
