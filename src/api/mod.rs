pub(crate) mod applications;
pub(crate) mod attempts;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod opportunities;
pub(crate) mod pagination;
pub(crate) mod quizzes;
pub(crate) mod router;
