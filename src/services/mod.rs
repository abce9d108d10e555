pub(crate) mod application_lifecycle;
pub(crate) mod applications;
pub(crate) mod attempt_timing;
pub(crate) mod errors;
pub(crate) mod events;
pub(crate) mod opportunities;
pub(crate) mod opportunity_lifecycle;
pub(crate) mod paging;
pub(crate) mod policy;
pub(crate) mod quiz_grading;
pub(crate) mod quiz_validation;
pub(crate) mod quizzes;
