use serde::Serialize;

use crate::core::metrics;
use crate::core::redis::RedisHandle;
use crate::db::types::ApplicationStatus;

/// Notifications consumed by an external notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub(crate) enum DomainEvent {
    #[serde(rename = "application.submitted")]
    ApplicationSubmitted { application_id: String, opportunity_id: String, candidate_id: String },
    #[serde(rename = "application.status_changed")]
    ApplicationStatusChanged {
        application_id: String,
        opportunity_id: String,
        candidate_id: String,
        from: ApplicationStatus,
        to: ApplicationStatus,
        actor_id: String,
    },
    #[serde(rename = "quiz.attempt_started")]
    QuizAttemptStarted { attempt_id: String, quiz_id: String, candidate_id: String },
    #[serde(rename = "quiz.attempt_submitted")]
    QuizAttemptSubmitted {
        attempt_id: String,
        quiz_id: String,
        candidate_id: String,
        score: i32,
        passed: bool,
    },
}

impl DomainEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::ApplicationSubmitted { .. } => "application.submitted",
            Self::ApplicationStatusChanged { .. } => "application.status_changed",
            Self::QuizAttemptStarted { .. } => "quiz.attempt_started",
            Self::QuizAttemptSubmitted { .. } => "quiz.attempt_submitted",
        }
    }
}

#[derive(Clone)]
pub(crate) struct EventPublisher {
    redis: RedisHandle,
    channel_prefix: String,
}

impl EventPublisher {
    pub(crate) fn new(redis: RedisHandle, channel_prefix: String) -> Self {
        Self { redis, channel_prefix }
    }

    pub(crate) fn channel_for(&self, event: &DomainEvent) -> String {
        format!("{}.{}", self.channel_prefix, event.name())
    }

    /// Best-effort: failures are logged, never returned.
    pub(crate) async fn publish(&self, event: DomainEvent) {
        let name = event.name();
        metrics::record_domain_event(name);

        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(event = name, error = %err, "Failed to serialize domain event");
                return;
            }
        };
        tracing::info!(event = name, payload = %payload, "Domain event");

        let channel = self.channel_for(&event);
        match self.redis.publish(&channel, &payload).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(event = name, "Redis disconnected, event not published");
            }
            Err(err) => {
                tracing::warn!(event = name, channel = %channel, error = %err, "Failed to publish domain event");
            }
        }
    }
}
