use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{ApplicationStatus, OpportunityStatus, UserRole};
use crate::repositories;
use crate::test_support;

fn letter(chars: usize) -> String {
    "x".repeat(chars)
}

#[tokio::test]
async fn candidate_applies_once() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
    let token = test_support::bearer_token(&candidate, ctx.state.settings());
    let uri = format!("/api/v1/opportunities/{}/applications", opportunity.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "cover_letter": letter(49) })),
        ))
        .await
        .expect("short letter");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({
                "cover_letter": letter(50),
                "resume_url": "https://cv.example.com/me.pdf"
            })),
        ))
        .await
        .expect("apply");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["candidate_id"], candidate.id);
    assert_eq!(body["applied_at"], body["updated_at"]);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::POST, &uri, Some(&token), Some(json!({}))))
        .await
        .expect("apply again");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
    assert_eq!(body["code"], "duplicate_application");
}

#[tokio::test]
async fn concurrent_duplicate_submissions_create_one_row() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
    let token = test_support::bearer_token(&candidate, ctx.state.settings());
    let uri = format!("/api/v1/opportunities/{}/applications", opportunity.id);

    let first = ctx.app.clone().oneshot(test_support::json_request(
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({})),
    ));
    let second = ctx.app.clone().oneshot(test_support::json_request(
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({})),
    ));
    let (first, second) = tokio::join!(first, second);

    let mut statuses =
        vec![first.expect("first").status().as_u16(), second.expect("second").status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![201, 409]);

    let total = repositories::applications::count(
        db,
        repositories::applications::Owner::Opportunity(&opportunity.id),
        None,
    )
    .await
    .expect("count");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn closed_or_full_opportunity_rejects_applications() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let hired = test_support::insert_actor(db, UserRole::Candidate).await;
    let token = test_support::bearer_token(&candidate, ctx.state.settings());

    let closed = test_support::insert_opportunity(
        db,
        &recruiter.id,
        OpportunityStatus::Closed,
        test_support::days_from_now(5),
        1,
    )
    .await;
    let full = test_support::insert_opportunity(
        db,
        &recruiter.id,
        OpportunityStatus::Published,
        test_support::days_from_now(5),
        1,
    )
    .await;
    test_support::insert_application(db, &full.id, &hired.id, ApplicationStatus::Accepted).await;

    for opportunity_id in [&closed.id, &full.id] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/opportunities/{opportunity_id}/applications"),
                Some(&token),
                Some(json!({})),
            ))
            .await
            .expect("apply");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
        assert_eq!(body["code"], "opportunity_closed");
    }
}

#[tokio::test]
async fn recruiter_moves_application_to_accepted_and_candidate_cannot_withdraw() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
    let application = test_support::insert_application(
        db,
        &opportunity.id,
        &candidate.id,
        ApplicationStatus::Pending,
    )
    .await;
    let recruiter_token = test_support::bearer_token(&recruiter, ctx.state.settings());
    let candidate_token = test_support::bearer_token(&candidate, ctx.state.settings());
    let status_uri = format!("/api/v1/applications/{}/status", application.id);

    for target in ["reviewing", "shortlisted", "accepted"] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &status_uri,
                Some(&recruiter_token),
                Some(json!({ "status": target })),
            ))
            .await
            .expect("transition");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "{target}: {body}");
        assert_eq!(body["status"], target);
    }

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/applications/{}/withdraw", application.id),
            Some(&candidate_token),
            None,
        ))
        .await
        .expect("withdraw accepted");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
    assert_eq!(body["code"], "invalid_transition");

    let stored = repositories::applications::find_by_id(db, &application.id)
        .await
        .expect("find")
        .expect("exists");
    assert_eq!(stored.status, ApplicationStatus::Accepted);
}

#[tokio::test]
async fn candidate_withdraws_pending_application() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
    let application = test_support::insert_application(
        db,
        &opportunity.id,
        &candidate.id,
        ApplicationStatus::Pending,
    )
    .await;
    let token = test_support::bearer_token(&candidate, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/applications/{}/withdraw", application.id),
            Some(&token),
            None,
        ))
        .await
        .expect("withdraw");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["status"], "withdrawn");
}

#[tokio::test]
async fn concurrent_reject_and_withdraw_leave_one_winner() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
    let application = test_support::insert_application(
        db,
        &opportunity.id,
        &candidate.id,
        ApplicationStatus::Pending,
    )
    .await;
    let recruiter_token = test_support::bearer_token(&recruiter, ctx.state.settings());
    let candidate_token = test_support::bearer_token(&candidate, ctx.state.settings());

    let reject = async {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/applications/{}/status", application.id),
                Some(&recruiter_token),
                Some(json!({ "status": "rejected" })),
            ))
            .await
            .expect("reject");
        let status = response.status();
        (status, test_support::read_json(response).await)
    };
    let withdraw = async {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/applications/{}/withdraw", application.id),
                Some(&candidate_token),
                None,
            ))
            .await
            .expect("withdraw");
        let status = response.status();
        (status, test_support::read_json(response).await)
    };
    let ((reject_status, reject_body), (withdraw_status, withdraw_body)) =
        tokio::join!(reject, withdraw);

    assert!(
        (reject_status == StatusCode::OK) != (withdraw_status == StatusCode::OK),
        "exactly one transition must win: {reject_body} / {withdraw_body}"
    );
    let (winner, loser_status, loser_body) = if reject_status == StatusCode::OK {
        (ApplicationStatus::Rejected, withdraw_status, withdraw_body)
    } else {
        (ApplicationStatus::Withdrawn, reject_status, reject_body)
    };
    assert_eq!(loser_status, StatusCode::CONFLICT, "response: {loser_body}");
    assert_eq!(loser_body["code"], "invalid_transition");

    let stored = repositories::applications::find_by_id(db, &application.id)
        .await
        .expect("find")
        .expect("exists");
    assert_eq!(stored.status, winner);
}

#[tokio::test]
async fn other_recruiter_cannot_review() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let owner = test_support::insert_actor(db, UserRole::Recruiter).await;
    let other = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    let opportunity = test_support::insert_published_opportunity(db, &owner.id).await;
    let application = test_support::insert_application(
        db,
        &opportunity.id,
        &candidate.id,
        ApplicationStatus::Pending,
    )
    .await;
    let token = test_support::bearer_token(&other, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/applications/{}/status", application.id),
            Some(&token),
            Some(json!({ "status": "rejected" })),
        ))
        .await
        .expect("transition");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn candidate_listing_filters_by_status_with_matching_total() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let candidate = test_support::insert_actor(db, UserRole::Candidate).await;
    for status in [ApplicationStatus::Pending, ApplicationStatus::Pending, ApplicationStatus::Rejected]
    {
        let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
        test_support::insert_application(db, &opportunity.id, &candidate.id, status).await;
    }
    let token = test_support::bearer_token(&candidate, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/applications/mine?status=pending&limit=1",
            Some(&token),
            None,
        ))
        .await
        .expect("list pending");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["items"].as_array().expect("items").len(), 1);
    assert_eq!(body["limit"], 1);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/applications/mine",
            Some(&token),
            None,
        ))
        .await
        .expect("list all");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 3);
}

#[tokio::test]
async fn opportunity_listing_is_owner_only_and_newest_first() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let recruiter = test_support::insert_actor(db, UserRole::Recruiter).await;
    let opportunity = test_support::insert_published_opportunity(db, &recruiter.id).await;
    let first = test_support::insert_actor(db, UserRole::Candidate).await;
    let second = test_support::insert_actor(db, UserRole::Candidate).await;
    test_support::insert_application(db, &opportunity.id, &first.id, ApplicationStatus::Pending)
        .await;
    let latest = test_support::insert_application(
        db,
        &opportunity.id,
        &second.id,
        ApplicationStatus::Pending,
    )
    .await;
    sqlx::query("UPDATE applications SET applied_at = applied_at + INTERVAL '1 minute' WHERE id = $1")
        .bind(&latest.id)
        .execute(db)
        .await
        .expect("bump applied_at");
    let uri = format!("/api/v1/opportunities/{}/applications", opportunity.id);

    let token = test_support::bearer_token(&recruiter, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&token), None))
        .await
        .expect("list as owner");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["items"][0]["id"], latest.id);

    let token = test_support::bearer_token(&first, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&token), None))
        .await
        .expect("list as candidate");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
