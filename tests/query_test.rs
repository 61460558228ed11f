//! Q&A threads against every available backend

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use voloconnect::models::{CapacityPolicy, QueryStatus, SubmitQueryRequest};
use voloconnect::VoloConnectError;

#[tokio::test]
#[serial]
async fn test_non_organizer_cannot_respond() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let query = ctx
            .services
            .queries
            .submit_query(1, event.id, SubmitQueryRequest::message("Are gloves provided?"))
            .await
            .unwrap();

        for requester in [1, 2] {
            assert_matches!(
                ctx.services
                    .queries
                    .respond_to_query(requester, query.id, "Yes".to_string())
                    .await,
                Err(VoloConnectError::Authorization(_)),
                "backend {}",
                ctx.backend
            );
        }

        let stored = ctx.services.queries.list_for_event(event.id).await.unwrap();
        assert_eq!(stored[0].status, QueryStatus::Pending);
        assert!(stored[0].response.is_none());
    }
}

#[tokio::test]
#[serial]
async fn test_second_response_is_rejected() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let request = SubmitQueryRequest {
            subject: Some("Equipment".to_string()),
            message: "Are gloves provided?".to_string(),
        };
        let query = ctx.services.queries.submit_query(1, event.id, request).await.unwrap();
        assert_eq!(query.subject.as_deref(), Some("Equipment"));

        let answered = ctx
            .services
            .queries
            .respond_to_query(ORGANIZER, query.id, "Yes, bring water".to_string())
            .await
            .unwrap();
        assert_eq!(answered.status, QueryStatus::Responded);
        assert!(answered.responded_at.is_some());

        assert_matches!(
            ctx.services
                .queries
                .respond_to_query(ORGANIZER, query.id, "Changed my mind".to_string())
                .await,
            Err(VoloConnectError::Conflict(_)),
            "backend {}",
            ctx.backend
        );

        let stored = ctx.services.queries.list_for_user(1).await.unwrap();
        assert_eq!(stored[0].response.as_deref(), Some("Yes, bring water"));
    }
}

#[tokio::test]
#[serial]
async fn test_close_query() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let query = ctx
            .services
            .queries
            .submit_query(1, event.id, SubmitQueryRequest::message("Is there parking?"))
            .await
            .unwrap();

        assert_matches!(
            ctx.services.queries.close_query(2, query.id).await,
            Err(VoloConnectError::Authorization(_))
        );

        let closed = ctx.services.queries.close_query(ORGANIZER, query.id).await.unwrap();
        assert_eq!(closed.status, QueryStatus::Closed, "backend {}", ctx.backend);

        assert_matches!(
            ctx.services.queries.close_query(1, query.id).await,
            Err(VoloConnectError::State { .. })
        );
        assert_matches!(
            ctx.services
                .queries
                .respond_to_query(ORGANIZER, query.id, "Yes".to_string())
                .await,
            Err(VoloConnectError::State { .. })
        );
    }
}

#[tokio::test]
#[serial]
async fn test_query_on_missing_event() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        assert_matches!(
            ctx.services
                .queries
                .submit_query(1, 9999, SubmitQueryRequest::message("Hello?"))
                .await,
            Err(VoloConnectError::NotFound { entity: "event", id: 9999 })
        );
        assert_matches!(
            ctx.services
                .queries
                .respond_to_query(ORGANIZER, 9999, "Hi".to_string())
                .await,
            Err(VoloConnectError::NotFound { entity: "query", id: 9999 })
        );
    }
}
