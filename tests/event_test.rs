//! Event registry and statistics against every available backend

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use helpers::*;
use proptest::prelude::*;
use serial_test::serial;
use voloconnect::models::{
    CapacityPolicy, EffectiveStatus, EventFilter, EventStatus, SignupDetails, StatsScope, UpdateEventRequest,
};
use voloconnect::VoloConnectError;

#[tokio::test]
#[serial]
async fn test_create_get_round_trip() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let request = event_request(25);
        let created = ctx.services.events.create_event(ORGANIZER, request.clone()).await.unwrap();
        let fetched = ctx.services.events.get_event(created.id).await.unwrap();

        assert_eq!(fetched.title, request.title, "backend {}", ctx.backend);
        assert_eq!(fetched.description, request.description);
        assert_eq!(fetched.location, request.location);
        assert_eq!(fetched.max_volunteers, request.max_volunteers);
        assert_eq!(fetched.required_skills, request.required_skills);
        assert_eq!(fetched.organizer_id, ORGANIZER);
        assert_eq!(fetched.status, EventStatus::Active);
        assert_eq!(fetched.current_volunteers, 0);
        // PostgreSQL stores microseconds
        assert!((fetched.start_date - request.start_date).num_microseconds().unwrap_or(i64::MAX).abs() < 1);
        assert!((fetched.end_date - request.end_date).num_microseconds().unwrap_or(i64::MAX).abs() < 1);
    }
}

#[tokio::test]
#[serial]
async fn test_missing_event() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        assert_matches!(
            ctx.services.events.get_event(424242).await,
            Err(VoloConnectError::NotFound { entity: "event", id: 424242 }),
            "backend {}",
            ctx.backend
        );
    }
}

#[tokio::test]
#[serial]
async fn test_update_keeps_dates_ordered() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();

        let later_start = UpdateEventRequest {
            start_date: Some(event.end_date + Duration::hours(1)),
            ..Default::default()
        };
        assert_matches!(
            ctx.services.events.update_event(ORGANIZER, event.id, later_start).await,
            Err(VoloConnectError::Validation(_))
        );

        let moved = UpdateEventRequest {
            start_date: Some(event.start_date + Duration::days(1)),
            end_date: Some(event.end_date + Duration::days(1)),
            ..Default::default()
        };
        let updated = ctx.services.events.update_event(ORGANIZER, event.id, moved).await.unwrap();
        assert!(updated.start_date < updated.end_date, "backend {}", ctx.backend);

        let stored = ctx.services.events.get_event(event.id).await.unwrap();
        assert!(stored.start_date < stored.end_date);
    }
}

#[tokio::test]
#[serial]
async fn test_failed_update_leaves_event_untouched() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();

        let request = UpdateEventRequest {
            title: Some("Renamed cleanup".to_string()),
            max_volunteers: Some(0),
            ..Default::default()
        };
        assert_matches!(
            ctx.services.events.update_event(ORGANIZER, event.id, request).await,
            Err(VoloConnectError::Validation(_))
        );

        let stored = ctx.services.events.get_event(event.id).await.unwrap();
        assert_eq!(stored.title, event.title, "backend {}", ctx.backend);
        assert_eq!(stored.max_volunteers, 5);
    }
}

#[tokio::test]
#[serial]
async fn test_listing_and_stats() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let open = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let full = ctx.services.events.create_event(ORGANIZER, event_request(1)).await.unwrap();
        let mut other = event_request(5);
        other.title = "Library book drive".to_string();
        other.description = "Sort donated books for the neighbourhood library".to_string();
        let other = ctx.services.events.create_event(ORGANIZER + 1, other).await.unwrap();

        let signup = ctx.services.ledger.sign_up(1, full.id, SignupDetails::default()).await.unwrap();
        ctx.services.ledger.approve(ORGANIZER, full.id, signup.id).await.unwrap();
        ctx.services.ledger.update_hours(ORGANIZER, signup.id, 2.0).await.unwrap();
        ctx.services.events.cancel_event(ORGANIZER + 1, other.id).await.unwrap();

        let active = ctx
            .services
            .events
            .list_events(EventFilter::with_status(EffectiveStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.iter().map(|e| e.id).collect::<Vec<_>>(), vec![open.id], "backend {}", ctx.backend);

        let books = ctx.services.events.list_events(EventFilter::with_search("BOOK")).await.unwrap();
        assert_eq!(books.iter().map(|e| e.id).collect::<Vec<_>>(), vec![other.id]);

        let mine = ctx.services.events.list_events(EventFilter::for_organizer(ORGANIZER)).await.unwrap();
        assert_eq!(mine.iter().map(|e| e.id).collect::<Vec<_>>(), vec![open.id, full.id]);

        let stats = ctx.services.stats.compute_stats(StatsScope::Global).await.unwrap();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.active_events, 1);
        assert_eq!(stats.full_events, 1);
        assert_eq!(stats.cancelled_events, 1);
        assert_eq!(stats.completed_events, 0);
        assert_eq!(stats.total_volunteers, 1);
        assert_eq!(stats.total_hours, 2.0);

        let volunteer = ctx.services.stats.volunteer_stats(1).await.unwrap();
        assert_eq!(volunteer.total_events, 1);
        assert_eq!(volunteer.upcoming_commitments, 1);
        assert_eq!(volunteer.total_hours, 2.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_created_events_have_ordered_dates(start_offset in -48i64..48, duration in -12i64..12) {
        tokio_test::block_on(async {
            let ctx = TestContext::in_memory(CapacityPolicy::default());
            let mut request = event_request(5);
            request.start_date = Utc::now() + Duration::hours(start_offset) + Duration::minutes(1);
            request.end_date = request.start_date + Duration::hours(duration);

            match ctx.services.events.create_event(ORGANIZER, request).await {
                Ok(event) => {
                    assert!(event.start_date < event.end_date);
                    assert!(start_offset >= 0 && duration > 0);
                }
                Err(VoloConnectError::Validation(errors)) => {
                    assert!(errors.has_field("start_date") || errors.has_field("end_date"));
                    assert!(start_offset < 0 || duration <= 0);
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        });
    }
}
