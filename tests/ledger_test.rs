//! Participation ledger behaviour against every available backend

mod helpers;

use assert_matches::assert_matches;
use futures::future::join_all;
use helpers::*;
use serial_test::serial;
use voloconnect::models::{CapacityPolicy, EffectiveStatus, SignupDetails, SignupStatus};
use voloconnect::VoloConnectError;

#[tokio::test]
#[serial]
async fn test_organizer_signup_is_approved() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let signup = ctx
            .services
            .ledger
            .sign_up(ORGANIZER, event.id, signup_details("Coordinator"))
            .await
            .unwrap();

        assert_eq!(signup.status, SignupStatus::Approved, "backend {}", ctx.backend);
        assert_eq!(signup.role, "Coordinator");
    }
}

#[tokio::test]
#[serial]
async fn test_duplicate_signup_conflicts() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        ctx.services
            .ledger
            .sign_up(1, event.id, SignupDetails::default())
            .await
            .unwrap();

        assert_matches!(
            ctx.services.ledger.sign_up(1, event.id, SignupDetails::default()).await,
            Err(VoloConnectError::Conflict(_)),
            "backend {}",
            ctx.backend
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_signups_for_same_pair() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(10)).await.unwrap();
        let event_id = event.id;

        let attempts = (0..2).map(|_| {
            let ledger = ctx.services.ledger.clone();
            tokio::spawn(async move { ledger.sign_up(7, event_id, SignupDetails::default()).await })
        });
        let results: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.expect("signup task panicked"))
            .collect();

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(VoloConnectError::Conflict(_))))
            .count();
        assert_eq!((succeeded, conflicts), (1, 1), "backend {}", ctx.backend);
        assert_eq!(ctx.services.ledger.list_for_event(event.id).await.unwrap().len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_signups_never_overfill() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(3)).await.unwrap();
        let event_id = event.id;

        let attempts = (1..=10).map(|volunteer_id| {
            let ledger = ctx.services.ledger.clone();
            tokio::spawn(async move {
                ledger
                    .sign_up(volunteer_id, event_id, SignupDetails::default())
                    .await
            })
        });
        let results: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.expect("signup task panicked"))
            .collect();

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Err(VoloConnectError::Capacity { .. })))
            .count();
        assert_eq!(succeeded, 3, "backend {}", ctx.backend);
        assert_eq!(full, 7, "backend {}", ctx.backend);

        let event = ctx.services.events.get_event(event.id).await.unwrap();
        assert_eq!(event.current_volunteers, 3);
        assert_eq!(event.effective_status(), EffectiveStatus::Full);
    }
}

#[tokio::test]
#[serial]
async fn test_single_seat_scenario() {
    for policy in [CapacityPolicy::ApprovedAndPending, CapacityPolicy::ApprovedOnly] {
        for ctx in TestContext::all(policy).await {
            let event = ctx.services.events.create_event(ORGANIZER, event_request(1)).await.unwrap();

            let a = ctx.services.ledger.sign_up(1, event.id, SignupDetails::default()).await.unwrap();
            assert_eq!(a.status, SignupStatus::Pending);
            ctx.services.ledger.approve(ORGANIZER, event.id, a.id).await.unwrap();

            assert_matches!(
                ctx.services.ledger.sign_up(2, event.id, SignupDetails::default()).await,
                Err(VoloConnectError::Capacity { max_volunteers: 1, .. }),
                "backend {} policy {:?}",
                ctx.backend,
                policy
            );
        }
    }
}

#[tokio::test]
#[serial]
async fn test_current_volunteers_under_approved_only() {
    for ctx in TestContext::all(CapacityPolicy::ApprovedOnly).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(10)).await.unwrap();

        // Three approved, two rejected, one left pending
        for volunteer_id in 1..=6 {
            let signup = ctx
                .services
                .ledger
                .sign_up(volunteer_id, event.id, SignupDetails::default())
                .await
                .unwrap();
            match volunteer_id {
                1..=3 => {
                    ctx.services.ledger.approve(ORGANIZER, event.id, signup.id).await.unwrap();
                }
                4 | 5 => {
                    ctx.services.ledger.reject(ORGANIZER, event.id, signup.id, None).await.unwrap();
                }
                _ => {}
            }
        }

        let event = ctx.services.events.get_event(event.id).await.unwrap();
        assert_eq!(event.current_volunteers, 3, "backend {}", ctx.backend);
    }
}

#[tokio::test]
#[serial]
async fn test_current_volunteers_under_approved_and_pending() {
    for ctx in TestContext::all(CapacityPolicy::ApprovedAndPending).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(10)).await.unwrap();

        for volunteer_id in 1..=6 {
            let signup = ctx
                .services
                .ledger
                .sign_up(volunteer_id, event.id, SignupDetails::default())
                .await
                .unwrap();
            match volunteer_id {
                1..=3 => {
                    ctx.services.ledger.approve(ORGANIZER, event.id, signup.id).await.unwrap();
                }
                4 | 5 => {
                    ctx.services.ledger.reject(ORGANIZER, event.id, signup.id, None).await.unwrap();
                }
                _ => {}
            }
        }

        let event = ctx.services.events.get_event(event.id).await.unwrap();
        assert_eq!(event.current_volunteers, 4, "backend {}", ctx.backend);
    }
}

#[tokio::test]
#[serial]
async fn test_decided_signups_cannot_move() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let approved = ctx.services.ledger.sign_up(1, event.id, SignupDetails::default()).await.unwrap();
        let rejected = ctx.services.ledger.sign_up(2, event.id, SignupDetails::default()).await.unwrap();
        ctx.services.ledger.approve(ORGANIZER, event.id, approved.id).await.unwrap();
        ctx.services.ledger.reject(ORGANIZER, event.id, rejected.id, None).await.unwrap();

        for (signup_id, target) in [
            (approved.id, SignupStatus::Rejected),
            (approved.id, SignupStatus::Pending),
            (approved.id, SignupStatus::Approved),
            (rejected.id, SignupStatus::Approved),
            (rejected.id, SignupStatus::Pending),
        ] {
            assert_matches!(
                ctx.services.ledger.set_status(ORGANIZER, event.id, signup_id, target).await,
                Err(VoloConnectError::State { .. }),
                "backend {} signup {} -> {}",
                ctx.backend,
                signup_id,
                target
            );
        }
    }
}

#[tokio::test]
#[serial]
async fn test_hours_and_feedback_flow() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let signup = ctx
            .services
            .ledger
            .sign_up(1, event.id, signup_details("Sorter"))
            .await
            .unwrap();
        ctx.services.ledger.approve(ORGANIZER, event.id, signup.id).await.unwrap();

        ctx.services.ledger.update_hours(ORGANIZER, signup.id, 3.25).await.unwrap();
        let updated = ctx
            .services
            .ledger
            .record_feedback(ORGANIZER, signup.id, "Reliable and quick".to_string())
            .await
            .unwrap();

        assert_eq!(updated.hours_contributed, 3.25, "backend {}", ctx.backend);
        assert_eq!(updated.feedback.as_deref(), Some("Reliable and quick"));
        assert_eq!(updated.status, SignupStatus::Approved);

        let history = ctx.services.ledger.volunteer_history(1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_title, event.title);
        assert_eq!(history[0].signup.hours_contributed, 3.25);
    }
}

#[tokio::test]
#[serial]
async fn test_notifications_follow_state_changes() {
    let ctx = TestContext::in_memory(CapacityPolicy::default());
    let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
    let signup = ctx.services.ledger.sign_up(1, event.id, SignupDetails::default()).await.unwrap();
    ctx.services
        .ledger
        .reject(ORGANIZER, event.id, signup.id, Some("Roster is complete".to_string()))
        .await
        .unwrap();

    let sent: Vec<(&'static str, i64)> = ctx.sent().iter().map(|n| (n.kind(), n.recipient())).collect();
    assert_eq!(
        sent,
        vec![("signup_received", ORGANIZER), ("signup_status_changed", 1)]
    );
    assert_eq!(ctx.services.notifications.stats().total_sent, 2);
}

#[tokio::test]
#[serial]
async fn test_organizer_reassigns_role() {
    for ctx in TestContext::all(CapacityPolicy::default()).await {
        let event = ctx.services.events.create_event(ORGANIZER, event_request(5)).await.unwrap();
        let signup = ctx
            .services
            .ledger
            .sign_up(1, event.id, signup_details("Sorter"))
            .await
            .unwrap();

        let updated = ctx
            .services
            .ledger
            .update_role(ORGANIZER, event.id, 1, "Shift lead".to_string())
            .await
            .unwrap();
        assert_eq!(updated.id, signup.id, "backend {}", ctx.backend);
        assert_eq!(updated.role, "Shift lead");

        assert_matches!(
            ctx.services.ledger.update_role(ORGANIZER, event.id, 2, "Driver".to_string()).await,
            Err(VoloConnectError::NotFound { .. }),
            "backend {}",
            ctx.backend
        );
        let stored = ctx.services.ledger.list_for_volunteer(1).await.unwrap();
        assert_eq!(stored[0].role, "Shift lead");
    }
}
