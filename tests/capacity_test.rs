//! Capacity tracker integration tests
//!
//! Registration, cancellation and the slot counter, including concurrent
//! attempts on the last slot.

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use futures::future::join_all;
use helpers::*;
use EventDesk::config::Settings;
use EventDesk::models::{EventStatus, RegistrationStatus};
use EventDesk::EventDeskError;

#[tokio::test]
async fn test_two_slot_event_scenario() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(2).await;
    let (a, b, c) = (ctx.attendee("alice").await, ctx.attendee("bob").await, ctx.attendee("carol").await);
    let tracker = &ctx.services.capacity;

    let reg_a = tracker.register(event.id, a.id).await.unwrap();
    assert_eq!(reg_a.status, RegistrationStatus::Pending);
    assert_eq!(ctx.available_slots(event.id).await, 1);

    tracker.register(event.id, b.id).await.unwrap();
    assert_eq!(ctx.available_slots(event.id).await, 0);

    assert_matches!(
        tracker.register(event.id, c.id).await,
        Err(EventDeskError::CapacityExceeded { event_id }) if event_id == event.id
    );
    assert_eq!(ctx.available_slots(event.id).await, 0);

    tracker.cancel(reg_a.id).await.unwrap();
    assert_eq!(ctx.available_slots(event.id).await, 1);

    // The freed slot is usable again
    tracker.register(event.id, c.id).await.unwrap();
    assert_eq!(ctx.available_slots(event.id).await, 0);
}

#[tokio::test]
async fn test_pending_event_rejects_registration() {
    let ctx = TestContext::new().await;
    let event = ctx.pending_event(5).await;
    assert_eq!(event.status, EventStatus::Pending);
    let user = ctx.attendee("alice").await;

    assert_matches!(
        ctx.services.capacity.register(event.id, user.id).await,
        Err(EventDeskError::EventNotApproved { .. })
    );
    assert_eq!(ctx.available_slots(event.id).await, 5);
}

#[tokio::test]
async fn test_rejected_and_cancelled_events_never_reopen() {
    let ctx = TestContext::new().await;
    let user = ctx.attendee("alice").await;

    let rejected = ctx.pending_event(5).await;
    ctx.services.event_service.reject(ctx.admin.id, rejected.id).await.unwrap();
    assert_matches!(
        ctx.services.capacity.approve_event(rejected.id).await,
        Err(EventDeskError::InvalidStateTransition { .. })
    );
    assert_matches!(
        ctx.services.capacity.register(rejected.id, user.id).await,
        Err(EventDeskError::EventNotApproved { .. })
    );

    let cancelled = ctx.approved_event(5).await;
    ctx.services.event_service.cancel_event(ctx.organizer.id, cancelled.id).await.unwrap();
    assert_matches!(
        ctx.services.capacity.register(cancelled.id, user.id).await,
        Err(EventDeskError::EventNotApproved { .. })
    );
}

#[tokio::test]
async fn test_registration_after_deadline() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(3).await;
    let user = ctx.attendee("late").await;

    let after_deadline = event.registration_deadline + Duration::seconds(1);
    assert_matches!(
        ctx.services.capacity.register_at(event.id, user.id, after_deadline).await,
        Err(EventDeskError::DeadlineExpired { .. })
    );
    assert_eq!(ctx.available_slots(event.id).await, 3);

    // Exactly at the deadline is still accepted
    ctx.services
        .capacity
        .register_at(event.id, user.id, event.registration_deadline)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancel_twice_fails_and_does_not_double_release() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(3).await;
    let user = ctx.attendee("alice").await;
    let registration = ctx.services.capacity.register(event.id, user.id).await.unwrap();

    ctx.services.capacity.cancel(registration.id).await.unwrap();
    assert_eq!(ctx.available_slots(event.id).await, 3);

    assert_matches!(
        ctx.services.capacity.cancel(registration.id).await,
        Err(EventDeskError::AlreadyCancelled { .. })
    );
    assert_eq!(ctx.available_slots(event.id).await, 3);
}

#[tokio::test]
async fn test_cancel_unknown_registration() {
    let ctx = TestContext::new().await;
    assert_matches!(
        ctx.services.capacity.cancel(12345).await,
        Err(EventDeskError::RegistrationNotFound { registration_id: 12345 })
    );
}

#[tokio::test]
async fn test_duplicate_registration_rejected_until_cancelled() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(3).await;
    let user = ctx.attendee("alice").await;
    let tracker = &ctx.services.capacity;

    let first = tracker.register(event.id, user.id).await.unwrap();
    assert_matches!(
        tracker.register(event.id, user.id).await,
        Err(EventDeskError::AlreadyRegistered { .. })
    );
    assert_eq!(ctx.available_slots(event.id).await, 2);

    tracker.cancel(first.id).await.unwrap();
    tracker.register(event.id, user.id).await.unwrap();
    assert_eq!(tracker.registered_users(event.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_auto_confirm_setting() {
    let mut settings = Settings::default();
    settings.registration.auto_confirm = true;
    let ctx = TestContext::with_settings(settings).await;
    let event = ctx.approved_event(2).await;
    let user = ctx.attendee("alice").await;

    let registration = ctx.services.capacity.register(event.id, user.id).await.unwrap();
    assert_eq!(registration.status, RegistrationStatus::Registered);

    let attended = ctx.services.capacity.check_in(registration.id).await.unwrap();
    assert_eq!(attended.status, RegistrationStatus::Attended);
    assert!(attended.checked_in);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_for_last_slot() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(1).await;

    let mut users = Vec::new();
    for i in 0..16 {
        users.push(ctx.attendee(&format!("racer{}", i)).await);
    }

    let handles = users.iter().map(|user| {
        let tracker = ctx.services.capacity.clone();
        let (event_id, user_id) = (event.id, user.id);
        tokio::spawn(async move { tracker.register(event_id, user_id).await })
    });
    let results: Vec<_> = join_all(handles).await.into_iter().map(|r| r.unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let capacity_errors = results
        .iter()
        .filter(|r| matches!(r, Err(EventDeskError::CapacityExceeded { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(capacity_errors, 15);
    assert_eq!(ctx.available_slots(event.id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_and_cancellations_keep_counter_consistent() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(5).await;

    let mut users = Vec::new();
    for i in 0..30 {
        users.push(ctx.attendee(&format!("user{}", i)).await);
    }

    let handles = users.iter().map(|user| {
        let tracker = ctx.services.capacity.clone();
        let (event_id, user_id) = (event.id, user.id);
        tokio::spawn(async move {
            match tracker.register(event_id, user_id).await {
                // Every winner gives the slot back, letting later racers in
                Ok(registration) => tracker.cancel(registration.id).await.map(|_| true),
                Err(EventDeskError::CapacityExceeded { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        })
    });
    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    let summary = ctx.services.capacity.summary(event.id).await.unwrap();
    assert_eq!(summary.available_slots, 5);
    assert_eq!(summary.active_registrations, 0);
}

#[tokio::test]
async fn test_summary_counts_from_registrations_list() {
    let ctx = TestContext::new().await;
    let event = ctx.approved_event(4).await;
    let tracker = &ctx.services.capacity;

    let a = tracker.register(event.id, ctx.attendee("a_user").await.id).await.unwrap();
    let b = tracker.register(event.id, ctx.attendee("b_user").await.id).await.unwrap();
    tracker.register(event.id, ctx.attendee("c_user").await.id).await.unwrap();

    tracker.cancel(a.id).await.unwrap();
    tracker.reject_registration(b.id).await.unwrap();

    let summary = tracker.summary(event.id).await.unwrap();
    assert_eq!(summary.total_slots, 4);
    assert_eq!(summary.available_slots, 3);
    assert_eq!(summary.active_registrations, 1);
    assert!(summary.available_slots <= summary.total_slots);
    assert!(Utc::now() < event.registration_deadline);
}
