//! End-to-end wizard runs.

use crate::{
    ErrorKind, GatewayError, GatewayErrorKind, GatewayOp, ResourceKind, WizardConfig, WizardError,
    WizardStep,
};

use super::common::{
    advance_to, category, event, price_tier, seat_section, show, showtime, wizard, wizard_with,
};

/// Show, one event, one category, one price tier, publish.
#[tokio::test]
async fn minimal_show_is_published() {
    let (gateway, mut wizard) = wizard();

    let created = wizard.create_show(show()).await.expect("create show");
    advance_to(&mut wizard, WizardStep::Events);
    wizard.create_event(event("June run")).await.expect("create event");
    advance_to(&mut wizard, WizardStep::Categories);
    let cat = wizard
        .create_category(category("Stalls"))
        .await
        .expect("create category");
    advance_to(&mut wizard, WizardStep::PriceTiers);
    let tier = wizard
        .create_price_tier(price_tier(cat.id.clone()))
        .await
        .expect("create price tier");
    advance_to(&mut wizard, WizardStep::Publish);
    let published = wizard.publish().await.expect("publish");

    let state = wizard.state();
    assert_eq!(state.show_id(), Some(&created.id));
    assert_eq!(state.event_ids().len(), 1);
    assert_eq!(state.category_ids(), [cat.id.clone()]);
    assert_eq!(state.price_tier_ids(), [tier.id.clone()]);
    assert!(state.is_completed());
    assert_eq!(state.current_step(), WizardStep::Publish);
    assert!(state.last_error().is_none());

    assert!(published.active);
    assert_eq!(state.show().map(|s| s.active), Some(true));
    assert_eq!(
        gateway.show(&created.id).map(|s| s.active),
        Some(true),
        "activation must reach the gateway"
    );
    assert_eq!(tier.show_id, created.id);
    assert_eq!(tier.category_id, cat.id);
}

/// Every step, including the optional ones.
#[tokio::test]
async fn full_show_walks_every_step() {
    let (gateway, mut wizard) = wizard();

    wizard.create_show(show()).await.expect("create show");
    wizard.advance();
    let ev = wizard.create_event(event("June run")).await.expect("event");
    wizard.advance();
    let st = wizard.create_showtime(showtime(&ev.id)).await.expect("showtime");
    wizard.advance();
    let cat = wizard.create_category(category("Circle")).await.expect("category");
    wizard.advance();
    wizard
        .create_price_tier(price_tier(cat.id.clone()))
        .await
        .expect("price tier");
    wizard.advance();
    wizard
        .create_seat_section(seat_section(&cat.id, &st.id))
        .await
        .expect("seat section");
    wizard.advance();
    wizard.publish().await.expect("publish");

    let state = wizard.state();
    assert_eq!(state.showtime_ids(), [st.id.clone()]);
    assert_eq!(state.seat_sections_created(), 1);
    assert!(state.is_completed());
    assert_eq!(gateway.count(ResourceKind::SeatSection), 1);
}

/// Price tier for a category the server does not know.
#[tokio::test]
async fn gateway_rejection_is_surfaced_verbatim() {
    let (gateway, mut wizard) = wizard_with(WizardConfig::permissive());

    wizard.create_show(show()).await.expect("create show");
    advance_to(&mut wizard, WizardStep::PriceTiers);
    let before = wizard.state().clone();

    let err = wizard
        .create_price_tier(price_tier("category-404"))
        .await
        .expect_err("unknown category must be rejected");

    assert!(matches!(
        &err,
        WizardError::Gateway(GatewayError { kind: GatewayErrorKind::NotFound, .. })
    ));
    let last = wizard.state().last_error().expect("last error is set");
    assert_eq!(last.kind, ErrorKind::GatewayFailure);
    assert_eq!(last.message, "category not found: category-404");
    assert!(wizard.state().price_tier_ids().is_empty());
    assert_eq!(wizard.state().price_tier_ids(), before.price_tier_ids());
    assert_eq!(gateway.calls().last(), Some(&GatewayOp::CreatePriceTier));
}

/// Retreating and advancing again keeps everything that was created.
#[tokio::test]
async fn retreat_round_trip_keeps_state() {
    let (_gateway, mut wizard) = wizard();

    let created = wizard.create_show(show()).await.expect("create show");
    assert!(wizard.advance());
    assert_eq!(wizard.state().current_step(), WizardStep::Events);
    let before = wizard.state().clone();

    assert!(wizard.retreat());
    assert_eq!(wizard.state().current_step(), WizardStep::ShowDetails);
    assert!(wizard.advance());
    assert_eq!(wizard.state().current_step(), WizardStep::Events);

    assert_eq!(wizard.state().show_id(), Some(&created.id));
    assert_eq!(wizard.state(), &before);
}

/// A failed call leaves the state untouched apart from `last_error`,
/// and the next success clears it.
#[tokio::test]
async fn success_clears_last_error() {
    let (gateway, mut wizard) = wizard();
    wizard.create_show(show()).await.expect("create show");
    wizard.advance();

    gateway.fail_next(
        GatewayOp::CreateEvent,
        GatewayError::new(GatewayErrorKind::Server, "upstream timed out"),
    );
    let err = wizard
        .create_event(event("June run"))
        .await
        .expect_err("scripted failure");
    assert_eq!(err.to_string(), "upstream timed out");
    assert_eq!(
        wizard.state().last_error().map(|e| e.message.as_str()),
        Some("upstream timed out")
    );
    assert!(wizard.state().event_ids().is_empty());
    assert_eq!(wizard.state().current_step(), WizardStep::Events);

    // Resubmitting is a brand new call.
    wizard
        .create_event(event("June run"))
        .await
        .expect("retry by the caller");
    assert!(wizard.state().last_error().is_none());
    assert_eq!(wizard.state().event_ids().len(), 1);
    assert_eq!(
        gateway
            .calls()
            .iter()
            .filter(|op| **op == GatewayOp::CreateEvent)
            .count(),
        2
    );
}

/// Tracked sequences only grow across successful operations.
#[tokio::test]
async fn identifier_sequences_only_grow() {
    let (_gateway, mut wizard) = wizard();
    wizard.create_show(show()).await.expect("create show");
    advance_to(&mut wizard, WizardStep::Events);
    wizard.create_event(event("June run")).await.expect("event");
    advance_to(&mut wizard, WizardStep::Categories);

    let mut last_len = 0;
    for name in ["Stalls", "Circle", "Gallery"] {
        let cat = wizard.create_category(category(name)).await.expect("category");
        let ids = wizard.state().category_ids();
        assert_eq!(ids.len(), last_len + 1);
        assert_eq!(ids.last(), Some(&cat.id));
        last_len = ids.len();

        assert!(wizard.advance());
        wizard
            .create_price_tier(price_tier(cat.id.clone()))
            .await
            .expect("price tier");
        assert!(wizard.retreat());
    }

    assert_eq!(wizard.state().category_ids().len(), 3);
    assert_eq!(wizard.state().price_tier_ids().len(), 3);
}

/// Publishing twice is an invalid transition and does not call the gateway again.
#[tokio::test]
async fn publish_is_once_only() {
    let (gateway, mut wizard) = wizard_with(WizardConfig::permissive());
    wizard.create_show(show()).await.expect("create show");
    advance_to(&mut wizard, WizardStep::Publish);
    wizard.publish().await.expect("publish");

    let err = wizard.publish().await.expect_err("second publish");

    assert!(matches!(err, WizardError::InvalidTransition { .. }));
    assert_eq!(
        gateway
            .calls()
            .iter()
            .filter(|op| **op == GatewayOp::PublishShow)
            .count(),
        1
    );
    assert!(wizard.state().is_completed());
}

/// A failed publish leaves the wizard incomplete.
#[tokio::test]
async fn failed_publish_does_not_complete() {
    let (gateway, mut wizard) = wizard_with(WizardConfig::permissive());
    wizard.create_show(show()).await.expect("create show");
    advance_to(&mut wizard, WizardStep::Publish);

    gateway.fail_next(
        GatewayOp::PublishShow,
        GatewayError::new(GatewayErrorKind::Network, "connection refused"),
    );
    wizard.publish().await.expect_err("scripted failure");

    assert!(!wizard.state().is_completed());
    assert_eq!(wizard.state().show().map(|s| s.active), Some(false));
    assert!(wizard.retreat(), "an incomplete wizard can still move back");
}
