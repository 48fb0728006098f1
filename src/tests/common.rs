//! Common drafts and builders for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    AdvancePolicy, Category, CategoryDraft, Event, EventDraft, GatewayError, InMemoryGateway,
    NewCategory, NewEvent, NewSeatSection, NewShow, NewShowtime, PriceTier, PriceTierDraft,
    PriceTierSpec, PublishShow, ResourceGateway, ResourceId, ResourceKind, SeatSection,
    SeatSectionDraft, Show, ShowDraft, Showtime, ShowtimeDraft, Wizard, WizardConfig, WizardStep,
};

/// A wizard over a fresh in-memory gateway, with default policies.
pub fn wizard() -> (Arc<InMemoryGateway>, Wizard<InMemoryGateway>) {
    wizard_with(WizardConfig::default())
}

/// A wizard over a fresh in-memory gateway.
pub fn wizard_with(config: WizardConfig) -> (Arc<InMemoryGateway>, Wizard<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::new());
    let wizard = Wizard::with_config(gateway.clone(), config);
    (gateway, wizard)
}

/// Default policies, except that navigation is left to the test.
pub fn free_navigation() -> WizardConfig {
    WizardConfig {
        advance: AdvancePolicy::Free,
        ..WizardConfig::default()
    }
}

pub fn show() -> ShowDraft {
    ShowDraft {
        title: "The Tempest".into(),
        description: "Shipwreck, magic and forgiveness".into(),
        duration_minutes: 150,
        language: "en".into(),
        age_limit: 10,
        venue_id: "venue-globe".into(),
    }
}

pub fn event(name: &str) -> EventDraft {
    EventDraft {
        name: name.into(),
        starts_on: date(2026, 6, 1),
        ends_on: date(2026, 6, 30),
    }
}

pub fn showtime(event_id: &ResourceId) -> ShowtimeDraft {
    ShowtimeDraft {
        event_id: event_id.clone(),
        starts_at: Utc
            .with_ymd_and_hms(2026, 6, 12, 19, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub fn category(name: &str) -> CategoryDraft {
    CategoryDraft {
        name: name.into(),
        description: format!("{name} seating"),
    }
}

pub fn price_tier(category_id: impl Into<ResourceId>) -> PriceTierDraft {
    PriceTierDraft {
        category_id: category_id.into(),
        price: Decimal::new(4550, 2),
        currency: "GBP".into(),
        description: "Standard".into(),
        capacity: 120,
    }
}

pub fn seat_section(category_id: &ResourceId, showtime_id: &ResourceId) -> SeatSectionDraft {
    SeatSectionDraft {
        category_id: category_id.clone(),
        showtime_id: showtime_id.clone(),
        name: "Stalls A".into(),
        rows: 12,
        seats_per_row: 20,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Advance until `step` is reached, failing the test if navigation stops early.
pub fn advance_to<G: ResourceGateway + ?Sized>(wizard: &mut Wizard<G>, step: WizardStep) {
    while wizard.state().current_step() < step {
        let from = wizard.state().current_step();
        assert!(wizard.advance(), "advance from {from} refused");
    }
}

// ============================================================================
// Slow gateway
// ============================================================================

/// In-memory gateway that sleeps before every call, so a call can be caught in flight.
pub struct SlowGateway {
    pub inner: InMemoryGateway,
    latency: Duration,
}

impl SlowGateway {
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: InMemoryGateway::new(),
            latency,
        }
    }

    async fn pause(&self) {
        tokio::time::sleep(self.latency).await;
    }
}

#[async_trait]
impl ResourceGateway for SlowGateway {
    async fn create_show(&self, input: &NewShow) -> Result<Show, GatewayError> {
        self.pause().await;
        self.inner.create_show(input).await
    }

    async fn update_show(&self, id: &ResourceId, input: &NewShow) -> Result<Show, GatewayError> {
        self.pause().await;
        self.inner.update_show(id, input).await
    }

    async fn publish_show(&self, input: &PublishShow) -> Result<Show, GatewayError> {
        self.pause().await;
        self.inner.publish_show(input).await
    }

    async fn create_event(&self, input: &NewEvent) -> Result<Event, GatewayError> {
        self.pause().await;
        self.inner.create_event(input).await
    }

    async fn create_showtime(&self, input: &NewShowtime) -> Result<Showtime, GatewayError> {
        self.pause().await;
        self.inner.create_showtime(input).await
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, GatewayError> {
        self.pause().await;
        self.inner.create_category(input).await
    }

    async fn create_price_tier(&self, input: &PriceTierSpec) -> Result<PriceTier, GatewayError> {
        self.pause().await;
        self.inner.create_price_tier(input).await
    }

    async fn create_seat_section(
        &self,
        input: &NewSeatSection,
    ) -> Result<SeatSection, GatewayError> {
        self.pause().await;
        self.inner.create_seat_section(input).await
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), GatewayError> {
        self.pause().await;
        self.inner.delete(kind, id).await
    }
}

/// A wizard whose gateway takes `latency` to answer.
pub fn slow_wizard(latency: Duration) -> (Arc<SlowGateway>, Wizard<SlowGateway>) {
    let gateway = Arc::new(SlowGateway::new(latency));
    let wizard = Wizard::new(gateway.clone());
    (gateway, wizard)
}
