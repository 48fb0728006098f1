//! Wizard demo showing a happy path, a rejected step and a compensated abandon.
//!
//! Run with: cargo run --example demo
//! Set RUST_LOG=marquee=debug to see navigation events.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use marquee::{
    AbandonPolicy, Category, CategoryDraft, Event, EventDraft, GatewayError, InMemoryGateway,
    NewCategory, NewEvent, NewSeatSection, NewShow, NewShowtime, PriceTier, PriceTierDraft,
    PriceTierSpec, PublishShow, ResourceGateway, ResourceId, ResourceKind, SeatSection,
    SeatSectionDraft, Show, ShowDraft, Showtime, ShowtimeDraft, Wizard, WizardConfig,
    WizardStep,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

// ============================================================================
// A gateway with latency
// ============================================================================

/// Wraps the in-memory gateway and sleeps before each call, like a remote API.
struct SlowGateway {
    inner: InMemoryGateway,
    latency: Duration,
}

impl SlowGateway {
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

// ============================================================================
// Inputs
// ============================================================================

fn show_draft() -> ShowDraft {
    ShowDraft {
        title: "A Midsummer Night's Dream".into(),
        description: "Lovers, fairies and a play within a play".into(),
        duration_minutes: 165,
        language: "en".into(),
        age_limit: 8,
        venue_id: "venue-rose".into(),
    }
}

fn event_draft() -> EventDraft {
    EventDraft {
        name: "Summer season".into(),
        starts_on: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap_or_default(),
        ends_on: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap_or_default(),
    }
}

fn price(category_id: ResourceId, pounds: i64) -> PriceTierDraft {
    PriceTierDraft {
        category_id,
        price: Decimal::new(pounds * 100, 2),
        currency: "GBP".into(),
        description: "Standard".into(),
        capacity: 200,
    }
}

fn print_state<G: ResourceGateway + ?Sized>(wizard: &Wizard<G>) {
    let state = wizard.state();
    println!(
        "  step={} show={:?} events={} showtimes={} categories={} tiers={} seat_sections={} completed={}",
        state.current_step(),
        state.show_id().map(ResourceId::as_str),
        state.event_ids().len(),
        state.showtime_ids().len(),
        state.category_ids().len(),
        state.price_tier_ids().len(),
        state.seat_sections_created(),
        state.is_completed(),
    );
    if let Some(err) = state.last_error() {
        println!("  last_error: {}", err.message);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

async fn happy_path() -> Result<(), marquee::WizardError> {
    println!("\n=== Happy path ===");
    let gateway = Arc::new(SlowGateway {
        inner: InMemoryGateway::new(),
        latency: Duration::from_millis(50),
    });
    let mut wizard = Wizard::new(gateway);

    wizard.create_show(show_draft()).await?;
    wizard.advance();
    let event = wizard.create_event(event_draft()).await?;
    wizard.advance();
    let starts_at = Utc
        .with_ymd_and_hms(2026, 7, 4, 19, 30, 0)
        .single()
        .unwrap_or_default();
    let showtime = wizard
        .create_showtime(ShowtimeDraft {
            event_id: event.id.clone(),
            starts_at,
        })
        .await?;
    wizard.advance();
    let stalls = wizard
        .create_category(CategoryDraft {
            name: "Stalls".into(),
            description: "Ground floor".into(),
        })
        .await?;
    wizard.advance();
    wizard.create_price_tier(price(stalls.id.clone(), 45)).await?;
    wizard.advance();
    wizard
        .create_seat_section(SeatSectionDraft {
            category_id: stalls.id.clone(),
            showtime_id: showtime.id.clone(),
            name: "Stalls A".into(),
            rows: 10,
            seats_per_row: 20,
        })
        .await?;
    wizard.advance();
    wizard.publish().await?;

    print_state(&wizard);
    Ok(())
}

async fn rejected_step() {
    println!("\n=== Rejected price tier ===");
    let mut wizard = Wizard::with_config(
        Arc::new(InMemoryGateway::new()),
        WizardConfig::permissive(),
    );

    if let Err(e) = wizard.create_show(show_draft()).await {
        println!("  unexpected: {e}");
        return;
    }
    while wizard.state().current_step() < WizardStep::PriceTiers && wizard.advance() {}
    match wizard
        .create_price_tier(price(ResourceId::from("category-missing"), 30))
        .await
    {
        Ok(tier) => println!("  unexpected tier {}", tier.id),
        Err(e) => println!("  rejected: {e}"),
    }
    print_state(&wizard);
}

async fn compensated_abandon() {
    println!("\n=== Abandon with compensation ===");
    let gateway = Arc::new(InMemoryGateway::new());
    let config = WizardConfig {
        on_abandon: AbandonPolicy::Compensate,
        ..WizardConfig::default()
    };
    let mut wizard = Wizard::with_config(gateway.clone(), config);

    let created = async {
        wizard.create_show(show_draft()).await?;
        wizard.advance();
        wizard.create_event(event_draft()).await?;
        Ok::<_, marquee::WizardError>(())
    }
    .await;
    if let Err(e) = created {
        println!("  unexpected: {e}");
        return;
    }
    print_state(&wizard);

    let report = wizard.abandon().await;
    for (kind, id) in &report.deleted {
        println!("  deleted {kind} {id}");
    }
    println!(
        "  remote shows={} events={} step={}",
        gateway.count(ResourceKind::Show),
        gateway.count(ResourceKind::Event),
        wizard.state().current_step(),
    );
    debug_assert_eq!(wizard.state().current_step(), WizardStep::ShowDetails);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info")),
        )
        .init();

    if let Err(e) = happy_path().await {
        println!("  happy path failed: {e}");
    }
    rejected_step().await;
    compensated_abandon().await;
}
