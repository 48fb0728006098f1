//! Resource identifiers, entities and the payloads exchanged with the gateway.
//!
//! Callers hand the wizard *drafts* (what a form collects). The executor fills in
//! the parent identifiers it has tracked so far and turns each draft into the
//! matching gateway payload (`New*`, [`PriceTierSpec`], [`PublishShow`]).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// Server-assigned identifier. The format is opaque to the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Arc<str>);

impl ResourceId {
    /// Wrap a gateway-issued identifier.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every resource type the wizard creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The root show.
    Show,
    /// A dated run of the show.
    Event,
    /// A concrete start time within an event.
    Showtime,
    /// A seating category.
    Category,
    /// A price attached to a category.
    PriceTier,
    /// Seat geometry for a category at a showtime.
    SeatSection,
}

impl ResourceKind {
    /// Stable lowercase name, used in logs and gateway identifiers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Event => "event",
            Self::Showtime => "showtime",
            Self::Category => "category",
            Self::PriceTier => "price_tier",
            Self::SeatSection => "seat_section",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Child resources whose identifiers are tracked in append-only sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    /// Tracked in `event_ids`.
    Event,
    /// Tracked in `showtime_ids`.
    Showtime,
    /// Tracked in `category_ids`.
    Category,
    /// Tracked in `price_tier_ids`.
    PriceTier,
}

impl ChildKind {
    /// All tracked child kinds, in creation order.
    pub const ALL: [ChildKind; 4] = [Self::Event, Self::Showtime, Self::Category, Self::PriceTier];
}

impl From<ChildKind> for ResourceKind {
    fn from(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Event => Self::Event,
            ChildKind::Showtime => Self::Showtime,
            ChildKind::Category => Self::Category,
            ChildKind::PriceTier => Self::PriceTier,
        }
    }
}

// ============================================================================
// Entities returned by the gateway
// ============================================================================

/// A show as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Title shown to customers.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Running time in minutes.
    pub duration_minutes: u32,
    /// Performance language.
    pub language: String,
    /// Minimum audience age.
    pub age_limit: u8,
    /// Venue hosting the show.
    pub venue_id: ResourceId,
    /// Whether the show is published.
    pub active: bool,
}

/// A dated run of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Parent show.
    pub show_id: ResourceId,
    /// Display name of the run.
    pub name: String,
    /// First day of the run.
    pub starts_on: NaiveDate,
    /// Last day of the run.
    pub ends_on: NaiveDate,
}

/// A single performance start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Parent event.
    pub event_id: ResourceId,
    /// When the performance starts.
    pub starts_at: DateTime<Utc>,
}

/// A seating category of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Parent show.
    pub show_id: ResourceId,
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: String,
}

/// A price attached to a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Show the tier belongs to.
    pub show_id: ResourceId,
    /// Category the tier prices.
    pub category_id: ResourceId,
    /// Ticket price.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Tier description.
    pub description: String,
    /// Seats sold at this price.
    pub capacity: u32,
}

/// Seat geometry for a category at a showtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSection {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Category the seats belong to.
    pub category_id: ResourceId,
    /// Showtime the seats are sold for.
    pub showtime_id: ResourceId,
    /// Section label.
    pub name: String,
    /// Number of rows.
    pub rows: u16,
    /// Seats in each row.
    pub seats_per_row: u16,
}

// ============================================================================
// Caller drafts
// ============================================================================

/// Show details collected on the first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDraft {
    /// Title shown to customers.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Running time in minutes.
    pub duration_minutes: u32,
    /// Performance language.
    pub language: String,
    /// Minimum audience age.
    pub age_limit: u8,
    /// Venue hosting the show.
    pub venue_id: ResourceId,
}

/// Event fields; the parent show comes from the workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Display name of the run.
    pub name: String,
    /// First day of the run.
    pub starts_on: NaiveDate,
    /// Last day of the run.
    pub ends_on: NaiveDate,
}

/// Showtime fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowtimeDraft {
    /// Event the showtime belongs to.
    pub event_id: ResourceId,
    /// When the performance starts.
    pub starts_at: DateTime<Utc>,
}

/// Category fields; the parent show comes from the workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: String,
}

/// Price tier fields; the show comes from the workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTierDraft {
    /// Category the tier prices.
    pub category_id: ResourceId,
    /// Ticket price, must not be negative.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Tier description.
    pub description: String,
    /// Seats sold at this price.
    pub capacity: u32,
}

/// Seat section fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSectionDraft {
    /// Category the seats belong to.
    pub category_id: ResourceId,
    /// Showtime the seats are sold for.
    pub showtime_id: ResourceId,
    /// Section label.
    pub name: String,
    /// Number of rows.
    pub rows: u16,
    /// Seats in each row.
    pub seats_per_row: u16,
}

// ============================================================================
// Gateway payloads
// ============================================================================

/// Create/update payload for a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShow {
    /// Title shown to customers.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Running time in minutes.
    pub duration_minutes: u32,
    /// Performance language.
    pub language: String,
    /// Minimum audience age.
    pub age_limit: u8,
    /// Venue hosting the show.
    pub venue_id: ResourceId,
    /// Shows are created inactive and only activated by publishing.
    pub active: bool,
}

/// Create payload for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Parent show.
    pub show_id: ResourceId,
    /// Display name of the run.
    pub name: String,
    /// First day of the run.
    pub starts_on: NaiveDate,
    /// Last day of the run.
    pub ends_on: NaiveDate,
}

/// Create payload for a showtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShowtime {
    /// Parent event.
    pub event_id: ResourceId,
    /// When the performance starts.
    pub starts_at: DateTime<Utc>,
}

/// Create payload for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Parent show.
    pub show_id: ResourceId,
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: String,
}

/// Price tier input, consumed directly by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTierSpec {
    /// Show the tier belongs to.
    pub show_id: ResourceId,
    /// Category the tier prices.
    pub category_id: ResourceId,
    /// Ticket price.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Tier description.
    pub description: String,
    /// Seats sold at this price.
    pub capacity: u32,
}

/// Create payload for a seat section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSeatSection {
    /// Category the seats belong to.
    pub category_id: ResourceId,
    /// Showtime the seats are sold for.
    pub showtime_id: ResourceId,
    /// Section label.
    pub name: String,
    /// Number of rows.
    pub rows: u16,
    /// Seats in each row.
    pub seats_per_row: u16,
}

/// Publish payload: flips the activation flag and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishShow {
    /// Show to activate.
    pub show_id: ResourceId,
    /// New activation flag.
    pub active: bool,
}

// ============================================================================
// Local validation
// ============================================================================

fn require_text(field: &'static str, value: &str) -> Result<(), WizardError> {
    if value.trim().is_empty() {
        return Err(WizardError::invalid_input(field, "is required"));
    }
    Ok(())
}

fn require_id(field: &'static str, value: &ResourceId) -> Result<(), WizardError> {
    require_text(field, value.as_str())
}

impl ShowDraft {
    /// Check required fields before any gateway call.
    pub fn validate(&self) -> Result<(), WizardError> {
        require_text("title", &self.title)?;
        require_text("language", &self.language)?;
        require_id("venue_id", &self.venue_id)?;
        if self.duration_minutes == 0 {
            return Err(WizardError::invalid_input(
                "duration_minutes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    pub(crate) fn into_payload(self, active: bool) -> NewShow {
        NewShow {
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            language: self.language,
            age_limit: self.age_limit,
            venue_id: self.venue_id,
            active,
        }
    }
}

impl EventDraft {
    /// Check required fields and date ordering.
    pub fn validate(&self) -> Result<(), WizardError> {
        require_text("name", &self.name)?;
        if self.ends_on < self.starts_on {
            return Err(WizardError::invalid_input(
                "ends_on",
                "must not be before starts_on",
            ));
        }
        Ok(())
    }

    pub(crate) fn into_payload(self, show_id: ResourceId) -> NewEvent {
        NewEvent {
            show_id,
            name: self.name,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
        }
    }
}

impl ShowtimeDraft {
    /// Check that an event is referenced.
    pub fn validate(&self) -> Result<(), WizardError> {
        require_id("event_id", &self.event_id)
    }

    pub(crate) fn into_payload(self) -> NewShowtime {
        NewShowtime {
            event_id: self.event_id,
            starts_at: self.starts_at,
        }
    }
}

impl CategoryDraft {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), WizardError> {
        require_text("name", &self.name)
    }

    pub(crate) fn into_payload(self, show_id: ResourceId) -> NewCategory {
        NewCategory {
            show_id,
            name: self.name,
            description: self.description,
        }
    }
}

impl PriceTierDraft {
    /// Check the category reference, price sign and currency code.
    pub fn validate(&self) -> Result<(), WizardError> {
        require_id("category_id", &self.category_id)?;
        if self.price < Decimal::ZERO {
            return Err(WizardError::invalid_input("price", "must not be negative"));
        }
        if !is_currency_code(&self.currency) {
            return Err(WizardError::invalid_input(
                "currency",
                "must be a three-letter ISO 4217 code",
            ));
        }
        Ok(())
    }

    pub(crate) fn into_spec(self, show_id: ResourceId) -> PriceTierSpec {
        PriceTierSpec {
            show_id,
            category_id: self.category_id,
            price: self.price,
            currency: self.currency,
            description: self.description,
            capacity: self.capacity,
        }
    }
}

impl SeatSectionDraft {
    /// Check references and that the geometry is not empty.
    pub fn validate(&self) -> Result<(), WizardError> {
        require_id("category_id", &self.category_id)?;
        require_id("showtime_id", &self.showtime_id)?;
        require_text("name", &self.name)?;
        if self.rows == 0 {
            return Err(WizardError::invalid_input("rows", "must be greater than zero"));
        }
        if self.seats_per_row == 0 {
            return Err(WizardError::invalid_input(
                "seats_per_row",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    pub(crate) fn into_payload(self) -> NewSeatSection {
        NewSeatSection {
            category_id: self.category_id,
            showtime_id: self.showtime_id,
            name: self.name,
            rows: self.rows,
            seats_per_row: self.seats_per_row,
        }
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
