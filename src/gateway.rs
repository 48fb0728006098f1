//! The remote resource boundary and an in-memory backend.
//!
//! The wizard never assigns identifiers itself: every [`ResourceId`] it tracks was
//! returned by a [`ResourceGateway`] call.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::resource::{
    Category, Event, NewCategory, NewEvent, NewSeatSection, NewShow, NewShowtime, PriceTier,
    PriceTierSpec, PublishShow, ResourceId, ResourceKind, SeatSection, Show, Showtime,
};

// ============================================================================
// Gateway Trait
// ============================================================================

/// Broad cause of a gateway failure. The wizard treats all of them alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// The server rejected the payload.
    Validation,
    /// A referenced resource does not exist.
    NotFound,
    /// The server failed to process the request.
    Server,
    /// The request did not reach the server or the reply was lost.
    Network,
}

/// A failed gateway call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct GatewayError {
    /// Cause category, informational only.
    pub kind: GatewayErrorKind,
    /// Message surfaced to the user verbatim.
    pub message: String,
}

impl GatewayError {
    /// Create a gateway error.
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn not_found(kind: ResourceKind, id: &ResourceId) -> Self {
        Self::new(GatewayErrorKind::NotFound, format!("{kind} not found: {id}"))
    }
}

/// Create/update/delete operations for every resource the wizard produces.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait::async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Create a show.
    async fn create_show(&self, input: &NewShow) -> Result<Show, GatewayError>;

    /// Replace the editable fields of an existing show.
    async fn update_show(&self, id: &ResourceId, input: &NewShow) -> Result<Show, GatewayError>;

    /// Set the activation flag of a show.
    async fn publish_show(&self, input: &PublishShow) -> Result<Show, GatewayError>;

    /// Create an event under a show.
    async fn create_event(&self, input: &NewEvent) -> Result<Event, GatewayError>;

    /// Create a showtime under an event.
    async fn create_showtime(&self, input: &NewShowtime) -> Result<Showtime, GatewayError>;

    /// Create a seating category under a show.
    async fn create_category(&self, input: &NewCategory) -> Result<Category, GatewayError>;

    /// Create a price tier for a category.
    async fn create_price_tier(&self, input: &PriceTierSpec) -> Result<PriceTier, GatewayError>;

    /// Create a seat section.
    async fn create_seat_section(
        &self,
        input: &NewSeatSection,
    ) -> Result<SeatSection, GatewayError>;

    /// Delete a previously created resource.
    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), GatewayError>;
}

// ============================================================================
// In-Memory Gateway
// ============================================================================

/// Identifies a gateway call, for scripting failures and inspecting the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayOp {
    /// [`ResourceGateway::create_show`]
    CreateShow,
    /// [`ResourceGateway::update_show`]
    UpdateShow,
    /// [`ResourceGateway::publish_show`]
    PublishShow,
    /// [`ResourceGateway::create_event`]
    CreateEvent,
    /// [`ResourceGateway::create_showtime`]
    CreateShowtime,
    /// [`ResourceGateway::create_category`]
    CreateCategory,
    /// [`ResourceGateway::create_price_tier`]
    CreatePriceTier,
    /// [`ResourceGateway::create_seat_section`]
    CreateSeatSection,
    /// [`ResourceGateway::delete`]
    Delete(ResourceKind),
}

#[derive(Debug, Default)]
struct Records {
    next_id: u64,
    shows: HashMap<ResourceId, Show>,
    events: HashMap<ResourceId, Event>,
    showtimes: HashMap<ResourceId, Showtime>,
    categories: HashMap<ResourceId, Category>,
    price_tiers: HashMap<ResourceId, PriceTier>,
    seat_sections: HashMap<ResourceId, SeatSection>,
    scripted: HashMap<GatewayOp, VecDeque<GatewayError>>,
    calls: Vec<GatewayOp>,
}

impl Records {
    fn issue_id(&mut self, kind: ResourceKind) -> ResourceId {
        self.next_id += 1;
        ResourceId::new(format!("{}-{}", kind.as_str(), self.next_id))
    }

    /// Log the call and pop a scripted failure for it, if one is queued.
    fn enter(&mut self, op: GatewayOp) -> Result<(), GatewayError> {
        self.calls.push(op);
        match self.scripted.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn require_show(&self, id: &ResourceId) -> Result<(), GatewayError> {
        if self.shows.contains_key(id) {
            Ok(())
        } else {
            Err(GatewayError::not_found(ResourceKind::Show, id))
        }
    }

    fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Show => self.shows.len(),
            ResourceKind::Event => self.events.len(),
            ResourceKind::Showtime => self.showtimes.len(),
            ResourceKind::Category => self.categories.len(),
            ResourceKind::PriceTier => self.price_tiers.len(),
            ResourceKind::SeatSection => self.seat_sections.len(),
        }
    }

    fn remove(&mut self, kind: ResourceKind, id: &ResourceId) -> bool {
        match kind {
            ResourceKind::Show => self.shows.remove(id).is_some(),
            ResourceKind::Event => self.events.remove(id).is_some(),
            ResourceKind::Showtime => self.showtimes.remove(id).is_some(),
            ResourceKind::Category => self.categories.remove(id).is_some(),
            ResourceKind::PriceTier => self.price_tiers.remove(id).is_some(),
            ResourceKind::SeatSection => self.seat_sections.remove(id).is_some(),
        }
    }
}

/// Thread-safe in-process gateway for tests, demos and single-process use.
///
/// Enforces referential integrity the way a real backend would (a price tier
/// needs an existing category, and so on) and can be scripted to fail specific
/// calls with [`InMemoryGateway::fail_next`].
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    records: RwLock<Records>,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with `err`. Failures queue per operation.
    pub fn fail_next(&self, op: GatewayOp, err: GatewayError) {
        self.records
            .write()
            .scripted
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Every call received so far, in order, including failed ones.
    pub fn calls(&self) -> Vec<GatewayOp> {
        self.records.read().calls.clone()
    }

    /// Number of live resources of a kind.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.records.read().count(kind)
    }

    /// Look up a stored show.
    pub fn show(&self, id: &ResourceId) -> Option<Show> {
        self.records.read().shows.get(id).cloned()
    }

    /// Whether a resource of the given kind is currently stored.
    pub fn contains(&self, kind: ResourceKind, id: &ResourceId) -> bool {
        let records = self.records.read();
        match kind {
            ResourceKind::Show => records.shows.contains_key(id),
            ResourceKind::Event => records.events.contains_key(id),
            ResourceKind::Showtime => records.showtimes.contains_key(id),
            ResourceKind::Category => records.categories.contains_key(id),
            ResourceKind::PriceTier => records.price_tiers.contains_key(id),
            ResourceKind::SeatSection => records.seat_sections.contains_key(id),
        }
    }
}

#[async_trait::async_trait]
impl ResourceGateway for InMemoryGateway {
    async fn create_show(&self, input: &NewShow) -> Result<Show, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::CreateShow)?;
        let show = Show {
            id: records.issue_id(ResourceKind::Show),
            title: input.title.clone(),
            description: input.description.clone(),
            duration_minutes: input.duration_minutes,
            language: input.language.clone(),
            age_limit: input.age_limit,
            venue_id: input.venue_id.clone(),
            active: input.active,
        };
        records.shows.insert(show.id.clone(), show.clone());
        Ok(show)
    }

    async fn update_show(&self, id: &ResourceId, input: &NewShow) -> Result<Show, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::UpdateShow)?;
        let show = records
            .shows
            .get_mut(id)
            .ok_or_else(|| GatewayError::not_found(ResourceKind::Show, id))?;
        show.title = input.title.clone();
        show.description = input.description.clone();
        show.duration_minutes = input.duration_minutes;
        show.language = input.language.clone();
        show.age_limit = input.age_limit;
        show.venue_id = input.venue_id.clone();
        show.active = input.active;
        Ok(show.clone())
    }

    async fn publish_show(&self, input: &PublishShow) -> Result<Show, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::PublishShow)?;
        let show = records
            .shows
            .get_mut(&input.show_id)
            .ok_or_else(|| GatewayError::not_found(ResourceKind::Show, &input.show_id))?;
        show.active = input.active;
        Ok(show.clone())
    }

    async fn create_event(&self, input: &NewEvent) -> Result<Event, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::CreateEvent)?;
        records.require_show(&input.show_id)?;
        let event = Event {
            id: records.issue_id(ResourceKind::Event),
            show_id: input.show_id.clone(),
            name: input.name.clone(),
            starts_on: input.starts_on,
            ends_on: input.ends_on,
        };
        records.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn create_showtime(&self, input: &NewShowtime) -> Result<Showtime, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::CreateShowtime)?;
        let event = records
            .events
            .get(&input.event_id)
            .ok_or_else(|| GatewayError::not_found(ResourceKind::Event, &input.event_id))?;
        if input.starts_at.date_naive() < event.starts_on
            || input.starts_at.date_naive() > event.ends_on
        {
            return Err(GatewayError::new(
                GatewayErrorKind::Validation,
                "showtime must fall within the event dates",
            ));
        }
        let showtime = Showtime {
            id: records.issue_id(ResourceKind::Showtime),
            event_id: input.event_id.clone(),
            starts_at: input.starts_at,
        };
        records.showtimes.insert(showtime.id.clone(), showtime.clone());
        Ok(showtime)
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::CreateCategory)?;
        records.require_show(&input.show_id)?;
        let category = Category {
            id: records.issue_id(ResourceKind::Category),
            show_id: input.show_id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
        };
        records
            .categories
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn create_price_tier(&self, input: &PriceTierSpec) -> Result<PriceTier, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::CreatePriceTier)?;
        records.require_show(&input.show_id)?;
        let category = records
            .categories
            .get(&input.category_id)
            .ok_or_else(|| GatewayError::not_found(ResourceKind::Category, &input.category_id))?;
        if category.show_id != input.show_id {
            return Err(GatewayError::new(
                GatewayErrorKind::Validation,
                format!(
                    "category {} does not belong to show {}",
                    input.category_id, input.show_id
                ),
            ));
        }
        let tier = PriceTier {
            id: records.issue_id(ResourceKind::PriceTier),
            show_id: input.show_id.clone(),
            category_id: input.category_id.clone(),
            price: input.price,
            currency: input.currency.clone(),
            description: input.description.clone(),
            capacity: input.capacity,
        };
        records.price_tiers.insert(tier.id.clone(), tier.clone());
        Ok(tier)
    }

    async fn create_seat_section(
        &self,
        input: &NewSeatSection,
    ) -> Result<SeatSection, GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::CreateSeatSection)?;
        if !records.categories.contains_key(&input.category_id) {
            return Err(GatewayError::not_found(
                ResourceKind::Category,
                &input.category_id,
            ));
        }
        if !records.showtimes.contains_key(&input.showtime_id) {
            return Err(GatewayError::not_found(
                ResourceKind::Showtime,
                &input.showtime_id,
            ));
        }
        let section = SeatSection {
            id: records.issue_id(ResourceKind::SeatSection),
            category_id: input.category_id.clone(),
            showtime_id: input.showtime_id.clone(),
            name: input.name.clone(),
            rows: input.rows,
            seats_per_row: input.seats_per_row,
        };
        records
            .seat_sections
            .insert(section.id.clone(), section.clone());
        Ok(section)
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), GatewayError> {
        let mut records = self.records.write();
        records.enter(GatewayOp::Delete(kind))?;
        if records.remove(kind, id) {
            Ok(())
        } else {
            Err(GatewayError::not_found(kind, id))
        }
    }
}
