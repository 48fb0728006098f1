//! Workflow state: the single record of wizard progress and created resources.
//!
//! Fields are private. Callers read through accessors and mutate only through
//! [`WorkflowState::record_show_created`], [`WorkflowState::record_child_created`],
//! [`WorkflowState::mark_published`] and [`WorkflowState::reset`]. The executor and
//! navigation modules use a few crate-private helpers on top of those.
//!
//! Tracked identifier sequences are append-only; only `reset` empties them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorDescriptor, WizardError};
use crate::resource::{ChildKind, ResourceId, ResourceKind, Show};
use crate::step::WizardStep;

/// Step on which resources of a tracked child kind are created.
pub(crate) const fn step_of(kind: ChildKind) -> WizardStep {
    match kind {
        ChildKind::Event => WizardStep::Events,
        ChildKind::Showtime => WizardStep::Showtimes,
        ChildKind::Category => WizardStep::Categories,
        ChildKind::PriceTier => WizardStep::PriceTiers,
    }
}

/// Session-scoped wizard state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Where the user currently is.
    current_step: WizardStep,
    /// Set once by the show creation call.
    show_id: Option<ResourceId>,
    /// Latest copy of the show returned by the gateway.
    show: Option<Show>,
    event_ids: Vec<ResourceId>,
    showtime_ids: Vec<ResourceId>,
    category_ids: Vec<ResourceId>,
    price_tier_ids: Vec<ResourceId>,
    /// Seat sections are created without tracking their identifiers.
    seat_sections_created: usize,
    /// Payload fingerprints of successful creations, for duplicate detection.
    fingerprints: BTreeMap<String, Option<ResourceId>>,
    last_error: Option<ErrorDescriptor>,
    completed: bool,
}

impl WorkflowState {
    /// Create a fresh state at the initial step with nothing created.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The step the user is on.
    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    /// Identifier of the created show, if any.
    pub fn show_id(&self) -> Option<&ResourceId> {
        self.show_id.as_ref()
    }

    /// Latest show snapshot returned by the gateway.
    pub fn show(&self) -> Option<&Show> {
        self.show.as_ref()
    }

    /// Events created in this session, oldest first.
    pub fn event_ids(&self) -> &[ResourceId] {
        &self.event_ids
    }

    /// Showtimes created in this session, oldest first.
    pub fn showtime_ids(&self) -> &[ResourceId] {
        &self.showtime_ids
    }

    /// Categories created in this session, oldest first.
    pub fn category_ids(&self) -> &[ResourceId] {
        &self.category_ids
    }

    /// Price tiers created in this session, oldest first.
    pub fn price_tier_ids(&self) -> &[ResourceId] {
        &self.price_tier_ids
    }

    /// Tracked identifiers for a child kind.
    pub fn child_ids(&self, kind: ChildKind) -> &[ResourceId] {
        match kind {
            ChildKind::Event => &self.event_ids,
            ChildKind::Showtime => &self.showtime_ids,
            ChildKind::Category => &self.category_ids,
            ChildKind::PriceTier => &self.price_tier_ids,
        }
    }

    /// Number of seat sections created. Their identifiers are not kept.
    pub fn seat_sections_created(&self) -> usize {
        self.seat_sections_created
    }

    /// The most recent failure, cleared by the next successful operation.
    pub fn last_error(&self) -> Option<&ErrorDescriptor> {
        self.last_error.as_ref()
    }

    /// Whether the show was published.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the current step is the initial one.
    pub fn is_first(&self) -> bool {
        self.current_step == WizardStep::FIRST
    }

    /// Whether the current step is the terminal one.
    pub fn is_last(&self) -> bool {
        self.current_step == WizardStep::LAST
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Record the identifier of the newly created show.
    ///
    /// A show is created at most once per session.
    pub fn record_show_created(&mut self, id: ResourceId) -> Result<(), WizardError> {
        if self.show_id.is_some() {
            return Err(WizardError::transition(
                WizardStep::ShowDetails,
                "show has already been created",
            ));
        }
        self.show_id = Some(id);
        Ok(())
    }

    /// Append the identifier of a newly created child resource.
    ///
    /// Does not deduplicate: recording the same identifier twice appends twice.
    pub fn record_child_created(
        &mut self,
        kind: ChildKind,
        id: ResourceId,
    ) -> Result<(), WizardError> {
        if self.show_id.is_none() {
            return Err(WizardError::precondition(
                step_of(kind),
                "show has not been created",
            ));
        }
        match kind {
            ChildKind::Event => self.event_ids.push(id),
            ChildKind::Showtime => self.showtime_ids.push(id),
            ChildKind::Category => self.category_ids.push(id),
            ChildKind::PriceTier => self.price_tier_ids.push(id),
        }
        Ok(())
    }

    /// Mark the wizard as completed.
    ///
    /// Requires a show and the terminal step, so that `completed` always
    /// implies both.
    pub fn mark_published(&mut self) -> Result<(), WizardError> {
        if self.show_id.is_none() {
            return Err(WizardError::precondition(
                WizardStep::Publish,
                "show has not been created",
            ));
        }
        if self.current_step != WizardStep::Publish {
            return Err(WizardError::precondition(
                WizardStep::Publish,
                "wizard is not on the publish step",
            ));
        }
        self.completed = true;
        Ok(())
    }

    /// Restore every field to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ------------------------------------------------------------------------
    // Crate-private helpers
    // ------------------------------------------------------------------------

    pub(crate) fn set_current_step(&mut self, step: WizardStep) {
        self.current_step = step;
    }

    pub(crate) fn set_show_snapshot(&mut self, show: Show) {
        self.show = Some(show);
    }

    pub(crate) fn record_seat_section_created(&mut self) {
        self.seat_sections_created += 1;
    }

    pub(crate) fn record_failure(&mut self, err: &WizardError) {
        self.last_error = Some(ErrorDescriptor::from(err));
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub(crate) fn fingerprint_hit(&self, key: &str) -> Option<&Option<ResourceId>> {
        self.fingerprints.get(key)
    }

    pub(crate) fn remember_fingerprint(&mut self, key: String, id: Option<ResourceId>) {
        self.fingerprints.insert(key, id);
    }

    /// Every tracked resource, in the order it should be deleted to unwind the session.
    pub(crate) fn compensation_order(&self) -> Vec<(ResourceKind, ResourceId)> {
        let mut order = Vec::new();
        for kind in ChildKind::ALL.iter().rev() {
            order.extend(
                self.child_ids(*kind)
                    .iter()
                    .rev()
                    .map(|id| (ResourceKind::from(*kind), id.clone())),
            );
        }
        if let Some(id) = &self.show_id {
            order.push((ResourceKind::Show, id.clone()));
        }
        order
    }
}
