//! Step executor: one async operation per wizard step.
//!
//! Every operation follows the same contract:
//!
//! 1. preconditions are checked against the [`WorkflowState`] and the input is
//!    validated locally;
//! 2. exactly one gateway call is issued;
//! 3. on success the state is updated, `last_error` is cleared and the created
//!    resource is returned;
//! 4. on any failure `last_error` is set and the state is otherwise untouched.
//!
//! All state mutation happens after the gateway call resolves, so dropping an
//! operation's future before it completes leaves the state exactly as it was.

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::{AbandonPolicy, PreconditionMode, WizardConfig};
use crate::error::WizardError;
use crate::gateway::{GatewayError, GatewayErrorKind, ResourceGateway};
use crate::navigation::Navigator;
use crate::resource::{
    Category, CategoryDraft, ChildKind, Event, EventDraft, NewShow, PriceTier, PriceTierDraft,
    PublishShow, ResourceId, ResourceKind, SeatSection, SeatSectionDraft, Show, ShowDraft,
    Showtime, ShowtimeDraft,
};
use crate::session::SessionId;
use crate::state::WorkflowState;
use crate::step::WizardStep;

/// A tracked resource whose compensating delete failed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompensationFailure {
    /// Kind of the resource left behind.
    pub kind: ResourceKind,
    /// Its identifier.
    pub id: ResourceId,
    /// Why the delete failed.
    pub error: GatewayError,
}

/// Outcome of [`Wizard::abandon`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbandonReport {
    /// Resources deleted, in deletion order.
    pub deleted: Vec<(ResourceKind, ResourceId)>,
    /// Resources that could not be deleted.
    pub failed: Vec<CompensationFailure>,
}

impl AbandonReport {
    /// Returns `true` if no compensating delete failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One wizard session: owns its [`WorkflowState`] and drives the gateway.
///
/// Operations take `&mut self`, so a single `Wizard` can never have two gateway
/// calls in flight. Use [`crate::SharedWizard`] when several tasks may submit.
#[derive(Debug)]
pub struct Wizard<G: ?Sized> {
    id: SessionId,
    gateway: Arc<G>,
    config: WizardConfig,
    state: WorkflowState,
}

impl<G> Wizard<G>
where
    G: ResourceGateway + ?Sized,
{
    /// Enter the wizard with default policies.
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_config(gateway, WizardConfig::default())
    }

    /// Enter the wizard with explicit policies.
    pub fn with_config(gateway: Arc<G>, config: WizardConfig) -> Self {
        Self {
            id: SessionId::new(),
            gateway,
            config,
            state: WorkflowState::new(),
        }
    }

    /// Identifier of the current session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Read-only view of the workflow state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Active policies.
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// The gateway this session talks to.
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Navigation controller over this session's state.
    pub fn navigator(&mut self) -> Navigator<'_> {
        Navigator::new(&mut self.state, self.config.advance)
    }

    /// See [`Navigator::advance`].
    pub fn advance(&mut self) -> bool {
        self.navigator().advance()
    }

    /// See [`Navigator::retreat`].
    pub fn retreat(&mut self) -> bool {
        self.navigator().retreat()
    }

    /// Whether the wizard is on its initial step.
    pub fn is_first(&self) -> bool {
        self.state.is_first()
    }

    /// Whether the wizard is on its terminal step.
    pub fn is_last(&self) -> bool {
        self.state.is_last()
    }

    // ------------------------------------------------------------------------
    // Step operations
    // ------------------------------------------------------------------------

    /// Create the show. Allowed once per session.
    pub async fn create_show(&mut self, draft: ShowDraft) -> Result<Show, WizardError> {
        let step = WizardStep::ShowDetails;
        let payload = match self.prepare_show(draft) {
            Ok(payload) => payload,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.create_show(&payload).await;

        self.settle(step, None, outcome, |state, show: &Show| {
            state.record_show_created(show.id.clone())?;
            state.set_show_snapshot(show.clone());
            Ok(Some(show.id.clone()))
        })
    }

    /// Edit the show created earlier in this session.
    ///
    /// Identifiers are unchanged; only the cached show snapshot is refreshed.
    pub async fn update_show(&mut self, draft: ShowDraft) -> Result<Show, WizardError> {
        let step = WizardStep::ShowDetails;
        let prepared = self.require_show(step).and_then(|id| {
            draft.validate()?;
            let active = self.state.show().is_some_and(|show| show.active);
            Ok((id, draft.into_payload(active)))
        });
        let (id, payload) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.update_show(&id, &payload).await;

        self.settle(step, None, outcome, |state, show: &Show| {
            state.set_show_snapshot(show.clone());
            Ok(Some(show.id.clone()))
        })
    }

    /// Create an event under the session's show.
    pub async fn create_event(&mut self, draft: EventDraft) -> Result<Event, WizardError> {
        let step = WizardStep::Events;
        let prepared = self.require_show(step).and_then(|show_id| {
            self.require_step(step)?;
            draft.validate()?;
            let payload = draft.into_payload(show_id);
            let key = self.check_duplicate(ResourceKind::Event, &payload)?;
            Ok((payload, key))
        });
        let (payload, key) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.create_event(&payload).await;

        self.settle(step, key, outcome, |state, event: &Event| {
            state.record_child_created(ChildKind::Event, event.id.clone())?;
            Ok(Some(event.id.clone()))
        })
    }

    /// Create a showtime for one of the events.
    pub async fn create_showtime(
        &mut self,
        draft: ShowtimeDraft,
    ) -> Result<Showtime, WizardError> {
        let step = WizardStep::Showtimes;
        let prepared = self.require_show(step).and_then(|_| {
            self.require_step(step)?;
            self.require_some(step, ChildKind::Event, "no event has been created")?;
            draft.validate()?;
            let payload = draft.into_payload();
            let key = self.check_duplicate(ResourceKind::Showtime, &payload)?;
            Ok((payload, key))
        });
        let (payload, key) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.create_showtime(&payload).await;

        self.settle(step, key, outcome, |state, showtime: &Showtime| {
            state.record_child_created(ChildKind::Showtime, showtime.id.clone())?;
            Ok(Some(showtime.id.clone()))
        })
    }

    /// Create a seating category under the session's show.
    pub async fn create_category(
        &mut self,
        draft: CategoryDraft,
    ) -> Result<Category, WizardError> {
        let step = WizardStep::Categories;
        let prepared = self.require_show(step).and_then(|show_id| {
            self.require_step(step)?;
            draft.validate()?;
            let payload = draft.into_payload(show_id);
            let key = self.check_duplicate(ResourceKind::Category, &payload)?;
            Ok((payload, key))
        });
        let (payload, key) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.create_category(&payload).await;

        self.settle(step, key, outcome, |state, category: &Category| {
            state.record_child_created(ChildKind::Category, category.id.clone())?;
            Ok(Some(category.id.clone()))
        })
    }

    /// Create a price tier for one of the categories.
    pub async fn create_price_tier(
        &mut self,
        draft: PriceTierDraft,
    ) -> Result<PriceTier, WizardError> {
        let step = WizardStep::PriceTiers;
        let prepared = self.require_show(step).and_then(|show_id| {
            self.require_step(step)?;
            self.require_some(step, ChildKind::Category, "no category has been created")?;
            draft.validate()?;
            let spec = draft.into_spec(show_id);
            let key = self.check_duplicate(ResourceKind::PriceTier, &spec)?;
            Ok((spec, key))
        });
        let (spec, key) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.create_price_tier(&spec).await;

        self.settle(step, key, outcome, |state, tier: &PriceTier| {
            state.record_child_created(ChildKind::PriceTier, tier.id.clone())?;
            Ok(Some(tier.id.clone()))
        })
    }

    /// Create a seat section. Its identifier is not tracked.
    pub async fn create_seat_section(
        &mut self,
        draft: SeatSectionDraft,
    ) -> Result<SeatSection, WizardError> {
        let step = WizardStep::SeatSections;
        let prepared = self.require_show(step).and_then(|_| {
            self.require_step(step)?;
            draft.validate()?;
            let payload = draft.into_payload();
            let key = self.check_duplicate(ResourceKind::SeatSection, &payload)?;
            Ok((payload, key))
        });
        let (payload, key) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.create_seat_section(&payload).await;

        self.settle(step, key, outcome, |state, _section: &SeatSection| {
            state.record_seat_section_created();
            Ok(None)
        })
    }

    /// Activate the show and complete the wizard.
    ///
    /// Requires the publish step and may succeed only once.
    pub async fn publish(&mut self) -> Result<Show, WizardError> {
        let step = WizardStep::Publish;
        let prepared = self.require_show(step).and_then(|show_id| {
            if self.state.is_completed() {
                return Err(WizardError::transition(step, "show is already published"));
            }
            self.require_step(step)?;
            Ok(PublishShow {
                show_id,
                active: true,
            })
        });
        let payload = match prepared {
            Ok(payload) => payload,
            Err(e) => return self.reject(step, e),
        };

        self.log_call(step);
        let outcome = self.gateway.publish_show(&payload).await;

        self.settle(step, None, outcome, |state, show: &Show| {
            state.mark_published()?;
            state.set_show_snapshot(show.clone());
            Ok(Some(show.id.clone()))
        })
    }

    // ------------------------------------------------------------------------
    // Reset / abort
    // ------------------------------------------------------------------------

    /// Clear the session and return to the first step.
    ///
    /// Never calls the gateway: resources created so far stay live remotely.
    pub fn reset_wizard(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            session = %self.id,
            step = %self.state.current_step(),
            "wizard.reset"
        );

        self.state.reset();
        self.navigator().go_to(WizardStep::FIRST);
        self.id = SessionId::new();
    }

    /// Abandon the session according to [`WizardConfig::on_abandon`], then reset.
    ///
    /// With [`AbandonPolicy::Compensate`] tracked resources are deleted newest
    /// first; a failed delete is reported and the remaining deletes still run.
    /// Seat sections are never deleted because their identifiers are not kept.
    pub async fn abandon(&mut self) -> AbandonReport {
        let mut report = AbandonReport::default();

        if self.config.on_abandon == AbandonPolicy::Compensate {
            for (kind, id) in self.state.compensation_order() {
                #[cfg(feature = "tracing")]
                tracing::info!(session = %self.id, %kind, %id, "compensate.start");

                match self.gateway.delete(kind, &id).await {
                    // Already gone remotely: nothing left to undo.
                    Ok(()) | Err(GatewayError {
                        kind: GatewayErrorKind::NotFound,
                        ..
                    }) => {
                        #[cfg(feature = "tracing")]
                        tracing::info!(
                            session = %self.id,
                            %kind,
                            %id,
                            outcome = "deleted",
                            "compensate.end"
                        );

                        report.deleted.push((kind, id));
                    }
                    Err(error) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!(
                            session = %self.id,
                            %kind,
                            %id,
                            error = %error,
                            outcome = "critical",
                            "compensate.end"
                        );

                        report.failed.push(CompensationFailure { kind, id, error });
                    }
                }
            }
        }

        self.reset_wizard();
        report
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn prepare_show(&self, draft: ShowDraft) -> Result<NewShow, WizardError> {
        let step = WizardStep::ShowDetails;
        if self.state.show_id().is_some() {
            return Err(WizardError::transition(step, "show has already been created"));
        }
        self.require_step(step)?;
        draft.validate()?;
        Ok(draft.into_payload(false))
    }

    fn require_show(&self, step: WizardStep) -> Result<ResourceId, WizardError> {
        self.state
            .show_id()
            .cloned()
            .ok_or(WizardError::precondition(step, "show has not been created"))
    }

    /// Creations belong to their own step, so nothing is created behind the pointer.
    fn require_step(&self, step: WizardStep) -> Result<(), WizardError> {
        if self.state.current_step() == step {
            Ok(())
        } else {
            Err(WizardError::precondition(step, "wizard is not on this step"))
        }
    }

    /// Enforce "at least one of `kind` exists" in strict mode; only log in advisory mode.
    fn require_some(
        &self,
        step: WizardStep,
        kind: ChildKind,
        reason: &'static str,
    ) -> Result<(), WizardError> {
        if !self.state.child_ids(kind).is_empty() {
            return Ok(());
        }
        match self.config.preconditions {
            PreconditionMode::Strict => Err(WizardError::precondition(step, reason)),
            PreconditionMode::Advisory => {
                #[cfg(feature = "tracing")]
                tracing::warn!(session = %self.id, step = %step, reason, "step.advisory");

                Ok(())
            }
        }
    }

    /// Fingerprint a create payload and reject it if an identical one already succeeded.
    ///
    /// Returns the fingerprint to remember on success, or `None` when
    /// deduplication is disabled.
    fn check_duplicate<P: Serialize>(
        &self,
        kind: ResourceKind,
        payload: &P,
    ) -> Result<Option<String>, WizardError> {
        if !self.config.deduplicate_submissions {
            return Ok(None);
        }
        let key = match fingerprint(kind, payload) {
            Ok(key) => key,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    session = %self.id,
                    %kind,
                    error = %e,
                    "step.dedupe.skipped"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = e;

                return Ok(None);
            }
        };
        match self.state.fingerprint_hit(&key) {
            Some(existing) => Err(WizardError::DuplicateSubmission {
                kind,
                existing: existing.clone(),
            }),
            None => Ok(Some(key)),
        }
    }

    fn log_call(&self, step: WizardStep) {
        #[cfg(feature = "tracing")]
        tracing::info!(session = %self.id, step = %step, "step.start");
        #[cfg(not(feature = "tracing"))]
        let _ = step;
    }

    fn reject<T>(&mut self, step: WizardStep, err: WizardError) -> Result<T, WizardError> {
        #[cfg(feature = "tracing")]
        self.log_rejection(step, &err);
        #[cfg(not(feature = "tracing"))]
        let _ = step;

        self.state.record_failure(&err);
        Err(err)
    }

    #[cfg(feature = "tracing")]
    fn log_rejection(&self, step: WizardStep, err: &WizardError) {
        match err {
            WizardError::Gateway(e) => tracing::error!(
                session = %self.id,
                step = %step,
                gateway = ?e.kind,
                error = %e,
                outcome = "failed",
                "step.end"
            ),
            other => tracing::warn!(
                session = %self.id,
                step = %step,
                error = %other,
                outcome = "rejected",
                "step.end"
            ),
        }
    }

    /// Fold a resolved gateway call into the state.
    ///
    /// `apply` must either fail before mutating or succeed; it returns the
    /// identifier to associate with the payload fingerprint.
    fn settle<T>(
        &mut self,
        step: WizardStep,
        fingerprint: Option<String>,
        outcome: Result<T, GatewayError>,
        apply: impl FnOnce(&mut WorkflowState, &T) -> Result<Option<ResourceId>, WizardError>,
    ) -> Result<T, WizardError> {
        let value = match outcome {
            Ok(value) => value,
            Err(e) => return self.reject(step, WizardError::Gateway(e)),
        };
        let id = match apply(&mut self.state, &value) {
            Ok(id) => id,
            Err(e) => return self.reject(step, e),
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            session = %self.id,
            step = %step,
            id = id.as_ref().map(ResourceId::as_str),
            outcome = "ok",
            "step.end"
        );

        if let Some(key) = fingerprint {
            self.state.remember_fingerprint(key, id);
        }
        self.state.clear_error();
        Ok(value)
    }
}

/// SHA-256 over the payload's JSON encoding, prefixed with the resource kind.
fn fingerprint<P: Serialize>(
    kind: ResourceKind,
    payload: &P,
) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(format!("{kind}:{:x}", Sha256::digest(&bytes)))
}
