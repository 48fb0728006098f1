//! Navigation controller: moves the current-step pointer by one in either direction.
//!
//! Navigation never touches created resources. Retreating keeps every tracked
//! identifier; only a reset clears them. Once the wizard is completed the pointer
//! is frozen on the terminal step.

use serde::{Deserialize, Serialize};

use crate::state::WorkflowState;
use crate::step::WizardStep;

/// When `advance` is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Only once the current step has produced what later steps depend on:
    /// the show, at least one event, at least one category.
    #[default]
    RequirePrerequisites,
    /// Whenever the caller asks.
    Free,
}

/// Whether leaving `step` keeps every later precondition satisfiable.
fn prerequisites_met(state: &WorkflowState, step: WizardStep) -> bool {
    match step {
        WizardStep::ShowDetails => state.show_id().is_some(),
        WizardStep::Events => !state.event_ids().is_empty(),
        WizardStep::Categories => !state.category_ids().is_empty(),
        _ => true,
    }
}

/// Step pointer operations over a borrowed [`WorkflowState`].
#[derive(Debug)]
pub struct Navigator<'a> {
    state: &'a mut WorkflowState,
    policy: AdvancePolicy,
}

impl<'a> Navigator<'a> {
    /// Navigate `state` under `policy`.
    pub fn new(state: &'a mut WorkflowState, policy: AdvancePolicy) -> Self {
        Self { state, policy }
    }

    /// The current step.
    pub fn current(&self) -> WizardStep {
        self.state.current_step()
    }

    /// Move to the next step.
    ///
    /// Returns `false` without changing anything at the terminal step, after
    /// completion, or when the policy finds the current step's prerequisites missing.
    pub fn advance(&mut self) -> bool {
        let from = self.state.current_step();
        if self.state.is_completed() {
            return false;
        }
        let Some(to) = from.next() else {
            return false;
        };
        let gated = self.policy == AdvancePolicy::RequirePrerequisites;
        if gated && !prerequisites_met(self.state, from) {
            #[cfg(feature = "tracing")]
            tracing::debug!(step = %from, "nav.advance.blocked");
            return false;
        }
        self.state.set_current_step(to);

        #[cfg(feature = "tracing")]
        tracing::debug!(from = %from, to = %to, "nav.advance");

        true
    }

    /// Move to the previous step.
    ///
    /// Returns `false` at the initial step or after completion.
    pub fn retreat(&mut self) -> bool {
        let from = self.state.current_step();
        if self.state.is_completed() {
            return false;
        }
        let Some(to) = from.prev() else {
            return false;
        };
        self.state.set_current_step(to);

        #[cfg(feature = "tracing")]
        tracing::debug!(from = %from, to = %to, "nav.retreat");

        true
    }

    /// Jump to `step`. Meant for re-entering the wizard at its start.
    ///
    /// Refused after completion, except as a no-op onto the terminal step.
    pub fn go_to(&mut self, step: WizardStep) -> bool {
        if self.state.is_completed() && step != WizardStep::LAST {
            return false;
        }
        self.state.set_current_step(step);
        true
    }

    /// Whether the pointer is on the initial step.
    pub fn is_first(&self) -> bool {
        self.state.is_first()
    }

    /// Whether the pointer is on the terminal step.
    pub fn is_last(&self) -> bool {
        self.state.is_last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ChildKind;

    #[test]
    fn retreat_at_first_step_is_refused() {
        let mut state = WorkflowState::new();
        let mut nav = Navigator::new(&mut state, AdvancePolicy::Free);
        assert!(nav.is_first());
        assert!(!nav.retreat());
        assert_eq!(nav.current(), WizardStep::ShowDetails);
    }

    #[test]
    fn advance_at_last_step_is_refused() {
        let mut state = WorkflowState::new();
        let mut nav = Navigator::new(&mut state, AdvancePolicy::Free);
        while nav.advance() {}
        assert!(nav.is_last());
        assert_eq!(nav.current(), WizardStep::Publish);
        assert!(!nav.advance());
        assert_eq!(nav.current(), WizardStep::Publish);
    }

    #[test]
    fn free_policy_walks_every_step() {
        let mut state = WorkflowState::new();
        let mut nav = Navigator::new(&mut state, AdvancePolicy::Free);
        let mut visited = vec![nav.current()];
        while nav.advance() {
            visited.push(nav.current());
        }
        assert_eq!(visited, WizardStep::ALL);

        while nav.retreat() {}
        assert!(nav.is_first());
    }

    #[test]
    fn prerequisites_gate_advance() {
        let policy = AdvancePolicy::RequirePrerequisites;
        let mut state = WorkflowState::new();
        assert!(!Navigator::new(&mut state, policy).advance());
        assert_eq!(state.current_step(), WizardStep::ShowDetails);

        state
            .record_show_created("show-1".into())
            .expect("record show");
        assert!(Navigator::new(&mut state, policy).advance());
        assert_eq!(state.current_step(), WizardStep::Events);

        assert!(!Navigator::new(&mut state, policy).advance());
        state
            .record_child_created(ChildKind::Event, "event-2".into())
            .expect("record event");
        assert!(Navigator::new(&mut state, policy).advance());

        // Showtimes are optional.
        assert!(Navigator::new(&mut state, policy).advance());
        assert_eq!(state.current_step(), WizardStep::Categories);
        assert!(!Navigator::new(&mut state, policy).advance());
    }

    #[test]
    fn completed_wizard_is_frozen() {
        let mut state = WorkflowState::new();
        state
            .record_show_created("show-1".into())
            .expect("record show");
        state.set_current_step(WizardStep::Publish);
        state.mark_published().expect("publish");

        let mut nav = Navigator::new(&mut state, AdvancePolicy::Free);
        assert!(!nav.retreat());
        assert!(!nav.go_to(WizardStep::ShowDetails));
        assert_eq!(nav.current(), WizardStep::Publish);
    }
}
