#![deny(missing_docs)]

//! Marquee — a step-by-step orchestrator for creating a show and the resources
//! that hang off it.
//!
//! # Workflow
//!
//! A session walks a fixed sequence of steps:
//!
//! `ShowDetails → Events → Showtimes → Categories → PriceTiers → SeatSections → Publish`
//!
//! Each step turns caller input into one call on a [`ResourceGateway`]. Later
//! steps depend on identifiers produced by earlier ones: an event needs the show,
//! a price tier needs a category. Those identifiers are kept in a
//! [`WorkflowState`] that only grows until the session is reset.
//!
//! # Core Concepts
//!
//! - [`WizardStep`]: The closed, totally ordered set of steps
//! - [`WorkflowState`]: Current step, tracked identifiers, last error, completion
//! - [`Wizard`]: Step operations, navigation, reset and abandonment for one session
//! - [`Navigator`]: Moves the step pointer by one, never undoing created resources
//! - [`ResourceGateway`]: The remote API boundary; [`InMemoryGateway`] for tests
//! - [`SharedWizard`]: A handle that rejects overlapping submissions
//!
//! Gateway failures are never retried automatically. They surface as
//! [`WizardError::Gateway`] and as the state's `last_error`.

// Modules
pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod navigation;
pub mod resource;
pub mod session;
pub mod state;
pub mod step;

// Re-exports for convenience
pub use config::{AbandonPolicy, ConfigError, PreconditionMode, WizardConfig};
pub use error::{ErrorDescriptor, ErrorKind, WizardError};
pub use executor::{AbandonReport, CompensationFailure, Wizard};
pub use gateway::{GatewayError, GatewayErrorKind, GatewayOp, InMemoryGateway, ResourceGateway};
pub use navigation::{AdvancePolicy, Navigator};
pub use resource::{
    Category, CategoryDraft, ChildKind, Event, EventDraft, NewCategory, NewEvent, NewSeatSection,
    NewShow, NewShowtime, PriceTier, PriceTierDraft, PriceTierSpec, PublishShow, ResourceId,
    ResourceKind, SeatSection, SeatSectionDraft, Show, ShowDraft, Showtime, ShowtimeDraft,
};
pub use session::{SessionId, SharedWizard};
pub use state::WorkflowState;
pub use step::WizardStep;

#[cfg(test)]
mod tests;
