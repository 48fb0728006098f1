//! The fixed, ordered sequence of wizard steps.
//!
//! Steps form a closed total order. Navigation is index arithmetic over
//! [`WizardStep::ALL`]; nothing compares step names.

use serde::{Deserialize, Serialize};

/// One stage of the wizard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Create or edit the show itself. Initial step.
    #[default]
    ShowDetails,
    /// Add dated runs.
    Events,
    /// Add start times to events.
    Showtimes,
    /// Add seating categories.
    Categories,
    /// Price the categories.
    PriceTiers,
    /// Lay out seats.
    SeatSections,
    /// Activate the show. Terminal step.
    Publish,
}

impl WizardStep {
    /// Every step, in wizard order.
    pub const ALL: [WizardStep; 7] = [
        Self::ShowDetails,
        Self::Events,
        Self::Showtimes,
        Self::Categories,
        Self::PriceTiers,
        Self::SeatSections,
        Self::Publish,
    ];

    /// The initial step.
    pub const FIRST: WizardStep = Self::ShowDetails;

    /// The terminal step.
    pub const LAST: WizardStep = Self::Publish;

    /// Zero-based position in [`WizardStep::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Step at the given position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following step, or `None` at the terminal step.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, or `None` at the initial step.
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowDetails => "show_details",
            Self::Events => "events",
            Self::Showtimes => "showtimes",
            Self::Categories => "categories",
            Self::PriceTiers => "price_tiers",
            Self::SeatSections => "seat_sections",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
