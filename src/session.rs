//! Session identity and a shareable, single-submission wizard handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::executor::Wizard;
use crate::gateway::ResourceGateway;

/// Unique identifier for a wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A [`Wizard`] that several tasks can hold.
///
/// Only one holder may drive the wizard at a time. [`SharedWizard::begin`] does
/// not wait: a second submission while one is in flight (a double click, say)
/// fails with [`WizardError::Busy`] instead of queueing another gateway call.
pub struct SharedWizard<G: ?Sized> {
    inner: Arc<Mutex<Wizard<G>>>,
}

impl<G: ?Sized> Clone for SharedWizard<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G> SharedWizard<G>
where
    G: ResourceGateway + ?Sized,
{
    /// Wrap an existing wizard.
    pub fn new(wizard: Wizard<G>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wizard)),
        }
    }

    /// Enter a new wizard session with the given policies.
    pub fn enter(gateway: Arc<G>, config: WizardConfig) -> Self {
        Self::new(Wizard::with_config(gateway, config))
    }

    /// Take exclusive control for one submission.
    ///
    /// The guard dereferences to the [`Wizard`]; release it by dropping it.
    pub fn begin(&self) -> Result<OwnedMutexGuard<Wizard<G>>, WizardError> {
        Arc::clone(&self.inner).try_lock_owned().map_err(|_| {
            #[cfg(feature = "tracing")]
            tracing::warn!("wizard.busy");

            WizardError::Busy
        })
    }

    /// Wait for exclusive control, for callers that do want to queue.
    pub async fn wait(&self) -> OwnedMutexGuard<Wizard<G>> {
        Arc::clone(&self.inner).lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;

    #[test]
    fn session_id_display() {
        let id = SessionId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn session_ids_differ() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[tokio::test]
    async fn second_begin_is_busy_until_release() {
        let shared = SharedWizard::enter(Arc::new(InMemoryGateway::new()), WizardConfig::default());

        let guard = shared.begin().expect("first holder");
        assert!(matches!(shared.clone().begin(), Err(WizardError::Busy)));

        drop(guard);
        assert!(shared.begin().is_ok());
    }
}
