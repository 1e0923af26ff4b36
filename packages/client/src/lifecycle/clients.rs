//! Client registry
//!
//! Tracks each connected client and the version that controls it. A client
//! is uncontrolled until it navigates under an active version or a new
//! version claims it during activation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Opaque identifier of a connected client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<ClientId, Option<String>>,
    next_id: AtomicU64,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client, optionally already controlled by `controller`
    pub fn connect(&self, controller: Option<String>) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.clients.insert(id, controller);
        tracing::debug!(target: "cachegate::registration", client = %id, "Client connected");
        id
    }

    /// Version controlling `id`, if any
    #[must_use]
    pub fn controller(&self, id: ClientId) -> Option<String> {
        self.clients.get(&id).and_then(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn is_controlled_by(&self, id: ClientId, version: &str) -> bool {
        self.clients
            .get(&id)
            .is_some_and(|entry| entry.value().as_deref() == Some(version))
    }

    /// Put a connected client under `version`; returns false for unknown clients
    pub fn control(&self, id: ClientId, version: &str) -> bool {
        match self.clients.get_mut(&id) {
            Some(mut entry) => {
                *entry = Some(version.to_string());
                true
            }
            None => false,
        }
    }

    /// Take control of every connected client not already under `version`
    ///
    /// Returns how many clients changed controller.
    pub fn claim(&self, version: &str) -> usize {
        let mut claimed = 0;
        for mut entry in self.clients.iter_mut() {
            if entry.value().as_deref() != Some(version) {
                *entry.value_mut() = Some(version.to_string());
                claimed += 1;
            }
        }
        tracing::info!(target: "cachegate::registration", version, claimed, "Clients claimed");
        claimed
    }

    pub fn disconnect(&self, id: ClientId) -> bool {
        self.clients.remove(&id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_moves_every_client_to_new_version() {
        let registry = ClientRegistry::new();
        let fresh = registry.connect(None);
        let old = registry.connect(Some("v1".to_string()));
        let current = registry.connect(Some("v2".to_string()));

        assert_eq!(registry.claim("v2"), 2);
        for id in [fresh, old, current] {
            assert!(registry.is_controlled_by(id, "v2"));
        }
    }

    #[test]
    fn disconnected_client_cannot_be_controlled() {
        let registry = ClientRegistry::new();
        let id = registry.connect(None);

        assert!(registry.disconnect(id));
        assert!(!registry.control(id, "v1"));
        assert_eq!(registry.controller(id), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_distinct() {
        let registry = ClientRegistry::new();
        let a = registry.connect(None);
        let b = registry.connect(None);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
