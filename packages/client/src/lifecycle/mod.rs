//! Version lifecycle
//!
//! - `manager`: install (pre-warm the static namespace) and activate
//!   (garbage-collect stale namespaces, enable preload, claim clients)
//! - `clients`: which clients are controlled by which version

use std::fmt;

pub mod clients;
pub mod manager;

pub use clients::{ClientId, ClientRegistry};
pub use manager::LifecycleManager;

/// State of one deployed version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Parsed,
    Installing,
    /// Installed, waiting to take over from the active version
    Waiting,
    Activating,
    Active,
    /// Failed to install, or superseded
    Redundant,
}

impl LifecycleState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attempted transition that the current state does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: LifecycleState,
    pub to: LifecycleState,
}
