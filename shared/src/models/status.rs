//! Order status registry and transition policy

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named lifecycle state from the status registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: Uuid,
    pub name: String,
}

/// Statuses every deployment is seeded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownStatus {
    Created,
    InProgress,
    Completed,
    Failed,
}

impl WellKnownStatus {
    pub const ALL: [WellKnownStatus; 4] = [
        WellKnownStatus::Created,
        WellKnownStatus::InProgress,
        WellKnownStatus::Completed,
        WellKnownStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WellKnownStatus::Created => "Created",
            WellKnownStatus::InProgress => "InProgress",
            WellKnownStatus::Completed => "Completed",
            WellKnownStatus::Failed => "Failed",
        }
    }

    pub fn matches(&self, status: &OrderStatus) -> bool {
        status.name == self.as_str()
    }
}

impl fmt::Display for WellKnownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive status name comparison used by the list-by-status filter
pub fn status_names_match(stored: &str, requested: &str) -> bool {
    stored.to_lowercase() == requested.to_lowercase()
}

/// In-process view of the status registry
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    statuses: Vec<OrderStatus>,
}

impl StatusRegistry {
    /// Registry holding the four well-known statuses with fresh ids
    pub fn seeded() -> Self {
        let mut registry = Self::default();
        for status in WellKnownStatus::ALL {
            registry.register(status.as_str());
        }
        registry
    }

    /// Register a status name, returning the existing id when the exact name is already known
    pub fn register(&mut self, name: impl Into<String>) -> Uuid {
        let name = name.into();
        if let Some(existing) = self.find_status_exact(&name) {
            return existing.id;
        }
        let id = Uuid::new_v4();
        self.statuses.push(OrderStatus { id, name });
        id
    }

    pub fn all(&self) -> &[OrderStatus] {
        &self.statuses
    }

    pub fn by_id(&self, id: Uuid) -> Option<&OrderStatus> {
        self.statuses.iter().find(|status| status.id == id)
    }

    /// Lookup used for status transition targets and the "Created" default
    pub fn find_status_exact(&self, name: &str) -> Option<&OrderStatus> {
        self.statuses.iter().find(|status| status.name == name)
    }

    /// Lookup used when filtering orders by status
    pub fn find_status_case_insensitive(&self, name: &str) -> Option<&OrderStatus> {
        self.statuses
            .iter()
            .find(|status| status_names_match(&status.name, name))
    }
}

/// Decides whether an order may move between two registered statuses.
///
/// The store only checks that the order and the target status exist; any
/// workflow restriction belongs to a policy.
pub trait TransitionPolicy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn allows(&self, from: &OrderStatus, to: &OrderStatus) -> bool;
}

/// Every status may be set from every other status
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyTransition;

impl TransitionPolicy for AnyTransition {
    fn name(&self) -> &'static str {
        "any"
    }

    fn allows(&self, _from: &OrderStatus, _to: &OrderStatus) -> bool {
        true
    }
}

/// Completed orders stay completed; re-setting "Completed" is still allowed
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletedIsFinal;

impl TransitionPolicy for CompletedIsFinal {
    fn name(&self) -> &'static str {
        "completed_is_final"
    }

    fn allows(&self, from: &OrderStatus, to: &OrderStatus) -> bool {
        !WellKnownStatus::Completed.matches(from) || from.id == to.id
    }
}
