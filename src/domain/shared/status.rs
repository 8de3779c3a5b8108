use serde::{Deserialize, Serialize};

/// Soft-delete status shared by clients, suppliers and products
///
/// # Status Transitions
/// ```text
/// Active <-> Inactive
///    \         /
///     Archived ---> Active
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lifecycle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Visible and selectable everywhere
    Active,
    /// Kept in listings but not offered for new documents
    Inactive,
    /// Hidden from default listings; can be restored
    Archived,
}

impl LifecycleStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// Staying in the same status is always allowed.
    ///
    /// # Example
    /// ```
    /// use comptoir_api::domain::shared::status::LifecycleStatus;
    ///
    /// assert!(LifecycleStatus::Active.can_transition_to(LifecycleStatus::Archived));
    /// assert!(!LifecycleStatus::Archived.can_transition_to(LifecycleStatus::Inactive));
    /// ```
    pub fn can_transition_to(&self, next: LifecycleStatus) -> bool {
        use LifecycleStatus::*;
        *self == next
            || matches!(
                (self, next),
                (Active, Inactive)
                    | (Inactive, Active)
                    | (Active, Archived)
                    | (Inactive, Archived)
                    | (Archived, Active)
            )
    }

    /// Applies a transition, returning `Ok(false)` when nothing changed
    pub fn transition(&mut self, next: LifecycleStatus) -> Result<bool, String> {
        if !self.can_transition_to(next) {
            return Err(format!(
                "Transition de statut impossible : {} vers {}",
                self, next
            ));
        }
        let changed = *self != next;
        *self = next;
        Ok(changed)
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleStatus::Active => write!(f, "active"),
            LifecycleStatus::Inactive => write!(f, "inactive"),
            LifecycleStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Body of the status-change endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusInput {
    pub status: Option<LifecycleStatus>,
}
