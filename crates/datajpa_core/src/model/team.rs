//! Team entity.

use super::validation::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Surrogate key of a `team` row.
pub type TeamId = i64;

/// A named group of members.
///
/// The member collection is not stored here: the relation is owned by
/// `Member::team_id`, and the inverse side is read through
/// `TeamRepository::list_members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<TeamId>,
    pub name: String,
}

impl Team {
    /// Creates an unsaved team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Returns whether this team has been persisted.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankTeamName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Team;
    use crate::model::validation::ModelValidationError;

    #[test]
    fn new_team_is_unsaved() {
        let team = Team::new("teamA");
        assert_eq!(team.id, None);
        assert!(!team.is_persisted());
        assert!(team.validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            Team::new("  ").validate(),
            Err(ModelValidationError::BlankTeamName)
        );
    }
}
