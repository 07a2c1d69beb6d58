//! Member entity.
//!
//! # Invariants
//! - `username` is never blank and `age` is never negative once validated.
//! - `team_id`, when set, must name a persisted team. The database enforces
//!   the foreign key; `change_team` rejects unsaved teams up front.

use super::team::{Team, TeamId};
use super::validation::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Surrogate key of a `member` row.
pub type MemberId = i64;

/// A person with an optional many-to-one link to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// `None` until the first save assigns the row id.
    pub id: Option<MemberId>,
    pub username: String,
    pub age: i32,
    /// Owning side of the member/team relation. Load the team itself with
    /// `MemberRepository::team_of`.
    pub team_id: Option<TeamId>,
}

impl Member {
    /// Creates an unsaved member with age `0` and no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    /// Creates an unsaved member with the given age and no team.
    pub fn with_age(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team_id: None,
        }
    }

    /// Creates an unsaved member already linked to `team`.
    pub fn with_team(
        username: impl Into<String>,
        age: i32,
        team: &Team,
    ) -> Result<Self, ModelValidationError> {
        let mut member = Self::with_age(username, age);
        member.change_team(team)?;
        Ok(member)
    }

    /// Moves this member to `team`.
    ///
    /// Only the owning side changes; nothing is written until the member is
    /// saved again.
    pub fn change_team(&mut self, team: &Team) -> Result<(), ModelValidationError> {
        let team_id = team
            .id
            .ok_or_else(|| ModelValidationError::UnsavedTeam(team.name.clone()))?;
        self.team_id = Some(team_id);
        Ok(())
    }

    /// Drops the team link.
    pub fn leave_team(&mut self) {
        self.team_id = None;
    }

    /// Returns whether this member has been persisted.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.username.trim().is_empty() {
            return Err(ModelValidationError::BlankUsername);
        }
        if self.age < 0 {
            return Err(ModelValidationError::NegativeAge(self.age));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Member;
    use crate::model::team::Team;
    use crate::model::validation::ModelValidationError;

    #[test]
    fn new_member_defaults() {
        let member = Member::new("memberA");
        assert_eq!(member.id, None);
        assert_eq!(member.age, 0);
        assert_eq!(member.team_id, None);
        assert!(member.validate().is_ok());
    }

    #[test]
    fn change_team_requires_saved_team() {
        let mut member = Member::with_age("memberA", 10);
        let unsaved = Team::new("teamA");
        assert_eq!(
            member.change_team(&unsaved),
            Err(ModelValidationError::UnsavedTeam("teamA".to_string()))
        );

        let saved = Team {
            id: Some(7),
            name: "teamA".to_string(),
        };
        member.change_team(&saved).unwrap();
        assert_eq!(member.team_id, Some(7));

        member.leave_team();
        assert_eq!(member.team_id, None);
    }

    #[test]
    fn validate_rejects_blank_username_and_negative_age() {
        assert_eq!(
            Member::with_age(" ", 10).validate(),
            Err(ModelValidationError::BlankUsername)
        );
        assert_eq!(
            Member::with_age("memberA", -1).validate(),
            Err(ModelValidationError::NegativeAge(-1))
        );
    }

    #[test]
    fn member_serializes_with_nullable_team() {
        let member = Member::with_age("memberA", 10);
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["username"], "memberA");
        assert!(json["team_id"].is_null());
    }
}
