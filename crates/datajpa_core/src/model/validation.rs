//! Validation errors shared by member and team entities.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons an entity is rejected before it reaches SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// `Member::username` is empty or whitespace only.
    BlankUsername,
    /// `Member::age` is below zero.
    NegativeAge(i32),
    /// `Team::name` is empty or whitespace only.
    BlankTeamName,
    /// A member was linked to a team that has not been saved yet.
    UnsavedTeam(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "member username must not be blank"),
            Self::NegativeAge(age) => write!(f, "member age must be >= 0, got {age}"),
            Self::BlankTeamName => write!(f, "team name must not be blank"),
            Self::UnsavedTeam(name) => {
                write!(f, "team `{name}` must be saved before members can reference it")
            }
        }
    }
}

impl Error for ModelValidationError {}
