//! Repository error and result types.

use crate::db::DbError;
use crate::model::member::MemberId;
use crate::model::team::TeamId;
use crate::model::validation::ModelValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifies the entity an operation could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// `None` means the caller passed a member that was never saved.
    Member(Option<MemberId>),
    Team(Option<TeamId>),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member(Some(id)) => write!(f, "member {id}"),
            Self::Member(None) => write!(f, "unsaved member"),
            Self::Team(Some(id)) => write!(f, "team {id}"),
            Self::Team(None) => write!(f, "unsaved team"),
        }
    }
}

/// Error for member/team persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed `validate()` before any SQL ran.
    Validation(ModelValidationError),
    /// SQLite failure, including constraint violations on save.
    Db(DbError),
    /// Strict lookup, update or delete targeted a row that does not exist.
    NotFound(EntityRef),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be mapped back to a valid entity.
    InvalidData(String),
}

impl RepoError {
    /// Returns whether this error came from a violated database constraint
    /// (duplicate key, broken foreign key, CHECK).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Db(err) => err.is_constraint_violation(),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityRef, RepoError};

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            RepoError::NotFound(EntityRef::Member(Some(3))).to_string(),
            "member 3 not found"
        );
        assert_eq!(
            RepoError::NotFound(EntityRef::Member(None)).to_string(),
            "unsaved member not found"
        );
        assert_eq!(
            RepoError::NotFound(EntityRef::Team(Some(1))).to_string(),
            "team 1 not found"
        );
    }
}
