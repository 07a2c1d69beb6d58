//! Member/team data access over SQLite.
//!
//! Entities are saved, looked up, paged and bulk-updated through explicit
//! repository contracts; every operation is one hand-written SQL statement.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::member::{Member, MemberId};
pub use model::team::{Team, TeamId};
pub use model::validation::ModelValidationError;
pub use repo::error::{EntityRef, RepoError, RepoResult};
pub use repo::member_repo::{
    MemberRepository, NamedQuery, SqliteMemberRepository, MEMBER_FIND_BY_USERNAME,
};
pub use repo::paging::{Page, PageRequest};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
