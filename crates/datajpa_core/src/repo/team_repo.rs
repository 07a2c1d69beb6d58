//! Team repository contract and SQLite implementation.
//!
//! # Invariants
//! - `team` rows are only written through `save`.
//! - `list_members` reads the inverse side of the member/team relation; it is
//!   never used to change membership.

use crate::model::member::Member;
use crate::model::team::{Team, TeamId};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::member_repo::{parse_member_row, MEMBER_SELECT_SQL};
use crate::repo::schema::{ensure_connection_ready, MEMBER_COLUMNS, TEAM_COLUMNS};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const TEAM_SELECT_SQL: &str = "SELECT team_id, name FROM team";

/// Repository interface for team persistence.
pub trait TeamRepository {
    /// Inserts a new team or updates an existing one; returns it with id set.
    fn save(&self, team: &Team) -> RepoResult<Team>;
    /// Lenient point lookup.
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    /// Members currently referencing `team_id`, ordered by member id.
    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("team", TEAM_COLUMNS), ("member", MEMBER_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save(&self, team: &Team) -> RepoResult<Team> {
        team.validate()?;

        match team.id {
            None => {
                self.conn
                    .execute("INSERT INTO team (name) VALUES (?1);", [team.name.as_str()])?;
                Ok(Team {
                    id: Some(self.conn.last_insert_rowid()),
                    name: team.name.clone(),
                })
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE team SET name = ?1 WHERE team_id = ?2;",
                    params![team.name.as_str(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(EntityRef::Team(Some(id))));
                }
                Ok(team.clone())
            }
        }
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        find_team(self.conn, id)
    }

    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE team_id = ?1
             ORDER BY member_id ASC;"
        ))?;
        let mut rows = stmt.query([team_id])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }
}

/// Loads one team row; shared with the member repository's association loads.
pub(crate) fn find_team(conn: &Connection, id: TeamId) -> RepoResult<Option<Team>> {
    let team = conn
        .query_row(
            &format!("{TEAM_SELECT_SQL} WHERE team_id = ?1;"),
            [id],
            parse_team_row,
        )
        .optional()?;
    Ok(team)
}

fn parse_team_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: Some(row.get("team_id")?),
        name: row.get("name")?,
    })
}
