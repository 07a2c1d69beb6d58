//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/delete, filtered queries, paging and the bulk age
//!   update over the `member` table.
//! - Keep a per-repository persistence context (identity map) of loaded
//!   members.
//!
//! # Invariants
//! - A member id maps to at most one managed copy. Queries return the managed
//!   copy when one exists, so a copy goes stale if the row changes behind it.
//! - `bulk_age_plus` clears the persistence context after the update; no copy
//!   loaded before the update is ever returned afterwards.
//! - Paging order is `member_id ASC`.

use crate::model::member::{Member, MemberId};
use crate::model::team::Team;
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::paging::{Page, PageRequest};
use crate::repo::schema::{ensure_connection_ready, MEMBER_COLUMNS, TEAM_COLUMNS};
use crate::repo::team_repo::find_team;
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{named_params, params, params_from_iter, Connection, OptionalExtension, Row};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub(crate) const MEMBER_SELECT_SQL: &str = "SELECT
    member_id,
    username,
    age,
    team_id
FROM member";

/// SQL registered under a stable name and compiled once per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Exact username match, `member_id ASC`.
pub const MEMBER_FIND_BY_USERNAME: NamedQuery = NamedQuery {
    name: "Member.findByUsername",
    sql: "SELECT
        member_id,
        username,
        age,
        team_id
    FROM member
    WHERE username = :username
    ORDER BY member_id ASC;",
};

/// Repository interface for member persistence and queries.
pub trait MemberRepository {
    /// Inserts when `member.id` is `None`, otherwise updates that row.
    /// Returns the saved member with its id populated.
    fn save(&self, member: &Member) -> RepoResult<Member>;
    /// Lenient point lookup: `Ok(None)` when the row does not exist.
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Strict point lookup: `RepoError::NotFound` when the row does not exist.
    fn find(&self, id: MemberId) -> RepoResult<Member>;
    fn find_all(&self) -> RepoResult<Vec<Member>>;
    /// Deletes the member's row; a missing row is `RepoError::NotFound`.
    fn delete(&self, member: &Member) -> RepoResult<()>;
    fn total_count(&self) -> RepoResult<i64>;
    fn total_count_by_age(&self, age: i32) -> RepoResult<i64>;
    /// `username = ? AND age > ?`.
    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        min_age: i32,
    ) -> RepoResult<Vec<Member>>;
    /// Runs the `Member.findByUsername` named query.
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
    /// Members of exactly `age`, skipping `offset` rows and returning at most
    /// `limit`, ordered by member id.
    fn find_by_page(&self, age: i32, offset: u64, limit: u32) -> RepoResult<Vec<Member>>;
    /// Page-number based variant of `find_by_page` with totals.
    fn find_page_by_age(&self, age: i32, request: PageRequest) -> RepoResult<Page<Member>>;
    /// Adds one to the age of every member aged `threshold` or older in a
    /// single statement; returns the number of rows changed. Members already
    /// at `i32::MAX` are skipped and not counted.
    fn bulk_age_plus(&self, threshold: i32) -> RepoResult<usize>;
    /// Loads the team referenced by `member`, if any.
    fn team_of(&self, member: &Member) -> RepoResult<Option<Team>>;
    /// Loads a member together with its team in one query. The team always
    /// matches the `team_id` of the returned (possibly managed) member.
    fn find_with_team(&self, id: MemberId) -> RepoResult<Option<(Member, Option<Team>)>>;
    /// Drops every managed copy; later reads go to the database.
    fn clear(&self);
}

/// SQLite-backed member repository with its own persistence context.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
    context: RefCell<BTreeMap<MemberId, Member>>,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("team", TEAM_COLUMNS), ("member", MEMBER_COLUMNS)])?;
        Ok(Self {
            conn,
            context: RefCell::new(BTreeMap::new()),
        })
    }

    /// Number of members currently managed by the persistence context.
    pub fn cached_len(&self) -> usize {
        self.context.borrow().len()
    }

    /// Returns whether `id` has a managed copy.
    pub fn is_managed(&self, id: MemberId) -> bool {
        self.context.borrow().contains_key(&id)
    }

    fn manage(&self, loaded: Member) -> Member {
        let Some(id) = loaded.id else {
            return loaded;
        };
        self.context
            .borrow_mut()
            .entry(id)
            .or_insert(loaded)
            .clone()
    }

    fn query_members(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(self.manage(parse_member_row(row)?));
        }
        Ok(members)
    }

    fn count(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row(sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &Member) -> RepoResult<Member> {
        member.validate()?;

        let saved = match member.id {
            None => {
                self.conn.execute(
                    "INSERT INTO member (username, age, team_id) VALUES (?1, ?2, ?3);",
                    params![member.username.as_str(), member.age, member.team_id],
                )?;
                Member {
                    id: Some(self.conn.last_insert_rowid()),
                    ..member.clone()
                }
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE member
                     SET
                        username = ?1,
                        age = ?2,
                        team_id = ?3
                     WHERE member_id = ?4;",
                    params![member.username.as_str(), member.age, member.team_id, id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(EntityRef::Member(Some(id))));
                }
                member.clone()
            }
        };

        if let Some(id) = saved.id {
            self.context.borrow_mut().insert(id, saved.clone());
        }
        Ok(saved)
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        if let Some(managed) = self.context.borrow().get(&id) {
            return Ok(Some(managed.clone()));
        }

        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE member_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.manage(parse_member_row(row)?)));
        }

        Ok(None)
    }

    fn find(&self, id: MemberId) -> RepoResult<Member> {
        self.find_by_id(id)?
            .ok_or(RepoError::NotFound(EntityRef::Member(Some(id))))
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("{MEMBER_SELECT_SQL} ORDER BY member_id ASC;"),
            Vec::new(),
        )
    }

    fn delete(&self, member: &Member) -> RepoResult<()> {
        let id = member
            .id
            .ok_or(RepoError::NotFound(EntityRef::Member(None)))?;

        let changed = self
            .conn
            .execute("DELETE FROM member WHERE member_id = ?1;", [id])?;
        self.context.borrow_mut().remove(&id);

        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Member(Some(id))));
        }
        Ok(())
    }

    fn total_count(&self) -> RepoResult<i64> {
        self.count("SELECT COUNT(*) FROM member;", Vec::new())
    }

    fn total_count_by_age(&self, age: i32) -> RepoResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM member WHERE age = ?1;",
            vec![Value::Integer(i64::from(age))],
        )
    }

    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        min_age: i32,
    ) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!(
                "{MEMBER_SELECT_SQL}
                 WHERE username = ?1
                   AND age > ?2
                 ORDER BY member_id ASC;"
            ),
            vec![
                Value::Text(username.to_string()),
                Value::Integer(i64::from(min_age)),
            ],
        )
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare_cached(MEMBER_FIND_BY_USERNAME.sql)?;
        let mut rows = stmt.query(named_params! { ":username": username })?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(self.manage(parse_member_row(row)?));
        }
        debug!(
            "event=named_query module=repo status=ok query={} rows={}",
            MEMBER_FIND_BY_USERNAME.name,
            members.len()
        );
        Ok(members)
    }

    fn find_by_page(&self, age: i32, offset: u64, limit: u32) -> RepoResult<Vec<Member>> {
        let offset = i64::try_from(offset)
            .map_err(|_| RepoError::InvalidData(format!("page offset {offset} is too large")))?;
        self.query_members(
            &format!(
                "{MEMBER_SELECT_SQL}
                 WHERE age = ?1
                 ORDER BY member_id ASC
                 LIMIT ?2 OFFSET ?3;"
            ),
            vec![
                Value::Integer(i64::from(age)),
                Value::Integer(i64::from(limit)),
                Value::Integer(offset),
            ],
        )
    }

    fn find_page_by_age(&self, age: i32, request: PageRequest) -> RepoResult<Page<Member>> {
        let content = self.find_by_page(age, request.offset(), request.limit())?;
        let total = self.total_count_by_age(age)?;
        let total = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))?;
        Ok(Page::new(content, request, total))
    }

    fn bulk_age_plus(&self, threshold: i32) -> RepoResult<usize> {
        // Rows already at `i32::MAX` are left as they are; one more would no
        // longer map back to `Member::age`.
        let affected = self.conn.execute(
            "UPDATE member
             SET age = age + 1
             WHERE age >= ?1
               AND age < ?2;",
            [threshold, i32::MAX],
        )?;
        info!(
            "event=bulk_update module=repo status=ok table=member threshold={threshold} affected={affected}"
        );
        self.clear();
        Ok(affected)
    }

    fn team_of(&self, member: &Member) -> RepoResult<Option<Team>> {
        let Some(team_id) = member.team_id else {
            return Ok(None);
        };
        match find_team(self.conn, team_id)? {
            Some(team) => Ok(Some(team)),
            None => Err(RepoError::InvalidData(format!(
                "member.team_id `{team_id}` references a missing team"
            ))),
        }
    }

    fn find_with_team(&self, id: MemberId) -> RepoResult<Option<(Member, Option<Team>)>> {
        let loaded = self
            .conn
            .query_row(
                "SELECT
                    m.member_id,
                    m.username,
                    m.age,
                    m.team_id,
                    t.name AS team_name
                 FROM member m
                 LEFT JOIN team t ON t.team_id = m.team_id
                 WHERE m.member_id = ?1;",
                [id],
                |row| {
                    let member = read_member(row)?;
                    let team_name: Option<String> = row.get("team_name")?;
                    Ok((member, team_name))
                },
            )
            .optional()?;

        let Some((member, team_name)) = loaded else {
            return Ok(None);
        };
        check_persisted_member(&member)?;

        let joined_team_id = member.team_id;
        let member = self.manage(member);
        if member.team_id != joined_team_id {
            // The managed copy wins; resolve the team it points at.
            let team = self.team_of(&member)?;
            return Ok(Some((member, team)));
        }

        let team = match (joined_team_id, team_name) {
            (Some(team_id), Some(name)) => Some(Team {
                id: Some(team_id),
                name,
            }),
            (Some(team_id), None) => {
                return Err(RepoError::InvalidData(format!(
                    "member.team_id `{team_id}` references a missing team"
                )));
            }
            (None, _) => None,
        };

        Ok(Some((member, team)))
    }

    fn clear(&self) {
        let evicted = {
            let mut context = self.context.borrow_mut();
            let evicted = context.len();
            context.clear();
            evicted
        };
        debug!("event=context_clear module=repo status=ok entity=member evicted={evicted}");
    }
}

/// Maps one `MEMBER_SELECT_SQL` row and rejects invalid persisted state.
pub(crate) fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let member = read_member(row)?;
    check_persisted_member(&member)?;
    Ok(member)
}

fn read_member(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: Some(row.get("member_id")?),
        username: row.get("username")?,
        age: row.get("age")?,
        team_id: row.get("team_id")?,
    })
}

fn check_persisted_member(member: &Member) -> RepoResult<()> {
    member.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "member row {}: {err}",
            member.id.unwrap_or_default()
        ))
    })
}
