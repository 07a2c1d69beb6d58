//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the member/team data-access contracts.
//! - Keep SQL text and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Every repository operation runs exactly one explicit SQL statement
//!   (association loads are a separate, explicit call).
//! - Write paths call `validate()` before SQL mutations.
//! - Strict lookups return `RepoError::NotFound`; lenient lookups return
//!   `Ok(None)`.

pub mod error;
pub mod member_repo;
pub mod paging;
mod schema;
pub mod team_repo;
