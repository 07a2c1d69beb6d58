//! Domain model for members and the teams they belong to.
//!
//! # Responsibility
//! - Define the entity structs mapped onto the `member` and `team` tables.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - An entity has `id == None` until its first successful save.
//! - `Member::team_id` is the owning side of the member/team relation.

pub mod member;
pub mod team;
pub mod validation;
