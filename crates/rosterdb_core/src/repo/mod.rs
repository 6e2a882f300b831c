//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define entity-level data access contracts for members and teams.
//! - Isolate SQLite statements from service orchestration.
//!
//! # Invariants
//! - Repository writes validate entities before persistence.
//! - Single-entity lookups return `Option`; `NotFound` is reserved for
//!   mutations addressing a missing id.

pub mod member_repo;
pub mod team_repo;
