//! Domain model for members, teams and their read projections.
//!
//! # Responsibility
//! - Define the persisted entity shapes and their validation rules.
//! - Define transient query inputs (search condition, page request) and
//!   outputs (member/team projection, page).
//!
//! # Invariants
//! - Entity ids are assigned by storage and never reused.
//! - Projections and conditions are never persisted.

pub mod condition;
pub mod dto;
pub mod member;
pub mod page;
