//! Dynamic member search.
//!
//! # Responsibility
//! - Turn sparse search conditions into conjunctive predicates.
//! - Execute joined member/team projections as lists or pages.

pub mod member_query;
pub mod predicate;
