//! Member filter predicates.
//!
//! # Responsibility
//! - Assemble a conjunctive predicate from a sparse search condition.
//! - Render predicates as parameterized SQL over the member/team join.
//! - Evaluate predicates in memory against a projection row.
//!
//! # Invariants
//! - `All([])` is match-all; its SQL form is `1 = 1`.
//! - Filter values only ever reach SQL as bound parameters.
//! - SQL rendering and `matches` agree for every predicate.

use crate::model::condition::MemberSearchCondition;
use crate::model::dto::MemberTeamDto;
use rusqlite::types::Value;

/// Column reference for the member table in joined queries.
pub(crate) const MEMBER_ALIAS: &str = "m";
/// Column reference for the team table in joined queries.
pub(crate) const TEAM_ALIAS: &str = "t";

/// Boolean filter over one member row joined with its team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    UsernameEq(String),
    /// Never matches members without a team.
    TeamNameEq(String),
    AgeGoe(i32),
    AgeLoe(i32),
    /// Inclusive on both ends.
    AgeBetween { min: i32, max: i32 },
    /// Conjunction; empty means match-all.
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn match_all() -> Self {
        Self::All(Vec::new())
    }

    pub fn username_eq(username: impl Into<String>) -> Self {
        Self::UsernameEq(username.into())
    }

    pub fn team_name_eq(team_name: impl Into<String>) -> Self {
        Self::TeamNameEq(team_name.into())
    }

    pub fn age_goe(age: i32) -> Self {
        Self::AgeGoe(age)
    }

    pub fn age_loe(age: i32) -> Self {
        Self::AgeLoe(age)
    }

    pub fn age_between(min: i32, max: i32) -> Self {
        Self::AgeBetween { min, max }
    }

    /// Builds the AND of every present filter in `condition`.
    ///
    /// Blank text filters are skipped like absent ones.
    pub fn from_condition(condition: &MemberSearchCondition) -> Self {
        let clauses = [
            condition.username_filter().map(Self::username_eq),
            condition.team_name_filter().map(Self::team_name_eq),
            condition.age_goe.map(Self::age_goe),
            condition.age_loe.map(Self::age_loe),
        ];
        Self::All(clauses.into_iter().flatten().collect())
    }

    /// Conjunction of `self` and `other`, flattened into one `All`.
    pub fn and(self, other: Predicate) -> Self {
        let mut clauses = self.into_clauses();
        clauses.extend(other.into_clauses());
        Self::All(clauses)
    }

    pub fn is_match_all(&self) -> bool {
        match self {
            Self::All(clauses) => clauses.iter().all(Predicate::is_match_all),
            _ => false,
        }
    }

    /// Whether evaluating this predicate needs the team join.
    pub fn references_team(&self) -> bool {
        match self {
            Self::TeamNameEq(_) => true,
            Self::All(clauses) => clauses.iter().any(Predicate::references_team),
            _ => false,
        }
    }

    /// Evaluates the predicate against an already materialized row.
    pub fn matches(&self, row: &MemberTeamDto) -> bool {
        match self {
            Self::UsernameEq(username) => row.username == *username,
            Self::TeamNameEq(team_name) => row.team_name.as_deref() == Some(team_name.as_str()),
            Self::AgeGoe(age) => row.age >= *age,
            Self::AgeLoe(age) => row.age <= *age,
            Self::AgeBetween { min, max } => (*min..=*max).contains(&row.age),
            Self::All(clauses) => clauses.iter().all(|clause| clause.matches(row)),
        }
    }

    /// Renders this predicate as a SQL boolean expression with `?`
    /// placeholders, returning the expression and its bind values in order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        self.write_sql(&mut sql, &mut binds);
        (sql, binds)
    }

    fn write_sql(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::UsernameEq(username) => {
                sql.push_str(&format!("{MEMBER_ALIAS}.username = ?"));
                binds.push(Value::Text(username.clone()));
            }
            Self::TeamNameEq(team_name) => {
                sql.push_str(&format!("{TEAM_ALIAS}.name = ?"));
                binds.push(Value::Text(team_name.clone()));
            }
            Self::AgeGoe(age) => {
                sql.push_str(&format!("{MEMBER_ALIAS}.age >= ?"));
                binds.push(Value::Integer(i64::from(*age)));
            }
            Self::AgeLoe(age) => {
                sql.push_str(&format!("{MEMBER_ALIAS}.age <= ?"));
                binds.push(Value::Integer(i64::from(*age)));
            }
            Self::AgeBetween { min, max } => {
                sql.push_str(&format!("{MEMBER_ALIAS}.age BETWEEN ? AND ?"));
                binds.push(Value::Integer(i64::from(*min)));
                binds.push(Value::Integer(i64::from(*max)));
            }
            Self::All(clauses) if clauses.is_empty() => sql.push_str("1 = 1"),
            Self::All(clauses) => {
                sql.push('(');
                for (index, clause) in clauses.iter().enumerate() {
                    if index > 0 {
                        sql.push_str(" AND ");
                    }
                    clause.write_sql(sql, binds);
                }
                sql.push(')');
            }
        }
    }

    fn into_clauses(self) -> Vec<Predicate> {
        match self {
            Self::All(clauses) => clauses,
            other => vec![other],
        }
    }
}

impl From<&MemberSearchCondition> for Predicate {
    fn from(condition: &MemberSearchCondition) -> Self {
        Self::from_condition(condition)
    }
}
