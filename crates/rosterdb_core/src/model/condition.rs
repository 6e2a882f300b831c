//! Sparse member search condition.
//!
//! # Responsibility
//! - Carry the four optional member filters (username, team name, age range).
//! - Parse conditions from compact `key=value` filter expressions.
//!
//! # Invariants
//! - An absent field imposes no constraint.
//! - Blank text filters are treated exactly like absent ones.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static FILTER_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<key>[A-Za-z_]+)\s*=\s*(?:"(?P<quoted>[^"]*)"|(?P<bare>[^\s"]+))"#)
        .expect("valid filter term regex")
});

/// Optional filters applied conjunctively to a member search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberSearchCondition {
    /// Exact username match.
    pub username: Option<String>,
    /// Exact team name match. Members without a team never match.
    pub team_name: Option<String>,
    /// Inclusive lower age bound.
    pub age_goe: Option<i32>,
    /// Inclusive upper age bound.
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    /// Condition with every filter absent (matches all members).
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }

    /// Username filter, `None` when absent or blank.
    pub fn username_filter(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    /// Team name filter, `None` when absent or blank.
    pub fn team_name_filter(&self) -> Option<&str> {
        non_blank(self.team_name.as_deref())
    }

    /// Returns whether no effective filter is present.
    pub fn is_unfiltered(&self) -> bool {
        self.username_filter().is_none()
            && self.team_name_filter().is_none()
            && self.age_goe.is_none()
            && self.age_loe.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Failure to parse a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionParseError {
    /// Text that is not a `key=value` term.
    Malformed(String),
    UnknownKey(String),
    DuplicateKey(String),
    InvalidAge { key: String, value: String },
}

impl Display for ConditionParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(text) => write!(f, "malformed filter term `{text}`"),
            Self::UnknownKey(key) => write!(
                f,
                "unknown filter key `{key}`; expected username|teamName|ageGoe|ageLoe"
            ),
            Self::DuplicateKey(key) => write!(f, "filter key `{key}` given more than once"),
            Self::InvalidAge { key, value } => {
                write!(f, "filter `{key}` expects an integer age, got `{value}`")
            }
        }
    }
}

impl Error for ConditionParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterKey {
    Username,
    TeamName,
    AgeGoe,
    AgeLoe,
}

fn parse_filter_key(key: &str) -> Option<FilterKey> {
    match key {
        "username" | "usernameEq" | "username_eq" => Some(FilterKey::Username),
        "teamName" | "team_name" | "teamNameEq" | "team" => Some(FilterKey::TeamName),
        "ageGoe" | "age_goe" => Some(FilterKey::AgeGoe),
        "ageLoe" | "age_loe" => Some(FilterKey::AgeLoe),
        _ => None,
    }
}

/// Parses `username=member1 teamName=teamB ageGoe=35 ageLoe=40`.
///
/// Values containing spaces must be double-quoted. An empty or blank
/// expression yields the match-all condition.
impl FromStr for MemberSearchCondition {
    type Err = ConditionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut condition = Self::default();
        let mut cursor = 0;

        for captures in FILTER_TERM_RE.captures_iter(input) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            ensure_only_whitespace(&input[cursor..whole.start()])?;
            cursor = whole.end();

            let key = &captures["key"];
            let value = captures
                .name("quoted")
                .or_else(|| captures.name("bare"))
                .map_or("", |m| m.as_str());

            let filter_key =
                parse_filter_key(key).ok_or_else(|| ConditionParseError::UnknownKey(key.to_string()))?;
            let duplicate = match filter_key {
                FilterKey::Username => condition.username.replace(value.to_string()).is_some(),
                FilterKey::TeamName => condition.team_name.replace(value.to_string()).is_some(),
                FilterKey::AgeGoe => condition.age_goe.replace(parse_age(key, value)?).is_some(),
                FilterKey::AgeLoe => condition.age_loe.replace(parse_age(key, value)?).is_some(),
            };
            if duplicate {
                return Err(ConditionParseError::DuplicateKey(key.to_string()));
            }
        }
        ensure_only_whitespace(&input[cursor..])?;

        Ok(condition)
    }
}

fn ensure_only_whitespace(text: &str) -> Result<(), ConditionParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(())
    } else {
        Err(ConditionParseError::Malformed(trimmed.to_string()))
    }
}

fn parse_age(key: &str, value: &str) -> Result<i32, ConditionParseError> {
    value
        .parse::<i32>()
        .map_err(|_| ConditionParseError::InvalidAge {
            key: key.to_string(),
            value: value.to_string(),
        })
}
