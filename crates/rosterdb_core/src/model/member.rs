//! Member and team entities.
//!
//! # Responsibility
//! - Define persisted member/team records and their insert shapes.
//! - Validate field-level invariants before any write.
//!
//! # Invariants
//! - `username` and team `name` are never blank.
//! - `age` is never negative.
//! - A member references at most one team; the team owns no authoritative
//!   member list.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-generated member identifier. Ordering follows insertion order.
pub type MemberId = i64;
/// Storage-generated team identifier.
pub type TeamId = i64;

/// Field-level validation failure for members and teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankUsername,
    NegativeAge(i32),
    BlankTeamName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "username must not be blank"),
            Self::NegativeAge(age) => write!(f, "age must not be negative, got {age}"),
            Self::BlankTeamName => write!(f, "team name must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Persisted team row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_team_name(&self.name)
    }
}

/// Insert shape for a team; the id is generated on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_team_name(&self.name)
    }
}

/// Persisted member row.
///
/// `team_id` is the owning side of the member/team association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl Member {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_member_fields(&self.username, self.age)
    }

    /// Moves this member to `team`, or detaches it when `None`.
    pub fn change_team(&mut self, team: Option<&Team>) {
        self.team_id = team.map(|team| team.id);
    }
}

/// Insert shape for a member; the id is generated on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl NewMember {
    /// Creates a member without a team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: None,
        }
    }

    /// Creates a member already assigned to `team`.
    pub fn with_team(username: impl Into<String>, age: i32, team: &Team) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: Some(team.id),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_member_fields(&self.username, self.age)
    }
}

fn validate_member_fields(username: &str, age: i32) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::BlankUsername);
    }
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    Ok(())
}

fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankTeamName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Member, NewMember, NewTeam, Team, ValidationError};

    #[test]
    fn new_member_rejects_blank_username_and_negative_age() {
        assert_eq!(
            NewMember::new("  ", 10).validate(),
            Err(ValidationError::BlankUsername)
        );
        assert_eq!(
            NewMember::new("member1", -1).validate(),
            Err(ValidationError::NegativeAge(-1))
        );
        assert!(NewMember::new("member1", 0).validate().is_ok());
    }

    #[test]
    fn new_team_rejects_blank_name() {
        assert_eq!(NewTeam::new("").validate(), Err(ValidationError::BlankTeamName));
    }

    #[test]
    fn change_team_sets_and_clears_reference() {
        let team = Team {
            id: 7,
            name: "teamA".to_string(),
        };
        let mut member = Member {
            id: 1,
            username: "member1".to_string(),
            age: 10,
            team_id: None,
        };

        member.change_team(Some(&team));
        assert_eq!(member.team_id, Some(7));

        member.change_team(None);
        assert_eq!(member.team_id, None);
    }
}
