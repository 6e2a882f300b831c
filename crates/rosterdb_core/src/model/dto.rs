//! Member/team read projection.

use crate::model::member::{MemberId, TeamId};
use serde::{Deserialize, Serialize};

/// One member row joined with its (optional) team.
///
/// Members without a team still produce a projection with `team_id` and
/// `team_name` set to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamDto {
    pub member_id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}
