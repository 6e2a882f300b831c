#![allow(dead_code)]

use rosterdb_core::{
    Member, MemberRepository, NewMember, NewTeam, SqliteMemberRepository, SqliteTeamRepository,
    Team, TeamRepository,
};
use rusqlite::Connection;

/// Two teams and four members, inserted in id order.
pub struct Fixture {
    pub team_a: Team,
    pub team_b: Team,
    pub members: Vec<Member>,
}

/// Seeds teamA/teamB with member1..member4 aged 10, 20, 30, 40.
pub fn seed_teams_and_members(conn: &Connection) -> Fixture {
    let teams = SqliteTeamRepository::try_new(conn).unwrap();
    let members = SqliteMemberRepository::try_new(conn).unwrap();

    let team_a = teams.save(&NewTeam::new("teamA")).unwrap();
    let team_b = teams.save(&NewTeam::new("teamB")).unwrap();

    let seeded = [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ]
    .into_iter()
    .map(|(username, age, team)| members.save(&NewMember::with_team(username, age, team)).unwrap())
    .collect();

    Fixture {
        team_a,
        team_b,
        members: seeded,
    }
}

pub fn usernames<T>(rows: &[T], username: impl Fn(&T) -> &str) -> Vec<String> {
    rows.iter().map(|row| username(row).to_string()).collect()
}
