//! Team repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Team names are not unique; `find_by_name` may return several teams.
//! - A team cannot be deleted while members still reference it.
//! - `list_members` is a read-only view of the inverse side of the
//!   member/team association.

use crate::db::ensure_schema_ready;
use crate::model::member::{Member, NewTeam, Team, TeamId};
use crate::repo::member_repo::{parse_member_row, RepoError, RepoResult, MEMBER_SELECT_SQL};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TEAM_SELECT_SQL: &str = "SELECT team_id, name FROM teams";

/// Repository interface for team persistence.
pub trait TeamRepository {
    /// Inserts `team` and returns it with its generated id.
    fn save(&self, team: &NewTeam) -> RepoResult<Team>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Team>>;
    fn find_all(&self) -> RepoResult<Vec<Team>>;
    /// Members currently assigned to `team_id`, in id order.
    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
    fn delete_team(&self, id: TeamId) -> RepoResult<()>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_teams(&self, sql: &str, name: Option<&str>) -> RepoResult<Vec<Team>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match name {
            Some(name) => stmt.query([name])?,
            None => stmt.query([])?,
        };
        let mut teams = Vec::new();

        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }

        Ok(teams)
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save(&self, team: &NewTeam) -> RepoResult<Team> {
        team.validate()?;

        self.conn.execute(
            "INSERT INTO teams (name) VALUES (?1);",
            params![team.name.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=team_save module=repo status=ok team_id={id}");

        Ok(Team {
            id,
            name: team.name.clone(),
        })
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEAM_SELECT_SQL} WHERE team_id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_team_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Team>> {
        self.query_teams(
            &format!("{TEAM_SELECT_SQL} WHERE name = ?1 ORDER BY team_id ASC;"),
            Some(name),
        )
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        self.query_teams(&format!("{TEAM_SELECT_SQL} ORDER BY team_id ASC;"), None)
    }

    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        if self.find_by_id(team_id)?.is_none() {
            return Err(RepoError::TeamNotFound(team_id));
        }

        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE m.team_id = ?1 ORDER BY m.member_id ASC;"
        ))?;
        let mut rows = stmt.query([team_id])?;
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }

    fn delete_team(&self, id: TeamId) -> RepoResult<()> {
        let in_use: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM members WHERE team_id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if in_use {
            return Err(RepoError::TeamInUse(id));
        }

        let changed = self
            .conn
            .execute("DELETE FROM teams WHERE team_id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::TeamNotFound(id));
        }

        debug!("event=team_delete module=repo status=ok team_id={id}");
        Ok(())
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let team = Team {
        id: row.get("team_id")?,
        name: row.get("name")?,
    };
    team.validate().map_err(|err| {
        RepoError::InvalidData(format!("team {} violates invariants: {err}", team.id))
    })?;
    Ok(team)
}
