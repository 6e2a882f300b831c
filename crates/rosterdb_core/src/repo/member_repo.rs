//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/update/delete APIs over the `members` table.
//! - Execute ad-hoc [`Predicate`] filters returning full member rows.
//!
//! # Invariants
//! - Write paths validate before SQL mutations.
//! - A set `team_id` must reference an existing team.
//! - List results are ordered by `member_id` ascending.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{ensure_schema_ready, DbError};
use crate::model::member::{Member, MemberId, NewMember, TeamId, ValidationError};
use crate::query::predicate::Predicate;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const MEMBER_SELECT_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id
FROM members m";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for member and team persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    /// Storage failure; the store is treated as unavailable.
    Db(DbError),
    /// Member id does not exist.
    NotFound(MemberId),
    /// Referenced or addressed team id does not exist.
    TeamNotFound(TeamId),
    /// Team still has members referencing it.
    TeamInUse(TeamId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "member not found: {id}"),
            Self::TeamNotFound(id) => write!(f, "team not found: {id}"),
            Self::TeamInUse(id) => write!(f, "team {id} still has members"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::TeamNotFound(_) | Self::TeamInUse(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for member persistence.
pub trait MemberRepository {
    /// Inserts `member` and returns it with its generated id.
    fn save(&self, member: &NewMember) -> RepoResult<Member>;
    /// Overwrites username, age and team of an existing member.
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn find_all(&self) -> RepoResult<Vec<Member>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
    /// Returns every member for which `predicate` holds, in id order.
    fn find_all_matching(&self, predicate: &Predicate) -> RepoResult<Vec<Member>>;
    fn count(&self) -> RepoResult<u64>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Wraps `conn` after checking it is at the current schema with
    /// foreign keys enforced.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn ensure_team_exists(&self, team_id: Option<TeamId>) -> RepoResult<()> {
        let Some(team_id) = team_id else {
            return Ok(());
        };
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM teams WHERE team_id = ?1);",
            [team_id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(RepoError::TeamNotFound(team_id))
        }
    }

    fn query_members(&self, sql: &str, binds: Vec<Value>) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &NewMember) -> RepoResult<Member> {
        member.validate()?;
        self.ensure_team_exists(member.team_id)?;

        self.conn.execute(
            "INSERT INTO members (username, age, team_id) VALUES (?1, ?2, ?3);",
            params![member.username.as_str(), member.age, member.team_id],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=member_save module=repo status=ok member_id={id}");

        Ok(Member {
            id,
            username: member.username.clone(),
            age: member.age,
            team_id: member.team_id,
        })
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;
        self.ensure_team_exists(member.team_id)?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                username = ?1,
                age = ?2,
                team_id = ?3
             WHERE member_id = ?4;",
            params![member.username.as_str(), member.age, member.team_id, member.id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(member.id));
        }

        Ok(())
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE m.member_id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_member_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("{MEMBER_SELECT_SQL} ORDER BY m.member_id ASC;"),
            Vec::new(),
        )
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("{MEMBER_SELECT_SQL} WHERE m.username = ? ORDER BY m.member_id ASC;"),
            vec![Value::Text(username.to_string())],
        )
    }

    fn find_all_matching(&self, predicate: &Predicate) -> RepoResult<Vec<Member>> {
        let (where_sql, binds) = predicate.to_sql();
        let join = if predicate.references_team() {
            " LEFT JOIN teams t ON t.team_id = m.team_id"
        } else {
            ""
        };
        self.query_members(
            &format!("{MEMBER_SELECT_SQL}{join} WHERE {where_sql} ORDER BY m.member_id ASC;"),
            binds,
        )
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM members;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative member count {count}")))
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE member_id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=member_delete module=repo status=ok member_id={id}");
        Ok(())
    }
}

pub(crate) fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let member = Member {
        id: row.get("member_id")?,
        username: row.get("username")?,
        age: row.get("age")?,
        team_id: row.get("team_id")?,
    };
    member.validate().map_err(|err| {
        RepoError::InvalidData(format!("member {} violates invariants: {err}", member.id))
    })?;
    Ok(member)
}
