//! Member/team use-case service.
//!
//! # Responsibility
//! - Register teams and members, change age and team assignment.
//! - Expose list and paged searches with raw page parameters.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Repository and query errors are returned unchanged, wrapped by layer.

use crate::config::CoreConfig;
use crate::model::condition::MemberSearchCondition;
use crate::model::dto::MemberTeamDto;
use crate::model::member::{Member, MemberId, NewMember, NewTeam, Team, TeamId};
use crate::model::page::{Page, PageRequest};
use crate::query::member_query::{
    MemberQueryRepository, QueryError, QueryResult, SqliteMemberQueryRepository,
};
use crate::repo::member_repo::{MemberRepository, RepoError, SqliteMemberRepository};
use crate::repo::team_repo::{SqliteTeamRepository, TeamRepository};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Query(QueryError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Query(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<QueryError> for ServiceError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

/// Use-case facade over member, team and search repositories.
pub struct MemberService<M, T, Q> {
    members: M,
    teams: T,
    queries: Q,
}

/// Service wired to SQLite repositories sharing one connection.
pub type SqliteMemberService<'conn> = MemberService<
    SqliteMemberRepository<'conn>,
    SqliteTeamRepository<'conn>,
    SqliteMemberQueryRepository<'conn>,
>;

impl<'conn> SqliteMemberService<'conn> {
    /// Wires all three repositories to `conn`.
    ///
    /// # Errors
    /// - `conn` is not at the current schema or has foreign keys off.
    pub fn sqlite(conn: &'conn Connection, config: &CoreConfig) -> ServiceResult<Self> {
        Ok(MemberService::new(
            SqliteMemberRepository::try_new(conn)?,
            SqliteTeamRepository::try_new(conn)?,
            SqliteMemberQueryRepository::try_with_config(conn, config)?,
        ))
    }
}

impl<M, T, Q> MemberService<M, T, Q>
where
    M: MemberRepository,
    T: TeamRepository,
    Q: MemberQueryRepository,
{
    pub fn new(members: M, teams: T, queries: Q) -> Self {
        Self {
            members,
            teams,
            queries,
        }
    }

    pub fn register_team(&self, name: impl Into<String>) -> ServiceResult<Team> {
        Ok(self.teams.save(&NewTeam::new(name))?)
    }

    /// Registers a member, optionally assigned to an existing team.
    pub fn register_member(
        &self,
        username: impl Into<String>,
        age: i32,
        team_id: Option<TeamId>,
    ) -> ServiceResult<Member> {
        let member = NewMember {
            username: username.into(),
            age,
            team_id,
        };
        Ok(self.members.save(&member)?)
    }

    pub fn find_member(&self, id: MemberId) -> ServiceResult<Option<Member>> {
        Ok(self.members.find_by_id(id)?)
    }

    pub fn change_age(&self, id: MemberId, age: i32) -> ServiceResult<Member> {
        let mut member = self.load_member(id)?;
        member.age = age;
        self.members.update_member(&member)?;
        Ok(member)
    }

    /// Moves a member to `team_id`, or detaches it when `None`.
    pub fn assign_team(&self, id: MemberId, team_id: Option<TeamId>) -> ServiceResult<Member> {
        let mut member = self.load_member(id)?;
        let team = match team_id {
            Some(team_id) => Some(
                self.teams
                    .find_by_id(team_id)?
                    .ok_or(RepoError::TeamNotFound(team_id))?,
            ),
            None => None,
        };
        member.change_team(team.as_ref());
        self.members.update_member(&member)?;
        Ok(member)
    }

    pub fn remove_member(&self, id: MemberId) -> ServiceResult<()> {
        Ok(self.members.delete_member(id)?)
    }

    pub fn search(&self, condition: &MemberSearchCondition) -> ServiceResult<Vec<MemberTeamDto>> {
        Ok(self.queries.search(condition)?)
    }

    /// Paged search with an explicit count query.
    ///
    /// # Errors
    /// - `QueryError::InvalidArgument` for a negative page number or a
    ///   non-positive page size.
    pub fn search_page(
        &self,
        condition: &MemberSearchCondition,
        page_number: i64,
        page_size: i64,
    ) -> ServiceResult<Page<MemberTeamDto>> {
        let request = page_request(page_number, page_size)?;
        Ok(self.queries.search_page(condition, request)?)
    }

    /// Paged search that skips the count query when the window proves the
    /// total. Same errors as [`MemberService::search_page`].
    pub fn search_page_optimized_count(
        &self,
        condition: &MemberSearchCondition,
        page_number: i64,
        page_size: i64,
    ) -> ServiceResult<Page<MemberTeamDto>> {
        let request = page_request(page_number, page_size)?;
        Ok(self.queries.search_page_optimized_count(condition, request)?)
    }

    fn load_member(&self, id: MemberId) -> ServiceResult<Member> {
        Ok(self
            .members
            .find_by_id(id)?
            .ok_or(RepoError::NotFound(id))?)
    }
}

fn page_request(page_number: i64, page_size: i64) -> QueryResult<PageRequest> {
    Ok(PageRequest::of(page_number, page_size)?)
}
