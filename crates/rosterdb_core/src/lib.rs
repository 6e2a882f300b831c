//! Member/team persistence with dynamic search and pagination.
//! This crate is the single source of truth for roster invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{load_config, parse_config, ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging_from_config};
pub use model::condition::{ConditionParseError, MemberSearchCondition};
pub use model::dto::MemberTeamDto;
pub use model::member::{Member, MemberId, NewMember, NewTeam, Team, TeamId, ValidationError};
pub use model::page::{Page, PageRequest, PageRequestError};
pub use query::member_query::{
    MemberQueryRepository, QueryError, QueryResult, SqliteMemberQueryRepository, TotalSource,
};
pub use query::predicate::Predicate;
pub use repo::member_repo::{MemberRepository, RepoError, RepoResult, SqliteMemberRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use service::member_service::{
    MemberService, ServiceError, ServiceResult, SqliteMemberService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
