//! Member/team search over the joined projection.
//!
//! # Responsibility
//! - Run condition-driven searches as one LEFT JOIN of members to teams.
//! - Page results by member id and compute totals, skipping the count
//!   query when the fetched window already proves the total.
//!
//! # Invariants
//! - Every result row corresponds to exactly one member row.
//! - Results are ordered by `member_id` ascending.
//! - Reads never mutate storage; identical calls on unchanged data return
//!   identical results.
//! - Storage errors surface as `StorageUnavailable` without retries.

use crate::config::CoreConfig;
use crate::db::{ensure_schema_ready, DbError};
use crate::model::condition::MemberSearchCondition;
use crate::model::dto::MemberTeamDto;
use crate::model::page::{Page, PageRequest, PageRequestError};
use crate::query::predicate::Predicate;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const PROJECTION_SELECT_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    m.age AS age,
    t.team_id AS team_id,
    t.name AS team_name
FROM members m
LEFT JOIN teams t ON t.team_id = m.team_id";

const PROJECTION_COUNT_SQL: &str = "SELECT COUNT(m.member_id)
FROM members m
LEFT JOIN teams t ON t.team_id = m.team_id";

pub type QueryResult<T> = Result<T, QueryError>;

/// Error for search and paging operations.
#[derive(Debug)]
pub enum QueryError {
    /// Rejected page parameters.
    InvalidArgument(String),
    /// Backing store unreachable or statement execution failed.
    StorageUnavailable(DbError),
    /// Persisted row cannot be mapped to a projection.
    InvalidData(String),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::InvalidArgument(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for QueryError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(DbError::Sqlite(value))
    }
}

impl From<PageRequestError> for QueryError {
    fn from(value: PageRequestError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

/// Search contract over the member/team projection.
pub trait MemberQueryRepository {
    /// All members matching `condition`, in id order.
    fn search(&self, condition: &MemberSearchCondition) -> QueryResult<Vec<MemberTeamDto>> {
        self.search_matching(&Predicate::from_condition(condition))
    }

    /// All members matching an arbitrary predicate, in id order.
    fn search_matching(&self, predicate: &Predicate) -> QueryResult<Vec<MemberTeamDto>>;

    /// One page of matches plus a total from an explicit count query.
    fn search_page(
        &self,
        condition: &MemberSearchCondition,
        request: PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>>;

    /// Same result as [`MemberQueryRepository::search_page`], but the count
    /// query only runs when the fetched window cannot prove the total.
    fn search_page_optimized_count(
        &self,
        condition: &MemberSearchCondition,
        request: PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>>;
}

/// How a page total was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    /// Derived from offset and content size.
    Window,
    /// Issued a `COUNT` query.
    CountQuery,
}

impl TotalSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::CountQuery => "count_query",
        }
    }
}

/// Resolves the total element count for a fetched page window.
///
/// The window proves the total when it is not full and either starts at
/// offset 0 or contains at least one row. An empty window past offset 0
/// cannot tell "past the end" from "exact boundary", so `count` runs.
pub fn resolve_total(
    request: PageRequest,
    content_len: usize,
    count: impl FnOnce() -> QueryResult<u64>,
) -> QueryResult<(u64, TotalSource)> {
    let content_len = content_len as u64;
    let page_size = u64::from(request.page_size());
    let offset = request.offset();

    if content_len < page_size && (offset == 0 || content_len > 0) {
        return Ok((offset + content_len, TotalSource::Window));
    }

    Ok((count()?, TotalSource::CountQuery))
}

/// SQLite-backed member/team search.
pub struct SqliteMemberQueryRepository<'conn> {
    conn: &'conn Connection,
    max_page_size: Option<u32>,
}

impl<'conn> SqliteMemberQueryRepository<'conn> {
    /// Search over a ready connection with no page size ceiling.
    pub fn try_new(conn: &'conn Connection) -> QueryResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            max_page_size: None,
        })
    }

    /// Applies `config.max_page_size`, if set, as the page size ceiling.
    pub fn try_with_config(conn: &'conn Connection, config: &CoreConfig) -> QueryResult<Self> {
        let mut repo = Self::try_new(conn)?;
        repo.max_page_size = config.max_page_size;
        Ok(repo)
    }

    fn check_request(&self, request: PageRequest) -> QueryResult<()> {
        if let Some(max) = self.max_page_size {
            if request.page_size() > max {
                return Err(QueryError::InvalidArgument(format!(
                    "page size {} exceeds maximum {max}",
                    request.page_size()
                )));
            }
        }
        if i64::try_from(request.offset()).is_err() {
            return Err(QueryError::InvalidArgument(format!(
                "page offset {} is out of range",
                request.offset()
            )));
        }
        Ok(())
    }

    fn fetch(
        &self,
        predicate: &Predicate,
        window: Option<PageRequest>,
    ) -> QueryResult<Vec<MemberTeamDto>> {
        let (where_sql, mut binds) = predicate.to_sql();
        let mut sql = format!("{PROJECTION_SELECT_SQL} WHERE {where_sql} ORDER BY m.member_id ASC");

        if let Some(request) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(Value::Integer(i64::from(request.page_size())));
            binds.push(Value::Integer(i64::try_from(request.offset()).map_err(
                |_| QueryError::InvalidArgument("page offset is out of range".to_string()),
            )?));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut content = Vec::new();

        while let Some(row) = rows.next()? {
            content.push(parse_projection_row(row)?);
        }

        Ok(content)
    }

    fn count(&self, predicate: &Predicate) -> QueryResult<u64> {
        let (where_sql, binds) = predicate.to_sql();
        let count: i64 = self.conn.query_row(
            &format!("{PROJECTION_COUNT_SQL} WHERE {where_sql}"),
            params_from_iter(binds),
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| QueryError::InvalidData(format!("negative count {count}")))
    }

    fn page(
        &self,
        condition: &MemberSearchCondition,
        request: PageRequest,
        optimize_count: bool,
    ) -> QueryResult<Page<MemberTeamDto>> {
        let started_at = Instant::now();
        self.check_request(request)?;

        let predicate = Predicate::from_condition(condition);
        let result = self.fetch(&predicate, Some(request)).and_then(|content| {
            let (total, source) = if optimize_count {
                resolve_total(request, content.len(), || self.count(&predicate))?
            } else {
                (self.count(&predicate)?, TotalSource::CountQuery)
            };
            Ok((Page::new(content, request, total), source))
        });

        match result {
            Ok((page, source)) => {
                debug!(
                    "event=member_search_page module=query status=ok page={} size={} rows={} total={} total_source={} duration_ms={}",
                    request.page_number(),
                    request.page_size(),
                    page.number_of_elements(),
                    page.total_elements(),
                    source.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(page)
            }
            Err(err) => {
                warn!(
                    "event=member_search_page module=query status=error page={} size={} duration_ms={} error={}",
                    request.page_number(),
                    request.page_size(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

impl MemberQueryRepository for SqliteMemberQueryRepository<'_> {
    fn search_matching(&self, predicate: &Predicate) -> QueryResult<Vec<MemberTeamDto>> {
        let started_at = Instant::now();
        match self.fetch(predicate, None) {
            Ok(content) => {
                debug!(
                    "event=member_search module=query status=ok filtered={} rows={} duration_ms={}",
                    !predicate.is_match_all(),
                    content.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(content)
            }
            Err(err) => {
                warn!(
                    "event=member_search module=query status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn search_page(
        &self,
        condition: &MemberSearchCondition,
        request: PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.page(condition, request, false)
    }

    fn search_page_optimized_count(
        &self,
        condition: &MemberSearchCondition,
        request: PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.page(condition, request, true)
    }
}

fn parse_projection_row(row: &Row<'_>) -> QueryResult<MemberTeamDto> {
    let dto = MemberTeamDto {
        member_id: row.get("member_id")?,
        username: row.get("username")?,
        age: row.get("age")?,
        team_id: row.get("team_id")?,
        team_name: row.get("team_name")?,
    };
    if dto.team_id.is_some() != dto.team_name.is_some() {
        return Err(QueryError::InvalidData(format!(
            "member {} has a partial team projection",
            dto.member_id
        )));
    }
    Ok(dto)
}

#[cfg(test)]
mod tests {
    use super::{resolve_total, QueryError, TotalSource};
    use crate::model::page::PageRequest;
    use std::cell::Cell;

    fn resolve(page: i64, size: i64, content_len: usize, real_total: u64) -> (u64, TotalSource, u32) {
        let calls = Cell::new(0);
        let (total, source) = resolve_total(PageRequest::of(page, size).unwrap(), content_len, || {
            calls.set(calls.get() + 1);
            Ok(real_total)
        })
        .unwrap();
        (total, source, calls.get())
    }

    #[test]
    fn short_first_page_derives_total_without_count() {
        assert_eq!(resolve(0, 10, 4, 4), (4, TotalSource::Window, 0));
    }

    #[test]
    fn empty_first_page_derives_zero() {
        assert_eq!(resolve(0, 3, 0, 0), (0, TotalSource::Window, 0));
    }

    #[test]
    fn full_page_runs_count() {
        assert_eq!(resolve(0, 3, 3, 4), (4, TotalSource::CountQuery, 1));
    }

    #[test]
    fn short_later_page_derives_offset_plus_content() {
        assert_eq!(resolve(1, 3, 1, 4), (4, TotalSource::Window, 0));
    }

    #[test]
    fn empty_page_past_the_end_runs_count() {
        assert_eq!(resolve(5, 3, 0, 4), (4, TotalSource::CountQuery, 1));
    }

    #[test]
    fn count_failure_propagates() {
        let err = resolve_total(PageRequest::of(0, 2).unwrap(), 2, || {
            Err(QueryError::InvalidData("boom".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidData(_)));
    }
}
