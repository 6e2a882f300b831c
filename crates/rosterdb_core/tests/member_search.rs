mod common;

use common::{seed_teams_and_members, usernames};
use rosterdb_core::db::open_db_in_memory;
use rosterdb_core::{
    MemberQueryRepository, MemberRepository, MemberSearchCondition, MemberTeamDto, NewMember,
    QueryError, SqliteMemberQueryRepository, SqliteMemberRepository,
};

fn names(rows: &[MemberTeamDto]) -> Vec<String> {
    usernames(rows, |row| row.username.as_str())
}

#[test]
fn age_range_and_team_name_select_single_member() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed_teams_and_members(&conn);
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let condition = MemberSearchCondition::all()
        .with_age_goe(35)
        .with_age_loe(40)
        .with_team_name("teamB");
    let result = queries.search(&condition).unwrap();

    assert_eq!(
        result,
        vec![MemberTeamDto {
            member_id: fixture.members[3].id,
            username: "member4".to_string(),
            age: 40,
            team_id: Some(fixture.team_b.id),
            team_name: Some("teamB".to_string()),
        }]
    );
}

#[test]
fn empty_condition_returns_every_member_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let result = queries.search(&MemberSearchCondition::all()).unwrap();
    assert_eq!(names(&result), ["member1", "member2", "member3", "member4"]);
}

#[test]
fn members_without_team_appear_with_null_team_fields() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let loner = members.save(&NewMember::new("member5", 50)).unwrap();
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let result = queries
        .search(&MemberSearchCondition::all().with_age_goe(45))
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].member_id, loner.id);
    assert_eq!(result[0].team_id, None);
    assert_eq!(result[0].team_name, None);

    let team_filtered = queries
        .search(&MemberSearchCondition::all().with_team_name("teamA"))
        .unwrap();
    assert_eq!(names(&team_filtered), ["member1", "member2"]);
}

#[test]
fn unknown_team_name_yields_empty_result() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let result = queries
        .search(&MemberSearchCondition::all().with_team_name("teamZ"))
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn username_filter_is_exact_and_blank_filters_are_ignored() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let exact = queries
        .search(&MemberSearchCondition::all().with_username("member2"))
        .unwrap();
    assert_eq!(names(&exact), ["member2"]);

    let prefix = queries
        .search(&MemberSearchCondition::all().with_username("member"))
        .unwrap();
    assert!(prefix.is_empty());

    let blank = queries
        .search(&MemberSearchCondition::all().with_username("").with_team_name(" "))
        .unwrap();
    assert_eq!(blank.len(), 4);
}

#[test]
fn parsed_condition_matches_builder_condition() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let parsed: MemberSearchCondition = "teamName=teamA ageGoe=15".parse().unwrap();
    let result = queries.search(&parsed).unwrap();
    assert_eq!(names(&result), ["member2"]);
}

#[test]
fn storage_failure_surfaces_as_storage_unavailable() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    conn.execute_batch("DROP TABLE members;").unwrap();
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let err = queries.search(&MemberSearchCondition::all()).unwrap_err();
    assert!(matches!(err, QueryError::StorageUnavailable(_)));
}

#[test]
fn projection_serializes_with_camel_case_keys() {
    let conn = open_db_in_memory().unwrap();
    seed_teams_and_members(&conn);
    let queries = SqliteMemberQueryRepository::try_new(&conn).unwrap();

    let result = queries
        .search(&MemberSearchCondition::all().with_username("member1"))
        .unwrap();
    let json = serde_json::to_value(&result[0]).unwrap();
    assert_eq!(json["username"], "member1");
    assert_eq!(json["teamName"], "teamA");
    assert!(json.get("memberId").is_some());
}
