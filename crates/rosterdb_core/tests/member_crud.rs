mod common;

use common::seed_teams_and_members;
use rosterdb_core::db::{open_db_in_memory, DbError};
use rosterdb_core::{
    MemberRepository, NewMember, NewTeam, Predicate, RepoError, SqliteMemberRepository,
    SqliteTeamRepository, TeamRepository, ValidationError,
};
use rusqlite::Connection;

#[test]
fn save_then_find_by_id_find_all_and_find_by_username() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let member = repo.save(&NewMember::new("member1", 10)).unwrap();

    let found = repo.find_by_id(member.id).unwrap().unwrap();
    assert_eq!(found, member);

    assert_eq!(repo.find_all().unwrap(), vec![member.clone()]);
    assert_eq!(repo.find_by_username("member1").unwrap(), vec![member.clone()]);

    // Repeated reads observe the same state.
    assert_eq!(repo.find_all().unwrap(), vec![member.clone()]);
    assert_eq!(repo.find_by_username("member1").unwrap(), vec![member]);
}

#[test]
fn find_by_id_returns_none_for_missing_member() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    assert!(repo.find_by_id(42).unwrap().is_none());
}

#[test]
fn generated_ids_follow_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed_teams_and_members(&conn);

    let ids: Vec<_> = fixture.members.iter().map(|member| member.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(ids, sorted);
}

#[test]
fn save_rejects_invalid_member_and_unknown_team() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let err = repo.save(&NewMember::new("", 10)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::BlankUsername)));

    let err = repo.save(&NewMember::new("member1", -5)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::NegativeAge(-5))));

    let mut orphan = NewMember::new("member1", 10);
    orphan.team_id = Some(404);
    let err = repo.save(&orphan).unwrap_err();
    assert!(matches!(err, RepoError::TeamNotFound(404)));

    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn update_changes_age_and_team() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed_teams_and_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut member = fixture.members[0].clone();
    member.age = 11;
    member.change_team(Some(&fixture.team_b));
    repo.update_member(&member).unwrap();

    let loaded = repo.find_by_id(member.id).unwrap().unwrap();
    assert_eq!(loaded.age, 11);
    assert_eq!(loaded.team_id, Some(fixture.team_b.id));

    member.change_team(None);
    repo.update_member(&member).unwrap();
    assert_eq!(repo.find_by_id(member.id).unwrap().unwrap().team_id, None);
}

#[test]
fn update_and_delete_missing_member_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut member = repo.save(&NewMember::new("member1", 10)).unwrap();
    repo.delete_member(member.id).unwrap();

    member.age = 12;
    assert!(matches!(
        repo.update_member(&member).unwrap_err(),
        RepoError::NotFound(id) if id == member.id
    ));
    assert!(matches!(
        repo.delete_member(member.id).unwrap_err(),
        RepoError::NotFound(id) if id == member.id
    ));
}

#[test]
fn find_all_matching_applies_between_and_username() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed_teams_and_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let none = repo
        .find_all_matching(&Predicate::age_between(20, 40).and(Predicate::username_eq("member1")))
        .unwrap();
    assert!(none.is_empty());

    let between = repo
        .find_all_matching(&Predicate::age_between(20, 40))
        .unwrap();
    assert_eq!(between, fixture.members[1..].to_vec());

    let team_b = repo
        .find_all_matching(&Predicate::team_name_eq("teamB").and(Predicate::age_goe(35)))
        .unwrap();
    assert_eq!(team_b, vec![fixture.members[3].clone()]);

    assert_eq!(
        repo.find_all_matching(&Predicate::match_all()).unwrap(),
        fixture.members
    );
}

#[test]
fn team_lifecycle_and_inverse_member_list() {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed_teams_and_members(&conn);
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    assert_eq!(teams.find_all().unwrap(), vec![fixture.team_a.clone(), fixture.team_b.clone()]);
    assert_eq!(teams.find_by_name("teamB").unwrap(), vec![fixture.team_b.clone()]);
    assert!(teams.find_by_name("teamC").unwrap().is_empty());
    assert_eq!(
        teams.list_members(fixture.team_a.id).unwrap(),
        fixture.members[..2].to_vec()
    );

    let err = teams.delete_team(fixture.team_a.id).unwrap_err();
    assert!(matches!(err, RepoError::TeamInUse(id) if id == fixture.team_a.id));

    for member in &fixture.members[..2] {
        members.delete_member(member.id).unwrap();
    }
    teams.delete_team(fixture.team_a.id).unwrap();
    assert!(teams.find_by_id(fixture.team_a.id).unwrap().is_none());
    assert!(matches!(
        teams.list_members(fixture.team_a.id).unwrap_err(),
        RepoError::TeamNotFound(_)
    ));
    assert!(matches!(
        teams.delete_team(fixture.team_a.id).unwrap_err(),
        RepoError::TeamNotFound(_)
    ));
}

#[test]
fn team_save_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();

    let err = teams.save(&NewTeam::new("   ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::BlankTeamName)));
}

#[test]
fn repositories_reject_connections_without_the_roster_schema() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteMemberRepository::try_new(&conn),
        Err(RepoError::Db(DbError::ForeignKeysDisabled))
    ));

    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    assert!(matches!(
        SqliteTeamRepository::try_new(&conn),
        Err(RepoError::Db(DbError::SchemaOutdated { db_version: 0, .. }))
    ));
    assert!(matches!(
        SqliteMemberRepository::try_new(&conn),
        Err(RepoError::Db(DbError::SchemaOutdated { .. }))
    ));
}
