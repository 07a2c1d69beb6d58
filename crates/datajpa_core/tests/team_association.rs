use datajpa_core::db::open_db_in_memory;
use datajpa_core::{
    Member, MemberRepository, RepoError, SqliteMemberRepository, SqliteTeamRepository, Team,
    TeamRepository,
};

#[test]
fn lazy_team_load_after_clear_resolves_team_name() {
    let mut conn = open_db_in_memory().unwrap();
    let tx = conn.transaction().unwrap();
    let teams = SqliteTeamRepository::try_new(&tx).unwrap();
    let members = SqliteMemberRepository::try_new(&tx).unwrap();

    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();
    members
        .save(&Member::with_team("member1", 10, &team_a).unwrap())
        .unwrap();
    members
        .save(&Member::with_team("member2", 20, &team_b).unwrap())
        .unwrap();

    members.clear();
    assert_eq!(members.cached_len(), 0);

    let loaded = members.find_all().unwrap();
    let names: Vec<_> = loaded
        .iter()
        .map(|member| members.team_of(member).unwrap().unwrap().name)
        .collect();
    assert_eq!(names, vec!["teamA", "teamB"]);
}

#[test]
fn member_without_team_has_no_association() {
    let conn = open_db_in_memory().unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let solo = members.save(&Member::with_age("solo", 30)).unwrap();
    assert!(members.team_of(&solo).unwrap().is_none());

    let (member, team) = members.find_with_team(solo.id.unwrap()).unwrap().unwrap();
    assert_eq!(member, solo);
    assert!(team.is_none());
}

#[test]
fn find_with_team_loads_both_sides_in_one_call() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team = teams.save(&Team::new("teamA")).unwrap();
    let saved = members
        .save(&Member::with_team("member1", 10, &team).unwrap())
        .unwrap();
    members.clear();

    let (member, loaded_team) = members.find_with_team(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(member, saved);
    assert_eq!(loaded_team, Some(team));
    assert!(members.find_with_team(404).unwrap().is_none());
}

#[test]
fn find_with_team_resolves_team_of_the_managed_member() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();
    let saved = members
        .save(&Member::with_team("member1", 10, &team_a).unwrap())
        .unwrap();
    let id = saved.id.unwrap();

    conn.execute(
        "UPDATE member SET team_id = ?1 WHERE member_id = ?2;",
        [team_b.id.unwrap(), id],
    )
    .unwrap();

    let (member, team) = members.find_with_team(id).unwrap().unwrap();
    assert_eq!(member.team_id, team_a.id);
    assert_eq!(team, Some(team_a));

    members.clear();
    let (member, team) = members.find_with_team(id).unwrap().unwrap();
    assert_eq!(member.team_id, team_b.id);
    assert_eq!(team, Some(team_b));
}

#[test]
fn team_lists_its_members_as_inverse_side() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();
    let mut member1 = members
        .save(&Member::with_team("member1", 10, &team_a).unwrap())
        .unwrap();
    members
        .save(&Member::with_team("member2", 20, &team_a).unwrap())
        .unwrap();

    let in_a = teams.list_members(team_a.id.unwrap()).unwrap();
    assert_eq!(in_a.len(), 2);

    member1.change_team(&team_b).unwrap();
    members.save(&member1).unwrap();

    let in_a = teams.list_members(team_a.id.unwrap()).unwrap();
    let in_b = teams.list_members(team_b.id.unwrap()).unwrap();
    assert_eq!(in_a.len(), 1);
    assert_eq!(in_b, vec![member1]);
}

#[test]
fn saving_member_with_missing_team_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut member = Member::with_age("member1", 10);
    member.team_id = Some(999);
    let err = members.save(&member).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(err.is_constraint_violation());
    assert_eq!(members.total_count().unwrap(), 0);
}

#[test]
fn team_save_updates_and_find_by_id_is_lenient() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();

    let mut team = teams.save(&Team::new("teamA")).unwrap();
    team.name = "renamed".to_string();
    teams.save(&team).unwrap();

    let loaded = teams.find_by_id(team.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.name, "renamed");
    assert!(teams.find_by_id(404).unwrap().is_none());
    assert!(matches!(
        teams.save(&Team::new(" ")).unwrap_err(),
        RepoError::Validation(_)
    ));
}
