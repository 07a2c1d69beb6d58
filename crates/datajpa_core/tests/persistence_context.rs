use datajpa_core::db::open_db_in_memory;
use datajpa_core::{Member, MemberRepository, SqliteMemberRepository};

#[test]
fn managed_copy_is_stale_until_cleared() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Member::with_age("member1", 20)).unwrap();
    let id = saved.id.unwrap();
    assert!(repo.is_managed(id));

    conn.execute("UPDATE member SET age = 99 WHERE member_id = ?1;", [id])
        .unwrap();

    assert_eq!(repo.find(id).unwrap().age, 20);
    assert_eq!(repo.find_all().unwrap()[0].age, 20);

    repo.clear();
    assert!(!repo.is_managed(id));
    assert_eq!(repo.find(id).unwrap().age, 99);
}

#[test]
fn bulk_update_leaves_no_stale_copies() {
    let mut conn = open_db_in_memory().unwrap();
    let tx = conn.transaction().unwrap();
    let repo = SqliteMemberRepository::try_new(&tx).unwrap();

    let young = repo.save(&Member::with_age("member1", 10)).unwrap();
    let old = repo.save(&Member::with_age("member2", 40)).unwrap();
    assert_eq!(repo.cached_len(), 2);

    assert_eq!(repo.bulk_age_plus(20).unwrap(), 1);
    assert_eq!(repo.cached_len(), 0);

    let reloaded = repo.find_by_username("member2").unwrap();
    assert_eq!(reloaded[0].age, 41);
    assert_eq!(repo.find(old.id.unwrap()).unwrap().age, 41);
    assert_eq!(repo.find(young.id.unwrap()).unwrap().age, 10);
}

#[test]
fn delete_evicts_managed_copy() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Member::new("member1")).unwrap();
    repo.delete(&saved).unwrap();

    assert!(!repo.is_managed(saved.id.unwrap()));
    assert!(repo.find_by_id(saved.id.unwrap()).unwrap().is_none());
}

#[test]
fn queries_register_loaded_rows() {
    let conn = open_db_in_memory().unwrap();
    let writer = SqliteMemberRepository::try_new(&conn).unwrap();
    for name in ["member1", "member2", "member3"] {
        writer.save(&Member::with_age(name, 10)).unwrap();
    }

    let reader = SqliteMemberRepository::try_new(&conn).unwrap();
    assert_eq!(reader.cached_len(), 0);
    reader.find_by_page(10, 0, 2).unwrap();
    assert_eq!(reader.cached_len(), 2);
    reader.find_all().unwrap();
    assert_eq!(reader.cached_len(), 3);
}
