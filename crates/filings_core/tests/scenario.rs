use chrono::NaiveDate;
use filings_core::db::open_db_in_memory;
use filings_core::{
    Call, CallId, CoreError, EntityKind, Municipality, MunicipalityId, Permission,
    RegistryService, Role, StoreSet, Submission, SubmissionId, User, UserId,
};
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 6, 1)
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

fn ids() -> (UserId, MunicipalityId, CallId, SubmissionId) {
    (
        "fede1".parse().unwrap(),
        "m1".parse().unwrap(),
        "c1".parse().unwrap(),
        "p1".parse().unwrap(),
    )
}

fn seed(service: &mut RegistryService<'_>) {
    let (fede1, m1, _, _) = ids();
    service
        .create_user(User::new("fede1", "Federico", "1234", Role::named("Cuentadante")).unwrap())
        .unwrap();
    service
        .create_municipality(Municipality::new("m1", "Rosario", 5).unwrap())
        .unwrap();
    service
        .create_call(
            Call::new_as_of(
                "c1",
                date(2024, 1, 1),
                date(2024, 12, 31),
                "Rendicion de cuentas 2024",
                &["LibroDiario"],
                today(),
            )
            .unwrap(),
        )
        .unwrap();
    service.assign_representative(&m1, &fede1).unwrap();
}

fn create_p1(service: &mut RegistryService<'_>) {
    let (fede1, m1, c1, _) = ids();
    let submission =
        Submission::new_as_of("p1", date(2024, 5, 20), Some(c1), Some(fede1), Some(m1), today())
            .unwrap();
    service.create_submission(submission).unwrap();
}

#[test]
fn representative_files_and_call_removal_cascades_to_storage() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    seed(&mut service);
    create_p1(&mut service);
    let (fede1, m1, c1, p1) = ids();

    assert_eq!(
        service.registry().municipality_represented_by(&fede1).map(|m| m.id().clone()),
        Some(m1.clone())
    );
    assert!(!service.registry().submission_compliance(&p1).unwrap());

    service.add_submission_document(&p1, "LibroDiario").unwrap();
    assert!(service.registry().submission_compliance(&p1).unwrap());
    assert_eq!(count(&conn, "submission_documents"), 1);

    let report = service.remove_call(&c1).unwrap();
    assert_eq!(report.removed_submissions(), vec![&p1]);
    assert!(!service.registry().submissions().contains(&p1));
    assert_eq!(count(&conn, "submissions"), 0);
    assert_eq!(count(&conn, "submission_documents"), 0);
    assert_eq!(count(&conn, "calls"), 0);
    assert_eq!(count(&conn, "municipalities"), 1);
}

#[test]
fn reloading_restores_the_same_registry() {
    let conn = open_db_in_memory().unwrap();
    let snapshot = {
        let mut service = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
        seed(&mut service);
        create_p1(&mut service);
        let (_, _, c1, p1) = ids();
        service.add_submission_document(&p1, "Anexo").unwrap();
        service.set_call_open(&c1, false).unwrap();
        service.registry().clone()
    };

    let reloaded = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    let registry = reloaded.registry();
    assert_eq!(registry.users().list(), snapshot.users().list());
    assert_eq!(registry.municipalities().list(), snapshot.municipalities().list());
    assert_eq!(registry.calls().list(), snapshot.calls().list());
    assert_eq!(registry.submissions().list(), snapshot.submissions().list());
    assert!(registry.open_calls().is_empty());
}

#[test]
fn removing_user_clears_representative_column() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    seed(&mut service);
    create_p1(&mut service);
    let (fede1, _, _, _) = ids();

    let report = service.remove_user(&fede1).unwrap();
    assert_eq!(report.cleared_references(), 1);
    assert_eq!(report.removed_submissions().len(), 1);

    let representative: Option<String> = conn
        .query_row(
            "SELECT representative_id FROM municipalities WHERE id = 'm1';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(representative, None);
    assert_eq!(count(&conn, "users"), 0);
    assert_eq!(count(&conn, "submissions"), 0);
}

fn representative_column(conn: &Connection, municipality: &str) -> Option<String> {
    conn.query_row(
        "SELECT representative_id FROM municipalities WHERE id = ?1;",
        [municipality],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn reassigning_representative_moves_the_column_between_rows() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    seed(&mut service);
    let (fede1, m1, _, _) = ids();
    let m2: MunicipalityId = "m2".parse().unwrap();
    service
        .create_municipality(Municipality::new("m2", "Funes", 3).unwrap())
        .unwrap();

    let previous = service.assign_representative(&m2, &fede1).unwrap();
    assert_eq!(previous, Some(m1.clone()));
    assert_eq!(representative_column(&conn, "m1"), None);
    assert_eq!(representative_column(&conn, "m2"), Some("fede1".to_string()));

    let previous = service.assign_representative(&m1, &fede1).unwrap();
    assert_eq!(previous, Some(m2));
    assert_eq!(representative_column(&conn, "m1"), Some("fede1".to_string()));
    assert_eq!(representative_column(&conn, "m2"), None);

    let reloaded = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    assert_eq!(
        reloaded.registry().municipality_represented_by(&fede1).map(|m| m.id().clone()),
        Some(m1)
    );
}

#[test]
fn role_changes_are_stored_with_their_grants() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    seed(&mut service);
    let (fede1, _, _, _) = ids();

    let reviewer = Role::custom("Revisor", Permission::parse_list("Calls:read-open").unwrap());
    service.change_user_role(&fede1, reviewer.clone()).unwrap();
    let reloaded = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    let role = reloaded.registry().users().get(&fede1).unwrap().role().clone();
    assert_eq!(role, reviewer);
    assert!(role.has_permission(EntityKind::Calls, "read-open"));

    service
        .change_user_role(&fede1, Role::named("Supervisor"))
        .unwrap();
    let grants: Option<String> = conn
        .query_row("SELECT role_grants FROM users WHERE id = 'fede1';", [], |row| row.get(0))
        .unwrap();
    assert_eq!(grants, None);
}

#[test]
fn rejected_mutations_never_reach_storage() {
    let conn = open_db_in_memory().unwrap();
    let mut service = RegistryService::load(StoreSet::sqlite(&conn).unwrap()).unwrap();
    seed(&mut service);
    let (_, _, c1, _) = ids();

    let err = service
        .create_user(User::new(" FEDE1", "Otro", "abcd", Role::named("Supervisor")).unwrap())
        .unwrap_err();
    assert!(matches!(err, CoreError::Duplicate { .. }));
    assert_eq!(count(&conn, "users"), 1);

    let err = service.add_required_document(&c1, "Acta").unwrap_err();
    assert!(matches!(err, CoreError::InvalidDocument(_)));

    let err = service
        .set_call_close_date(&c1, date(2023, 12, 1), today())
        .unwrap_err();
    assert!(matches!(err, CoreError::Date(_)));
    let close: String = conn
        .query_row("SELECT close_date FROM calls WHERE id = 'c1';", [], |row| row.get(0))
        .unwrap();
    assert_eq!(close, "2024-12-31");

    service
        .set_call_close_date(&c1, date(2024, 5, 31), today())
        .unwrap();
    let open: i64 = conn
        .query_row("SELECT is_open FROM calls WHERE id = 'c1';", [], |row| row.get(0))
        .unwrap();
    assert_eq!(open, 0);
}
