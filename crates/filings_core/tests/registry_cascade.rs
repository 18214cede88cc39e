use chrono::NaiveDate;
use filings_core::{
    Call, CallId, CascadeStep, CascadeTarget, CoreError, EntityKind, Municipality, MunicipalityId,
    Registry, Role, RoleKind, Submission, SubmissionId, User, UserId,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 6, 1)
}

fn submission(id: &str, call: &str, author: &str, municipality: &str) -> Submission {
    Submission::new_as_of(
        id,
        date(2024, 5, 15),
        Some(call.parse::<CallId>().unwrap()),
        Some(author.parse::<UserId>().unwrap()),
        Some(municipality.parse::<MunicipalityId>().unwrap()),
        today(),
    )
    .unwrap()
}

fn populated() -> Registry {
    let mut registry = Registry::new();
    for (id, kind) in [
        ("rep1", RoleKind::AccountableRepresentative),
        ("rep2", RoleKind::AccountableRepresentative),
        ("sup", RoleKind::Supervisor),
    ] {
        registry
            .add_user(User::new(id, id, "clave", Role::canonical(kind)).unwrap())
            .unwrap();
    }
    for (id, name) in [("m1", "Rosario"), ("m2", "Funes")] {
        registry
            .add_municipality(Municipality::new(id, name, 1).unwrap())
            .unwrap();
    }
    for id in ["c1", "c2"] {
        registry
            .add_call(
                Call::new_as_of(id, date(2024, 1, 1), date(2024, 12, 31), "Cierre", &[], today())
                    .unwrap(),
            )
            .unwrap();
    }

    let m1: MunicipalityId = "m1".parse().unwrap();
    let m2: MunicipalityId = "m2".parse().unwrap();
    registry.assign_representative(&m1, &"rep1".parse().unwrap()).unwrap();
    registry.assign_representative(&m2, &"rep2".parse().unwrap()).unwrap();
    registry.assign_supervisor(&m1, &"sup".parse().unwrap()).unwrap();
    registry.assign_supervisor(&m2, &"sup".parse().unwrap()).unwrap();

    registry.add_submission(submission("p1", "c1", "rep1", "m1")).unwrap();
    registry.add_submission(submission("p2", "c2", "rep1", "m1")).unwrap();
    registry.add_submission(submission("p3", "c1", "rep2", "m2")).unwrap();
    registry
}

#[test]
fn identifiers_are_unique_ignoring_case_and_whitespace() {
    let mut registry = populated();

    let err = registry
        .add_user(User::new("  REP1 ", "Otro", "clave", Role::named("Supervisor")).unwrap())
        .unwrap_err();
    assert!(matches!(err, CoreError::Duplicate { .. }));

    let err = registry
        .add_municipality(Municipality::new("M1", "Otra", 2).unwrap())
        .unwrap_err();
    assert!(matches!(err, CoreError::Duplicate { .. }));

    let err = registry
        .add_call(Call::new_as_of(" C2", date(2024, 1, 1), date(2024, 2, 1), "x", &[], today()).unwrap())
        .unwrap_err();
    assert!(matches!(err, CoreError::Duplicate { .. }));

    let err = registry
        .add_submission(submission("P3 ", "c2", "rep2", "m2"))
        .unwrap_err();
    assert!(matches!(err, CoreError::Duplicate { .. }));

    assert!(registry.users().lookup(" Rep2").is_ok());
}

#[test]
fn removing_municipality_clears_relations_and_its_submissions() {
    let mut registry = populated();
    let m1: MunicipalityId = "m1".parse().unwrap();

    let report = registry.remove_municipality(&m1).unwrap();
    assert_eq!(
        report.steps(),
        &[
            CascadeStep::ClearSupervisor(m1.clone()),
            CascadeStep::ClearRepresentative(m1.clone()),
            CascadeStep::RemoveSubmission("p1".parse().unwrap()),
            CascadeStep::RemoveSubmission("p2".parse().unwrap()),
            CascadeStep::RemoveMunicipality(m1.clone()),
        ]
    );

    assert!(!registry.municipalities().contains(&m1));
    assert!(registry
        .submissions()
        .iter()
        .all(|s| s.municipality_id() != Some(&m1)));
    assert_eq!(registry.submissions().len(), 1);
    let rep1: UserId = "rep1".parse().unwrap();
    assert!(registry.municipality_represented_by(&rep1).is_none());
    assert!(registry.users().contains(&rep1));
}

#[test]
fn removing_call_removes_only_its_submissions() {
    let mut registry = populated();
    let c1: CallId = "c1".parse().unwrap();

    let report = registry.remove_call(&c1).unwrap();
    assert_eq!(report.target(), &CascadeTarget::Call(c1.clone()));
    assert_eq!(report.target().kind(), EntityKind::Calls);
    let removed: Vec<&str> = report
        .removed_submissions()
        .into_iter()
        .map(SubmissionId::as_str)
        .collect();
    assert_eq!(removed, vec!["p1", "p3"]);
    assert_eq!(report.cleared_references(), 0);

    assert!(!registry.call_has_submissions(&c1));
    assert!(registry.submissions().contains(&"p2".parse().unwrap()));
    assert_eq!(registry.calls().len(), 1);
}

#[test]
fn removing_user_detaches_every_reference() {
    let mut registry = populated();
    let sup: UserId = "sup".parse().unwrap();
    let rep1: UserId = "rep1".parse().unwrap();

    let report = registry.remove_user(&sup).unwrap();
    assert_eq!(report.cleared_references(), 2);
    assert!(report.removed_submissions().is_empty());
    assert!(registry.municipalities_supervised_by(&sup).is_empty());

    let report = registry.remove_user(&rep1).unwrap();
    assert_eq!(report.cleared_references(), 1);
    assert_eq!(report.removed_submissions().len(), 2);
    assert!(registry.submissions_by_author(&rep1).is_empty());
    assert_eq!(registry.submissions().len(), 1);
    assert_eq!(registry.representatives().len(), 1);
}

#[test]
fn representative_moves_between_municipalities() {
    let mut registry = populated();
    let m1: MunicipalityId = "m1".parse().unwrap();
    let m2: MunicipalityId = "m2".parse().unwrap();
    let rep1: UserId = "rep1".parse().unwrap();

    let previous = registry.assign_representative(&m2, &rep1).unwrap();
    assert_eq!(previous, Some(m1.clone()));
    assert_eq!(registry.municipalities().get(&m1).unwrap().representative(), None);
    assert_eq!(
        registry.municipalities().get(&m2).unwrap().representative(),
        Some(&rep1)
    );
    assert_eq!(
        registry.municipality_represented_by(&rep1).map(|m| m.id().clone()),
        Some(m2)
    );
}

#[test]
fn snapshots_do_not_alias_registry_state() {
    let mut registry = populated();
    let mut listed = registry.calls().list();
    listed.clear();
    assert_eq!(registry.calls().len(), 2);

    let c1: CallId = "c1".parse().unwrap();
    registry.call_mut(&c1).unwrap().set_open(false);
    let open: Vec<String> = registry
        .open_calls()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(open, vec!["c2".to_string()]);
}
