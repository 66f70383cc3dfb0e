use super::common::*;

use crate::portal::domain::StudentId;
use crate::portal::roster::RosterError;
use crate::portal::store::StudentFilter;

#[test]
fn register_assigns_sequential_ids() {
    let portal = portal();
    let first = portal
        .roster
        .register(student_draft("Asha Rao", "5A"))
        .expect("first registers");
    let second = portal
        .roster
        .register(student_draft("Liam Ortiz", "5B"))
        .expect("second registers");

    assert_eq!(first.id, StudentId(1));
    assert_eq!(second.id, StudentId(2));
    assert!(!first.vaccinated);
}

#[test]
fn register_requires_name_and_class() {
    let portal = portal();
    assert!(matches!(
        portal.roster.register(student_draft("", "5A")),
        Err(RosterError::Validation)
    ));
    assert!(matches!(
        portal.roster.register(student_draft("Asha Rao", "   ")),
        Err(RosterError::Validation)
    ));
}

#[test]
fn list_filters_by_name_substring_case_insensitive() {
    let portal = portal();
    for (name, class) in [("Asha Rao", "5A"), ("Liam Ortiz", "5B"), ("Mina Patel", "6A")] {
        portal
            .roster
            .register(student_draft(name, class))
            .expect("student registers");
    }

    let filter = StudentFilter {
        id: None,
        name: Some("RA".to_string()),
    };
    let views = portal.roster.list(&filter).expect("list succeeds");
    let names: Vec<_> = views.iter().map(|view| view.name.as_str()).collect();
    assert_eq!(names, ["Asha Rao"]);
}

#[test]
fn list_filters_by_id() {
    let portal = portal();
    portal
        .roster
        .register(student_draft("Asha Rao", "5A"))
        .expect("first registers");
    let second = portal
        .roster
        .register(student_draft("Liam Ortiz", "5B"))
        .expect("second registers");

    let filter = StudentFilter {
        id: Some(second.id),
        name: None,
    };
    let views = portal.roster.list(&filter).expect("list succeeds");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, second.id);
}

#[test]
fn list_enriches_vaccinated_students_with_latest_drive() {
    let portal = portal();
    let (student, early) = seeded_pair(&portal, "MMR", 20);
    let late = portal
        .scheduler
        .schedule(drive_draft("Polio", in_days(40)), today())
        .expect("later drive schedules");

    portal
        .ledger
        .vaccinate(student.id, late.id)
        .expect("later drive recorded first");
    portal
        .ledger
        .vaccinate(student.id, early.id)
        .expect("earlier drive recorded second");

    let views = portal
        .roster
        .list(&StudentFilter::default())
        .expect("list succeeds");
    let details = views[0]
        .vaccination_details
        .as_ref()
        .expect("vaccinated student carries details");
    assert_eq!(details.vaccine_name, "Polio");
    assert_eq!(details.drive_date, late.drive_date);
}

#[test]
fn unvaccinated_students_have_no_details() {
    let portal = portal();
    portal
        .roster
        .register(student_draft("Asha Rao", "5A"))
        .expect("student registers");

    let views = portal
        .roster
        .list(&StudentFilter::default())
        .expect("list succeeds");
    assert!(views[0].vaccination_details.is_none());
}

#[test]
fn bulk_register_counts_valid_rows_and_skips_bad_ones() {
    let portal = portal();
    let csv = "\
name,student_class
Asha Rao,5A
,5B
Liam Ortiz,
Mina Patel,6A
";
    let added = portal
        .roster
        .bulk_register(csv.as_bytes())
        .expect("bulk import runs");
    assert_eq!(added, 2);

    let views = portal
        .roster
        .list(&StudentFilter::default())
        .expect("list succeeds");
    let names: Vec<_> = views.iter().map(|view| view.name.as_str()).collect();
    assert_eq!(names, ["Asha Rao", "Mina Patel"]);
}

#[test]
fn bulk_register_tolerates_extra_columns_in_any_order() {
    let portal = portal();
    let csv = "\
student_class,notes,name
5A,allergy on file,Asha Rao
";
    let added = portal
        .roster
        .bulk_register(csv.as_bytes())
        .expect("bulk import runs");
    assert_eq!(added, 1);
}

#[test]
fn bulk_register_requires_expected_columns() {
    let portal = portal();
    let csv = "full_name,grade\nAsha Rao,5A\n";
    let result = portal.roster.bulk_register(csv.as_bytes());
    assert!(matches!(result, Err(RosterError::MissingColumns)));
}
