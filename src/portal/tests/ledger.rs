use super::common::*;

use std::collections::HashSet;
use std::sync::Arc;

use crate::portal::domain::{DriveId, StudentId};
use crate::portal::ledger::{LedgerError, VaccinationLedger};
use crate::portal::store::VaccinationStore;

#[test]
fn vaccinate_links_drive_and_sets_flag() {
    let portal = portal();
    let (student, drive) = seeded_pair(&portal, "MMR", 20);
    assert!(!student.vaccinated);

    portal
        .ledger
        .vaccinate(student.id, drive.id)
        .expect("vaccination records");

    let stored = portal
        .store
        .fetch_student(student.id)
        .expect("store fetch")
        .expect("student present");
    assert!(stored.vaccinated);

    let history = portal
        .store
        .drives_for_student(student.id)
        .expect("history query");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, drive.id);
}

#[test]
fn vaccinate_rejects_unknown_student_or_drive() {
    let portal = portal();
    let (student, drive) = seeded_pair(&portal, "MMR", 20);

    let unknown_student = portal.ledger.vaccinate(StudentId(99), drive.id);
    assert!(matches!(unknown_student, Err(LedgerError::NotFound)));

    let unknown_drive = portal.ledger.vaccinate(student.id, DriveId(99));
    assert!(matches!(unknown_drive, Err(LedgerError::NotFound)));
}

#[test]
fn repeated_vaccination_for_same_drive_fails_without_state_change() {
    let portal = portal();
    let (student, drive) = seeded_pair(&portal, "MMR", 20);

    portal
        .ledger
        .vaccinate(student.id, drive.id)
        .expect("first call succeeds");
    let second = portal.ledger.vaccinate(student.id, drive.id);
    assert!(matches!(
        second,
        Err(LedgerError::AlreadyVaccinatedForDrive)
    ));

    let rows = portal.store.vaccination_rows().expect("join query");
    assert_eq!(rows.len(), 1);
}

#[test]
fn same_vaccine_across_drives_is_rejected() {
    let portal = portal();
    let (student, first) = seeded_pair(&portal, "MMR", 20);
    let later = portal
        .scheduler
        .schedule(drive_draft("MMR", in_days(40)), today())
        .expect("second MMR drive schedules");

    portal
        .ledger
        .vaccinate(student.id, first.id)
        .expect("first vaccination");
    let result = portal.ledger.vaccinate(student.id, later.id);
    assert!(matches!(result, Err(LedgerError::DuplicateVaccine)));
}

#[test]
fn different_vaccines_accumulate_distinct_history() {
    let portal = portal();
    let (student, mmr) = seeded_pair(&portal, "MMR", 20);
    let polio = portal
        .scheduler
        .schedule(drive_draft("Polio", in_days(25)), today())
        .expect("polio drive schedules");

    portal
        .ledger
        .vaccinate(student.id, mmr.id)
        .expect("first vaccine");
    portal
        .ledger
        .vaccinate(student.id, polio.id)
        .expect("second, different vaccine");

    let history = portal
        .store
        .drives_for_student(student.id)
        .expect("history query");
    let distinct: HashSet<_> = history.iter().map(|d| d.vaccine_name.as_str()).collect();
    assert_eq!(distinct.len(), history.len());
    assert_eq!(history.len(), 2);
}

#[test]
fn vaccinated_flag_tracks_association_count() {
    let portal = portal();
    let (student, drive) = seeded_pair(&portal, "MMR", 20);
    let bystander = portal
        .roster
        .register(student_draft("Liam Ortiz", "5B"))
        .expect("second student registers");

    portal
        .ledger
        .vaccinate(student.id, drive.id)
        .expect("vaccination records");

    for id in [student.id, bystander.id] {
        let stored = portal
            .store
            .fetch_student(id)
            .expect("store fetch")
            .expect("student present");
        let history = portal
            .store
            .drives_for_student(id)
            .expect("history query");
        assert_eq!(stored.vaccinated, !history.is_empty());
    }
}

#[test]
fn delete_student_cascades_relation_rows() {
    let portal = portal();
    let (student, drive) = seeded_pair(&portal, "MMR", 20);
    portal
        .ledger
        .vaccinate(student.id, drive.id)
        .expect("vaccination records");

    portal
        .ledger
        .delete_student(student.id)
        .expect("delete succeeds");

    assert!(portal
        .store
        .fetch_student(student.id)
        .expect("store fetch")
        .is_none());
    assert!(portal
        .store
        .vaccination_rows()
        .expect("join query")
        .is_empty());
}

#[test]
fn delete_unknown_student_is_not_found() {
    let portal = portal();
    let result = portal.ledger.delete_student(StudentId(42));
    assert!(matches!(result, Err(LedgerError::NotFound)));
}

#[test]
fn store_failures_surface_as_ledger_store_errors() {
    let ledger = VaccinationLedger::new(Arc::new(UnavailableStore));
    let result = ledger.vaccinate(StudentId(1), DriveId(1));
    assert!(matches!(result, Err(LedgerError::Store(_))));
}
