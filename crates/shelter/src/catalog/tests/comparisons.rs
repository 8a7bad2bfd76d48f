use super::common::*;
use crate::catalog::domain::ApplicationStatus;
use crate::catalog::ids::PetId;
use crate::catalog::service::EngagementError;

#[test]
fn compare_returns_available_pets() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper", "Juniper"]);

    let selection = service
        .compare(&[pets[0].id, pets[2].id])
        .expect("two pets");
    let mut ids: Vec<PetId> = selection.iter().map(|pet| pet.id).collect();
    ids.sort();
    assert_eq!(ids, vec![pets[0].id, pets[2].id]);
}

#[test]
fn repeated_ids_collapse_before_counting() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper"]);

    let err = service
        .compare(&[pets[0].id, pets[0].id])
        .expect_err("same pet twice");
    assert!(matches!(
        err,
        EngagementError::InsufficientSelection { available: 1 }
    ));
}

#[test]
fn unknown_and_adopted_pets_drop_out() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper", "Juniper"]);

    let application = service
        .submit_application(&bob(), pets[1].id, application_form())
        .expect("apply");
    service
        .transition(&staff(), application.id, ApplicationStatus::Approved, None)
        .expect("approve");
    service
        .transition(&staff(), application.id, ApplicationStatus::Completed, None)
        .expect("complete");

    let err = service
        .compare(&[pets[0].id, pets[1].id, PetId(u64::MAX)])
        .expect_err("only one available");
    assert!(matches!(
        err,
        EngagementError::InsufficientSelection { available: 1 }
    ));

    let selection = service
        .compare(&[pets[0].id, pets[1].id, pets[2].id])
        .expect("two remain");
    assert_eq!(selection.len(), 2);
    assert!(selection.iter().all(|pet| pet.id != pets[1].id));
}

#[test]
fn empty_selection_is_insufficient() {
    let (service, _, _) = build_service();

    let err = service.compare(&[]).expect_err("nothing selected");
    assert!(matches!(
        err,
        EngagementError::InsufficientSelection { available: 0 }
    ));
}

#[test]
fn saved_comparisons_belong_to_their_owner() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper"]);

    let saved = service
        .save_comparison(&alice(), &[pets[0].id, pets[1].id, pets[0].id])
        .expect("save");
    assert_eq!(saved.pets.len(), 2);

    assert_eq!(service.saved_comparisons(&alice()).expect("alice").len(), 1);
    assert!(service.saved_comparisons(&bob()).expect("bob").is_empty());
}
