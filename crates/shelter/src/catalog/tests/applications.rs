use super::common::*;
use crate::catalog::domain::{Actor, ApplicationForm, ApplicationStatus};
use crate::catalog::ids::{ApplicationId, PetId};
use crate::catalog::intake::ValidationError;
use crate::catalog::repository::PetRepository;
use crate::catalog::service::{EngagementError, MissingEntity};

#[test]
fn submit_stores_pending_application() {
    let (service, _, notifier) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    let application = service
        .submit_application(&alice(), pet, application_form())
        .expect("submit");
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.user, alice().user);
    assert!(application.admin_notes.is_empty());

    let stored = service
        .application_for(&alice(), pet)
        .expect("lookup")
        .expect("stored");
    assert_eq!(stored.id, application.id);
    assert_eq!(
        notifier.templates(),
        vec!["application_submitted".to_string()]
    );
}

#[test]
fn duplicate_submission_reports_existing_application() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    let first = service
        .submit_application(&alice(), pet, application_form())
        .expect("first");
    let err = service
        .submit_application(&alice(), pet, application_form())
        .expect_err("duplicate");

    match err {
        EngagementError::DuplicateApplication { existing } => {
            assert_eq!(existing.id, first.id);
            assert_eq!(existing.status, ApplicationStatus::Pending);
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(service.list_for_user(&alice()).expect("list").len(), 1);
}

#[test]
fn rejected_application_still_blocks_resubmission() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    let first = service
        .submit_application(&alice(), pet, application_form())
        .expect("first");
    service
        .transition(&staff(), first.id, ApplicationStatus::Rejected, None)
        .expect("reject");

    let err = service
        .submit_application(&alice(), pet, application_form())
        .expect_err("still unique");
    assert!(matches!(err, EngagementError::DuplicateApplication { .. }));
}

#[test]
fn missing_fields_are_named() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);

    let form = ApplicationForm {
        phone: "   ".to_string(),
        motivation: String::new(),
        ..application_form()
    };
    let err = service
        .submit_application(&alice(), pets[0].id, form)
        .expect_err("missing fields");

    match err {
        EngagementError::Validation(ValidationError::MissingFields { fields }) => {
            assert_eq!(fields, vec!["phone", "motivation"]);
        }
        other => panic!("expected missing fields, got {other:?}"),
    }
    assert!(service
        .application_for(&alice(), pets[0].id)
        .expect("lookup")
        .is_none());
}

#[test]
fn overlong_and_malformed_fields_are_rejected() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);

    let long_phone = ApplicationForm {
        phone: "5".repeat(21),
        ..application_form()
    };
    let err = service
        .submit_application(&alice(), pets[0].id, long_phone)
        .expect_err("phone too long");
    assert!(matches!(
        err,
        EngagementError::Validation(ValidationError::FieldTooLong { field: "phone", max: 20 })
    ));

    let bad_email = ApplicationForm {
        email: "alice.example.com".to_string(),
        ..application_form()
    };
    let err = service
        .submit_application(&alice(), pets[0].id, bad_email)
        .expect_err("malformed email");
    assert!(matches!(
        err,
        EngagementError::Validation(ValidationError::MalformedEmail)
    ));
}

#[test]
fn unknown_pet_is_not_found() {
    let (service, _, _) = build_service();

    let err = service
        .submit_application(&alice(), PetId(u64::MAX), application_form())
        .expect_err("unknown pet");
    assert!(matches!(
        err,
        EngagementError::NotFound(MissingEntity::Pet(_))
    ));
}

#[test]
fn lifecycle_follows_transition_table() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let application = service
        .submit_application(&alice(), pets[0].id, application_form())
        .expect("submit");

    let err = service
        .transition(&staff(), application.id, ApplicationStatus::Completed, None)
        .expect_err("pending cannot complete");
    assert!(matches!(
        err,
        EngagementError::InvalidTransition {
            from: ApplicationStatus::Pending,
            to: ApplicationStatus::Completed,
        }
    ));

    let approved = service
        .transition(
            &staff(),
            application.id,
            ApplicationStatus::Approved,
            Some("  Home visit booked ".to_string()),
        )
        .expect("approve");
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert_eq!(approved.admin_notes, "Home visit booked");
    assert!(approved.updated_at >= application.updated_at);

    let err = service
        .transition(&staff(), application.id, ApplicationStatus::Rejected, None)
        .expect_err("approved cannot be rejected");
    assert!(matches!(err, EngagementError::InvalidTransition { .. }));

    let completed = service
        .transition(&staff(), application.id, ApplicationStatus::Completed, None)
        .expect("complete");
    assert_eq!(completed.status, ApplicationStatus::Completed);
    assert_eq!(completed.admin_notes, "Home visit booked");

    for next in ApplicationStatus::ALL {
        let err = service
            .transition(&staff(), application.id, next, None)
            .expect_err("completed is terminal");
        assert!(matches!(err, EngagementError::InvalidTransition { .. }));
    }
}

#[test]
fn completion_marks_pet_adopted() {
    let (service, store, notifier) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper"]);
    let pet = pets[0].id;

    let application = service
        .submit_application(&alice(), pet, application_form())
        .expect("submit");
    service
        .transition(&staff(), application.id, ApplicationStatus::Approved, None)
        .expect("approve");
    assert!(!store.fetch_pet(pet).expect("fetch").expect("pet").is_adopted);

    service
        .transition(&staff(), application.id, ApplicationStatus::Completed, None)
        .expect("complete");
    assert!(store.fetch_pet(pet).expect("fetch").expect("pet").is_adopted);

    let catalog: Vec<PetId> = service
        .available_pets()
        .expect("catalog")
        .into_iter()
        .map(|pet| pet.id)
        .collect();
    assert_eq!(catalog, vec![pets[1].id]);

    let templates = notifier.templates();
    assert_eq!(
        templates
            .iter()
            .filter(|template| template.as_str() == "application_status_changed")
            .count(),
        2
    );
}

#[test]
fn other_applicants_see_pet_unavailable_after_adoption() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    let alices = service
        .submit_application(&alice(), pet, application_form())
        .expect("alice applies");
    let bobs = service
        .submit_application(&bob(), pet, application_form())
        .expect("bob applies");

    service
        .transition(&staff(), alices.id, ApplicationStatus::Approved, None)
        .expect("approve alice");
    service
        .transition(&staff(), alices.id, ApplicationStatus::Completed, None)
        .expect("complete alice");

    let err = service
        .submit_application(&Actor::member("carol"), pet, application_form())
        .expect_err("adopted");
    assert!(matches!(
        err,
        EngagementError::Validation(ValidationError::PetUnavailable { .. })
    ));

    let err = service
        .submit_application(&bob(), pet, application_form())
        .expect_err("bob already applied");
    assert!(matches!(err, EngagementError::DuplicateApplication { .. }));

    service
        .transition(&staff(), bobs.id, ApplicationStatus::Approved, None)
        .expect("approve bob");
    let err = service
        .transition(&staff(), bobs.id, ApplicationStatus::Completed, None)
        .expect_err("pet already adopted");
    assert!(matches!(
        err,
        EngagementError::Validation(ValidationError::PetUnavailable { .. })
    ));

    let bobs = service
        .application_for(&bob(), pet)
        .expect("lookup")
        .expect("stored");
    assert_eq!(bobs.status, ApplicationStatus::Approved);
}

#[test]
fn transitions_require_staff() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let application = service
        .submit_application(&alice(), pets[0].id, application_form())
        .expect("submit");

    let err = service
        .transition(&alice(), application.id, ApplicationStatus::Approved, None)
        .expect_err("applicant cannot approve");
    assert!(matches!(err, EngagementError::Permission(_)));

    let err = service
        .transition(&staff(), ApplicationId(u64::MAX), ApplicationStatus::Approved, None)
        .expect_err("unknown application");
    assert!(matches!(
        err,
        EngagementError::NotFound(MissingEntity::Application(_))
    ));
}

#[test]
fn list_for_user_pairs_applications_with_pets() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper"]);

    service
        .submit_application(&alice(), pets[0].id, application_form())
        .expect("first");
    service
        .submit_application(&alice(), pets[1].id, application_form())
        .expect("second");
    service
        .submit_application(&bob(), pets[0].id, application_form())
        .expect("bob");

    let listing = service.list_for_user(&alice()).expect("list");
    let names: Vec<&str> = listing.iter().map(|entry| entry.pet.name.as_str()).collect();
    assert_eq!(names, vec!["Pepper", "Biscuit"]);
    assert!(listing
        .iter()
        .all(|entry| entry.application.user == alice().user));

    let reviewed = service
        .applications_for_pet(&staff(), pets[0].id)
        .expect("staff review");
    assert_eq!(reviewed.len(), 2);
}

#[test]
fn pet_detail_reflects_viewer_state() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    service.toggle_favorite(&alice(), pet).expect("favorite");
    service
        .submit_application(&alice(), pet, application_form())
        .expect("apply");

    let mine = service.pet_detail(Some(&alice()), pet).expect("alice view");
    assert!(mine.is_favorite);
    assert_eq!(
        mine.application.as_ref().map(|view| view.status),
        Some("pending")
    );
    assert_eq!(mine.age_label, "2 y 2 mo");
    assert!(mine.shelter.is_some());

    let anonymous = service.pet_detail(None, pet).expect("anonymous view");
    assert!(!anonymous.is_favorite);
    assert!(anonymous.application.is_none());
}
