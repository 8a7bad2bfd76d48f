use std::sync::Arc;

use super::common::*;
use crate::catalog::domain::{ApplicationStatus, FavoriteState};
use crate::catalog::ids::PetId;
use crate::catalog::intake::ValidationError;
use crate::catalog::memory::InMemoryStore;
use crate::catalog::repository::FavoriteRepository;
use crate::catalog::service::{EngagementError, EngagementService, MissingEntity};

#[test]
fn toggle_adds_then_removes() {
    let (service, store, notifier) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    assert_eq!(
        service.toggle_favorite(&alice(), pet).expect("first toggle"),
        FavoriteState::Added
    );
    assert!(store.favorite_exists(&alice().user, pet).expect("exists"));

    assert_eq!(
        service.toggle_favorite(&alice(), pet).expect("second toggle"),
        FavoriteState::Removed
    );
    assert!(!store.favorite_exists(&alice().user, pet).expect("exists"));
    assert_eq!(
        notifier.templates(),
        vec!["favorite_added".to_string(), "favorite_removed".to_string()]
    );
}

#[test]
fn favorites_are_scoped_per_user() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    service.toggle_favorite(&alice(), pet).expect("alice toggle");
    assert!(service.is_favorite(&alice(), pet).expect("alice"));
    assert!(!service.is_favorite(&bob(), pet).expect("bob"));

    assert_eq!(
        service.toggle_favorite(&bob(), pet).expect("bob toggle"),
        FavoriteState::Added
    );
    assert!(service.is_favorite(&alice(), pet).expect("alice still"));
}

#[test]
fn add_and_remove_are_idempotent() {
    let (service, store, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    assert_eq!(
        service.add_favorite(&alice(), pet).expect("add"),
        FavoriteState::Added
    );
    assert_eq!(
        service.add_favorite(&alice(), pet).expect("repeat add"),
        FavoriteState::AlreadyPresent
    );
    assert_eq!(store.favorites_for(&alice().user).expect("list").len(), 1);

    assert_eq!(
        service.remove_favorite(&alice(), pet).expect("remove"),
        FavoriteState::Removed
    );
    assert_eq!(
        service.remove_favorite(&alice(), pet).expect("repeat remove"),
        FavoriteState::NotPresent
    );
}

#[test]
fn toggle_on_unknown_pet_is_not_found() {
    let (service, _, _) = build_service();

    let err = service
        .toggle_favorite(&alice(), PetId(u64::MAX))
        .expect_err("unknown pet");
    assert!(matches!(
        err,
        EngagementError::NotFound(MissingEntity::Pet(PetId(u64::MAX)))
    ));
}

#[test]
fn adopted_pet_can_be_unfavorited_but_not_favorited() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit"]);
    let pet = pets[0].id;

    service.toggle_favorite(&alice(), pet).expect("alice favorites");
    let application = service
        .submit_application(&bob(), pet, application_form())
        .expect("bob applies");
    service
        .transition(&staff(), application.id, ApplicationStatus::Approved, None)
        .expect("approve");
    service
        .transition(&staff(), application.id, ApplicationStatus::Completed, None)
        .expect("complete");

    let err = service
        .toggle_favorite(&bob(), pet)
        .expect_err("adopted pet cannot be favorited");
    assert!(matches!(
        err,
        EngagementError::Validation(ValidationError::PetUnavailable { .. })
    ));

    assert_eq!(
        service.toggle_favorite(&alice(), pet).expect("unfavorite"),
        FavoriteState::Removed
    );
}

#[test]
fn list_favorites_returns_newest_first() {
    let (service, _, _) = build_service();
    let pets = seed_pets(&service, &["Biscuit", "Pepper", "Juniper"]);

    service.toggle_favorite(&alice(), pets[1].id).expect("pepper");
    service.toggle_favorite(&alice(), pets[0].id).expect("biscuit");
    service.toggle_favorite(&alice(), pets[2].id).expect("juniper");

    let names: Vec<String> = service
        .list_favorites(&alice())
        .expect("list")
        .into_iter()
        .map(|pet| pet.name)
        .collect();
    assert_eq!(names, vec!["Juniper", "Biscuit", "Pepper"]);
}

#[test]
fn notification_failure_does_not_undo_toggle() {
    let store = Arc::new(InMemoryStore::new());
    let service = EngagementService::new(store.clone(), Arc::new(FailingNotifier));
    let pets = seed_pets(&service, &["Biscuit"]);

    assert_eq!(
        service.toggle_favorite(&alice(), pets[0].id).expect("toggle"),
        FavoriteState::Added
    );
    assert!(store
        .favorite_exists(&alice().user, pets[0].id)
        .expect("exists"));
}
