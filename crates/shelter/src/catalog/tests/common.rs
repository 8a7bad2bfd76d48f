use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::catalog::domain::{
    Actor, AdoptionApplication, ApplicationForm, Comment, Favorite, NewPet, NewShelter, Pet,
    PetComparison, PetKind, Shelter, Sponsorship,
};
use crate::catalog::ids::{ApplicationId, CommentId, PetId, ShelterId, UserId};
use crate::catalog::memory::InMemoryStore;
use crate::catalog::repository::{
    ApplicationRepository, CommentRepository, ComparisonRepository, FavoriteRepository, Notice,
    NotificationError, NotificationSink, PetRepository, RepositoryError, SponsorshipRepository,
    StoreTransaction,
};
use crate::catalog::router::catalog_router;
use crate::catalog::service::EngagementService;

pub(super) type MemoryService = EngagementService<InMemoryStore, RecordingNotifier>;

pub(super) fn staff() -> Actor {
    Actor::staff("staff-1")
}

pub(super) fn alice() -> Actor {
    Actor::member("alice")
}

pub(super) fn bob() -> Actor {
    Actor::member("bob")
}

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = EngagementService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn shelter_form() -> NewShelter {
    NewShelter {
        name: "Harbor Animal Rescue".to_string(),
        address: "12 Dock Street".to_string(),
        phone: "555-0100".to_string(),
        email: "hello@harbor.example".to_string(),
        website: None,
        description: "Volunteer run shelter".to_string(),
    }
}

pub(super) fn pet_form(shelter: ShelterId, name: &str, kind: PetKind) -> NewPet {
    NewPet {
        name: name.to_string(),
        kind,
        age_months: 26,
        shelter,
        history: "Found near the harbor".to_string(),
        character: "Calm and curious".to_string(),
        special_needs: String::new(),
    }
}

/// Registers a shelter and `names.len()` dogs, returning the pets in registration order.
pub(super) fn seed_pets<R, N>(service: &EngagementService<R, N>, names: &[&str]) -> Vec<Pet>
where
    R: crate::catalog::repository::ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let shelter = service
        .register_shelter(&staff(), shelter_form())
        .expect("register shelter");
    names
        .iter()
        .map(|name| {
            service
                .register_pet(&staff(), pet_form(shelter.id, name, PetKind::Dog))
                .expect("register pet")
        })
        .collect()
}

pub(super) fn application_form() -> ApplicationForm {
    ApplicationForm {
        full_name: "Alice Example".to_string(),
        phone: "555-0199".to_string(),
        email: "alice@example.com".to_string(),
        address: "4 Elm Row".to_string(),
        housing_type: "House".to_string(),
        has_yard: true,
        other_pets: "One cat".to_string(),
        experience: "Raised two dogs".to_string(),
        motivation: "Looking for a walking companion".to_string(),
        work_schedule: "Remote, flexible".to_string(),
        family_members: "Two adults".to_string(),
        additional_info: String::new(),
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .map(|notice| notice.template)
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn publish(&self, notice: Notice) -> Result<(), NotificationError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl NotificationSink for FailingNotifier {
    fn publish(&self, _notice: Notice) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

/// Store whose every primitive fails, for exercising the 500 path.
pub(super) struct OfflineStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl PetRepository for OfflineStore {
    fn insert_shelter(&self, _shelter: Shelter) -> Result<Shelter, RepositoryError> {
        offline()
    }

    fn fetch_shelter(&self, _id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        offline()
    }

    fn insert_pet(&self, _pet: Pet) -> Result<Pet, RepositoryError> {
        offline()
    }

    fn fetch_pet(&self, _id: PetId) -> Result<Option<Pet>, RepositoryError> {
        offline()
    }

    fn available_pets(&self) -> Result<Vec<Pet>, RepositoryError> {
        offline()
    }

    fn pets_by_ids(&self, _ids: &[PetId]) -> Result<Vec<Pet>, RepositoryError> {
        offline()
    }

    fn remove_pet(&self, _id: PetId) -> Result<bool, RepositoryError> {
        offline()
    }
}

impl FavoriteRepository for OfflineStore {
    fn insert_favorite(&self, _favorite: Favorite) -> Result<Favorite, RepositoryError> {
        offline()
    }

    fn delete_favorite(&self, _user: &UserId, _pet: PetId) -> Result<bool, RepositoryError> {
        offline()
    }

    fn favorite_exists(&self, _user: &UserId, _pet: PetId) -> Result<bool, RepositoryError> {
        offline()
    }

    fn favorites_for(&self, _user: &UserId) -> Result<Vec<Favorite>, RepositoryError> {
        offline()
    }
}

impl SponsorshipRepository for OfflineStore {
    fn insert_sponsorship(
        &self,
        _sponsorship: Sponsorship,
    ) -> Result<Sponsorship, RepositoryError> {
        offline()
    }

    fn sponsorships_for_pet(&self, _pet: PetId) -> Result<Vec<Sponsorship>, RepositoryError> {
        offline()
    }
}

impl CommentRepository for OfflineStore {
    fn insert_comment(&self, _comment: Comment) -> Result<Comment, RepositoryError> {
        offline()
    }

    fn fetch_comment(&self, _id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        offline()
    }

    fn delete_comment(&self, _id: CommentId) -> Result<bool, RepositoryError> {
        offline()
    }

    fn update_comment(&self, _comment: Comment) -> Result<(), RepositoryError> {
        offline()
    }

    fn comments_for_pet(&self, _pet: PetId) -> Result<Vec<Comment>, RepositoryError> {
        offline()
    }
}

impl ComparisonRepository for OfflineStore {
    fn insert_comparison(
        &self,
        _comparison: PetComparison,
    ) -> Result<PetComparison, RepositoryError> {
        offline()
    }

    fn comparisons_for(&self, _user: &UserId) -> Result<Vec<PetComparison>, RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for OfflineStore {
    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn fetch_application(
        &self,
        _id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        offline()
    }

    fn application_for(
        &self,
        _user: &UserId,
        _pet: PetId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        offline()
    }

    fn applications_for_user(
        &self,
        _user: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        offline()
    }

    fn applications_for_pet(
        &self,
        _pet: PetId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    catalog_router(Arc::new(service))
}
