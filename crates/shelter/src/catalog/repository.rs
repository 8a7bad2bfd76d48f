use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    AdoptionApplication, Comment, Favorite, Pet, PetComparison, Shelter, Sponsorship,
};
use super::ids::{ApplicationId, CommentId, PetId, ShelterId, UserId};

/// Error enumeration for entity store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Catalog storage: shelters and pets.
pub trait PetRepository: Send + Sync {
    fn insert_shelter(&self, shelter: Shelter) -> Result<Shelter, RepositoryError>;
    fn fetch_shelter(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError>;
    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError>;
    fn fetch_pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;
    /// Pets with `is_adopted = false`, newest first.
    fn available_pets(&self) -> Result<Vec<Pet>, RepositoryError>;
    /// Pets matching `ids`, newest first. Unknown ids are skipped.
    fn pets_by_ids(&self, ids: &[PetId]) -> Result<Vec<Pet>, RepositoryError>;
    /// Delete a pet together with every relationship that references it.
    fn remove_pet(&self, id: PetId) -> Result<bool, RepositoryError>;
}

/// Favorites are unique per (user, pet); the store enforces it.
pub trait FavoriteRepository: Send + Sync {
    /// Insert if absent. Fails with `Conflict` when the pair already exists.
    fn insert_favorite(&self, favorite: Favorite) -> Result<Favorite, RepositoryError>;
    /// Returns whether a row was deleted.
    fn delete_favorite(&self, user: &UserId, pet: PetId) -> Result<bool, RepositoryError>;
    fn favorite_exists(&self, user: &UserId, pet: PetId) -> Result<bool, RepositoryError>;
    /// Newest first.
    fn favorites_for(&self, user: &UserId) -> Result<Vec<Favorite>, RepositoryError>;
}

/// Append-only pledge log.
pub trait SponsorshipRepository: Send + Sync {
    fn insert_sponsorship(&self, sponsorship: Sponsorship)
        -> Result<Sponsorship, RepositoryError>;
    fn sponsorships_for_pet(&self, pet: PetId) -> Result<Vec<Sponsorship>, RepositoryError>;
}

pub trait CommentRepository: Send + Sync {
    fn insert_comment(&self, comment: Comment) -> Result<Comment, RepositoryError>;
    fn fetch_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError>;
    fn delete_comment(&self, id: CommentId) -> Result<bool, RepositoryError>;
    fn update_comment(&self, comment: Comment) -> Result<(), RepositoryError>;
    /// Every comment on the pet regardless of approval, newest first.
    fn comments_for_pet(&self, pet: PetId) -> Result<Vec<Comment>, RepositoryError>;
}

pub trait ComparisonRepository: Send + Sync {
    fn insert_comparison(&self, comparison: PetComparison)
        -> Result<PetComparison, RepositoryError>;
    fn comparisons_for(&self, user: &UserId) -> Result<Vec<PetComparison>, RepositoryError>;
}

/// Unit of work handed to [`ApplicationRepository::transaction`]. Writes are staged and
/// only become visible when the surrounding closure returns `Ok`.
pub trait StoreTransaction {
    fn pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;
    fn save_pet(&mut self, pet: Pet) -> Result<(), RepositoryError>;
    fn application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;
    fn application_for(
        &self,
        user: &UserId,
        pet: PetId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;
    /// Insert if no application exists for the same (user, pet), else `Conflict`.
    fn insert_application(
        &mut self,
        application: AdoptionApplication,
    ) -> Result<AdoptionApplication, RepositoryError>;
    fn save_application(&mut self, application: AdoptionApplication)
        -> Result<(), RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    /// Run `work` atomically. Staged writes are discarded on every `Err` path.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>;

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;
    fn application_for(
        &self,
        user: &UserId,
        pet: PetId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;
    /// Newest first.
    fn applications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError>;
    /// Newest first.
    fn applications_for_pet(&self, pet: PetId)
        -> Result<Vec<AdoptionApplication>, RepositoryError>;
}

/// Full entity store consumed by the engagement service.
pub trait ShelterRepository:
    PetRepository
    + FavoriteRepository
    + SponsorshipRepository
    + CommentRepository
    + ComparisonRepository
    + ApplicationRepository
{
}

impl<T> ShelterRepository for T where
    T: PetRepository
        + FavoriteRepository
        + SponsorshipRepository
        + CommentRepository
        + ComparisonRepository
        + ApplicationRepository
{
}

/// Outbound messaging surface informed of completed user actions.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notice: Notice) -> Result<(), NotificationError>;
}

/// Structured outcome; rendering it into display text is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub template: String,
    pub user: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetId>,
    pub details: BTreeMap<String, String>,
}

impl Notice {
    pub fn new(template: &str, user: &UserId, pet: Option<PetId>) -> Self {
        Self {
            template: template.to_string(),
            user: user.clone(),
            pet,
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
