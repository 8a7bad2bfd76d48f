//! Engagement service: the single entry point the web layer calls for every user action.
//!
//! Each submodule contributes one slice of behavior (favorites, sponsorships, comparisons,
//! comments, adoption applications) as an `impl` block on [`EngagementService`].

mod applications;
mod comments;
mod comparisons;
mod favorites;
mod sponsorships;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    Actor, AdoptionApplication, ApplicationStatus, NewPet, NewShelter, Pet, PetDetail, Shelter,
};
use super::ids::{ApplicationId, CommentId, PetId, ShelterId};
use super::intake::{IntakeGuard, ValidationError};
use super::repository::{Notice, NotificationSink, RepositoryError, ShelterRepository};

/// Service composing the intake guard, entity store, and notification sink.
pub struct EngagementService<R, N> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> EngagementService<R, N>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self::with_guard(IntakeGuard::default(), repository, notifier)
    }

    pub fn with_guard(guard: IntakeGuard, repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
            notifier,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn register_shelter(
        &self,
        actor: &Actor,
        shelter: NewShelter,
    ) -> Result<Shelter, EngagementError> {
        require_staff(actor, "only staff may register shelters")?;
        let stored = self.repository.insert_shelter(Shelter {
            id: ShelterId::next(),
            name: shelter.name,
            address: shelter.address,
            phone: shelter.phone,
            email: shelter.email,
            website: shelter.website,
            description: shelter.description,
        })?;
        info!(shelter = %stored.id, name = %stored.name, "shelter registered");
        Ok(stored)
    }

    pub fn register_pet(&self, actor: &Actor, pet: NewPet) -> Result<Pet, EngagementError> {
        require_staff(actor, "only staff may register pets")?;
        let shelter = pet.shelter;
        let stored = self
            .repository
            .insert_pet(Pet {
                id: PetId::next(),
                name: pet.name,
                kind: pet.kind,
                age_months: pet.age_months,
                shelter,
                history: pet.history,
                character: pet.character,
                special_needs: pet.special_needs,
                is_adopted: false,
                added_at: Utc::now(),
            })
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    EngagementError::NotFound(MissingEntity::Shelter(shelter))
                }
                other => other.into(),
            })?;
        info!(pet = %stored.id, kind = stored.kind.label(), "pet registered");
        Ok(stored)
    }

    /// Public catalog: pets still up for adoption, newest first.
    pub fn available_pets(&self) -> Result<Vec<Pet>, EngagementError> {
        Ok(self.repository.available_pets()?)
    }

    /// Pet page payload. Viewer specific fields stay empty for anonymous callers.
    pub fn pet_detail(
        &self,
        viewer: Option<&Actor>,
        pet_id: PetId,
    ) -> Result<PetDetail, EngagementError> {
        let pet = self.require_pet(pet_id)?;
        let shelter = self.repository.fetch_shelter(pet.shelter)?;
        let comments = self.visible_comments(pet_id)?;

        let (is_favorite, application) = match viewer {
            Some(actor) => (
                self.repository.favorite_exists(&actor.user, pet_id)?,
                self.repository
                    .application_for(&actor.user, pet_id)?
                    .map(|application| application.status_view()),
            ),
            None => (false, None),
        };

        Ok(PetDetail {
            age_label: pet.age_label(),
            pet,
            shelter,
            comments,
            is_favorite,
            application,
        })
    }

    /// Delete a pet and every relationship that references it.
    pub fn remove_pet(&self, actor: &Actor, pet_id: PetId) -> Result<(), EngagementError> {
        require_staff(actor, "only staff may remove pets")?;
        if !self.repository.remove_pet(pet_id)? {
            return Err(EngagementError::NotFound(MissingEntity::Pet(pet_id)));
        }
        info!(pet = %pet_id, staff = %actor.user, "pet removed with its relationships");
        Ok(())
    }

    fn require_pet(&self, pet_id: PetId) -> Result<Pet, EngagementError> {
        self.repository
            .fetch_pet(pet_id)?
            .ok_or(EngagementError::NotFound(MissingEntity::Pet(pet_id)))
    }

    /// Notification failures never undo a committed mutation.
    fn notify(&self, notice: Notice) {
        let template = notice.template.clone();
        if let Err(err) = self.notifier.publish(notice) {
            warn!(%template, error = %err, "notification dropped");
        }
    }
}

fn require_staff(actor: &Actor, reason: &'static str) -> Result<(), EngagementError> {
    if actor.is_staff() {
        Ok(())
    } else {
        Err(EngagementError::Permission(reason))
    }
}

/// Referenced record that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntity {
    Pet(PetId),
    Shelter(ShelterId),
    Comment(CommentId),
    Application(ApplicationId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingEntity::Pet(id) => write!(f, "pet {id}"),
            MissingEntity::Shelter(id) => write!(f, "shelter {id}"),
            MissingEntity::Comment(id) => write!(f, "comment {id}"),
            MissingEntity::Application(id) => write!(f, "application {id}"),
        }
    }
}

/// Error raised by the engagement service. Every variant is recoverable by the caller.
#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("{0} not found")]
    NotFound(MissingEntity),
    #[error("authentication required")]
    AuthRequired,
    #[error("permission denied: {0}")]
    Permission(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("an application for this pet already exists (status: {})", existing.status)]
    DuplicateApplication { existing: Box<AdoptionApplication> },
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("select at least two available pets to compare (found {available})")]
    InsufficientSelection { available: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
