use chrono::Utc;
use tracing::info;

use super::{EngagementError, EngagementService};
use crate::catalog::domain::{Actor, Favorite, FavoriteState, Pet};
use crate::catalog::ids::PetId;
use crate::catalog::intake::ValidationError;
use crate::catalog::repository::{Notice, NotificationSink, RepositoryError, ShelterRepository};

impl<R, N> EngagementService<R, N>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    /// Add the favorite when absent, remove it when present.
    ///
    /// The insert goes first: a store conflict means the pair already exists, so the
    /// conflicting writer falls through to delete. Every reported state matches a real write.
    pub fn toggle_favorite(
        &self,
        actor: &Actor,
        pet_id: PetId,
    ) -> Result<FavoriteState, EngagementError> {
        let pet = self.require_pet(pet_id)?;

        if !pet.is_available() {
            return if self.repository.delete_favorite(&actor.user, pet_id)? {
                self.favorite_changed(actor, &pet, FavoriteState::Removed);
                Ok(FavoriteState::Removed)
            } else {
                Err(ValidationError::PetUnavailable { pet: pet_id }.into())
            };
        }

        let state = loop {
            match self.repository.insert_favorite(Favorite {
                user: actor.user.clone(),
                pet: pet_id,
                added_at: Utc::now(),
            }) {
                Ok(_) => break FavoriteState::Added,
                Err(RepositoryError::Conflict) => {
                    if self.repository.delete_favorite(&actor.user, pet_id)? {
                        break FavoriteState::Removed;
                    }
                    // Another toggle removed the row between our insert and delete.
                }
                Err(other) => return Err(other.into()),
            }
        };

        self.favorite_changed(actor, &pet, state);
        Ok(state)
    }

    /// Idempotent add; reports `AlreadyPresent` instead of failing on a repeat.
    pub fn add_favorite(
        &self,
        actor: &Actor,
        pet_id: PetId,
    ) -> Result<FavoriteState, EngagementError> {
        let pet = self.require_pet(pet_id)?;
        self.guard.ensure_available(&pet)?;

        let state = match self.repository.insert_favorite(Favorite {
            user: actor.user.clone(),
            pet: pet_id,
            added_at: Utc::now(),
        }) {
            Ok(_) => FavoriteState::Added,
            Err(RepositoryError::Conflict) => FavoriteState::AlreadyPresent,
            Err(other) => return Err(other.into()),
        };

        if state == FavoriteState::Added {
            self.favorite_changed(actor, &pet, state);
        }
        Ok(state)
    }

    pub fn remove_favorite(
        &self,
        actor: &Actor,
        pet_id: PetId,
    ) -> Result<FavoriteState, EngagementError> {
        let pet = self.require_pet(pet_id)?;
        if self.repository.delete_favorite(&actor.user, pet_id)? {
            self.favorite_changed(actor, &pet, FavoriteState::Removed);
            Ok(FavoriteState::Removed)
        } else {
            Ok(FavoriteState::NotPresent)
        }
    }

    pub fn is_favorite(&self, actor: &Actor, pet_id: PetId) -> Result<bool, EngagementError> {
        Ok(self.repository.favorite_exists(&actor.user, pet_id)?)
    }

    /// Favorited pets, most recently added first.
    pub fn list_favorites(&self, actor: &Actor) -> Result<Vec<Pet>, EngagementError> {
        let favorites = self.repository.favorites_for(&actor.user)?;
        let mut pets = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            if let Some(pet) = self.repository.fetch_pet(favorite.pet)? {
                pets.push(pet);
            }
        }
        Ok(pets)
    }

    fn favorite_changed(&self, actor: &Actor, pet: &Pet, state: FavoriteState) {
        info!(user = %actor.user, pet = %pet.id, state = state.label(), "favorite updated");
        let template = match state {
            FavoriteState::Removed => "favorite_removed",
            _ => "favorite_added",
        };
        self.notify(
            Notice::new(template, &actor.user, Some(pet.id)).with_detail("pet_name", &pet.name),
        );
    }
}
