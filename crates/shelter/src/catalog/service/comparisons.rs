use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use super::{EngagementError, EngagementService};
use crate::catalog::domain::{Actor, Pet, PetComparison};
use crate::catalog::ids::{ComparisonId, PetId};
use crate::catalog::repository::{NotificationSink, ShelterRepository};

const MINIMUM_SELECTION: usize = 2;

impl<R, N> EngagementService<R, N>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    /// Resolve a selection into available pets for side-by-side viewing.
    ///
    /// Repeated ids collapse, unknown or adopted pets drop out, and what remains must
    /// still hold at least two pets.
    pub fn compare(&self, pet_ids: &[PetId]) -> Result<Vec<Pet>, EngagementError> {
        let unique: BTreeSet<PetId> = pet_ids.iter().copied().collect();
        let ids: Vec<PetId> = unique.into_iter().collect();

        let pets: Vec<Pet> = self
            .repository
            .pets_by_ids(&ids)?
            .into_iter()
            .filter(Pet::is_available)
            .collect();

        if pets.len() < MINIMUM_SELECTION {
            return Err(EngagementError::InsufficientSelection {
                available: pets.len(),
            });
        }
        Ok(pets)
    }

    pub fn save_comparison(
        &self,
        actor: &Actor,
        pet_ids: &[PetId],
    ) -> Result<PetComparison, EngagementError> {
        let pets = self.compare(pet_ids)?;
        let stored = self.repository.insert_comparison(PetComparison {
            id: ComparisonId::next(),
            user: actor.user.clone(),
            pets: pets.iter().map(|pet| pet.id).collect(),
            created_at: Utc::now(),
        })?;
        info!(user = %actor.user, basket = %stored.id, size = stored.pets.len(), "comparison saved");
        Ok(stored)
    }

    pub fn saved_comparisons(&self, actor: &Actor) -> Result<Vec<PetComparison>, EngagementError> {
        Ok(self.repository.comparisons_for(&actor.user)?)
    }
}
