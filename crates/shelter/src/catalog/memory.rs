use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    AdoptionApplication, Comment, Favorite, Pet, PetComparison, Shelter, Sponsorship,
};
use super::ids::{
    ApplicationId, CommentId, ComparisonId, PetId, ShelterId, SponsorshipId, UserId,
};
use super::repository::{
    ApplicationRepository, CommentRepository, ComparisonRepository, FavoriteRepository,
    PetRepository, RepositoryError, SponsorshipRepository, StoreTransaction,
};

/// Process-local entity store. Every primitive runs under one mutex, which gives the
/// insert-if-absent and transaction guarantees the service relies on.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<ShelterState>>,
}

#[derive(Default)]
struct ShelterState {
    shelters: HashMap<ShelterId, Shelter>,
    pets: HashMap<PetId, Pet>,
    favorites: HashMap<(UserId, PetId), (u64, Favorite)>,
    favorite_sequence: u64,
    sponsorships: HashMap<SponsorshipId, Sponsorship>,
    comments: HashMap<CommentId, Comment>,
    comparisons: HashMap<ComparisonId, PetComparison>,
    applications: HashMap<ApplicationId, AdoptionApplication>,
    application_index: HashMap<(UserId, PetId), ApplicationId>,
}

impl ShelterState {
    fn require_pet(&self, id: PetId) -> Result<(), RepositoryError> {
        if self.pets.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn commit(
        &mut self,
        pets: HashMap<PetId, Pet>,
        applications: HashMap<ApplicationId, AdoptionApplication>,
    ) {
        self.pets.extend(pets);
        for (id, application) in applications {
            self.application_index
                .insert((application.user.clone(), application.pet), id);
            self.applications.insert(id, application);
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ShelterState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn newest_pets_first(pets: &mut [Pet]) {
    pets.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));
}

fn newest_applications_first(applications: &mut [AdoptionApplication]) {
    applications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl PetRepository for InMemoryStore {
    fn insert_shelter(&self, shelter: Shelter) -> Result<Shelter, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.shelters.contains_key(&shelter.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.shelters.insert(shelter.id, shelter.clone());
        Ok(shelter)
    }

    fn fetch_shelter(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        Ok(self.lock()?.shelters.get(&id).cloned())
    }

    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.shelters.contains_key(&pet.shelter) {
            return Err(RepositoryError::NotFound);
        }
        if guard.pets.contains_key(&pet.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    fn fetch_pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self.lock()?.pets.get(&id).cloned())
    }

    fn available_pets(&self) -> Result<Vec<Pet>, RepositoryError> {
        let guard = self.lock()?;
        let mut pets: Vec<Pet> = guard
            .pets
            .values()
            .filter(|pet| pet.is_available())
            .cloned()
            .collect();
        newest_pets_first(&mut pets);
        Ok(pets)
    }

    fn pets_by_ids(&self, ids: &[PetId]) -> Result<Vec<Pet>, RepositoryError> {
        let guard = self.lock()?;
        let mut pets: Vec<Pet> = guard
            .pets
            .values()
            .filter(|pet| ids.contains(&pet.id))
            .cloned()
            .collect();
        newest_pets_first(&mut pets);
        Ok(pets)
    }

    fn remove_pet(&self, id: PetId) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.pets.remove(&id).is_none() {
            return Ok(false);
        }

        let state = &mut *guard;
        state.favorites.retain(|(_, pet), _| *pet != id);
        state.sponsorships.retain(|_, sponsorship| sponsorship.pet != id);
        state.comments.retain(|_, comment| comment.pet != id);
        state.applications.retain(|_, application| application.pet != id);
        state.application_index.retain(|(_, pet), _| *pet != id);
        state.comparisons.retain(|_, comparison| {
            comparison.pets.remove(&id);
            comparison.pets.len() >= 2
        });
        Ok(true)
    }
}

impl FavoriteRepository for InMemoryStore {
    fn insert_favorite(&self, favorite: Favorite) -> Result<Favorite, RepositoryError> {
        let mut guard = self.lock()?;
        guard.require_pet(favorite.pet)?;

        let key = (favorite.user.clone(), favorite.pet);
        if guard.favorites.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.favorite_sequence += 1;
        let sequence = guard.favorite_sequence;
        guard.favorites.insert(key, (sequence, favorite.clone()));
        Ok(favorite)
    }

    fn delete_favorite(&self, user: &UserId, pet: PetId) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        Ok(guard.favorites.remove(&(user.clone(), pet)).is_some())
    }

    fn favorite_exists(&self, user: &UserId, pet: PetId) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.favorites.contains_key(&(user.clone(), pet)))
    }

    fn favorites_for(&self, user: &UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let guard = self.lock()?;
        let mut entries: Vec<&(u64, Favorite)> = guard
            .favorites
            .iter()
            .filter(|((owner, _), _)| owner == user)
            .map(|(_, entry)| entry)
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries
            .into_iter()
            .map(|(_, favorite)| favorite.clone())
            .collect())
    }
}

impl SponsorshipRepository for InMemoryStore {
    fn insert_sponsorship(
        &self,
        sponsorship: Sponsorship,
    ) -> Result<Sponsorship, RepositoryError> {
        let mut guard = self.lock()?;
        guard.require_pet(sponsorship.pet)?;
        if guard.sponsorships.contains_key(&sponsorship.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.sponsorships.insert(sponsorship.id, sponsorship.clone());
        Ok(sponsorship)
    }

    fn sponsorships_for_pet(&self, pet: PetId) -> Result<Vec<Sponsorship>, RepositoryError> {
        let guard = self.lock()?;
        let mut pledges: Vec<Sponsorship> = guard
            .sponsorships
            .values()
            .filter(|sponsorship| sponsorship.pet == pet)
            .cloned()
            .collect();
        pledges.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(pledges)
    }
}

impl CommentRepository for InMemoryStore {
    fn insert_comment(&self, comment: Comment) -> Result<Comment, RepositoryError> {
        let mut guard = self.lock()?;
        guard.require_pet(comment.pet)?;
        if guard.comments.contains_key(&comment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn fetch_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        Ok(self.lock()?.comments.get(&id).cloned())
    }

    fn delete_comment(&self, id: CommentId) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.comments.remove(&id).is_some())
    }

    fn update_comment(&self, comment: Comment) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.comments.get_mut(&comment.id) {
            Some(existing) => {
                *existing = comment;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn comments_for_pet(&self, pet: PetId) -> Result<Vec<Comment>, RepositoryError> {
        let guard = self.lock()?;
        let mut comments: Vec<Comment> = guard
            .comments
            .values()
            .filter(|comment| comment.pet == pet)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }
}

impl ComparisonRepository for InMemoryStore {
    fn insert_comparison(
        &self,
        comparison: PetComparison,
    ) -> Result<PetComparison, RepositoryError> {
        let mut guard = self.lock()?;
        for pet in &comparison.pets {
            guard.require_pet(*pet)?;
        }
        if guard.comparisons.contains_key(&comparison.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.comparisons.insert(comparison.id, comparison.clone());
        Ok(comparison)
    }

    fn comparisons_for(&self, user: &UserId) -> Result<Vec<PetComparison>, RepositoryError> {
        let guard = self.lock()?;
        let mut baskets: Vec<PetComparison> = guard
            .comparisons
            .values()
            .filter(|comparison| &comparison.user == user)
            .cloned()
            .collect();
        baskets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(baskets)
    }
}

/// Staged writes over a locked snapshot of the store.
struct MemoryTransaction<'a> {
    state: &'a ShelterState,
    pets: HashMap<PetId, Pet>,
    applications: HashMap<ApplicationId, AdoptionApplication>,
}

impl<'a> MemoryTransaction<'a> {
    fn new(state: &'a ShelterState) -> Self {
        Self {
            state,
            pets: HashMap::new(),
            applications: HashMap::new(),
        }
    }
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self
            .pets
            .get(&id)
            .or_else(|| self.state.pets.get(&id))
            .cloned())
    }

    fn save_pet(&mut self, pet: Pet) -> Result<(), RepositoryError> {
        if !self.pets.contains_key(&pet.id) && !self.state.pets.contains_key(&pet.id) {
            return Err(RepositoryError::NotFound);
        }
        self.pets.insert(pet.id, pet);
        Ok(())
    }

    fn application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(self
            .applications
            .get(&id)
            .or_else(|| self.state.applications.get(&id))
            .cloned())
    }

    fn application_for(
        &self,
        user: &UserId,
        pet: PetId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        if let Some(staged) = self
            .applications
            .values()
            .find(|application| &application.user == user && application.pet == pet)
        {
            return Ok(Some(staged.clone()));
        }
        Ok(self
            .state
            .application_index
            .get(&(user.clone(), pet))
            .and_then(|id| self.state.applications.get(id))
            .cloned())
    }

    fn insert_application(
        &mut self,
        application: AdoptionApplication,
    ) -> Result<AdoptionApplication, RepositoryError> {
        if self.pet(application.pet)?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        if self
            .application_for(&application.user, application.pet)?
            .is_some()
            || self.application(application.id)?.is_some()
        {
            return Err(RepositoryError::Conflict);
        }
        self.applications.insert(application.id, application.clone());
        Ok(application)
    }

    fn save_application(
        &mut self,
        application: AdoptionApplication,
    ) -> Result<(), RepositoryError> {
        match self.application(application.id)? {
            Some(existing)
                if existing.user == application.user && existing.pet == application.pet =>
            {
                self.applications.insert(application.id, application);
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl ApplicationRepository for InMemoryStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.lock()?;
        let mut tx = MemoryTransaction::new(&guard);
        let output = work(&mut tx)?;
        let MemoryTransaction {
            pets, applications, ..
        } = tx;
        guard.commit(pets, applications);
        Ok(output)
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn application_for(
        &self,
        user: &UserId,
        pet: PetId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .application_index
            .get(&(user.clone(), pet))
            .and_then(|id| guard.applications.get(id))
            .cloned())
    }

    fn applications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        let guard = self.lock()?;
        let mut applications: Vec<AdoptionApplication> = guard
            .applications
            .values()
            .filter(|application| &application.user == user)
            .cloned()
            .collect();
        newest_applications_first(&mut applications);
        Ok(applications)
    }

    fn applications_for_pet(
        &self,
        pet: PetId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        let guard = self.lock()?;
        let mut applications: Vec<AdoptionApplication> = guard
            .applications
            .values()
            .filter(|application| application.pet == pet)
            .cloned()
            .collect();
        newest_applications_first(&mut applications);
        Ok(applications)
    }
}
