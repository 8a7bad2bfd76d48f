use chrono::Utc;
use tracing::info;

use super::{require_staff, EngagementError, EngagementService};
use crate::catalog::domain::{Actor, Sponsorship, SponsorshipForm};
use crate::catalog::ids::{PetId, SponsorshipId};
use crate::catalog::repository::{Notice, NotificationSink, ShelterRepository};

impl<R, N> EngagementService<R, N>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    /// Append a pledge. Repeat pledges for the same pet are expected and never merged.
    pub fn record_sponsorship(
        &self,
        actor: &Actor,
        pet_id: PetId,
        form: SponsorshipForm,
    ) -> Result<Sponsorship, EngagementError> {
        let pet = self.require_pet(pet_id)?;
        self.guard.ensure_available(&pet)?;
        let amount = self.guard.sponsorship_amount(&form.amount)?;

        let stored = self.repository.insert_sponsorship(Sponsorship {
            id: SponsorshipId::next(),
            user: actor.user.clone(),
            pet: pet_id,
            kind: form.kind,
            amount,
            message: form.message.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        })?;

        info!(
            user = %actor.user,
            pet = %pet_id,
            kind = stored.kind.label(),
            amount = %stored.amount,
            "sponsorship recorded"
        );
        self.notify(
            Notice::new("sponsorship_recorded", &actor.user, Some(pet_id))
                .with_detail("pet_name", &pet.name)
                .with_detail("kind", stored.kind.label())
                .with_detail("amount", stored.amount.to_string()),
        );
        Ok(stored)
    }

    pub fn sponsorships_for_pet(
        &self,
        actor: &Actor,
        pet_id: PetId,
    ) -> Result<Vec<Sponsorship>, EngagementError> {
        require_staff(actor, "only staff may review sponsorships")?;
        self.require_pet(pet_id)?;
        Ok(self.repository.sponsorships_for_pet(pet_id)?)
    }
}
