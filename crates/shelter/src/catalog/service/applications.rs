use chrono::Utc;
use tracing::{info, warn};

use super::{require_staff, EngagementError, EngagementService, MissingEntity};
use crate::catalog::domain::{
    Actor, AdoptionApplication, ApplicationForm, ApplicationStatus, ApplicationWithPet,
};
use crate::catalog::ids::{ApplicationId, PetId};
use crate::catalog::intake::ValidationError;
use crate::catalog::repository::{Notice, NotificationSink, RepositoryError, ShelterRepository};

impl<R, N> EngagementService<R, N>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    /// Submit a new application, returning the stored `pending` record.
    ///
    /// Checks run inside one store transaction so a concurrent completion of the same pet
    /// cannot slip between the availability check and the insert.
    pub fn submit_application(
        &self,
        actor: &Actor,
        pet_id: PetId,
        form: ApplicationForm,
    ) -> Result<AdoptionApplication, EngagementError> {
        let now = Utc::now();
        let guard = &self.guard;

        let outcome = self.repository.transaction(|tx| -> Result<_, EngagementError> {
            let pet = tx
                .pet(pet_id)?
                .ok_or(EngagementError::NotFound(MissingEntity::Pet(pet_id)))?;

            if let Some(existing) = tx.application_for(&actor.user, pet_id)? {
                return Err(EngagementError::DuplicateApplication {
                    existing: Box::new(existing),
                });
            }

            guard.ensure_available(&pet)?;
            let application =
                guard.application_from_form(actor.user.clone(), pet_id, form, now)?;
            Ok((tx.insert_application(application)?, pet.name))
        });

        let (stored, pet_name) = match outcome {
            Ok(stored) => stored,
            Err(EngagementError::Repository(RepositoryError::Conflict)) => {
                return Err(self.lost_submission_race(actor, pet_id));
            }
            Err(err) => return Err(err),
        };

        info!(
            user = %actor.user,
            pet = %pet_id,
            application = %stored.id,
            "adoption application submitted"
        );
        self.notify(
            Notice::new("application_submitted", &actor.user, Some(pet_id))
                .with_detail("pet_name", pet_name)
                .with_detail("application_id", stored.id.to_string())
                .with_detail("status", stored.status.label()),
        );
        Ok(stored)
    }

    /// Staff-driven status change. Completing an application marks the pet adopted in the
    /// same transaction as the status write.
    pub fn transition(
        &self,
        actor: &Actor,
        application_id: ApplicationId,
        next: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<AdoptionApplication, EngagementError> {
        require_staff(actor, "only staff may change application status")?;
        let now = Utc::now();

        let (previous, updated) = self
            .repository
            .transaction(|tx| -> Result<_, EngagementError> {
                let mut application = tx.application(application_id)?.ok_or(
                    EngagementError::NotFound(MissingEntity::Application(application_id)),
                )?;

                let previous = application.status;
                if !previous.can_transition_to(next) {
                    return Err(EngagementError::InvalidTransition {
                        from: previous,
                        to: next,
                    });
                }

                if next.marks_pet_adopted() {
                    let mut pet = tx
                        .pet(application.pet)?
                        .ok_or(EngagementError::NotFound(MissingEntity::Pet(application.pet)))?;
                    if pet.is_adopted {
                        return Err(ValidationError::PetUnavailable { pet: pet.id }.into());
                    }
                    pet.is_adopted = true;
                    tx.save_pet(pet)?;
                }

                application.status = next;
                if let Some(notes) = notes {
                    application.admin_notes = notes.trim().to_string();
                }
                application.updated_at = now;
                tx.save_application(application.clone())?;
                Ok((previous, application))
            })?;

        info!(
            staff = %actor.user,
            application = %application_id,
            from = previous.label(),
            to = next.label(),
            "application status changed"
        );
        if next.marks_pet_adopted() {
            info!(pet = %updated.pet, "pet marked adopted");
        }
        self.notify(
            Notice::new("application_status_changed", &updated.user, Some(updated.pet))
                .with_detail("application_id", application_id.to_string())
                .with_detail("from", previous.label())
                .with_detail("to", next.label()),
        );
        Ok(updated)
    }

    /// The caller's applications, newest first, each with its pet.
    pub fn list_for_user(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ApplicationWithPet>, EngagementError> {
        let applications = self.repository.applications_for_user(&actor.user)?;
        let mut listing = Vec::with_capacity(applications.len());
        for application in applications {
            if let Some(pet) = self.repository.fetch_pet(application.pet)? {
                listing.push(ApplicationWithPet { application, pet });
            }
        }
        Ok(listing)
    }

    pub fn application_for(
        &self,
        actor: &Actor,
        pet_id: PetId,
    ) -> Result<Option<AdoptionApplication>, EngagementError> {
        Ok(self.repository.application_for(&actor.user, pet_id)?)
    }

    pub fn applications_for_pet(
        &self,
        actor: &Actor,
        pet_id: PetId,
    ) -> Result<Vec<AdoptionApplication>, EngagementError> {
        require_staff(actor, "only staff may review applications")?;
        self.require_pet(pet_id)?;
        Ok(self.repository.applications_for_pet(pet_id)?)
    }

    /// A concurrent submission won the uniqueness check. Report the winner's row.
    fn lost_submission_race(&self, actor: &Actor, pet_id: PetId) -> EngagementError {
        warn!(user = %actor.user, pet = %pet_id, "application insert conflicted");
        match self.repository.application_for(&actor.user, pet_id) {
            Ok(Some(existing)) => EngagementError::DuplicateApplication {
                existing: Box::new(existing),
            },
            Ok(None) => EngagementError::Repository(RepositoryError::Conflict),
            Err(err) => err.into(),
        }
    }
}
