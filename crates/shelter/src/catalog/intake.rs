use chrono::{DateTime, Utc};

use super::domain::{
    AdoptionApplication, Amount, AmountError, ApplicationForm, ApplicationStatus, Pet,
};
use super::ids::{ApplicationId, PetId, UserId};

/// Input problems the caller can correct and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("{field} exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("email address is malformed")]
    MalformedEmail,
    #[error("pet {pet} is no longer available")]
    PetUnavailable { pet: PetId },
    #[error("comment must not be empty")]
    EmptyComment,
    #[error("invalid sponsorship amount '{raw}': {reason}")]
    InvalidAmount { raw: String, reason: AmountError },
}

/// Field length caps applied to applications.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    full_name_max: usize,
    phone_max: usize,
    housing_type_max: usize,
    work_schedule_max: usize,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            full_name_max: 200,
            phone_max: 20,
            housing_type_max: 100,
            work_schedule_max: 200,
        }
    }
}

/// Guard that turns raw user input into records fit for the entity store.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    policy: IntakePolicy,
}

impl IntakeGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    pub fn ensure_available(&self, pet: &Pet) -> Result<(), ValidationError> {
        if pet.is_available() {
            Ok(())
        } else {
            Err(ValidationError::PetUnavailable { pet: pet.id })
        }
    }

    pub fn comment_content(&self, raw: &str) -> Result<String, ValidationError> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(content.to_string())
    }

    pub fn sponsorship_amount(&self, raw: &str) -> Result<Amount, ValidationError> {
        raw.parse()
            .map_err(|reason| ValidationError::InvalidAmount {
                raw: raw.to_string(),
                reason,
            })
    }

    /// Validate the form and build a pending application from it.
    pub fn application_from_form(
        &self,
        user: UserId,
        pet: PetId,
        form: ApplicationForm,
        now: DateTime<Utc>,
    ) -> Result<AdoptionApplication, ValidationError> {
        let form = trimmed(form);

        let required = [
            ("full_name", &form.full_name),
            ("phone", &form.phone),
            ("email", &form.email),
            ("address", &form.address),
            ("housing_type", &form.housing_type),
            ("experience", &form.experience),
            ("motivation", &form.motivation),
            ("work_schedule", &form.work_schedule),
            ("family_members", &form.family_members),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        let capped = [
            ("full_name", &form.full_name, self.policy.full_name_max),
            ("phone", &form.phone, self.policy.phone_max),
            ("housing_type", &form.housing_type, self.policy.housing_type_max),
            ("work_schedule", &form.work_schedule, self.policy.work_schedule_max),
        ];
        if let Some((field, _, max)) = capped
            .iter()
            .find(|(_, value, max)| value.chars().count() > *max)
        {
            return Err(ValidationError::FieldTooLong {
                field: *field,
                max: *max,
            });
        }

        if !is_plausible_email(&form.email) {
            return Err(ValidationError::MalformedEmail);
        }

        Ok(AdoptionApplication {
            id: ApplicationId::next(),
            pet,
            user,
            full_name: form.full_name,
            phone: form.phone,
            email: form.email,
            address: form.address,
            housing_type: form.housing_type,
            has_yard: form.has_yard,
            other_pets: form.other_pets,
            experience: form.experience,
            motivation: form.motivation,
            work_schedule: form.work_schedule,
            family_members: form.family_members,
            additional_info: form.additional_info,
            status: ApplicationStatus::Pending,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

fn trimmed(form: ApplicationForm) -> ApplicationForm {
    let clean = |value: String| value.trim().to_string();
    ApplicationForm {
        full_name: clean(form.full_name),
        phone: clean(form.phone),
        email: clean(form.email),
        address: clean(form.address),
        housing_type: clean(form.housing_type),
        has_yard: form.has_yard,
        other_pets: clean(form.other_pets),
        experience: clean(form.experience),
        motivation: clean(form.motivation),
        work_schedule: clean(form.work_schedule),
        family_members: clean(form.family_members),
        additional_info: clean(form.additional_info),
    }
}

fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
