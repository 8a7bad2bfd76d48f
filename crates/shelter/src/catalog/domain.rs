use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::{
    ApplicationId, CommentId, ComparisonId, PetId, ShelterId, SponsorshipId, UserId,
};

/// Caller identity handed over by the web layer after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn member(user: impl Into<String>) -> Self {
        Self {
            user: UserId::new(user),
            role: ActorRole::Member,
        }
    }

    pub fn staff(user: impl Into<String>) -> Self {
        Self {
            user: UserId::new(user),
            role: ActorRole::Staff,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, ActorRole::Staff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Member,
    Staff,
}

/// Shelter that owns pets in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub description: String,
}

/// Fields supplied by staff when registering a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShelter {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetKind {
    Dog,
    Cat,
    Rabbit,
    Bird,
    Other,
}

impl PetKind {
    pub const fn label(self) -> &'static str {
        match self {
            PetKind::Dog => "dog",
            PetKind::Cat => "cat",
            PetKind::Rabbit => "rabbit",
            PetKind::Bird => "bird",
            PetKind::Other => "other",
        }
    }
}

/// Adoptable animal. `is_adopted` is terminal: once set the pet leaves the public catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub kind: PetKind,
    pub age_months: u32,
    pub shelter: ShelterId,
    pub history: String,
    pub character: String,
    pub special_needs: String,
    pub is_adopted: bool,
    pub added_at: DateTime<Utc>,
}

impl Pet {
    pub fn is_available(&self) -> bool {
        !self.is_adopted
    }

    /// Human readable age, e.g. `2 y 3 mo` or `7 mo`.
    pub fn age_label(&self) -> String {
        let years = self.age_months / 12;
        let months = self.age_months % 12;
        if years > 0 {
            format!("{years} y {months} mo")
        } else {
            format!("{months} mo")
        }
    }
}

/// Fields supplied by staff when registering a pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub kind: PetKind,
    pub age_months: u32,
    pub shelter: ShelterId,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub special_needs: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user: UserId,
    pub pet: PetId,
    pub added_at: DateTime<Utc>,
}

/// Outcome of a favorite mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteState {
    Added,
    Removed,
    AlreadyPresent,
    NotPresent,
}

impl FavoriteState {
    pub const fn is_favorite(self) -> bool {
        matches!(self, FavoriteState::Added | FavoriteState::AlreadyPresent)
    }

    pub const fn label(self) -> &'static str {
        match self {
            FavoriteState::Added => "added",
            FavoriteState::Removed => "removed",
            FavoriteState::AlreadyPresent => "already_present",
            FavoriteState::NotPresent => "not_present",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorshipKind {
    Food,
    Medical,
    Toys,
    General,
}

impl SponsorshipKind {
    pub const fn label(self) -> &'static str {
        match self {
            SponsorshipKind::Food => "food",
            SponsorshipKind::Medical => "medical",
            SponsorshipKind::Toys => "toys",
            SponsorshipKind::General => "general",
        }
    }
}

/// Non-negative money amount with two decimal places, held as cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const MAX_INTEGER_DIGITS: usize = 8;
    pub const MAX_FRACTION_DIGITS: usize = 2;

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must not be negative")]
    Negative,
    #[error("amount must be a plain decimal number")]
    NotNumeric,
    #[error("amount allows at most {max} fractional digits")]
    TooPrecise { max: usize },
    #[error("amount allows at most {max} integer digits")]
    TooLarge { max: usize },
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountError::Negative);
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::NotNumeric);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::NotNumeric);
        }
        if fraction.len() > Self::MAX_FRACTION_DIGITS {
            return Err(AmountError::TooPrecise {
                max: Self::MAX_FRACTION_DIGITS,
            });
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > Self::MAX_INTEGER_DIGITS {
            return Err(AmountError::TooLarge {
                max: Self::MAX_INTEGER_DIGITS,
            });
        }

        let units: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| AmountError::NotNumeric)?
        };
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| AmountError::NotNumeric)? * 10,
            _ => fraction.parse().map_err(|_| AmountError::NotNumeric)?,
        };

        Ok(Self(units * 100 + cents))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Append-only pledge of support tied to a pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsorship {
    pub id: SponsorshipId,
    pub user: UserId,
    pub pet: PetId,
    pub kind: SponsorshipKind,
    pub amount: Amount,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Pledge form as posted by the user; the amount is parsed during intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorshipForm {
    pub kind: SponsorshipKind,
    pub amount: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub pet: PetId,
    pub user: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_approved: bool,
}

/// Saved comparison basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetComparison {
    pub id: ComparisonId,
    pub user: UserId,
    pub pets: BTreeSet<PetId>,
    pub created_at: DateTime<Utc>,
}

/// Status tracked through the adoption workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Completed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Applicant supplied answers. Validated by the intake guard before a record is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub housing_type: String,
    pub has_yard: bool,
    pub other_pets: String,
    pub experience: String,
    pub motivation: String,
    pub work_schedule: String,
    pub family_members: String,
    pub additional_info: String,
}

/// Formal request by a user to adopt a specific pet. Unique per (user, pet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionApplication {
    pub id: ApplicationId,
    pub pet: PetId,
    pub user: UserId,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub housing_type: String,
    pub has_yard: bool,
    pub other_pets: String,
    pub experience: String,
    pub motivation: String,
    pub work_schedule: String,
    pub family_members: String,
    pub additional_info: String,
    pub status: ApplicationStatus,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdoptionApplication {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id,
            pet: self.pet,
            status: self.status.label(),
            admin_notes: (!self.admin_notes.is_empty()).then(|| self.admin_notes.clone()),
            updated_at: self.updated_at,
        }
    }
}

/// Public projection of an application's progress.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub pet: PetId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationWithPet {
    pub application: AdoptionApplication,
    pub pet: Pet,
}

/// Everything the pet page needs in one read.
#[derive(Debug, Clone, Serialize)]
pub struct PetDetail {
    pub pet: Pet,
    pub age_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter: Option<Shelter>,
    pub comments: Vec<Comment>,
    pub is_favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationStatusView>,
}
