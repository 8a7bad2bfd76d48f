//! Shelter catalog and the per-user relationship ledgers built on it.
//!
//! The entity store ([`repository`]) owns the uniqueness and atomicity guarantees; the
//! [`EngagementService`] layers the favorite, sponsorship, comparison, comment and
//! adoption-application rules on top and is what the HTTP [`router`] calls into.

pub mod domain;
pub mod ids;
pub mod intake;
mod lifecycle;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, ActorRole, AdoptionApplication, Amount, AmountError, ApplicationForm,
    ApplicationStatus, ApplicationStatusView, ApplicationWithPet, Comment, Favorite,
    FavoriteState, NewPet, NewShelter, Pet, PetComparison, PetDetail, PetKind, Shelter,
    Sponsorship, SponsorshipForm, SponsorshipKind,
};
pub use ids::{ApplicationId, CommentId, ComparisonId, PetId, ShelterId, SponsorshipId, UserId};
pub use intake::{IntakeGuard, IntakePolicy, ValidationError};
pub use memory::InMemoryStore;
pub use repository::{
    ApplicationRepository, CommentRepository, ComparisonRepository, FavoriteRepository, Notice,
    NotificationError, NotificationSink, PetRepository, RepositoryError, ShelterRepository,
    SponsorshipRepository, StoreTransaction,
};
pub use router::catalog_router;
pub use service::{EngagementError, EngagementService, MissingEntity};
