use metrics_exporter_prometheus::PrometheusHandle;
use shelter::catalog::{
    Actor, EngagementError, EngagementService, NewPet, NewShelter, Notice, NotificationError,
    NotificationSink, Pet, PetKind, ShelterRepository,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notification sink that logs each notice and keeps it in a process-local outbox.
#[derive(Default, Clone)]
pub(crate) struct OutboxNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NotificationSink for OutboxNotifier {
    fn publish(&self, notice: Notice) -> Result<(), NotificationError> {
        info!(
            template = %notice.template,
            user = %notice.user,
            pet = ?notice.pet.map(|pet| pet.0),
            "notice queued"
        );
        self.notices
            .lock()
            .map_err(|_| NotificationError::Transport("outbox mutex poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

impl OutboxNotifier {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn demo_staff() -> Actor {
    Actor::staff("demo-coordinator")
}

/// Registers one shelter with a small mixed catalog.
pub(crate) fn seed_demo_catalog<R, N>(
    service: &EngagementService<R, N>,
) -> Result<Vec<Pet>, EngagementError>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let staff = demo_staff();
    let shelter = service.register_shelter(
        &staff,
        NewShelter {
            name: "Riverside Animal Shelter".to_string(),
            address: "200 Riverside Drive".to_string(),
            phone: "555-0123".to_string(),
            email: "adopt@riverside.example".to_string(),
            website: Some("https://riverside.example".to_string()),
            description: "Community shelter with a foster network".to_string(),
        },
    )?;

    let catalog = [
        ("Maple", PetKind::Dog, 30, "Loves long walks", ""),
        ("Clementine", PetKind::Cat, 9, "Playful and chatty", ""),
        ("Thistle", PetKind::Rabbit, 14, "Shy at first", "Needs a hay-based diet"),
        ("Pico", PetKind::Bird, 48, "Whistles the radio jingles", ""),
    ];

    let mut pets = Vec::with_capacity(catalog.len());
    for (name, kind, age_months, character, special_needs) in catalog {
        pets.push(service.register_pet(
            &staff,
            NewPet {
                name: name.to_string(),
                kind,
                age_months,
                shelter: shelter.id,
                history: format!("Surrendered to {}", shelter.name),
                character: character.to_string(),
                special_needs: special_needs.to_string(),
            },
        )?);
    }

    info!(shelter = %shelter.id, pets = pets.len(), "demo catalog seeded");
    Ok(pets)
}
