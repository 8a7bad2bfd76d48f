use crate::infra::{demo_staff, seed_demo_catalog, OutboxNotifier};
use chrono::Local;
use clap::Args;
use shelter::catalog::{
    Actor, ApplicationForm, ApplicationStatus, EngagementError, EngagementService,
    InMemoryStore, SponsorshipForm, SponsorshipKind,
};
use shelter::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop after the favorites, sponsorship and comparison walkthrough.
    #[arg(long)]
    pub(crate) skip_adoption: bool,
    /// Print every queued notice at the end of the run.
    #[arg(long)]
    pub(crate) show_notices: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        skip_adoption,
        show_notices,
    } = args;

    let notifier = Arc::new(OutboxNotifier::default());
    let service = EngagementService::new(Arc::new(InMemoryStore::new()), notifier.clone());
    let pets = seed_demo_catalog(&service)?;

    println!(
        "Shelter engagement demo ({})",
        Local::now().format("%Y-%m-%d %H:%M")
    );
    println!("Catalog:");
    for pet in &pets {
        println!("  - #{} {} ({}, {})", pet.id, pet.name, pet.kind.label(), pet.age_label());
    }

    let ana = Actor::member("ana");
    let ben = Actor::member("ben");
    let first = pets[0].id;
    let second = pets[1].id;

    let state = service.toggle_favorite(&ana, first)?;
    println!("\nana toggles favorite on #{first}: {}", state.label());
    let state = service.toggle_favorite(&ana, second)?;
    println!("ana toggles favorite on #{second}: {}", state.label());
    let favorites = service.list_favorites(&ana)?;
    println!(
        "ana's favorites: {}",
        favorites
            .iter()
            .map(|pet| pet.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let pledge = service.record_sponsorship(
        &ben,
        first,
        SponsorshipForm {
            kind: SponsorshipKind::Medical,
            amount: "40".to_string(),
            message: "For the checkup".to_string(),
        },
    )?;
    println!(
        "ben pledges {} toward {} care for #{first}",
        pledge.amount,
        pledge.kind.label()
    );

    let comparison = service.compare(&[first, second, first])?;
    println!("Comparing {} pets side by side:", comparison.len());
    for pet in &comparison {
        println!("  - {} | {} | {}", pet.name, pet.age_label(), pet.character);
    }
    match service.compare(&[first]) {
        Err(EngagementError::InsufficientSelection { available }) => {
            println!("A single pet cannot be compared ({available} available)");
        }
        Err(err) => return Err(err.into()),
        Ok(_) => println!("Unexpected: single-pet comparison accepted"),
    }

    let comment = service.add_comment(&ben, first, "Met her at the open day, so gentle!")?;
    println!("ben comments on #{first}: \"{}\"", comment.content);

    if !skip_adoption {
        run_adoption(&service, &ana, &ben, first)?;
    }

    if show_notices {
        println!("\nQueued notices:");
        for notice in notifier.notices() {
            let details = notice
                .details
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("  - {} for {} {}", notice.template, notice.user, details);
        }
    }

    Ok(())
}

fn run_adoption(
    service: &EngagementService<InMemoryStore, OutboxNotifier>,
    ana: &Actor,
    ben: &Actor,
    pet: shelter::catalog::PetId,
) -> Result<(), AppError> {
    let staff = demo_staff();

    let ana_application = service.submit_application(ana, pet, demo_form("Ana Silva", "ana"))?;
    let ben_application = service.submit_application(ben, pet, demo_form("Ben Carter", "ben"))?;
    println!(
        "\nApplications for #{pet}: ana #{} ({}), ben #{} ({})",
        ana_application.id,
        ana_application.status,
        ben_application.id,
        ben_application.status
    );

    if let Err(EngagementError::DuplicateApplication { existing }) =
        service.submit_application(ana, pet, demo_form("Ana Silva", "ana"))
    {
        println!(
            "ana resubmits: rejected, existing application #{} is {}",
            existing.id, existing.status
        );
    }

    service.transition(
        &staff,
        ana_application.id,
        ApplicationStatus::Approved,
        Some("Home visit went well".to_string()),
    )?;
    let completed =
        service.transition(&staff, ana_application.id, ApplicationStatus::Completed, None)?;
    println!(
        "Staff completes ana's application: {} ({})",
        completed.status, completed.admin_notes
    );

    let detail = service.pet_detail(Some(ana), pet)?;
    println!(
        "#{pet} {} adopted: {}",
        detail.pet.name,
        if detail.pet.is_adopted { "yes" } else { "no" }
    );

    match service.transition(&staff, ben_application.id, ApplicationStatus::Approved, None) {
        Ok(application) => match service.transition(
            &staff,
            application.id,
            ApplicationStatus::Completed,
            None,
        ) {
            Err(err) => println!("Completing ben's application fails: {err}"),
            Ok(_) => println!("Unexpected: second adoption accepted"),
        },
        Err(err) => println!("Approving ben's application fails: {err}"),
    }

    println!(
        "Catalog now lists {} available pets",
        service.available_pets()?.len()
    );
    Ok(())
}

fn demo_form(full_name: &str, handle: &str) -> ApplicationForm {
    ApplicationForm {
        full_name: full_name.to_string(),
        phone: "555-0188".to_string(),
        email: format!("{handle}@example.com"),
        address: "48 Orchard Way".to_string(),
        housing_type: "Townhouse".to_string(),
        has_yard: true,
        experience: "Grew up with dogs".to_string(),
        motivation: "Ready for a companion".to_string(),
        work_schedule: "Hybrid".to_string(),
        family_members: "Two adults".to_string(),
        ..ApplicationForm::default()
    }
}
