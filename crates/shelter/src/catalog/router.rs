use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{Actor, ActorRole, ApplicationForm, ApplicationStatus, SponsorshipForm};
use super::ids::{ApplicationId, CommentId, PetId, UserId};
use super::intake::ValidationError;
use super::repository::{NotificationSink, RepositoryError, ShelterRepository};
use super::service::{EngagementError, EngagementService};

/// Header carrying the authenticated user reference issued by the identity provider.
pub const USER_HEADER: &str = "x-user-id";
/// Header carrying the caller's role; `staff` unlocks administrative actions.
pub const ROLE_HEADER: &str = "x-user-role";

type SharedService<R, N> = Arc<EngagementService<R, N>>;

/// Router builder exposing the catalog and engagement endpoints.
pub fn catalog_router<R, N>(service: SharedService<R, N>) -> Router
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/pets", get(list_pets_handler::<R, N>))
        .route("/api/v1/pets/:pet_id", get(pet_detail_handler::<R, N>))
        .route(
            "/api/v1/pets/:pet_id/favorite",
            post(toggle_favorite_handler::<R, N>),
        )
        .route("/api/v1/favorites", get(favorites_handler::<R, N>))
        .route(
            "/api/v1/pets/:pet_id/sponsorships",
            post(sponsor_handler::<R, N>),
        )
        .route("/api/v1/compare", get(compare_handler::<R, N>))
        .route("/api/v1/comparisons", post(save_comparison_handler::<R, N>))
        .route(
            "/api/v1/pets/:pet_id/comments",
            get(comments_handler::<R, N>).post(add_comment_handler::<R, N>),
        )
        .route(
            "/api/v1/comments/:comment_id",
            delete(delete_comment_handler::<R, N>),
        )
        .route(
            "/api/v1/comments/:comment_id/approval",
            put(comment_approval_handler::<R, N>),
        )
        .route(
            "/api/v1/pets/:pet_id/applications",
            post(submit_handler::<R, N>),
        )
        .route("/api/v1/applications", get(my_applications_handler::<R, N>))
        .route(
            "/api/v1/applications/:application_id/transition",
            post(transition_handler::<R, N>),
        )
        .with_state(service)
}

/// Resolve the caller from identity headers set by the fronting web layer.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, EngagementError> {
    viewer_from_headers(headers).ok_or(EngagementError::AuthRequired)
}

pub(crate) fn viewer_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let user = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())?;

    let role = match headers
        .get(ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("staff") => ActorRole::Staff,
        _ => ActorRole::Member,
    };

    Some(Actor {
        user: UserId::new(user),
        role,
    })
}

/// Map a service error to its HTTP status and JSON payload.
pub(crate) fn error_response(error: EngagementError) -> Response {
    let status = match &error {
        EngagementError::NotFound(_) => StatusCode::NOT_FOUND,
        EngagementError::AuthRequired => StatusCode::UNAUTHORIZED,
        EngagementError::Permission(_) => StatusCode::FORBIDDEN,
        EngagementError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngagementError::DuplicateApplication { .. } => StatusCode::CONFLICT,
        EngagementError::InvalidTransition { .. } => StatusCode::CONFLICT,
        EngagementError::InsufficientSelection { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngagementError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EngagementError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut payload = json!({ "error": error.to_string() });
    match &error {
        EngagementError::DuplicateApplication { existing } => {
            payload["existing"] = json!(existing.status_view());
        }
        EngagementError::Validation(ValidationError::MissingFields { fields }) => {
            payload["fields"] = json!(fields);
        }
        EngagementError::InsufficientSelection { available } => {
            payload["available"] = json!(available);
        }
        EngagementError::Repository(err) => {
            error!(error = %err, "entity store failure");
        }
        _ => {}
    }

    (status, Json(payload)).into_response()
}

fn respond<T, F>(result: Result<T, EngagementError>, on_success: F) -> Response
where
    F: FnOnce(T) -> Response,
{
    match result {
        Ok(value) => on_success(value),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_pets_handler<R, N>(
    State(service): State<SharedService<R, N>>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    respond(service.available_pets(), |pets| Json(pets).into_response())
}

pub(crate) async fn pet_detail_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(pet_id): Path<u64>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let viewer = viewer_from_headers(&headers);
    respond(service.pet_detail(viewer.as_ref(), PetId(pet_id)), |detail| {
        Json(detail).into_response()
    })
}

pub(crate) async fn toggle_favorite_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(pet_id): Path<u64>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers)
        .and_then(|actor| service.toggle_favorite(&actor, PetId(pet_id)));
    respond(result, |state| {
        Json(json!({
            "pet_id": pet_id,
            "state": state.label(),
            "is_favorite": state.is_favorite(),
        }))
        .into_response()
    })
}

pub(crate) async fn favorites_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers).and_then(|actor| service.list_favorites(&actor));
    respond(result, |pets| Json(pets).into_response())
}

pub(crate) async fn sponsor_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(pet_id): Path<u64>,
    Json(form): Json<SponsorshipForm>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers)
        .and_then(|actor| service.record_sponsorship(&actor, PetId(pet_id), form));
    respond(result, |sponsorship| {
        (StatusCode::CREATED, Json(sponsorship)).into_response()
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareQuery {
    #[serde(default)]
    pets: String,
}

/// Parse `1,2,3` into pet ids; blanks between commas are ignored.
pub(crate) fn parse_pet_ids(raw: &str) -> Result<Vec<PetId>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<u64>()
                .map(PetId)
                .map_err(|_| format!("'{value}' is not a pet id"))
        })
        .collect()
}

pub(crate) async fn compare_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Query(query): Query<CompareQuery>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    match parse_pet_ids(&query.pets) {
        Ok(ids) => respond(service.compare(&ids), |pets| Json(pets).into_response()),
        Err(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveComparisonRequest {
    pets: Vec<PetId>,
}

pub(crate) async fn save_comparison_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Json(request): Json<SaveComparisonRequest>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers)
        .and_then(|actor| service.save_comparison(&actor, &request.pets));
    respond(result, |comparison| {
        (StatusCode::CREATED, Json(comparison)).into_response()
    })
}

pub(crate) async fn comments_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(pet_id): Path<u64>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    respond(service.visible_comments(PetId(pet_id)), |comments| {
        Json(comments).into_response()
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentRequest {
    #[serde(default)]
    content: String,
}

pub(crate) async fn add_comment_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(pet_id): Path<u64>,
    Json(request): Json<CommentRequest>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers)
        .and_then(|actor| service.add_comment(&actor, PetId(pet_id), &request.content));
    respond(result, |comment| {
        (StatusCode::CREATED, Json(comment)).into_response()
    })
}

pub(crate) async fn delete_comment_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(comment_id): Path<u64>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers)
        .and_then(|actor| service.delete_comment(&actor, CommentId(comment_id)));
    respond(result, |()| StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApprovalRequest {
    approved: bool,
}

pub(crate) async fn comment_approval_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(comment_id): Path<u64>,
    Json(request): Json<ApprovalRequest>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers).and_then(|actor| {
        service.set_comment_approval(&actor, CommentId(comment_id), request.approved)
    });
    respond(result, |comment| Json(comment).into_response())
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(pet_id): Path<u64>,
    Json(form): Json<ApplicationForm>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers)
        .and_then(|actor| service.submit_application(&actor, PetId(pet_id), form));
    respond(result, |application| {
        (StatusCode::CREATED, Json(application.status_view())).into_response()
    })
}

pub(crate) async fn my_applications_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers).and_then(|actor| service.list_for_user(&actor));
    respond(result, |applications| Json(applications).into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    status: ApplicationStatus,
    #[serde(default)]
    notes: Option<String>,
}

pub(crate) async fn transition_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    Json(request): Json<TransitionRequest>,
) -> Response
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    let result = actor_from_headers(&headers).and_then(|actor| {
        service.transition(
            &actor,
            ApplicationId(application_id),
            request.status,
            request.notes,
        )
    });
    respond(result, |application| {
        Json(application.status_view()).into_response()
    })
}
