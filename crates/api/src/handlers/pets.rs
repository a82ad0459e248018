//! Handlers for the pet collection and item resources.
//!
//! Groups and traits are never addressed directly: they are resolved by
//! natural key (get-or-create) whenever a pet is created or updated.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use petkare_core::error::CoreError;
use petkare_core::pagination::resolve_page;
use petkare_core::types::DbId;
use petkare_db::models::pet::PetPayload;
use petkare_db::repositories::{PetRepo, TraitRepo};

use crate::error::{AppError, AppResult};
use crate::query::PetListParams;
use crate::response::Paginated;
use crate::state::AppState;

/// Which pets a list request covers.
enum PetScope {
    All,
    WithTrait(DbId),
    /// The requested trait does not exist.
    Nothing,
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// GET /api/pets
///
/// Paginated pet list. `?trait=<name>` restricts the list to pets linked to
/// the trait with exactly that name; an unknown name yields an empty page.
pub async fn list_pets(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(pairs) = query?;
    let params = PetListParams::from_pairs(&pairs);

    let scope = match params.trait_name.as_deref() {
        None => PetScope::All,
        Some(name) => match TraitRepo::find_by_name(&state.pool, name).await? {
            Some(found) => PetScope::WithTrait(found.id),
            None => PetScope::Nothing,
        },
    };

    let count = match scope {
        PetScope::All => PetRepo::count(&state.pool, None).await?,
        PetScope::WithTrait(trait_id) => PetRepo::count(&state.pool, Some(trait_id)).await?,
        PetScope::Nothing => 0,
    };

    let window = resolve_page(params.page.as_deref(), count, state.config.page_size)?;

    let pets = match scope {
        PetScope::All => PetRepo::list(&state.pool, None, window.limit, window.offset).await?,
        PetScope::WithTrait(trait_id) => {
            PetRepo::list(&state.pool, Some(trait_id), window.limit, window.offset).await?
        }
        PetScope::Nothing => Vec::new(),
    };
    let results = PetRepo::hydrate(&state.pool, pets).await?;

    Ok(Json(Paginated::new(
        results,
        count,
        &window,
        &state.config,
        &headers,
        &uri,
    )))
}

/// POST /api/pets
///
/// Create a pet. The group and each trait are looked up case-insensitively
/// and created on first use.
pub async fn create_pet(
    State(state): State<AppState>,
    body: Result<Json<PetPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = body?;
    let input = payload.into_create()?;

    let pet = PetRepo::create(&state.pool, &input).await?;

    tracing::info!(
        pet_id = pet.pet.id,
        group_id = pet.group.id,
        trait_count = pet.traits_count,
        "Pet created",
    );

    Ok((StatusCode::CREATED, Json(pet)))
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// GET /api/pets/{pet_id}
pub async fn get_pet(
    State(state): State<AppState>,
    pet_id: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let pet_id = pet_id_from(pet_id)?;

    let pet = PetRepo::find_detail(&state.pool, pet_id)
        .await?
        .ok_or_else(|| pet_not_found(pet_id))?;

    Ok(Json(pet))
}

/// PATCH /api/pets/{pet_id}
///
/// Partial update. Only fields present in the body are applied; `traits`
/// replaces the whole trait set when present.
pub async fn update_pet(
    State(state): State<AppState>,
    pet_id: Result<Path<DbId>, PathRejection>,
    body: Result<Json<PetPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let pet_id = pet_id_from(pet_id)?;

    // A missing pet is a 404 even when the body is invalid, so existence is
    // checked before the body is parsed. `PetRepo::update` re-checks under
    // a row lock.
    if PetRepo::find_by_id(&state.pool, pet_id).await?.is_none() {
        return Err(pet_not_found(pet_id));
    }

    let Json(payload) = body?;
    let input = payload.into_update()?;

    let pet = PetRepo::update(&state.pool, pet_id, &input)
        .await?
        .ok_or_else(|| pet_not_found(pet_id))?;

    tracing::info!(
        pet_id,
        group_changed = input.group.is_some(),
        traits_replaced = input.traits.is_some(),
        "Pet updated",
    );

    Ok(Json(pet))
}

/// DELETE /api/pets/{pet_id}
///
/// Delete a pet. Its group and traits are kept.
pub async fn delete_pet(
    State(state): State<AppState>,
    pet_id: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let pet_id = pet_id_from(pet_id)?;

    if !PetRepo::delete(&state.pool, pet_id).await? {
        return Err(pet_not_found(pet_id));
    }

    tracing::info!(pet_id, "Pet deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A path segment that is not an integer cannot name a pet, so it is a 404
/// rather than a 400.
fn pet_id_from(path: Result<Path<DbId>, PathRejection>) -> Result<DbId, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unparseable pet id");
            Err(AppError::NotFound("Pet not found".to_string()))
        }
    }
}

fn pet_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Pet", id })
}
