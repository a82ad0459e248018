//! Route definitions for pets.

use axum::routing::get;
use axum::Router;

use crate::handlers::pets;
use crate::state::AppState;

/// Pet routes mounted at `/pets`.
///
/// ```text
/// GET    /              -> list_pets
/// POST   /              -> create_pet
/// GET    /{pet_id}      -> get_pet
/// PATCH  /{pet_id}      -> update_pet
/// DELETE /{pet_id}      -> delete_pet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pets::list_pets).post(pets::create_pet))
        .route(
            "/{pet_id}",
            get(pets::get_pet)
                .patch(pets::update_pet)
                .delete(pets::delete_pet),
        )
}
