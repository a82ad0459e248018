pub mod health;
pub mod pets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pets                  list (paginated, ?trait=), create
/// /pets/{pet_id}         get, partial update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/pets", pets::router())
}
