//! JSON API.

/// Category routes
pub mod categories;
/// Expense routes
pub mod expenses;
/// Generic CRUD handlers
pub mod resource;

use crate::server::AppState;
use axum::Router;
use categories::Categories;
use expenses::Expenses;
use resource::resource_routes;

/// All `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(resource_routes::<Expenses>())
        .merge(resource_routes::<Categories>())
}
