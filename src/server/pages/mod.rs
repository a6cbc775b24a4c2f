//! Server-rendered HTML pages.
//!
//! Pages read through the same core functions as the JSON API. Forms that
//! create or edit records post JSON to `/api` from a small inline script, so
//! the pages themselves only ever render.

/// Sign-in, sign-up and sign-out
pub mod auth;
/// Category list and forms
pub mod categories;
/// Monthly summary
pub mod dashboard;
/// Expense list and forms
pub mod expenses;
/// Page shell, HTML helpers and page errors
pub mod layout;

use crate::server::AppState;
use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

/// All page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::dashboard_page))
        .route("/expenses", get(expenses::expenses_page))
        .route("/expenses/new", get(expenses::new_expense_page))
        .route("/expenses/:id/edit", get(expenses::edit_expense_page))
        .route("/categories", get(categories::categories_page))
        .route("/categories/new", get(categories::new_category_page))
        .route("/categories/:id/edit", get(categories::edit_category_page))
}
