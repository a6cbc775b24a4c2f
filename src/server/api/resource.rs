//! Generic CRUD handlers shared by every JSON resource.
//!
//! A resource only describes how to talk to the core layer through the
//! [`Resource`] trait. Session checks, payload parsing, error mapping and the
//! form-based delete fallback are written once here.

use crate::{
    core::session::CurrentUser,
    errors::{Error, Result},
    server::{AppState, error::ApiError, session::MaybeUser},
};
use axum::{
    Form, Json, Router,
    extract::{
        Path, State,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::Redirect,
    routing::get,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Whose records a request may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Only records owned by this user id
    Owner(&'a str),
    /// Records shared by all users
    Shared,
}

impl<'a> Scope<'a> {
    /// The owning user id; a shared scope has none.
    pub fn owner(self) -> Result<&'a str> {
        match self {
            Scope::Owner(id) => Ok(id),
            Scope::Shared => Err(Error::Unauthorized),
        }
    }
}

/// A record type exposed under `/api/{PLURAL}`.
pub trait Resource: Send + Sync + 'static {
    /// What the API returns
    type Record: Serialize + Send;
    /// What create and update accept
    type Form: DeserializeOwned + Send + 'static;

    /// Lowercase singular name, used in log and failure messages
    const SINGULAR: &'static str;
    /// Lowercase plural name, used in paths
    const PLURAL: &'static str;
    /// Capitalized name, used in user-facing messages
    const LABEL: &'static str;
    /// Whether each record belongs to a single user
    const OWNER_SCOPED: bool;

    /// Every record visible in `scope`
    fn list(state: &AppState, scope: Scope<'_>) -> impl Future<Output = Result<Vec<Self::Record>>> + Send;

    /// One record by id; a record outside `scope` is not found
    fn fetch(state: &AppState, scope: Scope<'_>, id: &str) -> impl Future<Output = Result<Self::Record>> + Send;

    /// Validates and stores a new record
    fn create(state: &AppState, scope: Scope<'_>, form: Self::Form) -> impl Future<Output = Result<Self::Record>> + Send;

    /// Validates and replaces an existing record
    fn update(
        state: &AppState,
        scope: Scope<'_>,
        id: &str,
        form: Self::Form,
    ) -> impl Future<Output = Result<Self::Record>> + Send;

    /// Removes a record
    fn delete(state: &AppState, scope: Scope<'_>, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Body of a successful `DELETE`.
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Confirmation such as `"Expense deleted"`
    pub message: String,
}

/// Form fields of an HTML delete button.
#[derive(Debug, Deserialize)]
pub struct MethodOverride {
    /// Requested method; only `DELETE` is accepted
    #[serde(rename = "_method", default)]
    pub method: Option<String>,
}

impl MethodOverride {
    fn is_delete(&self) -> bool {
        self.method
            .as_deref()
            .is_some_and(|method| method.eq_ignore_ascii_case("DELETE"))
    }
}

/// Picks the scope for `R`. Owner-scoped resources need a signed-in user.
fn scope_for<R: Resource>(user: Option<&CurrentUser>) -> std::result::Result<Scope<'_>, ApiError> {
    if !R::OWNER_SCOPED {
        return Ok(Scope::Shared);
    }
    user.map(|user| Scope::Owner(user.id.as_str()))
        .ok_or_else(ApiError::unauthorized)
}

fn failure<R: Resource>(err: Error, verb: &str, noun: &str) -> ApiError {
    ApiError::from_error(err, R::LABEL, &format!("Failed to {verb} {noun}"))
}

/// `GET /api/{plural}`
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> std::result::Result<Json<Vec<R::Record>>, ApiError> {
    let scope = scope_for::<R>(user.as_ref())?;
    R::list(&state, scope)
        .await
        .map(Json)
        .map_err(|e| failure::<R>(e, "fetch", R::PLURAL))
}

/// `GET /api/{plural}/{id}`
pub async fn show<R: Resource>(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> std::result::Result<Json<R::Record>, ApiError> {
    let scope = scope_for::<R>(user.as_ref())?;
    R::fetch(&state, scope, &id)
        .await
        .map(Json)
        .map_err(|e| failure::<R>(e, "fetch", R::SINGULAR))
}

/// `POST /api/{plural}`
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: std::result::Result<Json<R::Form>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<R::Record>), ApiError> {
    let Json(form) = payload?;
    let scope = scope_for::<R>(Some(&user))?;

    let record = R::create(&state, scope, form)
        .await
        .map_err(|e| failure::<R>(e, "create", R::SINGULAR))?;
    tracing::info!("User {} created a {}", user.id, R::SINGULAR);

    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /api/{plural}/{id}`
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: std::result::Result<Json<R::Form>, JsonRejection>,
) -> std::result::Result<Json<R::Record>, ApiError> {
    let Json(form) = payload?;
    let scope = scope_for::<R>(Some(&user))?;

    R::update(&state, scope, &id, form)
        .await
        .map(Json)
        .map_err(|e| failure::<R>(e, "update", R::SINGULAR))
}

/// `DELETE /api/{plural}/{id}`
pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> std::result::Result<Json<Deleted>, ApiError> {
    remove::<R>(&state, &user, &id).await?;
    Ok(Json(Deleted {
        message: format!("{} deleted", R::LABEL),
    }))
}

/// `POST /api/{plural}/{id}` from an HTML form.
///
/// Only `_method=DELETE` is honoured; the method is checked before the
/// session so a stray post is always a 405.
pub async fn form_delete<R: Resource>(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
    form: std::result::Result<Form<MethodOverride>, FormRejection>,
) -> std::result::Result<Redirect, ApiError> {
    match form {
        Ok(Form(over)) if over.is_delete() => {}
        _ => return Err(ApiError::method_not_allowed()),
    }
    let user = user.ok_or_else(ApiError::unauthorized)?;

    remove::<R>(&state, &user, &id).await?;
    Ok(Redirect::to(&format!("/{}", R::PLURAL)))
}

async fn remove<R: Resource>(state: &AppState, user: &CurrentUser, id: &str) -> std::result::Result<(), ApiError> {
    let scope = scope_for::<R>(Some(user))?;
    R::delete(state, scope, id)
        .await
        .map_err(|e| failure::<R>(e, "delete", R::SINGULAR))?;
    tracing::info!("User {} deleted {} {id}", user.id, R::SINGULAR);
    Ok(())
}

/// Mounts the collection and member routes of `R`.
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(&format!("/api/{}", R::PLURAL), get(list::<R>).post(create::<R>))
        .route(
            &format!("/api/{}/:id", R::PLURAL),
            get(show::<R>)
                .put(update::<R>)
                .delete(destroy::<R>)
                .post(form_delete::<R>),
        )
}
