//! Sign-in, sign-up and sign-out.
//!
//! Successful sign-in and sign-up create a session row and hand its token to
//! the browser in the `session` cookie. Failures re-render the form with the
//! matching status code instead of redirecting.

use super::layout::{PageResult, escape, render_page};
use crate::{
    core::{
        session::{create_session, delete_session, purge_expired_sessions},
        user::{self, SignupForm},
    },
    errors::{Error, Result},
    server::{
        AppState,
        session::{MaybeUser, clear_session_cookie, session_cookie, session_token},
    },
};
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::fmt::Write;

/// Where signed-in users land.
const HOME_PATH: &str = "/dashboard";

/// Sign-in form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// `GET /login`
pub async fn login_page(MaybeUser(user): MaybeUser) -> PageResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(HOME_PATH).into_response());
    }
    Ok(Html(render_login(None, "")?).into_response())
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> PageResult<Response> {
    let Ok(Form(form)) = form else {
        let html = render_login(Some("Email and password are required"), "")?;
        return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
    };

    match user::verify_credentials(&state.database, &form.email, &form.password).await {
        Ok(account) => Ok(signed_in(&state, &account.id).await?),
        Err(Error::Unauthorized) => {
            tracing::info!("Failed sign-in for {}", form.email);
            let html = render_login(Some("Invalid email or password"), &form.email)?;
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /register`
pub async fn register_page(MaybeUser(user): MaybeUser) -> PageResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(HOME_PATH).into_response());
    }
    Ok(Html(render_register(&[], "", "")?).into_response())
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    form: std::result::Result<Form<SignupForm>, FormRejection>,
) -> PageResult<Response> {
    let Ok(Form(form)) = form else {
        let html = render_register(&["Name, email and password are required"], "", "")?;
        return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
    };
    let (name, email) = (form.name.clone(), form.email.clone());

    match user::create_user(&state.database, form).await {
        Ok(account) => Ok(signed_in(&state, &account.id).await?),
        Err(Error::Validation { fields }) => {
            let messages: Vec<&str> = fields.iter().map(|f| f.message.as_str()).collect();
            let html = render_register(&messages, &name, &email)?;
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
        Err(Error::Conflict { message }) => {
            let html = render_register(&[message.as_str()], &name, &email)?;
            Ok((StatusCode::CONFLICT, Html(html)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> PageResult<Response> {
    if let Some(token) = session_token(&headers) {
        delete_session(&state.database, &token).await?;
    }
    Ok(([(SET_COOKIE, clear_session_cookie())], Redirect::to("/login")).into_response())
}

/// Opens a session and redirects home with the cookie set. Expired sessions
/// of every user are purged first.
async fn signed_in(state: &AppState, user_id: &str) -> Result<Response> {
    let settings = &state.settings.server;
    purge_expired_sessions(&state.database).await?;
    let session = create_session(&state.database, user_id, settings.session_ttl()).await?;
    tracing::info!("User {user_id} signed in");

    Ok((
        [(SET_COOKIE, session_cookie(&session.token, settings))],
        Redirect::to(HOME_PATH),
    )
        .into_response())
}

fn render_errors(body: &mut String, messages: &[&str]) -> Result<()> {
    for message in messages {
        writeln!(body, "<p class=\"form-error\">{}</p>", escape(message))?;
    }
    Ok(())
}

/// Builds the sign-in page.
pub fn render_login(error: Option<&str>, email: &str) -> Result<String> {
    let mut body = String::new();
    writeln!(&mut body, "<div class=\"card\"><h2>Sign in to your account</h2>")?;
    render_errors(&mut body, error.as_slice())?;
    writeln!(
        &mut body,
        "<form method=\"post\" action=\"/login\">\
         <label for=\"email\">Email</label><input id=\"email\" name=\"email\" type=\"email\" required value=\"{}\">\
         <label for=\"password\">Password</label><input id=\"password\" name=\"password\" type=\"password\" required>\
         <p><button type=\"submit\">Sign in</button></p></form>\
         <p class=\"muted\">No account? <a href=\"/register\">Create one</a></p></div>",
        escape(email)
    )?;
    render_page("Sign in", None, &body)
}

/// Builds the sign-up page.
pub fn render_register(errors: &[&str], name: &str, email: &str) -> Result<String> {
    let mut body = String::new();
    writeln!(&mut body, "<div class=\"card\"><h2>Create an account</h2>")?;
    render_errors(&mut body, errors)?;
    writeln!(
        &mut body,
        "<form method=\"post\" action=\"/register\">\
         <label for=\"name\">Name</label><input id=\"name\" name=\"name\" required value=\"{}\">\
         <label for=\"email\">Email</label><input id=\"email\" name=\"email\" type=\"email\" required value=\"{}\">\
         <label for=\"password\">Password</label><input id=\"password\" name=\"password\" type=\"password\" minlength=\"6\" required>\
         <p><button type=\"submit\">Sign up</button></p></form>\
         <p class=\"muted\">Already registered? <a href=\"/login\">Sign in</a></p></div>",
        escape(name),
        escape(email)
    )?;
    render_page("Sign up", None, &body)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_render_login() {
        let html = render_login(None, "").unwrap();
        assert!(html.contains("action=\"/login\""));
        assert!(!html.contains("<p class=\"form-error\">"));

        let failed = render_login(Some("Invalid email or password"), "a\"b@example.com").unwrap();
        assert!(failed.contains("Invalid email or password"));
        assert!(failed.contains("value=\"a&quot;b@example.com\""));
    }

    #[test]
    fn test_render_register_errors() {
        let html = render_register(&["Password must be at least 6 characters"], "Ann", "ann@example.com").unwrap();
        assert!(html.contains("Password must be at least 6 characters"));
        assert!(html.contains("value=\"Ann\""));
        assert!(html.contains("action=\"/register\""));
    }
}
