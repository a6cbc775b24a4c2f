//! Shared page chrome and formatting helpers.

use crate::{
    core::session::CurrentUser,
    errors::{Error, ErrorKind, Result},
    server::{error::status_for, session::LOGIN_PATH},
};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Application title shown in the navigation bar.
pub const APP_TITLE: &str = "XenFi Expense Manager";

/// Submits `<form data-api=...>` as JSON and follows `data-redirect` on
/// success. Error messages from the API are shown in the form's `.form-error`.
const JSON_FORM_SCRIPT: &str = r#"<script>
document.querySelectorAll("form[data-api]").forEach(function (form) {
  form.addEventListener("submit", async function (event) {
    event.preventDefault();
    var body = {};
    new FormData(form).forEach(function (value, key) { body[key] = value; });
    if ("amount" in body) body.amount = parseFloat(body.amount);
    if ("date" in body && body.date) body.date = new Date(body.date).toISOString();
    var box = form.querySelector(".form-error");
    var response = await fetch(form.dataset.api, {
      method: form.dataset.method || "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body)
    });
    if (response.ok) { window.location.href = form.dataset.redirect; return; }
    var data = await response.json().catch(function () { return {}; });
    var details = (data.details || []).map(function (d) { return d.message; }).join(", ");
    box.textContent = details || data.error || "Request failed";
  });
});
</script>"#;

const STYLE: &str = "<style>
body{font-family:system-ui,sans-serif;background:#f9fafb;margin:0;color:#111827}
nav{background:#fff;box-shadow:0 1px 2px rgba(0,0,0,.1);padding:1rem 2rem;display:flex;gap:1.5rem;align-items:center}
nav .title{font-weight:700;margin-right:auto}
main{max-width:64rem;margin:0 auto;padding:2rem}
.card{background:#fff;border-radius:.5rem;box-shadow:0 1px 3px rgba(0,0,0,.1);padding:1.25rem;margin-bottom:1.5rem}
.stats{display:grid;grid-template-columns:repeat(3,1fr);gap:1.5rem}
ul.rows{list-style:none;padding:0;margin:0}
ul.rows li{display:flex;justify-content:space-between;padding:.75rem 0;border-top:1px solid #e5e7eb}
.muted{color:#6b7280;font-size:.875rem}
.form-error{color:#b91c1c}
label{display:block;margin:.75rem 0 .25rem}
</style>";

/// Escapes text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats an amount as `$1234.50`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

/// `"1 expense"`, `"3 expenses"`.
#[must_use]
pub fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Calendar date as shown in lists and date inputs.
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Wraps `body` in the document shell. The navigation bar is shown when a
/// user is signed in.
pub fn render_page(title: &str, user: Option<&CurrentUser>, body: &str) -> Result<String> {
    let mut html = String::new();
    writeln!(&mut html, "<!DOCTYPE html>")?;
    writeln!(
        &mut html,
        "<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{} | {APP_TITLE}</title>{STYLE}</head><body>",
        escape(title)
    )?;

    if let Some(user) = user {
        writeln!(
            &mut html,
            "<nav><span class=\"title\">{APP_TITLE}</span>\
             <a href=\"/dashboard\">Dashboard</a>\
             <a href=\"/expenses\">Expenses</a>\
             <a href=\"/categories\">Categories</a>\
             <span>Welcome, {}</span>\
             <form method=\"post\" action=\"/logout\"><button type=\"submit\">Sign out</button></form></nav>",
            escape(&user.name)
        )?;
    }

    writeln!(&mut html, "<main>{body}</main>")?;
    writeln!(&mut html, "{JSON_FORM_SCRIPT}</body></html>")?;
    Ok(html)
}

/// Delete button posting `_method=DELETE` to `action`.
#[must_use]
pub fn delete_button(action: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" style=\"display:inline\">\
         <input type=\"hidden\" name=\"_method\" value=\"DELETE\">\
         <button type=\"submit\">Delete</button></form>",
        escape(action)
    )
}

/// Error raised while building a page.
#[derive(Debug)]
pub struct PageError(pub Error);

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let message = match kind {
            ErrorKind::Unauthorized => return Redirect::to(LOGIN_PATH).into_response(),
            ErrorKind::NotFound => "The page you requested does not exist.".to_string(),
            ErrorKind::Validation | ErrorKind::Conflict => self.0.to_string(),
            ErrorKind::Internal => {
                tracing::error!("Failed to render page: {}", self.0);
                "Something went wrong.".to_string()
            }
        };

        let body = format!(
            "<div class=\"card\"><h2>Error</h2><p>{}</p><a href=\"/dashboard\">Back to dashboard</a></div>",
            escape(&message)
        );
        match render_page("Error", None, &body) {
            Ok(html) => (status_for(kind), Html(html)).into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
        }
    }
}

/// Result of a page handler.
pub type PageResult<T> = std::result::Result<T, PageError>;
