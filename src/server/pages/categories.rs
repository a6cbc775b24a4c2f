//! `/categories`, `/categories/new` and `/categories/{id}/edit`

use super::layout::{PageResult, delete_button, escape, plural, render_page};
use crate::{
    core::{
        category::{CategorySummary, get_category, list_categories},
        session::CurrentUser,
    },
    errors::Result,
    server::{AppState, session::PageUser},
};
use axum::{
    extract::{Path, State},
    response::Html,
};
use std::fmt::Write;

/// Lists every category with its expense count.
pub async fn categories_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
) -> PageResult<Html<String>> {
    let categories = list_categories(&state.database).await?;
    Ok(Html(render_category_list(&user, &categories)?))
}

/// Empty category form.
pub async fn new_category_page(PageUser(user): PageUser) -> PageResult<Html<String>> {
    Ok(Html(render_category_form(&user, None)?))
}

/// Category form pre-filled from the stored record.
pub async fn edit_category_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
) -> PageResult<Html<String>> {
    let summary = get_category(&state.database, &id).await?;
    Ok(Html(render_category_form(&user, Some(&summary))?))
}

/// Builds the category list HTML with expense counts.
pub fn render_category_list(user: &CurrentUser, categories: &[CategorySummary]) -> Result<String> {
    let mut body = String::new();
    writeln!(
        &mut body,
        "<h2>Categories</h2><a href=\"/categories/new\">Add Category</a><div class=\"card\"><ul class=\"rows\">"
    )?;

    if categories.is_empty() {
        writeln!(&mut body, "<li class=\"muted\">No categories yet</li>")?;
    }
    for summary in categories {
        let category = &summary.category;
        writeln!(
            &mut body,
            "<li><div>{}<div class=\"muted\">{}</div></div>\
             <div>{} <a href=\"/categories/{}/edit\">Edit</a> {}</div></li>",
            escape(&category.name),
            escape(category.description.as_deref().unwrap_or("")),
            plural(summary.count.expenses, "expense"),
            escape(&category.id),
            delete_button(&format!("/api/categories/{}", category.id))
        )?;
    }
    writeln!(&mut body, "</ul></div>")?;

    render_page("Categories", Some(user), &body)
}

/// Builds the create or edit form.
pub fn render_category_form(user: &CurrentUser, existing: Option<&CategorySummary>) -> Result<String> {
    let category = existing.map(|summary| &summary.category);
    let (title, api, method) = match category {
        Some(category) => ("Edit Category", format!("/api/categories/{}", category.id), "PUT"),
        None => ("Add Category", "/api/categories".to_string(), "POST"),
    };
    let name = category.map(|c| escape(&c.name)).unwrap_or_default();
    let description = category
        .and_then(|c| c.description.as_deref())
        .map(escape)
        .unwrap_or_default();

    let mut body = String::new();
    writeln!(&mut body, "<h2>{title}</h2>")?;
    writeln!(
        &mut body,
        "<form class=\"card\" data-api=\"{}\" data-method=\"{method}\" data-redirect=\"/categories\">\
         <p class=\"form-error\"></p>\
         <label for=\"name\">Name</label><input id=\"name\" name=\"name\" required value=\"{name}\">\
         <label for=\"description\">Description</label>\
         <textarea id=\"description\" name=\"description\" rows=\"3\">{description}</textarea>\
         <p><button type=\"submit\">{}</button> <a href=\"/categories\">Cancel</a></p></form>",
        escape(&api),
        if existing.is_some() { "Update Category" } else { "Create Category" }
    )?;

    render_page(title, Some(user), &body)
}
