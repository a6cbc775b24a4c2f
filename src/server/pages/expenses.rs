//! `/expenses`, `/expenses/new` and `/expenses/{id}/edit`

use super::layout::{PageResult, delete_button, escape, format_amount, format_date, render_page};
use crate::{
    core::{
        category::{CategorySummary, list_categories},
        expense::{ExpenseRecord, PAYMENT_METHODS, get_expense, list_expenses},
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

/// Lists the signed-in user's expenses, newest first.
pub async fn expenses_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
) -> PageResult<Html<String>> {
    let expenses = list_expenses(&state.database, &user.id).await?;
    Ok(Html(render_expense_list(&user, &expenses)?))
}

/// Empty expense form.
pub async fn new_expense_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
) -> PageResult<Html<String>> {
    let categories = list_categories(&state.database).await?;
    Ok(Html(render_expense_form(&user, &categories, None)?))
}

/// Pre-filled expense form. Someone else's expense is a 404.
pub async fn edit_expense_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
) -> PageResult<Html<String>> {
    let record = get_expense(&state.database, &user.id, &id).await?;
    let categories = list_categories(&state.database).await?;
    Ok(Html(render_expense_form(&user, &categories, Some(&record))?))
}

/// Builds the expense list HTML.
pub fn render_expense_list(user: &CurrentUser, expenses: &[ExpenseRecord]) -> Result<String> {
    let mut body = String::new();
    writeln!(
        &mut body,
        "<h2>Expenses</h2><a href=\"/expenses/new\">Add Expense</a><div class=\"card\"><ul class=\"rows\">"
    )?;

    if expenses.is_empty() {
        writeln!(&mut body, "<li class=\"muted\">No expenses found</li>")?;
    }
    for record in expenses {
        let expense = &record.expense;
        writeln!(
            &mut body,
            "<li><div>{}<div class=\"muted\">{} &middot; {} &middot; {}</div></div>\
             <div>{} <a href=\"/expenses/{}/edit\">Edit</a> {}</div></li>",
            escape(expense.description.as_deref().unwrap_or("No description")),
            escape(record.category_name()),
            escape(&expense.payment_method),
            format_date(expense.date),
            format_amount(expense.amount),
            escape(&expense.id),
            delete_button(&format!("/api/expenses/{}", expense.id))
        )?;
    }
    writeln!(&mut body, "</ul></div>")?;

    render_page("Expenses", Some(user), &body)
}

/// Builds the create or edit form. `existing` switches to edit mode.
pub fn render_expense_form(
    user: &CurrentUser,
    categories: &[CategorySummary],
    existing: Option<&ExpenseRecord>,
) -> Result<String> {
    let expense = existing.map(|record| &record.expense);
    let (title, api, method) = match expense {
        Some(expense) => ("Edit Expense", format!("/api/expenses/{}", expense.id), "PUT"),
        None => ("Add Expense", "/api/expenses".to_string(), "POST"),
    };

    let mut body = String::new();
    writeln!(&mut body, "<h2>{title}</h2>")?;
    writeln!(
        &mut body,
        "<form class=\"card\" data-api=\"{}\" data-method=\"{method}\" data-redirect=\"/expenses\">",
        escape(&api)
    )?;
    writeln!(&mut body, "<p class=\"form-error\"></p>")?;

    let amount = expense.map(|e| format!("{:.2}", e.amount)).unwrap_or_default();
    writeln!(
        &mut body,
        "<label for=\"amount\">Amount</label>\
         <input id=\"amount\" name=\"amount\" type=\"number\" step=\"0.01\" min=\"0.01\" required value=\"{amount}\">"
    )?;

    writeln!(
        &mut body,
        "<label for=\"paymentMethod\">Payment Method</label><select id=\"paymentMethod\" name=\"paymentMethod\" required>"
    )?;
    for option in PAYMENT_METHODS {
        let selected = expense.is_some_and(|e| e.payment_method == option);
        writeln!(
            &mut body,
            "<option value=\"{option}\"{}>{option}</option>",
            if selected { " selected" } else { "" }
        )?;
    }
    writeln!(&mut body, "</select>")?;

    writeln!(
        &mut body,
        "<label for=\"categoryId\">Category</label><select id=\"categoryId\" name=\"categoryId\" required>\
         <option value=\"\">Select a category</option>"
    )?;
    for summary in categories {
        let category = &summary.category;
        let selected = expense.is_some_and(|e| e.category_id == category.id);
        writeln!(
            &mut body,
            "<option value=\"{}\"{}>{}</option>",
            escape(&category.id),
            if selected { " selected" } else { "" },
            escape(&category.name)
        )?;
    }
    writeln!(&mut body, "</select>")?;

    let date = expense.map(|e| format_date(e.date)).unwrap_or_default();
    writeln!(
        &mut body,
        "<label for=\"date\">Date</label><input id=\"date\" name=\"date\" type=\"date\" required value=\"{date}\">"
    )?;

    let description = expense
        .and_then(|e| e.description.as_deref())
        .map(escape)
        .unwrap_or_default();
    writeln!(
        &mut body,
        "<label for=\"description\">Description</label>\
         <textarea id=\"description\" name=\"description\" rows=\"3\">{description}</textarea>"
    )?;

    writeln!(
        &mut body,
        "<p><button type=\"submit\">{}</button> <a href=\"/expenses\">Cancel</a></p></form>",
        if existing.is_some() { "Update Expense" } else { "Create Expense" }
    )?;

    render_page(title, Some(user), &body)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::category::ExpenseCount;
    use crate::entities::{category, expense};
    use chrono::{TimeZone, Utc};

    fn user() -> CurrentUser {
        CurrentUser {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    fn travel() -> CategorySummary {
        CategorySummary {
            category: category::Model {
                id: "c1".to_string(),
                name: "Travel".to_string(),
                description: None,
                created_at: Utc::now(),
            },
            count: ExpenseCount { expenses: 1 },
        }
    }

    fn record() -> ExpenseRecord {
        let date = Utc.with_ymd_and_hms(2026, 10, 5, 12, 0, 0).unwrap();
        ExpenseRecord {
            expense: expense::Model {
                id: "e1".to_string(),
                amount: 299.99,
                description: Some("Flight <LHR>".to_string()),
                date,
                payment_method: "Corporate Card".to_string(),
                category_id: "c1".to_string(),
                user_id: "u1".to_string(),
                created_at: date,
            },
            category: Some(travel().category),
        }
    }

    #[test]
    fn test_render_expense_list() {
        let html = render_expense_list(&user(), &[record()]).unwrap();
        assert!(html.contains("Flight &lt;LHR&gt;"));
        assert!(html.contains("Travel &middot; Corporate Card &middot; 2026-10-05"));
        assert!(html.contains("$299.99"));
        assert!(html.contains("href=\"/expenses/e1/edit\""));
        assert!(html.contains("action=\"/api/expenses/e1\""));
        assert!(html.contains("name=\"_method\" value=\"DELETE\""));

        let empty = render_expense_list(&user(), &[]).unwrap();
        assert!(empty.contains("No expenses found"));
    }

    #[test]
    fn test_render_new_form() {
        let html = render_expense_form(&user(), &[travel()], None).unwrap();
        assert!(html.contains("data-api=\"/api/expenses\" data-method=\"POST\""));
        assert!(html.contains("<option value=\"c1\">Travel</option>"));
        assert!(html.contains("Create Expense"));
    }

    #[test]
    fn test_render_edit_form_prefills() {
        let html = render_expense_form(&user(), &[travel()], Some(&record())).unwrap();
        assert!(html.contains("data-api=\"/api/expenses/e1\" data-method=\"PUT\""));
        assert!(html.contains("value=\"299.99\""));
        assert!(html.contains("value=\"2026-10-05\""));
        assert!(html.contains("<option value=\"c1\" selected>Travel</option>"));
        assert!(html.contains("<option value=\"Corporate Card\" selected>"));
        assert!(html.contains("Update Expense"));
    }
}
