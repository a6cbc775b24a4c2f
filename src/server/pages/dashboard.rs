//! `/dashboard`

use super::layout::{PageResult, escape, format_amount, format_date, plural, render_page};
use crate::{
    core::{
        dashboard::{Dashboard, get_dashboard},
        session::CurrentUser,
    },
    errors::Result,
    server::{AppState, session::PageUser},
};
use axum::{extract::State, response::Html};
use chrono::Utc;
use std::fmt::Write;

/// Renders the monthly summary of the signed-in user.
pub async fn dashboard_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
) -> PageResult<Html<String>> {
    let dashboard = get_dashboard(&state.database, &user.id, Utc::now()).await?;
    Ok(Html(render_dashboard(&user, &dashboard)?))
}

/// Builds the dashboard HTML.
pub fn render_dashboard(user: &CurrentUser, dashboard: &Dashboard) -> Result<String> {
    let mut body = String::new();
    writeln!(&mut body, "<h2>Dashboard</h2>")?;
    writeln!(
        &mut body,
        "<p class=\"muted\">Since {}</p>",
        format_date(dashboard.month_start)
    )?;

    writeln!(&mut body, "<div class=\"stats\">")?;
    for (label, value) in [
        ("Total Expenses (This Month)", format_amount(dashboard.total)),
        ("Categories", dashboard.by_category.len().to_string()),
        ("Recent Transactions", dashboard.recent.len().to_string()),
    ] {
        writeln!(
            &mut body,
            "<div class=\"card\"><div class=\"muted\">{label}</div><div><strong>{value}</strong></div></div>"
        )?;
    }
    writeln!(&mut body, "</div>")?;

    writeln!(
        &mut body,
        "<div class=\"card\"><h3>Expenses by Category (This Month)</h3><ul class=\"rows\">"
    )?;
    if dashboard.by_category.is_empty() {
        writeln!(&mut body, "<li class=\"muted\">No expenses this month</li>")?;
    }
    for total in &dashboard.by_category {
        writeln!(
            &mut body,
            "<li><div>{}<div class=\"muted\">{}</div></div><div>{}</div></li>",
            escape(&total.category),
            plural(total.count, "transaction"),
            format_amount(total.amount)
        )?;
    }
    writeln!(&mut body, "</ul></div>")?;

    writeln!(
        &mut body,
        "<div class=\"card\"><h3>Recent Expenses</h3><a href=\"/expenses/new\">Add Expense</a><ul class=\"rows\">"
    )?;
    if dashboard.recent.is_empty() {
        writeln!(&mut body, "<li class=\"muted\">No expenses yet</li>")?;
    }
    for record in &dashboard.recent {
        let expense = &record.expense;
        writeln!(
            &mut body,
            "<li><div>{}<div class=\"muted\">{} &middot; {} &middot; {}</div></div><div>{}</div></li>",
            escape(expense.description.as_deref().unwrap_or("No description")),
            escape(record.category_name()),
            escape(&expense.payment_method),
            format_date(expense.date),
            format_amount(expense.amount)
        )?;
    }
    writeln!(&mut body, "</ul></div>")?;

    render_page("Dashboard", Some(user), &body)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{dashboard::CategoryTotal, expense::ExpenseRecord};
    use crate::entities::expense;

    fn user() -> CurrentUser {
        CurrentUser {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    #[test]
    fn test_render_empty_dashboard() {
        let dashboard = Dashboard {
            month_start: Utc::now(),
            total: 0.0,
            by_category: vec![],
            recent: vec![],
        };
        let html = render_dashboard(&user(), &dashboard).unwrap();
        assert!(html.contains("$0.00"));
        assert!(html.contains(&format!("Since {}", format_date(dashboard.month_start))));
        assert!(html.contains("No expenses this month"));
        assert!(html.contains("No expenses yet"));
    }

    #[test]
    fn test_render_dashboard_rows() {
        let now = Utc::now();
        let dashboard = Dashboard {
            month_start: now,
            total: 445.97,
            by_category: vec![CategoryTotal {
                category: "Travel".to_string(),
                amount: 299.99,
                count: 1,
            }],
            recent: vec![ExpenseRecord {
                expense: expense::Model {
                    id: "e1".to_string(),
                    amount: 299.99,
                    description: None,
                    date: now,
                    payment_method: "Corporate Card".to_string(),
                    category_id: "gone".to_string(),
                    user_id: "u1".to_string(),
                    created_at: now,
                },
                category: None,
            }],
        };

        let html = render_dashboard(&user(), &dashboard).unwrap();
        assert!(html.contains("$445.97"));
        assert!(html.contains("1 transaction<"));
        assert!(html.contains("No description"));
        assert!(html.contains("Unknown"));
        assert!(!html.contains("No expenses yet"));
    }
}
