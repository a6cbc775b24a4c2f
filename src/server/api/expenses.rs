//! `/api/expenses`, owned by the signed-in user.

use super::resource::{Resource, Scope};
use crate::{
    core::expense::{self, ExpenseForm, ExpenseRecord},
    errors::Result,
    server::AppState,
};

/// Expense resource.
pub struct Expenses;

impl Resource for Expenses {
    type Record = ExpenseRecord;
    type Form = ExpenseForm;

    const SINGULAR: &'static str = "expense";
    const PLURAL: &'static str = "expenses";
    const LABEL: &'static str = "Expense";
    const OWNER_SCOPED: bool = true;

    async fn list(state: &AppState, scope: Scope<'_>) -> Result<Vec<ExpenseRecord>> {
        expense::list_expenses(&state.database, scope.owner()?).await
    }

    async fn fetch(state: &AppState, scope: Scope<'_>, id: &str) -> Result<ExpenseRecord> {
        expense::get_expense(&state.database, scope.owner()?, id).await
    }

    async fn create(state: &AppState, scope: Scope<'_>, form: ExpenseForm) -> Result<ExpenseRecord> {
        expense::create_expense(&state.database, scope.owner()?, form).await
    }

    async fn update(state: &AppState, scope: Scope<'_>, id: &str, form: ExpenseForm) -> Result<ExpenseRecord> {
        expense::update_expense(&state.database, scope.owner()?, id, form).await
    }

    async fn delete(state: &AppState, scope: Scope<'_>, id: &str) -> Result<()> {
        expense::delete_expense(&state.database, scope.owner()?, id).await
    }
}
