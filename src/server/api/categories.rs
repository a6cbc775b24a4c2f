//! `/api/categories`, shared by all users.
//!
//! Reads are public. Mutations go through the generic handlers, which already
//! require a session; deletion follows the configured policy.

use super::resource::{Resource, Scope};
use crate::{
    core::category::{self, CategoryForm, CategorySummary},
    errors::Result,
    server::AppState,
};

/// Category resource.
pub struct Categories;

impl Resource for Categories {
    type Record = CategorySummary;
    type Form = CategoryForm;

    const SINGULAR: &'static str = "category";
    const PLURAL: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const OWNER_SCOPED: bool = false;

    async fn list(state: &AppState, _scope: Scope<'_>) -> Result<Vec<CategorySummary>> {
        category::list_categories(&state.database).await
    }

    async fn fetch(state: &AppState, _scope: Scope<'_>, id: &str) -> Result<CategorySummary> {
        category::get_category(&state.database, id).await
    }

    async fn create(state: &AppState, _scope: Scope<'_>, form: CategoryForm) -> Result<CategorySummary> {
        category::create_category(&state.database, form).await
    }

    async fn update(state: &AppState, _scope: Scope<'_>, id: &str, form: CategoryForm) -> Result<CategorySummary> {
        category::update_category(&state.database, id, form).await
    }

    async fn delete(state: &AppState, _scope: Scope<'_>, id: &str) -> Result<()> {
        let policy = state.settings.categories.delete_policy;
        category::delete_category(&state.database, id, policy).await
    }
}
