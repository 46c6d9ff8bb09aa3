//! Report HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    report::aggregation::{
        CategoryExpense, MonthlySummary, category_expense_totals, monthly_summary,
    },
    transaction::{Transaction, TransactionFilter, query_transactions},
};

/// The state needed for the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn get_all_transactions(state: &ReportState, user_id: UserID) -> Result<Vec<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    query_transactions(user_id, &TransactionFilter::default(), None, &connection)
}

/// A route handler for the logged in user's income and expense totals per
/// month.
pub async fn get_monthly_summary(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<MonthlySummary>>, Error> {
    let transactions = get_all_transactions(&state, user_id)?;

    Ok(Json(monthly_summary(&transactions)))
}

/// A route handler for the logged in user's expense totals per category.
pub async fn get_category_expenses(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<CategoryExpense>>, Error> {
    let transactions = get_all_transactions(&state, user_id)?;

    Ok(Json(category_expense_totals(&transactions)))
}
