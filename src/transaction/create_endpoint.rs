//! Defines the endpoint for creating a new transaction, and the write path
//! that keeps the creator's balance up to date.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    transaction::{
        NewTransaction, Transaction, TransactionData,
        balance::{apply_to_balance, get_balance},
        core::insert_transaction,
        validation::check_sufficient_balance,
    },
};

/// Record a new transaction for `user_id` and adjust their balance.
///
/// The balance check, the insert and the balance update happen in one
/// immediate SQL transaction, so two expenses created at the same time cannot
/// both be checked against the same balance. Nothing is stored if any step
/// fails.
///
/// # Errors
/// This function will return a:
/// - [Error::InsufficientBalance] if the transaction is an expense larger than
///   the user's balance,
/// - [Error::NotFound] if `user_id` does not refer to a user,
/// - [Error::BalanceUpdateFailed] if the balance could not be updated,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let balance = get_balance(user_id, &sql_transaction)?;
    check_sufficient_balance(new_transaction, balance)?;

    let transaction = insert_transaction(user_id, new_transaction, &sql_transaction)?;
    apply_to_balance(user_id, &transaction, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction, with a `Location` header
/// pointing at the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<TransactionData>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(data) = payload?;
    let new_transaction = NewTransaction::try_from(data)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, &new_transaction, &connection)?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::TRANSACTION, transaction.pk))],
        Json(transaction),
    )
        .into_response())
}
