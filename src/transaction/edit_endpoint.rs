//! Defines the endpoint for replacing the fields of an existing transaction.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rusqlite::{Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{
        NewTransaction, Transaction, TransactionData,
        core::{get_transaction, update_transaction},
        list_endpoint::TransactionState,
    },
};

/// A route handler for replacing every field of a transaction.
///
/// A missing or foreign transaction is reported as not found before the body
/// is looked at. Edits never change the user's balance.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionData>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = transaction_id?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let sql_transaction =
        SqlTransaction::new_unchecked(&connection, TransactionBehavior::Immediate)?;

    get_transaction(transaction_id, user_id, &sql_transaction)?;

    let Json(data) = payload?;
    let replacement = NewTransaction::try_from(data)?;

    let transaction = update_transaction(transaction_id, user_id, &replacement, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(Json(transaction))
}
