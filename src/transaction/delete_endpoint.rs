//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{core::delete_transaction, list_endpoint::TransactionState},
};

/// A route handler for deleting a transaction. Responds with 204 on success.
///
/// Deleting never changes the user's balance.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(transaction_id) = transaction_id?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, user_id, &connection)?;
    tracing::info!("user {user_id} deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}
