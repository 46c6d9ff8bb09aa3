//! The route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword, user::create_user},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost used to hash new passwords.
    pub password_hash_cost: u32,
    /// The database connection for inserting users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data needed to register a new user.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterData {
    /// The name the user will log in with.
    pub username: String,
    /// The plain text password, checked for strength before hashing.
    pub password: String,
}

/// The response to a successful registration.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisteredUser {
    /// The ID of the new user.
    pub pk: i64,
    /// The name of the new user.
    pub username: String,
}

/// Handler for registering a new user.
///
/// # Errors
///
/// Returns a 400 error if the username or password are not acceptable or the
/// username is already taken.
pub async fn register_user(
    State(state): State<RegistrationState>,
    payload: Result<Json<RegisterData>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredUser>), Error> {
    let Json(user_data) = payload?;

    let validated_password = ValidatedPassword::new(&user_data.password)?;
    let password_hash =
        PasswordHash::new(validated_password, state.password_hash_cost).inspect_err(|error| {
            tracing::error!("an error occurred while hashing a password: {error}")
        })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user(&user_data.username, password_hash, &connection)?;
    tracing::info!("Registered user {} with ID {}", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            pk: user.id.as_i64(),
            username: user.username,
        }),
    ))
}
