//! Code for creating the user table and fetching users from the database.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, PasswordHash, money};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The maximum number of characters in a username.
pub(crate) const MAX_USERNAME_LENGTH: usize = 255;

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The unique name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether the user is allowed to log in.
    pub is_active: bool,
    /// Income minus expenses over the transactions the user has created.
    ///
    /// Only the creation of a transaction changes this value, see
    /// [crate::transaction::apply_to_balance].
    pub balance: Decimal,
}

/// Check that `username` is non-empty, alphanumeric and not too long.
///
/// # Errors
/// Returns [Error::InvalidUsername] if any of the checks fail.
pub(crate) fn validate_username(username: &str) -> Result<(), Error> {
    let is_valid = !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username.chars().all(char::is_alphanumeric);

    if is_valid {
        Ok(())
    } else {
        Err(Error::InvalidUsername)
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                balance TEXT NOT NULL DEFAULT '0.00'
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new active user with a zero balance into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidUsername] if `username` is not a valid username,
/// - [Error::DuplicateUsername] if `username` is already taken,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    validate_username(username)?;

    connection
        .prepare(
            "INSERT INTO user (username, password) VALUES (?1, ?2)
             RETURNING id, username, password, is_active, balance",
        )?
        .query_row((username, password_hash.as_ref()), map_user_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUsername(username.to_owned()),
            error => error.into(),
        })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, username, password, is_active, balance FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with the name `username`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has that name, or an [Error::SqlError]
/// if there was an error trying to access the store.
pub(crate) fn get_user_by_username(
    username: &str,
    db_connection: &Connection,
) -> Result<User, Error> {
    db_connection
        .prepare(
            "SELECT id, username, password, is_active, balance FROM user WHERE username = :username",
        )?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
#[cfg(test)]
pub(crate) fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        username: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        is_active: row.get(3)?,
        balance: money::get_decimal(row, 4)?,
    })
}

/// The public view of a user.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserDetails {
    /// The user's ID.
    pub pk: i64,
    /// The user's name.
    pub username: String,
    /// Whether the user may log in.
    pub is_active: bool,
    /// The user's current balance.
    pub balance: Decimal,
}

impl From<User> for UserDetails {
    fn from(user: User) -> Self {
        Self {
            pk: user.id.as_i64(),
            username: user.username,
            is_active: user.is_active,
            balance: user.balance,
        }
    }
}

/// The state needed to look up the logged in user.
#[derive(Debug, Clone)]
pub struct CurrentUserState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CurrentUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the logged in user, including their balance.
pub async fn get_current_user(
    State(state): State<CurrentUserState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<UserDetails>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(user.into()))
}
