#![allow(missing_docs)]

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, PaginationConfig, build_router,
    auth::{COOKIE_TOKEN, PasswordHash, User, create_user},
    db::initialize,
    endpoints,
    transaction::Transaction,
};

/// The password of every user made by [create_test_user].
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// The lowest cost bcrypt accepts, so tests do not spend their time hashing.
const TEST_HASH_COST: u32 = 4;

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

pub(crate) fn create_test_user_in(connection: &Connection, username: &str) -> User {
    let password_hash =
        PasswordHash::from_raw_password(TEST_PASSWORD, TEST_HASH_COST).expect("Could not hash.");

    create_user(username, password_hash, connection).expect("Could not create test user.")
}

pub(crate) fn create_test_user(state: &AppState, username: &str) -> User {
    create_test_user_in(&state.db_connection.lock().unwrap(), username)
}

pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let mut state = AppState::new(connection, "foobar", PaginationConfig::default())
        .expect("Could not create app state.");
    state.password_hash_cost = TEST_HASH_COST;

    state
}

pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = get_test_state();
    let server =
        TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

    (server, state)
}

/// Log in as `username` and return the auth cookie.
pub(crate) async fn log_in(server: &TestServer, username: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();

    response.cookie(COOKIE_TOKEN)
}

/// A server with the user "alice" logged in.
pub(crate) async fn get_logged_in_server() -> (TestServer, AppState, User, Cookie<'static>) {
    let (server, state) = get_test_server();
    let user = create_test_user(&state, "alice");
    let cookie = log_in(&server, &user.username).await;

    (server, state, user, cookie)
}

/// Create a transaction through the API and return it.
pub(crate) async fn post_transaction(
    server: &TestServer,
    cookie: &Cookie<'static>,
    amount: &str,
    transaction_type: &str,
    category: &str,
    date: &str,
) -> Transaction {
    let response = server
        .post(endpoints::TRANSACTIONS)
        .add_cookie(cookie.clone())
        .json(&json!({
            "amount": amount,
            "type": transaction_type,
            "category": category,
            "date": date,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    response.json()
}
