//! Log-out route handler that invalidates the authentication cookie.

use axum::Json;
use axum_extra::extract::PrivateCookieJar;
use serde_json::{Value, json};

use crate::auth::cookie::invalidate_auth_cookie;

/// Invalidate the auth cookie.
///
/// Logging out without being logged in is not an error.
pub async fn post_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, Json<Value>) {
    let jar = invalidate_auth_cookie(jar);

    (jar, Json(json!({ "detail": "Logged out" })))
}
