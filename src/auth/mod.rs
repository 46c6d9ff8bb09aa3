//! User accounts, sessions and the middleware that guards the API.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use user::{
    User, UserID, create_user, create_user_table, get_current_user, get_user_by_id,
};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
