//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The route for registering a new user.
pub const REGISTER: &str = "/api/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for the details of the logged in user.
pub const CURRENT_USER: &str = "/api/users/me";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for income and expense totals per month.
pub const MONTHLY_SUMMARY_REPORT: &str = "/api/reports/monthly-summary";
/// The route for expense totals per category.
pub const CATEGORY_EXPENSE_REPORT: &str = "/api/reports/category-wise-expense";

/// Replace the path parameter in `endpoint_path`, e.g. `{transaction_id}`, with `id`.
///
/// Only the first parameter is replaced. A path without one is returned as is.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((prefix, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };

    let suffix = rest.split_once('}').map_or("", |(_, suffix)| suffix);

    format!("{prefix}{id}{suffix}")
}
