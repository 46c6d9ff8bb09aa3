//! Monthly and per-category summaries of a user's transactions.
//!
//! This module contains:
//! - Pure aggregation functions that group and sum transactions
//! - Route handlers that serve the summaries as JSON

mod aggregation;
mod handlers;

pub use handlers::{get_category_expenses, get_monthly_summary};
