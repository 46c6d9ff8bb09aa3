//! Database queries for listing a user's transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    pagination::PageRequest,
    transaction::{Transaction, TransactionType, core::map_transaction_row},
};

/// Optional conditions a listed transaction must meet. All conditions that
/// are set must hold.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only transactions with exactly this category.
    pub category: Option<String>,
    /// Only transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// The first day of the date range, inclusive.
    ///
    /// Ignored unless `date_to` is also set.
    pub date_from: Option<Date>,
    /// The last day of the date range, inclusive.
    ///
    /// Ignored unless `date_from` is also set.
    pub date_to: Option<Date>,
}

impl TransactionFilter {
    /// The inclusive date range to filter by, if both ends were given.
    pub fn date_range(&self) -> Option<(Date, Date)> {
        match (self.date_from, self.date_to) {
            (Some(date_from), Some(date_to)) => Some((date_from, date_to)),
            _ => None,
        }
    }

    /// The filter as query string parameters, e.g. for links to other pages
    /// of the same list.
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }

        if let Some(transaction_type) = self.transaction_type {
            pairs.push(("type", transaction_type.as_str().to_owned()));
        }

        if let Some(date_from) = self.date_from {
            pairs.push(("date_from", date_from.to_string()));
        }

        if let Some(date_to) = self.date_to {
            pairs.push(("date_to", date_to.to_string()));
        }

        pairs
    }

    /// Build the WHERE clause for `user_id` and this filter, along with the
    /// values for its placeholders.
    fn where_clause(&self, user_id: UserID) -> (String, Vec<Value>) {
        let mut conditions = vec!["user_id = ?".to_owned()];
        let mut values = vec![Value::Integer(user_id.as_i64())];

        if let Some(category) = &self.category {
            conditions.push("category = ?".to_owned());
            values.push(Value::Text(category.clone()));
        }

        if let Some(transaction_type) = self.transaction_type {
            conditions.push("type = ?".to_owned());
            values.push(Value::Text(transaction_type.as_str().to_owned()));
        }

        if let Some((date_from, date_to)) = self.date_range() {
            conditions.push("date BETWEEN ? AND ?".to_owned());
            values.push(Value::Text(date_from.to_string()));
            values.push(Value::Text(date_to.to_string()));
        }

        (format!("WHERE {}", conditions.join(" AND ")), values)
    }
}

/// Get the transactions of `user_id` that match `filter`, newest first.
///
/// Transactions on the same day are ordered by ID so that the order is stable
/// across pages. If `page` is `None` all matching transactions are returned.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub(crate) fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    page: Option<PageRequest>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, mut values) = filter.where_clause(user_id);

    let limit_clause = match page {
        Some(page) => {
            values.push(Value::Integer(to_sql_integer(page.page_size)));
            values.push(Value::Integer(to_sql_integer(page.offset())));
            "LIMIT ? OFFSET ?"
        }
        None => "",
    };

    let query = format!(
        "SELECT id, amount, type, category, date FROM \"transaction\" \
        {where_clause} \
        ORDER BY date DESC, id ASC \
        {limit_clause}"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(values), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Count the transactions of `user_id` that match `filter`.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub(crate) fn count_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, values) = filter.where_clause(user_id);
    let query = format!("SELECT COUNT(id) FROM \"transaction\" {where_clause}");

    let count: i64 = connection.query_row(&query, params_from_iter(values), |row| row.get(0))?;

    Ok(count.max(0) as u64)
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
