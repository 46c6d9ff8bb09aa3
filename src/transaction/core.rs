//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    money::{self, get_decimal},
};

// ============================================================================
// MODELS
// ============================================================================

/// The maximum number of characters in a transaction category.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Whether money was earned or spent.
///
/// Variants are ordered by name, so expenses sort before income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was spent, decreases the balance.
    Expense,
    /// Money that was earned, increases the balance.
    Income,
}

impl TransactionType {
    /// The name used for the type in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(format!("unknown transaction type \"{other}\"")),
        }
    }
}

/// An expense or income recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub pk: TransactionId,
    /// The amount of money spent or earned, always positive.
    pub amount: Decimal,
    /// Whether the money was spent or earned.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A free text label, e.g. "Food".
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

/// The fields of a transaction as sent by a client, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    /// The amount as a JSON number or decimal string.
    pub amount: Decimal,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category label.
    pub category: String,
    /// The date in the format "YYYY-MM-DD".
    pub date: Date,
}

/// The validated fields of a transaction that has not been stored yet, or the
/// replacement fields for an existing one.
///
/// Use [NewTransaction::new] to create one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    amount: Decimal,
    transaction_type: TransactionType,
    category: String,
    date: Date,
}

impl NewTransaction {
    /// Validate the fields of a transaction.
    ///
    /// The category is trimmed and the amount is rescaled to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::NonPositiveAmount] if `amount` is zero or negative,
    /// - [Error::AmountOutOfRange] if `amount` cannot be stored exactly,
    /// - [Error::EmptyCategory] if `category` is blank,
    /// - or [Error::CategoryTooLong] if `category` has more than
    ///   [MAX_CATEGORY_LENGTH] characters.
    pub fn new(
        amount: Decimal,
        transaction_type: TransactionType,
        category: &str,
        date: Date,
    ) -> Result<Self, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount);
        }

        let amount = money::to_fixed_precision(amount)?;

        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        if category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(Error::CategoryTooLong(MAX_CATEGORY_LENGTH));
        }

        Ok(Self {
            amount,
            transaction_type,
            category: category.to_owned(),
            date,
        })
    }

    /// The amount, with exactly two decimal places.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Whether this is income or an expense.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// The trimmed category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// When the transaction happened.
    pub fn date(&self) -> Date {
        self.date
    }
}

impl TryFrom<TransactionData> for NewTransaction {
    type Error = Error;

    fn try_from(data: TransactionData) -> Result<Self, Self::Error> {
        NewTransaction::new(
            data.amount,
            data.transaction_type,
            &data.category,
            data.date,
        )
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                type TEXT NOT NULL CHECK(type IN ('income', 'expense')),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Covers the per-user queries ordered by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Store `transaction` as belonging to `user_id`.
///
/// This does not touch the user's balance, use
/// [crate::transaction::create_transaction] to record a new transaction.
///
/// # Errors
/// Returns a [Error::NotFound] if `user_id` does not refer to a user, or an
/// [Error::SqlError] if there is some other SQL error.
pub(crate) fn insert_transaction(
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, type, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, type, category, date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                money::to_sql_text(transaction.amount),
                transaction.transaction_type.as_str(),
                &transaction.category,
                transaction.date,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, type, category, date FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace all the fields of the transaction `id` owned by `user_id`.
///
/// The user's balance is left as is.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub(crate) fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "UPDATE \"transaction\" SET amount = ?1, type = ?2, category = ?3, date = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING id, amount, type, category, date",
        )?
        .query_one(
            (
                money::to_sql_text(transaction.amount),
                transaction.transaction_type.as_str(),
                &transaction.category,
                transaction.date,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete the transaction `id` owned by `user_id`.
///
/// The user's balance is left as is.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub(crate) fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub(crate) fn count_all_transactions(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
///
/// Expects the columns id, amount, type, category and date, in that order.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(2)?;
    let transaction_type = raw_type.parse().map_err(|error: String| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, error.into())
    })?;

    Ok(Transaction {
        pk: row.get(0)?,
        amount: get_decimal(row, 1)?,
        transaction_type,
        category: row.get(3)?,
        date: row.get(4)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
