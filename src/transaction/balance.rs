//! Keeps each user's cached balance in step with the transactions they create.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    money,
    transaction::{Transaction, TransactionType},
};

/// Read the current balance of `user_id`.
///
/// # Errors
/// Returns a [Error::NotFound] if `user_id` does not refer to a user, or an
/// [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_balance(user_id: UserID, connection: &Connection) -> Result<Decimal, Error> {
    connection
        .prepare("SELECT balance FROM user WHERE id = :id")?
        .query_one(&[(":id", &user_id.as_i64())], |row| {
            money::get_decimal(row, 0)
        })
        .map_err(|error| error.into())
}

/// The change `transaction` makes to a balance.
pub(crate) fn balance_delta(transaction: &Transaction) -> Decimal {
    match transaction.transaction_type {
        TransactionType::Income => transaction.amount,
        TransactionType::Expense => -transaction.amount,
    }
}

/// Add income to, or subtract an expense from, the balance of `user_id`.
///
/// Must be called exactly once for each newly stored transaction, and never
/// for edits or deletions. Returns the new balance.
///
/// # Errors
/// Returns an [Error::BalanceUpdateFailed] if the balance could not be read,
/// overflowed or could not be written back.
pub fn apply_to_balance(
    user_id: UserID,
    transaction: &Transaction,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let update_failed = |reason: String| {
        tracing::error!("could not update the balance of user {user_id}: {reason}");
        Error::BalanceUpdateFailed(user_id, reason)
    };

    let balance =
        get_balance(user_id, connection).map_err(|error| update_failed(error.to_string()))?;

    let new_balance = balance
        .checked_add(balance_delta(transaction))
        .ok_or_else(|| update_failed("balance overflowed".to_owned()))?;

    let rows_affected = connection
        .execute(
            "UPDATE user SET balance = ?1 WHERE id = ?2",
            (money::to_sql_text(new_balance), user_id.as_i64()),
        )
        .map_err(|error| update_failed(error.to_string()))?;

    if rows_affected != 1 {
        return Err(update_failed(format!("{rows_affected} users updated")));
    }

    tracing::debug!(
        "balance of user {user_id} went from {balance} to {new_balance} after transaction {}",
        transaction.pk
    );

    Ok(new_balance)
}

#[cfg(test)]
mod balance_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error, UserID,
        test_utils::{create_test_user_in, get_test_connection},
        transaction::{Transaction, TransactionType},
    };

    use super::{apply_to_balance, get_balance};

    fn transaction(amount: Decimal, transaction_type: TransactionType) -> Transaction {
        Transaction {
            pk: 1,
            amount,
            transaction_type,
            category: "Test".to_owned(),
            date: date!(2023 - 07 - 19),
        }
    }

    #[test]
    fn income_increases_balance() {
        let conn = get_test_connection();
        let user = create_test_user_in(&conn, "alice");

        let got = apply_to_balance(
            user.id,
            &transaction(dec!(100.50), TransactionType::Income),
            &conn,
        );

        assert_eq!(got, Ok(dec!(100.50)));
        assert_eq!(get_balance(user.id, &conn), Ok(dec!(100.50)));
    }

    #[test]
    fn expense_decreases_balance() {
        let conn = get_test_connection();
        let user = create_test_user_in(&conn, "alice");
        apply_to_balance(
            user.id,
            &transaction(dec!(100), TransactionType::Income),
            &conn,
        )
        .unwrap();

        let got = apply_to_balance(
            user.id,
            &transaction(dec!(30.25), TransactionType::Expense),
            &conn,
        );

        assert_eq!(got, Ok(dec!(69.75)));
        assert_eq!(get_balance(user.id, &conn).unwrap().to_string(), "69.75");
    }

    #[test]
    fn unknown_user_fails_loudly() {
        let conn = get_test_connection();

        let got = apply_to_balance(
            UserID::new(42),
            &transaction(dec!(1), TransactionType::Income),
            &conn,
        );

        assert!(matches!(got, Err(Error::BalanceUpdateFailed(_, _))));
    }
}
