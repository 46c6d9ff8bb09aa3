//! Write-time checks that need more than the fields of a single transaction.

use rust_decimal::Decimal;

use crate::{
    Error,
    transaction::{NewTransaction, TransactionType},
};

/// Reject an expense that is larger than `balance`.
///
/// Income, and expenses up to and including the balance, always pass.
///
/// # Errors
/// Returns [Error::InsufficientBalance] if the expense exceeds `balance`.
pub(crate) fn check_sufficient_balance(
    transaction: &NewTransaction,
    balance: Decimal,
) -> Result<(), Error> {
    match transaction.transaction_type() {
        TransactionType::Expense if transaction.amount() > balance => {
            Err(Error::InsufficientBalance)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod validation_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        transaction::{NewTransaction, TransactionType},
    };

    use super::check_sufficient_balance;

    fn new(amount: Decimal, transaction_type: TransactionType) -> NewTransaction {
        NewTransaction::new(amount, transaction_type, "Food", date!(2023 - 07 - 19)).unwrap()
    }

    #[test]
    fn expense_above_balance_fails() {
        let expense = new(dec!(100.01), TransactionType::Expense);

        let got = check_sufficient_balance(&expense, dec!(100));

        assert_eq!(got, Err(Error::InsufficientBalance));
    }

    #[test]
    fn expense_equal_to_balance_passes() {
        let got = check_sufficient_balance(&new(dec!(100), TransactionType::Expense), dec!(100));

        assert_eq!(got, Ok(()));
    }

    #[test]
    fn income_always_passes() {
        let got = check_sufficient_balance(&new(dec!(5000), TransactionType::Income), dec!(0));

        assert_eq!(got, Ok(()));
    }
}
