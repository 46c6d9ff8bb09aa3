//! Grouped totals over a user's transactions.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionType};

/// The total amount of one type of transaction in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The calendar year.
    #[serde(rename = "date__year")]
    pub year: i32,
    /// The month of the year, from 1 to 12.
    #[serde(rename = "date__month")]
    pub month: u8,
    /// Whether the total is of income or expenses.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The sum of the amounts.
    pub total_amount: Decimal,
}

/// The total spent under one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpense {
    /// The category label, spelled as stored.
    pub category: String,
    /// The sum of the expense amounts.
    pub total_expense: Decimal,
}

/// Sum `transactions` per (year, month, type).
///
/// Rows are ordered by year, then month, then type name, so expenses come
/// before income within a month. Groups without transactions are left out.
pub(super) fn monthly_summary(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut totals: BTreeMap<(i32, u8, TransactionType), Decimal> = BTreeMap::new();

    for transaction in transactions {
        let date = transaction.date;
        let key = (date.year(), u8::from(date.month()), transaction.transaction_type);
        *totals.entry(key).or_insert(Decimal::ZERO) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|((year, month, transaction_type), total_amount)| MonthlySummary {
            year,
            month,
            transaction_type,
            total_amount,
        })
        .collect()
}

/// Sum the expenses in `transactions` per category. Income is ignored.
///
/// Rows are ordered by category name ignoring case. Categories that only
/// differ in case are kept apart and ordered by their exact spelling.
pub(super) fn category_expense_totals(transactions: &[Transaction]) -> Vec<CategoryExpense> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
    {
        *totals
            .entry(transaction.category.as_str())
            .or_insert(Decimal::ZERO) += transaction.amount;
    }

    let mut rows: Vec<CategoryExpense> = totals
        .into_iter()
        .map(|(category, total_expense)| CategoryExpense {
            category: category.to_owned(),
            total_expense,
        })
        .collect();

    // The map already orders by exact spelling, and the sort is stable.
    rows.sort_by_cached_key(|row| row.category.to_lowercase());

    rows
}

#[cfg(test)]
mod aggregation_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::transaction::{Transaction, TransactionType};

    use super::{CategoryExpense, MonthlySummary, category_expense_totals, monthly_summary};

    fn transaction(
        amount: Decimal,
        transaction_type: TransactionType,
        category: &str,
        date: Date,
    ) -> Transaction {
        Transaction {
            pk: 0,
            amount,
            transaction_type,
            category: category.to_owned(),
            date,
        }
    }

    #[test]
    fn monthly_summary_groups_by_month_and_type() {
        let transactions = [
            transaction(dec!(1000.00), TransactionType::Income, "Salary", date!(2023 - 08 - 21)),
            transaction(dec!(50.00), TransactionType::Expense, "Food", date!(2023 - 07 - 19)),
            transaction(dec!(30.00), TransactionType::Expense, "Transport", date!(2023 - 07 - 20)),
        ];

        let got = monthly_summary(&transactions);

        assert_eq!(
            got,
            [
                MonthlySummary {
                    year: 2023,
                    month: 7,
                    transaction_type: TransactionType::Expense,
                    total_amount: dec!(80.00),
                },
                MonthlySummary {
                    year: 2023,
                    month: 8,
                    transaction_type: TransactionType::Income,
                    total_amount: dec!(1000.00),
                },
            ]
        );
    }

    #[test]
    fn monthly_summary_orders_across_years_and_types() {
        let transactions = [
            transaction(dec!(5), TransactionType::Income, "A", date!(2024 - 01 - 05)),
            transaction(dec!(4), TransactionType::Income, "A", date!(2023 - 12 - 05)),
            transaction(dec!(3), TransactionType::Expense, "A", date!(2023 - 12 - 31)),
            transaction(dec!(2), TransactionType::Income, "A", date!(2023 - 02 - 01)),
        ];

        let got: Vec<(i32, u8, TransactionType)> = monthly_summary(&transactions)
            .into_iter()
            .map(|row| (row.year, row.month, row.transaction_type))
            .collect();

        assert_eq!(
            got,
            [
                (2023, 2, TransactionType::Income),
                (2023, 12, TransactionType::Expense),
                (2023, 12, TransactionType::Income),
                (2024, 1, TransactionType::Income),
            ]
        );
    }

    #[test]
    fn monthly_summary_of_nothing_is_empty() {
        assert!(monthly_summary(&[]).is_empty());
    }

    #[test]
    fn category_totals_sum_expenses_alphabetically() {
        let transactions = [
            transaction(dec!(50.00), TransactionType::Expense, "Food", date!(2023 - 07 - 19)),
            transaction(dec!(30.00), TransactionType::Expense, "Transport", date!(2023 - 07 - 20)),
            transaction(dec!(20.00), TransactionType::Expense, "Food", date!(2023 - 07 - 21)),
            transaction(dec!(10.00), TransactionType::Expense, "Others", date!(2023 - 07 - 22)),
            transaction(dec!(999.00), TransactionType::Income, "Food", date!(2023 - 07 - 23)),
        ];

        let got = category_expense_totals(&transactions);

        assert_eq!(
            got,
            [
                CategoryExpense {
                    category: "Food".to_owned(),
                    total_expense: dec!(70.00),
                },
                CategoryExpense {
                    category: "Others".to_owned(),
                    total_expense: dec!(10.00),
                },
                CategoryExpense {
                    category: "Transport".to_owned(),
                    total_expense: dec!(30.00),
                },
            ]
        );
    }

    #[test]
    fn category_order_ignores_case() {
        let transactions = [
            transaction(dec!(1), TransactionType::Expense, "bills", date!(2023 - 07 - 19)),
            transaction(dec!(1), TransactionType::Expense, "Food", date!(2023 - 07 - 19)),
            transaction(dec!(1), TransactionType::Expense, "apples", date!(2023 - 07 - 19)),
            transaction(dec!(1), TransactionType::Expense, "food", date!(2023 - 07 - 19)),
        ];

        let got: Vec<String> = category_expense_totals(&transactions)
            .into_iter()
            .map(|row| row.category)
            .collect();

        assert_eq!(got, ["apples", "bills", "Food", "food"]);
    }
}
