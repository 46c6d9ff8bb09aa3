//! Helpers for exact monetary amounts.
//!
//! Amounts are [Decimal]s with two decimal places and at most twenty digits in
//! total. They are stored in SQLite as text so no precision is lost.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

use crate::Error;

/// The number of digits after the decimal point kept for every amount.
pub(crate) const DECIMAL_PLACES: u32 = 2;

/// The maximum number of digits in an amount, including the decimal places.
pub(crate) const MAX_DIGITS: u32 = 20;

const MAX_INTEGER_DIGITS: u32 = MAX_DIGITS - DECIMAL_PLACES;

/// Check that `amount` fits the fixed precision and rescale it to exactly
/// [DECIMAL_PLACES] places, e.g. `50` becomes `50.00`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if `amount` has more than
/// [DECIMAL_PLACES] significant decimal places or more than
/// `MAX_DIGITS - DECIMAL_PLACES` digits before the decimal point.
pub(crate) fn to_fixed_precision(amount: Decimal) -> Result<Decimal, Error> {
    let out_of_range = Error::AmountOutOfRange {
        max_integer_digits: MAX_INTEGER_DIGITS,
        max_decimal_places: DECIMAL_PLACES,
    };

    if amount.normalize().scale() > DECIMAL_PLACES {
        return Err(out_of_range);
    }

    let limit = Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS));
    if amount.abs() >= limit {
        return Err(out_of_range);
    }

    let mut amount = amount;
    amount.rescale(DECIMAL_PLACES);

    Ok(amount)
}

/// Format an amount the way it is stored in the database.
pub(crate) fn to_sql_text(amount: Decimal) -> String {
    let mut amount = amount;
    amount.rescale(DECIMAL_PLACES);
    amount.to_string()
}

/// Read the text column at `index` as a [Decimal].
pub(crate) fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
