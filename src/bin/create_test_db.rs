use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::macros::date;

use ledger_tracker::{
    NewTransaction, PasswordHash, TransactionType, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of ledger_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_USERNAME: &str = "test";
const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {TEST_USERNAME:?} with the password {TEST_PASSWORD:?}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new(TEST_PASSWORD)?,
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(TEST_USERNAME, password_hash, &conn)?;

    println!("Creating test transactions...");

    let transactions = [
        (1000, TransactionType::Income, "Salary", date!(2023 - 07 - 01)),
        (50, TransactionType::Expense, "Food", date!(2023 - 07 - 19)),
        (30, TransactionType::Expense, "Transport", date!(2023 - 07 - 20)),
        (1000, TransactionType::Income, "Salary", date!(2023 - 08 - 01)),
        (20, TransactionType::Expense, "Food", date!(2023 - 08 - 05)),
        (10, TransactionType::Expense, "Others", date!(2023 - 08 - 21)),
    ];

    for (amount, transaction_type, category, date) in transactions {
        let transaction =
            NewTransaction::new(Decimal::from(amount), transaction_type, category, date)?;
        create_transaction(user.id, &transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}
