use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use dompet::{
    AccountForm, AccountType, BudgetPeriod, NewBudget, NewGoal, Transaction, TransactionType,
    create_account, create_budget, create_goal, create_user, initialize_db, record_transaction,
};

/// A utility for creating a test database for the REST API server of dompet.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = create_user("test@example.com", Some("Test User"), &conn)?;

    println!("Creating accounts...");
    let bank = create_account(
        user.id,
        &AccountForm {
            name: "Maybank".to_owned(),
            account_type: AccountType::Bank,
            balance: 2500.0,
        },
        &conn,
    )?;
    let wallet = create_account(
        user.id,
        &AccountForm {
            name: "Touch 'n Go eWallet".to_owned(),
            account_type: AccountType::EWallet,
            balance: 150.0,
        },
        &conn,
    )?;
    create_account(
        user.id,
        &AccountForm {
            name: "Cash".to_owned(),
            account_type: AccountType::Cash,
            balance: 80.0,
        },
        &conn,
    )?;

    println!("Recording transactions...");
    let today = OffsetDateTime::now_utc().date();
    let transactions = [
        (4200.0, TransactionType::Income, "Salary", 20, Some(bank.id)),
        (1200.0, TransactionType::Expense, "Rent", 19, Some(bank.id)),
        (45.5, TransactionType::Expense, "Food", 6, Some(wallet.id)),
        (12.9, TransactionType::Expense, "Food", 3, Some(wallet.id)),
        (100.0, TransactionType::Transfer, "Top up", 2, Some(bank.id)),
        (30.0, TransactionType::Expense, "Transport", 1, None),
        (18.0, TransactionType::Expense, "Food", 0, Some(wallet.id)),
    ];

    for (amount, transaction_type, category, days_ago, account_id) in transactions {
        record_transaction(
            user.id,
            Transaction::build(
                amount,
                transaction_type,
                category,
                today - Duration::days(days_ago),
            )
            .account_id(account_id),
            &conn,
        )?;
    }

    println!("Creating a budget and a savings goal...");
    create_budget(
        user.id,
        &NewBudget {
            category: "Food".to_owned(),
            amount: 500.0,
            period: BudgetPeriod::Monthly,
            start_date: today - Duration::days(30),
            end_date: today + Duration::days(30),
        },
        &conn,
    )?;
    create_goal(
        user.id,
        &NewGoal {
            name: "Emergency fund".to_owned(),
            target_amount: 10_000.0,
            current_amount: 2_750.0,
            deadline: None,
        },
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
