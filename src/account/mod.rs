mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountType, adjust_account_balance, create_account_table, get_account, get_accounts,
    map_row_to_account,
};
pub use create_endpoint::{AccountForm, AccountState, create_account, create_account_endpoint};
pub use delete_endpoint::{delete_account, delete_account_endpoint};
pub use list_endpoint::get_accounts_endpoint;
