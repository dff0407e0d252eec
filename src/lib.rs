pub use self::{
    account::{Account, ValidationError, CURRENCY},
    config::Config,
    console::Session,
    ledger::{Ledger, LedgerError},
    report::write_summary_csv,
    storage::{Field, FormatError},
};

mod account;
pub mod config;
mod console;
mod ledger;
mod report;
mod storage;
