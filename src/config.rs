use std::path::PathBuf;

/// The file the ledger is loaded from at start and saved to on exit
pub const DEFAULT_DATA_FILE: &str = "bank_accounts.dat";
/// The file an export is written to when no name is entered
pub const DEFAULT_EXPORT_FILE: &str = "accounts.dat";
/// The file accounts with equal deposits and withdrawals are saved to
pub const DEFAULT_EQUAL_FLOWS_FILE: &str = "equal_accounts.dat";

/// Settings of a console session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    pub export_file: PathBuf,
    pub equal_flows_file: PathBuf,
    /// Whether the screen is cleared before every menu action
    pub clear_screen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            equal_flows_file: PathBuf::from(DEFAULT_EQUAL_FLOWS_FILE),
            clear_screen: true,
        }
    }
}
