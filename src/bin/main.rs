use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bank_ledger::{config, Config, Ledger, Session};

/// An interactive manager for bank account ledgers
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The ledger file loaded at start and saved on exit
    #[clap(long, env = "BANK_LEDGER_DATA_FILE", default_value = config::DEFAULT_DATA_FILE)]
    data_file: PathBuf,
    /// The file exports are written to when no file name is entered
    #[clap(long, env = "BANK_LEDGER_EXPORT_FILE", default_value = config::DEFAULT_EXPORT_FILE)]
    export_file: PathBuf,
    /// The file accounts with equal deposits and withdrawals are saved to
    #[clap(long, env = "BANK_LEDGER_EQUAL_FLOWS_FILE", default_value = config::DEFAULT_EQUAL_FLOWS_FILE)]
    equal_flows_file: PathBuf,
    /// Don't clear the screen before every menu action
    #[clap(long)]
    no_clear: bool,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Writes the totals of every account in the ledger file as CSV and exits
    Report {
        /// The CSV file to write instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
}

impl Args {
    fn config(&self) -> Config {
        Config {
            data_file: self.data_file.clone(),
            export_file: self.export_file.clone(),
            equal_flows_file: self.equal_flows_file.clone(),
            clear_screen: !self.no_clear,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // logs go to stderr so they don't interleave with the menu
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = args.config();

    match args.command {
        Some(Command::Report { output }) => {
            let ledger = Ledger::load(&config.data_file)
                .with_context(|| format!("Failed to load {}", config.data_file.display()))?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    bank_ledger::write_summary_csv(&ledger, file)?;
                }
                None => bank_ledger::write_summary_csv(&ledger, io::stdout())?,
            }
        }
        None => {
            let ledger = load_or_empty(&config)?;
            let stdin = io::stdin();
            Session::new(ledger, config, stdin.lock(), io::stdout()).run()?;
        }
    }

    Ok(())
}

/// Loads the session ledger, falling back to an empty one if the file is corrupt
fn load_or_empty(config: &Config) -> io::Result<Ledger> {
    let mut stdout = io::stdout();
    match Ledger::load(&config.data_file) {
        Ok(ledger) => {
            if !ledger.is_empty() {
                writeln!(stdout, "\n[OK] Data loaded successfully!")?;
                writeln!(stdout, "  Accounts count: {}", ledger.len())?;
            }
            Ok(ledger)
        }
        Err(e) => {
            tracing::error!(path = %config.data_file.display(), error = %e, "failed to load ledger");
            writeln!(stdout, "[ERROR] Error loading {}: {}", config.data_file.display(), e)?;
            writeln!(stdout, "  Starting with an empty ledger, the file is overwritten on exit.")?;
            Ok(Ledger::new())
        }
    }
}
