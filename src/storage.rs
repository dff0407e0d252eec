use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::{Account, Ledger, ValidationError};

/// The field a line of a ledger file is expected to hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    AccountCount,
    Code,
    OwnerName,
    DepositCount,
    Deposit,
    WithdrawalCount,
    Withdrawal,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::AccountCount => "account count",
            Field::Code => "account code",
            Field::OwnerName => "owner name",
            Field::DepositCount => "deposit count",
            Field::Deposit => "deposit amount",
            Field::WithdrawalCount => "withdrawal count",
            Field::Withdrawal => "withdrawal amount",
        })
    }
}

/// Possible errors to occur while reading a ledger file
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Line {line}: expected the {field}, but the file ended")]
    MissingLine { line: usize, field: Field },
    #[error("Line {line}: the {field} `{value}` is not a count")]
    InvalidCount { line: usize, field: Field, value: String },
    #[error("Line {line}: the {field} `{value}` is not a number")]
    InvalidAmount { line: usize, field: Field, value: String },
    #[error("Line {line}: {source}")]
    InvalidAccount {
        line: usize,
        #[source]
        source: ValidationError,
    },
}

/// Reads a ledger file line by line, keeping track of the line number
struct LineReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn read(&mut self, field: Field) -> Result<String, FormatError> {
        self.line += 1;
        let mut line = self.lines
            .next()
            .ok_or(FormatError::MissingLine { line: self.line, field })??;
        // `lines` only strips the `\n` of a `\r\n` line ending
        if line.ends_with('\r') {
            line.pop();
        }

        Ok(line)
    }

    fn count(&mut self, field: Field) -> Result<usize, FormatError> {
        let value = self.read(field)?;
        value
            .trim()
            .parse()
            .map_err(|_| FormatError::InvalidCount { line: self.line, field, value })
    }

    fn amount(&mut self, field: Field) -> Result<f64, FormatError> {
        let value = self.read(field)?;
        value
            .trim()
            .parse()
            .map_err(|_| FormatError::InvalidAmount { line: self.line, field, value })
    }

    fn invalid(&self, source: ValidationError) -> FormatError {
        FormatError::InvalidAccount { line: self.line, source }
    }

    fn account(&mut self) -> Result<Account, FormatError> {
        let code = self.read(Field::Code)?;
        let code_line = self.line;
        let owner_name = self.read(Field::OwnerName)?;
        let mut account = Account::new(code.trim(), owner_name)
            .map_err(|source| FormatError::InvalidAccount { line: code_line, source })?;

        for _ in 0..self.count(Field::DepositCount)? {
            let amount = self.amount(Field::Deposit)?;
            account.add_deposit(amount).map_err(|e| self.invalid(e))?;
        }
        for _ in 0..self.count(Field::WithdrawalCount)? {
            let amount = self.amount(Field::Withdrawal)?;
            account.add_withdrawal(amount).map_err(|e| self.invalid(e))?;
        }

        Ok(account)
    }
}

impl Ledger {
    /// Writes all accounts in the ledger file format
    ///
    /// The format holds one value per line:
    ///
    /// ```text
    /// <account count>
    /// <code>
    /// <owner name>
    /// <deposit count>
    /// <deposit>...
    /// <withdrawal count>
    /// <withdrawal>...
    /// ```
    ///
    /// where everything from the code on is repeated for every account.
    /// Amounts are written in their shortest exact decimal form.
    pub fn serialize<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{}", self.len())?;
        for account in self {
            writeln!(writer, "{}", account.code())?;
            writeln!(writer, "{}", account.owner_name())?;
            writeln!(writer, "{}", account.deposit_count())?;
            for amount in account.deposits() {
                writeln!(writer, "{}", amount)?;
            }
            writeln!(writer, "{}", account.withdrawal_count())?;
            for amount in account.withdrawals() {
                writeln!(writer, "{}", amount)?;
            }
        }

        writer.flush()
    }

    /// Reads a ledger written by [`Ledger::serialize`]
    ///
    /// Either the whole ledger is read, or an error is returned. Every account
    /// is checked with the same rules as accounts created by hand.
    pub fn deserialize<R: BufRead>(reader: R) -> Result<Ledger, FormatError> {
        let mut lines = LineReader::new(reader);
        let count = lines.count(Field::AccountCount)?;

        // the count is untrusted, so it doesn't size any allocation
        let mut ledger = Ledger::new();
        for _ in 0..count {
            ledger.append(lines.account()?);
        }

        Ok(ledger)
    }

    /// Loads a ledger file
    ///
    /// A file that does not exist is treated as an empty ledger.
    pub fn load(path: impl AsRef<Path>) -> Result<Ledger, FormatError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no ledger file, starting empty");
                return Ok(Ledger::new());
            }
            Err(e) => return Err(e.into()),
        };

        let ledger = Ledger::deserialize(BufReader::new(file))?;
        tracing::info!(path = %path.display(), accounts = ledger.len(), "ledger loaded");

        Ok(ledger)
    }

    /// Writes the ledger to a file, replacing its previous content
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        self.serialize(BufWriter::new(File::create(path)?))?;
        tracing::info!(path = %path.display(), accounts = self.len(), "ledger saved");

        Ok(())
    }
}
