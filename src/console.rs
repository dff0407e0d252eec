use std::io::{self, BufRead, Write};
use std::ops::{ControlFlow, RangeInclusive};
use std::path::Path;

use crate::{Account, Config, Ledger};

const RULE_WIDTH: usize = 65;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// The actions offered by the main menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    AddAccount,
    AddDeposit,
    AddWithdrawal,
    ShowAll,
    ShowAccount,
    Export,
    MultipleOwners,
    Differences,
    SaveEqualFlows,
    Exit,
}

impl Action {
    /// All actions in menu order, `Exit` is listed last but selected with `0`
    const MENU: [Action; 10] = [
        Action::AddAccount,
        Action::AddDeposit,
        Action::AddWithdrawal,
        Action::ShowAll,
        Action::ShowAccount,
        Action::Export,
        Action::MultipleOwners,
        Action::Differences,
        Action::SaveEqualFlows,
        Action::Exit,
    ];

    fn from_choice(choice: usize) -> Option<Action> {
        match choice {
            0 => Some(Action::Exit),
            n => Self::MENU.get(n - 1).copied().filter(|&action| action != Action::Exit),
        }
    }

    fn choice(self) -> usize {
        match self {
            Action::Exit => 0,
            action => Self::MENU.iter().position(|&a| a == action).map_or(0, |i| i + 1),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Action::AddAccount => "Add Bank Account",
            Action::AddDeposit => "Add Deposit to Account",
            Action::AddWithdrawal => "Add Withdrawal from Account",
            Action::ShowAll => "Display All Accounts",
            Action::ShowAccount => "Display Account Details",
            Action::Export => "Create Accounts File",
            Action::MultipleOwners => "Display Owners with Multiple Accounts",
            Action::Differences => "Display Deposit-Withdrawal Differences",
            Action::SaveEqualFlows => "Save Accounts with Equal Deposits and Withdrawals",
            Action::Exit => "Exit",
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum FlowKind {
    Deposit,
    Withdrawal,
}

/// An interactive menu session over a ledger
///
/// The session reads the operator's input line by line and writes every
/// screen to the output. Errors of single actions (invalid input, failed
/// exports) are reported to the operator and the session goes on; only
/// errors of the input or output themselves end it.
///
/// When the input ends, the session behaves as if exit was chosen.
pub struct Session<R, W> {
    ledger: Ledger,
    config: Config,
    input: R,
    output: W,
}

type Step = ControlFlow<()>;

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(ledger: Ledger, config: Config, input: R, output: W) -> Self {
        Self {
            ledger,
            config,
            input,
            output,
        }
    }

    /// Runs the menu loop until the operator exits
    ///
    /// The ledger is saved to the configured data file on exit and returned.
    pub fn run(mut self) -> io::Result<Ledger> {
        writeln!(self.output)?;
        self.rule('=')?;
        writeln!(self.output, "          Bank Accounts Management System        ")?;
        self.rule('=')?;

        loop {
            self.menu()?;
            let action = match self.read_number("Enter choice: ", 0..=9)? {
                Some(choice) => Action::from_choice(choice),
                None => Some(Action::Exit),
            };
            let step = match action {
                Some(action) => self.perform(action)?,
                None => {
                    writeln!(self.output, "Invalid option!")?;
                    Step::Continue(())
                }
            };

            if step.is_break() {
                break;
            }
        }

        self.exit()?;
        Ok(self.ledger)
    }

    fn menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        self.rule('=')?;
        writeln!(self.output, "                        MAIN MENU                 ")?;
        self.rule('=')?;
        for action in Action::MENU {
            writeln!(self.output, "{}. {}", action.choice(), action.label())?;
        }
        self.rule('=')
    }

    /// Performs one menu action, `Break` once the session should end
    fn perform(&mut self, action: Action) -> io::Result<Step> {
        if action == Action::Exit {
            return Ok(Step::Break(()));
        }

        if self.config.clear_screen {
            write!(self.output, "{}", CLEAR_SCREEN)?;
        }
        if action != Action::AddAccount && self.ledger.is_empty() {
            writeln!(self.output, "\n[ERROR] No accounts available! Add an account first.")?;
            return Ok(Step::Continue(()));
        }

        match action {
            Action::AddAccount => self.add_account(),
            Action::AddDeposit => self.add_flow(FlowKind::Deposit),
            Action::AddWithdrawal => self.add_flow(FlowKind::Withdrawal),
            Action::ShowAll => self.show_all(),
            Action::ShowAccount => self.show_account(),
            Action::Export => self.export(),
            Action::MultipleOwners => self.multiple_owners(),
            Action::Differences => self.differences(),
            Action::SaveEqualFlows => self.save_equal_flows(),
            Action::Exit => Ok(Step::Break(())),
        }
    }

    fn add_account(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\n=== ADD BANK ACCOUNT ===\n")?;

        let code = match self.prompt("Enter account code (letter + 5 digits, e.g. A12345): ")? {
            Some(code) => code,
            None => return Ok(Step::Break(())),
        };
        let owner_name = match self.prompt("Enter owner name: ")? {
            Some(owner_name) => owner_name,
            None => return Ok(Step::Break(())),
        };

        match Account::new(code.trim(), owner_name) {
            Ok(account) => {
                self.ledger.append(account);
                writeln!(self.output, "\n[OK] Account added successfully!")?;
            }
            Err(e) => self.report("Error adding account", &e)?,
        }

        Ok(Step::Continue(()))
    }

    fn add_flow(&mut self, kind: FlowKind) -> io::Result<Step> {
        let (title, prompt, noun) = match kind {
            FlowKind::Deposit => ("ADD DEPOSIT", "Enter deposit amount: ", "Deposit"),
            FlowKind::Withdrawal => ("ADD WITHDRAWAL", "Enter withdrawal amount: ", "Withdrawal"),
        };
        writeln!(self.output, "\n=== {} ===\n", title)?;

        let index = match self.select_account()? {
            Some(index) => index,
            None => return Ok(Step::Break(())),
        };
        let amount = match self.read_amount(prompt)? {
            Some(amount) => amount,
            None => return Ok(Step::Break(())),
        };

        let result = self.ledger
            .get_mut(index)
            .map(|account| match kind {
                FlowKind::Deposit => account.add_deposit(amount),
                FlowKind::Withdrawal => account.add_withdrawal(amount),
            });

        match result {
            Ok(Ok(())) => writeln!(self.output, "\n[OK] {} added successfully!", noun)?,
            Ok(Err(e)) => self.report(&format!("Error adding {}", noun.to_lowercase()), &e)?,
            Err(e) => self.report("Error selecting account", &e)?,
        }

        Ok(Step::Continue(()))
    }

    fn show_all(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\n=== ALL ACCOUNTS ===")?;
        for (i, account) in self.ledger.iter().enumerate() {
            write!(self.output, "\n[{}] {}", i + 1, account)?;
            writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        }

        Ok(Step::Continue(()))
    }

    fn show_account(&mut self) -> io::Result<Step> {
        let index = match self.select_account()? {
            Some(index) => index,
            None => return Ok(Step::Break(())),
        };

        match self.ledger.get(index) {
            Ok(account) => write!(self.output, "\n=== ACCOUNT DETAILS ===\n\n{}", account)?,
            Err(e) => self.report("Error selecting account", &e)?,
        }

        Ok(Step::Continue(()))
    }

    fn export(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\n=== CREATE ACCOUNTS FILE ===\n")?;

        let file_name = match self.prompt("Enter filename: ")? {
            Some(file_name) => file_name,
            None => return Ok(Step::Break(())),
        };
        let path = match file_name.trim() {
            "" => self.config.export_file.clone(),
            name => name.into(),
        };

        match self.ledger.save(&path) {
            Ok(()) => {
                writeln!(self.output, "\n[OK] File \"{}\" created successfully!", path.display())?;
                writeln!(self.output, "  Accounts count: {}", self.ledger.len())?;
            }
            Err(e) => self.report("Error creating file", &e)?,
        }

        Ok(Step::Continue(()))
    }

    fn multiple_owners(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\n=== OWNERS WITH MULTIPLE ACCOUNTS ===\n")?;

        let owners = self.ledger.owners_with_multiple_accounts();
        if owners.is_empty() {
            writeln!(self.output, "No owners with more than one account.")?;
            return Ok(Step::Continue(()));
        }

        writeln!(self.output, "Owners with more than one account (sorted alphabetically):\n")?;
        for (owner, count) in owners {
            writeln!(self.output, "  * {} - {} accounts", owner, count)?;
        }

        Ok(Step::Continue(()))
    }

    fn differences(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\n=== DEPOSIT-WITHDRAWAL DIFFERENCES ===\n")?;
        writeln!(
            self.output,
            "{:<15}{:<25}{:<20}{:<20}{:<15}",
            "Code", "Owner", "Total Deposited", "Total Withdrawn", "Difference",
        )?;
        writeln!(self.output, "{}", "-".repeat(95))?;

        for account in &self.ledger {
            writeln!(
                self.output,
                "{:<15}{:<25}{:<20.2}{:<20.2}{:<15.2}",
                account.code(),
                account.owner_name(),
                account.total_deposited(),
                account.total_withdrawn(),
                account.balance(),
            )?;
        }

        Ok(Step::Continue(()))
    }

    fn save_equal_flows(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\n=== SAVE ACCOUNTS WITH EQUAL DEPOSITS AND WITHDRAWALS ===\n")?;

        let equal = self.ledger.equal_flow_accounts();
        if equal.is_empty() {
            writeln!(self.output, "No accounts with equal deposits and withdrawals.")?;
            return Ok(Step::Continue(()));
        }

        let path = self.config.equal_flows_file.clone();
        if let Err(e) = equal.save(&path) {
            self.report("Error creating file", &e)?;
            return Ok(Step::Continue(()));
        }

        writeln!(self.output, "[OK] File \"{}\" created successfully!", path.display())?;
        writeln!(self.output, "  Accounts count: {}\n", equal.len())?;
        writeln!(self.output, "Accounts with equal deposits and withdrawals:\n")?;
        for account in &equal {
            write!(self.output, "{}", account)?;
            writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        }

        Ok(Step::Continue(()))
    }

    fn exit(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nSaving data...")?;
        let path = self.config.data_file.clone();
        self.save(&path)?;
        writeln!(self.output, "Thank you for using the system!")
    }

    fn save(&mut self, path: &Path) -> io::Result<()> {
        match self.ledger.save(path) {
            Ok(()) => {
                writeln!(self.output, "\n[OK] Data saved successfully!")?;
                writeln!(self.output, "  Accounts count: {}", self.ledger.len())
            }
            Err(e) => self.report("Error saving", &e),
        }
    }

    /// Lists all accounts and asks for one, returning its position
    fn select_account(&mut self) -> io::Result<Option<usize>> {
        writeln!(self.output, "\nAvailable accounts:")?;
        self.rule('-')?;
        for (i, account) in self.ledger.iter().enumerate() {
            writeln!(self.output, "[{}] {} - {}", i + 1, account.code(), account.owner_name())?;
        }
        self.rule('-')?;

        let choice = self.read_number("Select account: ", 1..=self.ledger.len())?;
        Ok(choice.map(|n| n - 1))
    }

    fn read_number(&mut self, prompt: &str, range: RangeInclusive<usize>) -> io::Result<Option<usize>> {
        loop {
            let line = match self.prompt(prompt)? {
                Some(line) => line,
                None => return Ok(None),
            };

            match line.trim().parse::<usize>() {
                Ok(n) if range.contains(&n) => return Ok(Some(n)),
                Ok(_) => writeln!(
                    self.output,
                    "[ERROR] Number must be between {} and {}.",
                    range.start(),
                    range.end(),
                )?,
                Err(_) => writeln!(self.output, "[ERROR] Invalid input! Please enter a number.")?,
            }
        }
    }

    fn read_amount(&mut self, prompt: &str) -> io::Result<Option<f64>> {
        loop {
            let line = match self.prompt(prompt)? {
                Some(line) => line,
                None => return Ok(None),
            };

            match line.trim().parse::<f64>() {
                Ok(amount) if amount.is_finite() && amount >= 0.0 => return Ok(Some(amount)),
                Ok(amount) if amount.is_finite() => {
                    writeln!(self.output, "[ERROR] Number must be at least 0.")?
                }
                _ => writeln!(self.output, "[ERROR] Invalid input! Please enter a number.")?,
            }
        }
    }

    /// Asks for one line of input, `None` once the input has ended
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            tracing::debug!("input ended");
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        Ok(Some(line))
    }

    fn report(&mut self, context: &str, error: &dyn std::error::Error) -> io::Result<()> {
        tracing::warn!(error = %error, "{}", context);
        writeln!(self.output, "[ERROR] {}: {}", context, error)
    }

    fn rule(&mut self, c: char) -> io::Result<()> {
        writeln!(self.output, "{}", c.to_string().repeat(RULE_WIDTH))
    }
}
