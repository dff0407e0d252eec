use std::fmt;

/// The currency every monetary value is displayed in
pub const CURRENCY: &str = "BGN";

const CODE_LEN: usize = 6;

/// Possible errors to occur when creating or modifying an account
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("The account code must be exactly 6 characters (letter + 5 digits), got {0} characters")]
    CodeLength(usize),
    #[error("The first character of the account code must be a letter")]
    CodeFirstCharacter,
    #[error("The last 5 characters of the account code must be digits")]
    CodeDigits,
    #[error("The owner name cannot be empty")]
    EmptyOwnerName,
    #[error("The deposit amount cannot be negative")]
    NegativeDeposit,
    #[error("The withdrawal amount cannot be negative")]
    NegativeWithdrawal,
    #[error("The amount `{0}` is not a finite number")]
    NonFiniteAmount(f64),
}

/// A bank account record
///
/// An account is identified by its code and owner and keeps the full history
/// of its flows:
/// 1. Deposits:
///    Every amount ever paid into the account, in the order it was added.
/// 2. Withdrawals:
///    Every amount ever taken out of the account, in the order it was added.
///
/// Flows are only ever appended. Totals and the balance are computed from the
/// history on every read.
///
/// Cloning an account yields an independent copy with its own histories.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    code: String,
    owner_name: String,
    deposits: Vec<f64>,
    withdrawals: Vec<f64>,
}

impl Account {
    /// Creates a new account without any flows
    ///
    /// The code has to consist of a letter followed by 5 digits (e.g. `A12345`),
    /// and the owner name must not be empty.
    pub fn new(code: impl Into<String>, owner_name: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let owner_name = owner_name.into();
        validate_code(&code)?;
        validate_owner_name(&owner_name)?;

        Ok(Self {
            code,
            owner_name,
            deposits: Vec::new(),
            withdrawals: Vec::new(),
        })
    }

    /// The business identifier of the account
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The name of the account owner
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// All deposited amounts, oldest first
    pub fn deposits(&self) -> &[f64] {
        &self.deposits
    }

    /// All withdrawn amounts, oldest first
    pub fn withdrawals(&self) -> &[f64] {
        &self.withdrawals
    }

    pub fn deposit_count(&self) -> usize {
        self.deposits.len()
    }

    pub fn withdrawal_count(&self) -> usize {
        self.withdrawals.len()
    }

    /// Replaces the account code
    ///
    /// The old code is kept if the new one is invalid.
    pub fn set_code(&mut self, code: impl Into<String>) -> Result<(), ValidationError> {
        let code = code.into();
        validate_code(&code)?;
        self.code = code;

        Ok(())
    }

    /// Replaces the owner name
    ///
    /// The old name is kept if the new one is empty.
    pub fn set_owner_name(&mut self, owner_name: impl Into<String>) -> Result<(), ValidationError> {
        let owner_name = owner_name.into();
        validate_owner_name(&owner_name)?;
        self.owner_name = owner_name;

        Ok(())
    }

    /// Appends a deposit to the account history
    pub fn add_deposit(&mut self, amount: f64) -> Result<(), ValidationError> {
        check_amount(amount, ValidationError::NegativeDeposit)?;
        self.deposits.push(amount);
        tracing::debug!(code = %self.code, amount, "deposit added");

        Ok(())
    }

    /// Appends a withdrawal to the account history
    ///
    /// Withdrawals are not checked against the balance, an account may be
    /// overdrawn.
    pub fn add_withdrawal(&mut self, amount: f64) -> Result<(), ValidationError> {
        check_amount(amount, ValidationError::NegativeWithdrawal)?;
        self.withdrawals.push(amount);
        tracing::debug!(code = %self.code, amount, "withdrawal added");

        Ok(())
    }

    /// The sum of all deposits
    pub fn total_deposited(&self) -> f64 {
        sum(&self.deposits)
    }

    /// The sum of all withdrawals
    pub fn total_withdrawn(&self) -> f64 {
        sum(&self.withdrawals)
    }

    /// The difference between the deposited and the withdrawn total
    pub fn balance(&self) -> f64 {
        self.total_deposited() - self.total_withdrawn()
    }

    /// Whether the deposited total is exactly equal to the withdrawn total
    ///
    /// ### Important
    /// The totals are compared without any tolerance, so amounts that only add
    /// up on paper (like `0.1 + 0.2` against `0.3`) are not considered equal.
    pub fn has_equal_flows(&self) -> bool {
        self.total_deposited() == self.total_withdrawn()
    }
}

// summed left to right from positive zero, so an empty history totals `0.0`
fn sum(amounts: &[f64]) -> f64 {
    amounts.iter().fold(0.0, |total, amount| total + amount)
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    let len = code.chars().count();
    if len != CODE_LEN {
        return Err(ValidationError::CodeLength(len));
    }

    let mut chars = code.chars();
    if !chars.next().map_or(false, |c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::CodeFirstCharacter);
    }
    if !chars.all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::CodeDigits);
    }

    Ok(())
}

fn validate_owner_name(owner_name: &str) -> Result<(), ValidationError> {
    match owner_name.is_empty() {
        false => Ok(()),
        true => Err(ValidationError::EmptyOwnerName),
    }
}

fn check_amount(amount: f64, negative: ValidationError) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NonFiniteAmount(amount));
    }
    if amount < 0.0 {
        return Err(negative);
    }

    Ok(())
}

struct Amounts<'a>(&'a [f64]);

impl fmt::Display for Amounts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }

        for (i, amount) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:.2}", amount)?;
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account Code: {}", self.code)?;
        writeln!(f, "Owner: {}", self.owner_name)?;
        writeln!(f, "Deposits Count: {}", self.deposit_count())?;
        writeln!(f, "Withdrawals Count: {}", self.withdrawal_count())?;
        writeln!(f, "Deposits: {}", Amounts(&self.deposits))?;
        writeln!(f, "Withdrawals: {}", Amounts(&self.withdrawals))?;
        writeln!(f, "Total Deposited: {:.2} {}", self.total_deposited(), CURRENCY)?;
        writeln!(f, "Total Withdrawn: {:.2} {}", self.total_withdrawn(), CURRENCY)?;
        writeln!(f, "Balance: {:.2} {}", self.balance(), CURRENCY)
    }
}

impl serde::Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        use serde::ser::SerializeStruct;
        let mut map = serializer.serialize_struct("Account", 7)?;

        map.serialize_field("code", &self.code)?;
        map.serialize_field("owner", &self.owner_name)?;
        map.serialize_field("deposits", &self.deposit_count())?;
        map.serialize_field("withdrawals", &self.withdrawal_count())?;
        map.serialize_field("total_deposited", &self.total_deposited())?;
        map.serialize_field("total_withdrawn", &self.total_withdrawn())?;
        map.serialize_field("balance", &self.balance())?;

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn account(deposits: &[f64], withdrawals: &[f64]) -> Account {
        let mut account = Account::new("A12345", "Alice").unwrap();
        for &amount in deposits {
            account.add_deposit(amount).unwrap();
        }
        for &amount in withdrawals {
            account.add_withdrawal(amount).unwrap();
        }
        account
    }

    #[test]
    fn new_account_echoes_code_and_owner() {
        let account = Account::new("z00042", "Bob Builder").unwrap();
        assert_eq!(account.code(), "z00042");
        assert_eq!(account.owner_name(), "Bob Builder");
        assert_eq!(account.deposit_count(), 0);
        assert_eq!(account.withdrawal_count(), 0);
        assert_eq!(account.balance(), 0.0);
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert_eq!(Account::new("", "Alice"), Err(ValidationError::CodeLength(0)));
        assert_eq!(Account::new("A1234", "Alice"), Err(ValidationError::CodeLength(5)));
        assert_eq!(Account::new("A123456", "Alice"), Err(ValidationError::CodeLength(7)));
        assert_eq!(Account::new("112345", "Alice"), Err(ValidationError::CodeFirstCharacter));
        assert_eq!(Account::new("_12345", "Alice"), Err(ValidationError::CodeFirstCharacter));
        assert_eq!(Account::new("Ä12345", "Alice"), Err(ValidationError::CodeFirstCharacter));
        assert_eq!(Account::new("A1234x", "Alice"), Err(ValidationError::CodeDigits));
        assert_eq!(Account::new("AB2345", "Alice"), Err(ValidationError::CodeDigits));
        assert_eq!(Account::new("A 2345", "Alice"), Err(ValidationError::CodeDigits));
    }

    #[test]
    fn empty_owner_is_rejected() {
        assert_eq!(Account::new("A12345", ""), Err(ValidationError::EmptyOwnerName));
    }

    #[test]
    fn setters_keep_old_value_on_failure() {
        let mut account = Account::new("A12345", "Alice").unwrap();

        assert_eq!(account.set_code("12345A"), Err(ValidationError::CodeFirstCharacter));
        assert_eq!(account.set_owner_name(""), Err(ValidationError::EmptyOwnerName));
        assert_eq!(account.code(), "A12345");
        assert_eq!(account.owner_name(), "Alice");

        account.set_code("B54321").unwrap();
        account.set_owner_name("Bob").unwrap();
        assert_eq!(account.code(), "B54321");
        assert_eq!(account.owner_name(), "Bob");
    }

    #[test]
    fn negative_amounts_leave_history_unchanged() {
        let mut account = account(&[10.0], &[4.0]);

        assert_eq!(account.add_deposit(-0.01), Err(ValidationError::NegativeDeposit));
        assert_eq!(account.add_withdrawal(-1.0), Err(ValidationError::NegativeWithdrawal));
        assert_eq!(account.deposits(), &[10.0]);
        assert_eq!(account.withdrawals(), &[4.0]);
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        let mut account = account(&[], &[]);

        assert!(matches!(account.add_deposit(f64::NAN), Err(ValidationError::NonFiniteAmount(_))));
        assert_eq!(
            account.add_withdrawal(f64::INFINITY),
            Err(ValidationError::NonFiniteAmount(f64::INFINITY)),
        );
        assert_eq!(account.deposit_count(), 0);
        assert_eq!(account.withdrawal_count(), 0);
    }

    #[test]
    fn zero_amounts_are_accepted() {
        let account = account(&[0.0], &[0.0]);
        assert_eq!(account.deposit_count(), 1);
        assert_eq!(account.withdrawal_count(), 1);
        assert!(account.has_equal_flows());
    }

    #[test]
    fn equal_flows() {
        let account = account(&[10.0, 5.0], &[15.0]);
        assert!(account.has_equal_flows());
        assert_eq!(account.balance(), 0.0);
    }

    #[test]
    fn unequal_flows() {
        let account = account(&[10.0], &[5.0]);
        assert!(!account.has_equal_flows());
        assert_eq!(account.balance(), 5.0);
    }

    #[test]
    fn equal_flows_has_no_tolerance() {
        let account = account(&[0.1, 0.2], &[0.3]);
        assert!(!account.has_equal_flows());
    }

    #[test]
    fn overdrawn_account_has_negative_balance() {
        let account = account(&[20.0], &[50.0]);
        assert_eq!(account.balance(), -30.0);
    }

    #[test]
    fn clone_is_independent() {
        let original = account(&[1.0], &[]);
        let mut copy = original.clone();
        copy.add_deposit(2.0).unwrap();
        copy.set_owner_name("Mallory").unwrap();

        assert_eq!(original.deposits(), &[1.0]);
        assert_eq!(original.owner_name(), "Alice");
        assert_eq!(copy.deposits(), &[1.0, 2.0]);
    }

    #[test]
    fn display_statement() {
        let account = account(&[100.0, 20.5], &[]);
        assert_eq!(
            account.to_string(),
            "Account Code: A12345\n\
             Owner: Alice\n\
             Deposits Count: 2\n\
             Withdrawals Count: 0\n\
             Deposits: 100.00, 20.50\n\
             Withdrawals: none\n\
             Total Deposited: 120.50 BGN\n\
             Total Withdrawn: 0.00 BGN\n\
             Balance: 120.50 BGN\n",
        );
    }

    proptest! {
        #[test]
        fn valid_codes_construct(code in "[A-Za-z][0-9]{5}", owner in ".+") {
            let account = Account::new(code.clone(), owner.clone()).unwrap();
            prop_assert_eq!(account.code(), code.as_str());
            prop_assert_eq!(account.owner_name(), owner.as_str());
        }

        #[test]
        fn totals_are_in_order_sums(
            deposits in prop::collection::vec(0.0f64..1_000_000.0, 0..20),
            withdrawals in prop::collection::vec(0.0f64..1_000_000.0, 0..20),
        ) {
            let account = account(&deposits, &withdrawals);

            let deposited = deposits.iter().fold(0.0, |total, amount| total + amount);
            let withdrawn = withdrawals.iter().fold(0.0, |total, amount| total + amount);
            prop_assert_eq!(account.total_deposited(), deposited);
            prop_assert_eq!(account.total_withdrawn(), withdrawn);
            prop_assert_eq!(account.balance(), deposited - withdrawn);
            prop_assert_eq!(account.has_equal_flows(), deposited == withdrawn);
        }
    }
}
