use std::collections::BTreeMap;

use crate::Account;

/// Possible errors to occur when accessing the ledger
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("There is no account at position {index}, the ledger holds {len} accounts")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The ordered collection of all accounts of a session
///
/// Accounts are kept in insertion order, which is also the order they are
/// displayed and persisted in. Accounts are addressed by position, codes are
/// not required to be unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    accounts: Vec<Account>,
}

impl Ledger {
    /// Creates a new, empty ledger
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
        }
    }

    /// Adds an account to the end of the ledger
    pub fn append(&mut self, account: Account) {
        tracing::debug!(code = %account.code(), owner = %account.owner_name(), "account appended");
        self.accounts.push(account);
    }

    /// The account at the specified position
    pub fn get(&self, index: usize) -> Result<&Account, LedgerError> {
        let len = self.accounts.len();
        self.accounts
            .get(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })
    }

    /// The account at the specified position, for appending flows
    pub fn get_mut(&mut self, index: usize) -> Result<&mut Account, LedgerError> {
        let len = self.accounts.len();
        self.accounts
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Account> {
        self.accounts.iter()
    }

    /// Builds a new ledger from copies of all accounts matching the predicate
    ///
    /// The order of the accounts is preserved. Changes to the returned ledger
    /// don't affect this one and vice versa.
    pub fn filter<P>(&self, mut predicate: P) -> Ledger
        where P: FnMut(&Account) -> bool
    {
        Ledger {
            accounts: self.accounts
                .iter()
                .filter(|&account| predicate(account))
                .cloned()
                .collect(),
        }
    }

    /// Copies of all accounts whose deposits and withdrawals add up to the same total
    pub fn equal_flow_accounts(&self) -> Ledger {
        self.filter(Account::has_equal_flows)
    }

    /// The number of accounts held by each owner
    pub fn group_owners_by_count(&self) -> BTreeMap<String, usize> {
        let mut owners = BTreeMap::new();
        for account in &self.accounts {
            *owners.entry(account.owner_name().to_owned()).or_insert(0) += 1;
        }
        owners
    }

    /// All owners holding more than one account, sorted alphabetically
    pub fn owners_with_multiple_accounts(&self) -> Vec<(String, usize)> {
        self.group_owners_by_count()
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Account;
    type IntoIter = std::slice::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Account> for Ledger {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
        }
    }
}
