use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_core::{AccountId, Entity, MarketError, MarketResult};

use crate::session::Session;

/// Registration input from the storefront's sign-up form.
///
/// The clearance and government-id fields hold attachment references
/// (filenames); registration only checks that both were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub address: String,
    pub email: String,
    pub password: String,
    pub barangay_clearance: Option<String>,
    pub government_id: Option<String>,
}

/// A registered shopper.
///
/// Passwords are stored in plain text; this directory backs a demo login
/// flow only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    account_id: AccountId,
    name: String,
    address: String,
    email: String,
    password: String,
    registered_at: DateTime<Utc>,
}

impl Account {
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Open a session for this account.
    pub fn open_session(&self, signed_in_at: DateTime<Utc>) -> Session {
        Session {
            account_id: self.account_id,
            email: self.email.clone(),
            display_name: self.name.clone(),
            signed_in_at,
        }
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.account_id
    }
}

/// Registry of shopper accounts, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.email == email)
    }

    /// Register a new shopper.
    ///
    /// Requires both verification attachments and non-blank credentials;
    /// emails are unique across the directory.
    pub fn register(
        &mut self,
        form: RegistrationForm,
        account_id: AccountId,
        registered_at: DateTime<Utc>,
    ) -> MarketResult<&Account> {
        if form.barangay_clearance.is_none() || form.government_id.is_none() {
            return Err(MarketError::validation(
                "barangay clearance and government id are required",
            ));
        }
        if form.email.trim().is_empty() || form.password.trim().is_empty() {
            return Err(MarketError::validation("missing credentials"));
        }
        if self.find_by_email(&form.email).is_some() {
            return Err(MarketError::conflict("email already registered"));
        }

        let slot = self.accounts.len();
        self.accounts.push(Account {
            account_id,
            name: form.name,
            address: form.address,
            email: form.email,
            password: form.password,
            registered_at,
        });
        Ok(&self.accounts[slot])
    }

    /// Match an email/password pair to an account and open a session.
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
        signed_in_at: DateTime<Utc>,
    ) -> MarketResult<Session> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or(MarketError::InvalidCredentials)?;
        Ok(account.open_session(signed_in_at))
    }
}
