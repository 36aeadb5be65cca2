//! Account records and the free-text listing parser.
//!
//! Admins paste one account per line. Depending on the service's account
//! type a line is either an opaque cookie blob or a delimited credentials
//! record (`user:pass` or `user|pass|expiry|additional`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// How a service's account lines are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Credentials,
    Cookies,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Credentials => "credentials",
            AccountType::Cookies => "cookies",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credentials" => Ok(AccountType::Credentials),
            "cookies" => Ok(AccountType::Cookies),
            other => Err(ModelError::Validation(format!("unknown account_type: {other}"))),
        }
    }
}

/// One stored account record. Serialized into the `service.accounts`
/// JSON column as a tagged object; absent credential fields are omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Account {
    Cookies {
        data: String,
    },
    Credentials {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pass: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiry: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional: Option<String>,
    },
}

/// Parse admin-submitted free text into account records, one per
/// non-empty trimmed line. Best effort; lines are never rejected.
pub fn parse_accounts(account_type: AccountType, text: &str) -> Vec<Account> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match account_type {
            AccountType::Cookies => Account::Cookies { data: line.to_string() },
            AccountType::Credentials => parse_credentials_line(line),
        })
        .collect()
}

/// `user:pass` when the line holds a colon and no pipe (split at the
/// first colon, both halves kept even when blank); otherwise up to four
/// pipe-separated fields with blank fields left absent.
fn parse_credentials_line(line: &str) -> Account {
    if line.contains(':') && !line.contains('|') {
        // contains(':') guarantees split_once succeeds
        let (user, pass) = line.split_once(':').unwrap_or((line, ""));
        return Account::Credentials {
            user: Some(user.trim().to_string()),
            pass: Some(pass.trim().to_string()),
            expiry: None,
            additional: None,
        };
    }

    let mut fields = line.split('|').map(|f| {
        let f = f.trim();
        if f.is_empty() { None } else { Some(f.to_string()) }
    });
    Account::Credentials {
        user: fields.next().flatten(),
        pass: fields.next().flatten(),
        expiry: fields.next().flatten(),
        additional: fields.next().flatten(),
    }
}
