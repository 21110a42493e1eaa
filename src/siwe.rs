//! EIP-4361 "Sign-In with Ethereum" message text.
//!
//! Only the subset the auth service accepts is produced: no expiration, no
//! resources, version fixed at `1`.

use std::fmt;

use bon::Builder;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Error;
use crate::{ChainId, Result};

pub const VERSION: &str = "1";

#[non_exhaustive]
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
#[builder(on(String, into))]
pub struct SiweMessage {
    pub domain: String,
    pub address: String,
    pub statement: String,
    pub uri: String,
    pub chain_id: ChainId,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
}

impl SiweMessage {
    /// Rejects any empty field; the auth service refuses such messages and
    /// the wallet would otherwise prompt for a signature over garbage.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("domain", &self.domain),
            ("address", &self.address),
            ("statement", &self.statement),
            ("uri", &self.uri),
            ("nonce", &self.nonce),
        ] {
            if value.trim().is_empty() {
                return Err(Error::precondition(format!(
                    "SIWE {name} must not be empty"
                )));
            }
        }
        if self.statement.contains('\n') {
            return Err(Error::precondition(
                "SIWE statement must be a single line",
            ));
        }

        Ok(())
    }

    /// `2024-01-01T00:00:00.000Z`
    #[must_use]
    pub fn issued_at_rfc3339(&self) -> String {
        self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The exact text to sign and to submit to the challenge endpoint.
    #[must_use]
    pub fn prepare(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SiweMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{domain} wants you to sign in with your Ethereum account:\n\
             {address}\n\
             \n\
             {statement}\n\
             \n\
             URI: {uri}\n\
             Version: {VERSION}\n\
             Chain ID: {chain_id}\n\
             Nonce: {nonce}\n\
             Issued At: {issued_at}",
            domain = self.domain,
            address = self.address,
            statement = self.statement,
            uri = self.uri,
            chain_id = self.chain_id,
            nonce = self.nonce,
            issued_at = self.issued_at_rfc3339(),
        )
    }
}
