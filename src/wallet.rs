//! The signing capability the login sequence delegates to.
//!
//! In a browser this is the injected EIP-1193 provider; natively it is any
//! type implementing [`Wallet`]. A local private key signer is provided.

use alloy::primitives::{Address, hex};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait Wallet: Send + Sync {
    /// Asks the wallet to expose its accounts; may prompt the operator.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Address of the account that will sign.
    async fn address(&self) -> Result<Address>;

    /// EIP-191 `personal_sign` over `message`, as a `0x`-prefixed hex string.
    async fn sign_message(&self, message: &str) -> Result<String>;
}

#[async_trait]
impl Wallet for PrivateKeySigner {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![alloy::signers::Signer::address(self)])
    }

    async fn address(&self) -> Result<Address> {
        Ok(alloy::signers::Signer::address(self))
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = alloy::signers::Signer::sign_message(self, message.as_bytes()).await?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }
}
