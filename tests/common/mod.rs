#![allow(dead_code, reason = "Not every test binary uses every helper")]

use std::str::FromStr as _;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use async_trait::async_trait;
use gnosis_pay_client::wallet::Wallet;
use gnosis_pay_client::{Client, ClientConfig, Result};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use url::Url;

// Already EIP-55 checksummed, so it round-trips through `Address` unchanged.
pub const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const SIGNATURE: &str = "0xsignature";
pub const APP_ID: &str = "app_test";

/// Wallet double that returns a fixed signature and remembers what it signed.
#[derive(Clone, Default)]
pub struct FixedWallet {
    pub signed: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Wallet for FixedWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![Address::from_str(ADDRESS).expect("valid address")])
    }

    async fn address(&self) -> Result<Address> {
        Ok(Address::from_str(ADDRESS).expect("valid address"))
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        self.signed
            .lock()
            .expect("lock poisoned")
            .push(message.to_owned());
        Ok(SIGNATURE.to_owned())
    }
}

/// Wallet double whose signer always fails.
#[derive(Clone, Default)]
pub struct RefusingWallet;

#[async_trait]
impl Wallet for RefusingWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![Address::from_str(ADDRESS).expect("valid address")])
    }

    async fn address(&self) -> Result<Address> {
        Ok(Address::from_str(ADDRESS).expect("valid address"))
    }

    async fn sign_message(&self, _message: &str) -> Result<String> {
        Err(alloy::signers::Error::other("user rejected the request").into())
    }
}

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base(Url::parse(&server.base_url()).expect("mock server URL"))
        .app_id(APP_ID.to_owned())
        .domain("something.com".to_owned())
        .statement("Sign in".to_owned())
        .build()
}

pub fn client(server: &MockServer) -> Client {
    Client::new(config(server)).expect("valid config")
}

pub fn client_with_wallet(server: &MockServer) -> (Client, FixedWallet) {
    let wallet = FixedWallet::default();
    (client(server).with_wallet(wallet.clone()), wallet)
}

pub const ACCESS_TOKEN: &str = "tok_1";

/// Runs the SIWE login against `server` and returns an authorized client.
pub async fn authorized_client(server: &MockServer) -> Client {
    authorized_client_with(server, config(server)).await
}

pub async fn authorized_client_with(server: &MockServer, config: ClientConfig) -> Client {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/auth/nonce");
            then.status(200).body("abc123");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/auth/challenge");
            then.status(200)
                .json_body(json!({ "accessToken": ACCESS_TOKEN }));
        })
        .await;

    let mut client = Client::new(config)
        .expect("valid config")
        .with_wallet(FixedWallet::default());
    client.connect().await.expect("connect");
    client.fetch_nonce().await.expect("nonce");
    client.sign_in().await.expect("sign in");
    client.authorize().await.expect("authorize");
    client
}
