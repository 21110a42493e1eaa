//! Ordered candidate field names for values the upstreams report under
//! several spellings.
//!
//! Each [`FieldRule`] is evaluated front to back; the first candidate that
//! holds a usable value wins. Empty strings are never usable.

use serde_json::Value;

use crate::Result;
use crate::error::Error;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
}

pub const ACCESS_TOKEN: FieldRule =
    FieldRule::new("access token", &["accessToken", "token", "bearerToken"]);
pub const APP_SCOPED_TOKEN: FieldRule =
    FieldRule::new("app-scoped token", &["token", "accessToken", "appScopedToken"]);
pub const EPHEMERAL_TOKEN: FieldRule =
    FieldRule::new("ephemeral token", &["ephemeralToken", "token"]);
pub const EPHEMERAL_EXPIRY: FieldRule =
    FieldRule::new("ephemeral expiry", &["expiresAt", "expiry", "expires_at"]);
pub const PUBLIC_KEY: FieldRule = FieldRule::new("public key", &["publicKey", "key"]);
pub const CARD_ID: FieldRule = FieldRule::new("card id", &["id", "cardId"]);
pub const CARD_TOKEN: FieldRule = FieldRule::new("card token", &["cardToken", "token"]);
pub const CARD_LIST: FieldRule = FieldRule::new("card list", &["items", "data"]);
pub const PAGE_ITEMS: FieldRule = FieldRule::new("page items", &["items", "transactions", "data"]);
pub const NEXT_PAGE: FieldRule = FieldRule::new("next page", &["nextPath", "next_path"]);

impl FieldRule {
    #[must_use]
    pub const fn new(name: &'static str, candidates: &'static [&'static str]) -> Self {
        Self { name, candidates }
    }

    /// First candidate holding a non-empty string.
    #[must_use]
    pub fn first_str<'value>(&self, value: &'value Value) -> Option<&'value str> {
        self.candidates
            .iter()
            .filter_map(|key| value.get(*key)?.as_str())
            .find(|s| !s.is_empty())
    }

    /// First candidate holding a non-empty string or a number, rendered as text.
    #[must_use]
    pub fn first_scalar(&self, value: &Value) -> Option<String> {
        self.candidates
            .iter()
            .find_map(|key| match value.get(*key)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// First candidate holding an array, even an empty one.
    #[must_use]
    pub fn first_array<'value>(&self, value: &'value Value) -> Option<&'value Vec<Value>> {
        self.candidates
            .iter()
            .find_map(|key| value.get(*key)?.as_array())
    }

    pub fn require_str(&self, value: &Value) -> Result<String> {
        self.first_str(value)
            .map(str::to_owned)
            .ok_or_else(|| self.missing())
    }

    fn missing(&self) -> Error {
        Error::missing_field(format!(
            "response carries no {} (looked for {})",
            self.name,
            self.candidates.join(", ")
        ))
    }
}

/// A list that is either the payload itself or nested under one of `rule`'s
/// candidates.
#[must_use]
pub fn list<'value>(value: &'value Value, rule: &FieldRule) -> Option<&'value Vec<Value>> {
    value.as_array().or_else(|| rule.first_array(value))
}
