//! Bearer credentials from the environment-provided JSON blob.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;

/// Environment variable holding the credential blob.
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS";

#[derive(Deserialize)]
struct CredentialsBlob {
    #[serde(default, alias = "token")]
    access_token: Option<String>,
}

/// A ready-to-use bearer token. Token minting happens outside this tool
/// (e.g. `gcloud auth print-access-token`); we only carry the result.
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Load from the environment. A missing variable, unparseable blob, or
    /// blank token is a fatal startup error.
    pub fn from_env() -> Result<Self> {
        let raw = env::var(CREDENTIALS_ENV)
            .map_err(|_| anyhow!("{CREDENTIALS_ENV} environment variable is not set"))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let blob: CredentialsBlob = serde_json::from_str(raw)
            .with_context(|| format!("parse {CREDENTIALS_ENV} JSON"))?;
        let token = blob
            .access_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| anyhow!("{CREDENTIALS_ENV} has no access_token"))?;
        Ok(Self { token })
    }

    pub fn bearer(&self) -> &str {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_access_token() {
        let creds = Credentials::from_json(r#"{"access_token": "ya29.abc"}"#).unwrap();
        assert_eq!(creds.bearer(), "ya29.abc");
    }

    #[test]
    fn token_alias_is_accepted() {
        let creds = Credentials::from_json(r#"{"token": " ya29.abc "}"#).unwrap();
        assert_eq!(creds.bearer(), "ya29.abc");
    }

    #[test]
    fn blank_or_missing_token_is_rejected() {
        assert!(Credentials::from_json(r#"{"access_token": "  "}"#).is_err());
        assert!(Credentials::from_json(r#"{}"#).is_err());
        assert!(Credentials::from_json("not json").is_err());
    }
}
