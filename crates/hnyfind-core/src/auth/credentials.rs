use keyring::Entry;
use thiserror::Error;

const SERVICE_NAME: &str = "hnyfind";

/// Keychain account the API key is stored under
const ACCOUNT: &str = "honeycomb.io";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No API key stored - run with --set <KEY> first")]
    Missing,

    #[error("API key must not be empty")]
    Empty,

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Where the Honeycomb API key lives between invocations.
pub trait CredentialStore {
    fn get(&self) -> Result<String, CredentialError>;
    fn set(&self, api_key: &str) -> Result<(), CredentialError>;
}

/// API key storage in the OS keychain
pub struct KeyringCredentials {
    service: String,
    account: String,
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            account: ACCOUNT.to_string(),
        }
    }
}

impl KeyringCredentials {
    fn entry(&self) -> Result<Entry, CredentialError> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl CredentialStore for KeyringCredentials {
    /// Retrieve the API key from the OS keychain
    fn get(&self) -> Result<String, CredentialError> {
        match self.entry()?.get_password() {
            Ok(key) => Ok(key),
            Err(keyring::Error::NoEntry) => Err(CredentialError::Missing),
            Err(e) => Err(e.into()),
        }
    }

    /// Store the API key in the OS keychain, replacing any previous key
    fn set(&self, api_key: &str) -> Result<(), CredentialError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CredentialError::Empty);
        }
        self.entry()?.set_password(api_key)?;
        Ok(())
    }
}
