//! Credential storage for the Honeycomb API key.
//!
//! `CredentialStore` is the seam the workflow depends on;
//! `KeyringCredentials` backs it with the OS keychain via `keyring`.

pub mod credentials;

pub use credentials::{CredentialError, CredentialStore, KeyringCredentials};
