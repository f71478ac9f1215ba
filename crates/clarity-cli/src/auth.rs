//! Keychain persistence for the per-profile bearer token.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

use clarity_core::auth::{AuthClient, TokenStore};
use clarity_core::config::ClientConfig;
use clarity_core::Error;
#[cfg(not(test))]
use keyring::Entry;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "clarity-cli";

#[derive(Debug, Clone)]
pub struct KeychainTokenStore {
    username: String,
}

impl KeychainTokenStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("auth_token:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> clarity_core::Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::Storage(error.to_string()))
    }
}

impl TokenStore for KeychainTokenStore {
    #[cfg(not(test))]
    fn load_token(&self) -> clarity_core::Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::Storage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_token(&self) -> clarity_core::Result<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(guard.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    fn save_token(&self, token: &str) -> clarity_core::Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(|error| Error::Storage(error.to_string()))
    }

    #[cfg(test)]
    fn save_token(&self, token: &str) -> clarity_core::Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        guard.insert(self.username.clone(), token.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_token(&self) -> clarity_core::Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::Storage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_token(&self) -> clarity_core::Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

pub fn auth_client(
    profile_name: &str,
    config: &ClientConfig,
) -> clarity_core::Result<AuthClient<KeychainTokenStore>> {
    AuthClient::new(config, KeychainTokenStore::new(profile_name))
}

pub fn load_stored_token(profile_name: &str) -> clarity_core::Result<Option<String>> {
    KeychainTokenStore::new(profile_name).load_token()
}
