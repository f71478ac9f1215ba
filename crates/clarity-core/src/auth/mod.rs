//! Account signup/login against the `/user` endpoint and bearer token storage.

mod password;

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use regex::Regex;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

pub use password::PasswordStrength;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::util::{compact_text, normalize_text_option};

/// Payload of `POST /user`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: String,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignUpRequest {
    /// Trimmed copy, rejecting missing fields and malformed emails.
    pub fn validated(&self) -> Result<Self> {
        let email = required(&self.email, "Email")?;
        if !is_valid_email(&email) {
            return Err(Error::InvalidInput(format!(
                "'{email}' is not a valid email address"
            )));
        }
        if self.password.trim().is_empty() {
            return Err(Error::InvalidInput("Password is required".to_string()));
        }
        Ok(Self {
            email,
            username: required(&self.username, "Username")?,
            name: required(&self.name, "Name")?,
            password: self.password.clone(),
        })
    }
}

/// Payload of `PATCH /user`; `identifier` is a username or an email.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginCredentials {
    pub fn validated(&self) -> Result<Self> {
        if self.password.trim().is_empty() {
            return Err(Error::InvalidInput("Password is required".to_string()));
        }
        Ok(Self {
            identifier: required(&self.identifier, "Username or email")?,
            password: self.password.clone(),
        })
    }
}

/// Body returned by both `/user` endpoints.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthResponse")
            .field("message", &self.message)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Durable storage for the bearer token.
pub trait TokenStore: Clone + Send + Sync + 'static {
    fn load_token(&self) -> Result<Option<String>>;
    fn save_token(&self, token: &str) -> Result<()>;
    fn clear_token(&self) -> Result<()>;
}

/// Token store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
}

impl TokenStore for MemoryTokenStore {
    fn load_token(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_token(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// HTTP client for account creation and login.
#[derive(Clone)]
pub struct AuthClient<S: TokenStore> {
    base_url: String,
    client: Client,
    store: S,
}

impl<S: TokenStore> AuthClient<S> {
    pub fn new(config: &ClientConfig, store: S) -> Result<Self> {
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client: Client::builder().timeout(config.request_timeout).build()?,
            store,
        })
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse> {
        let request = request.validated()?;
        let builder = self
            .client
            .post(format!("{}/user", self.base_url))
            .json(&request);
        self.send_auth_request(builder, "Failed to create account")
            .await
    }

    /// Log in and persist the returned token.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let credentials = credentials.validated()?;
        let builder = self
            .client
            .patch(format!("{}/user", self.base_url))
            .json(&credentials);
        let response = self.send_auth_request(builder, "Invalid credentials").await?;

        let token = normalize_text_option(response.token.clone()).ok_or_else(|| {
            Error::Api("Login response did not include a token".to_string())
        })?;
        self.store.save_token(&token)?;
        tracing::info!("Signed in as {}", credentials.identifier);
        Ok(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear_token()
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(normalize_text_option(self.store.load_token()?))
    }

    async fn send_auth_request(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<AuthResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<AuthResponse>(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|payload| normalize_text_option(payload.message))
                .map_or_else(
                    || format!("{fallback} (HTTP {})", status.as_u16()),
                    |message| compact_text(&message),
                );
            return Err(Error::Api(message));
        }
        Ok(parsed.unwrap_or_default())
    }
}

fn required(value: &str, field: &str) -> Result<String> {
    normalize_text_option(Some(value.to_string()))
        .ok_or_else(|| Error::InvalidInput(format!("{field} is required")))
}

/// Loose `local@domain.tld` shape check.
pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
        .is_match(value.trim())
}
