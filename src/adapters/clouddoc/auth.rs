//! OAuth2 sessions for the Google Docs destination
//!
//! [`OAuthSessionProvider`] reads the cached token from a [`TokenStore`] and
//! refreshes it with the refresh token when it is about to expire. The
//! interactive consent flow that fills the store lives in
//! [`super::login`].

use super::token_store::{expires_within_margin, StoredToken, TokenStore};
use crate::config::{secret_string, SecretString};
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Token store key for this destination
pub const TOKEN_KEY: &str = "clouddoc";

/// Scopes requested during login
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive",
];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Authenticated session used for API calls
#[derive(Debug, Clone)]
pub struct Session {
    access_token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session that never expires
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: secret_string(access_token.into()),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret().as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Uses the same refresh margin as the token store
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expires_within_margin(self.expires_at, now)
    }
}

/// Source of API sessions
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Md2NoteError::Authentication`] when no usable token exists
    /// and [`Md2NoteError::TransientNetwork`] when a refresh could not reach
    /// the token endpoint.
    async fn session(&self) -> Result<Session>;
}

/// OAuth client registration read from `credentials.json`
#[derive(Debug, Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecretsSection>,
    web: Option<ClientSecretsSection>,
}

#[derive(Deserialize)]
struct ClientSecretsSection {
    client_id: String,
    #[serde(default)]
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Loads a Google-style client secrets file (`installed` or `web`)
    ///
    /// # Errors
    ///
    /// Returns [`Md2NoteError::Authentication`] when the file is missing or
    /// has neither section.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Md2NoteError::Authentication(format!(
                "Cannot read OAuth client secrets {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&content).map_err(|e| match e {
            Md2NoteError::Authentication(msg) => {
                Md2NoteError::Authentication(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// # Errors
    ///
    /// Returns [`Md2NoteError::Authentication`] for malformed content.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)
            .map_err(|e| Md2NoteError::Authentication(format!("Invalid client secrets: {e}")))?;
        let section = file.installed.or(file.web).ok_or_else(|| {
            Md2NoteError::Authentication(
                "Client secrets must contain an 'installed' or 'web' section".to_string(),
            )
        })?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: secret_string(section.client_secret),
            auth_uri: section
                .auth_uri
                .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: section
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Converts to a stored token, keeping `previous_refresh` when the
    /// response carries no refresh token
    pub(crate) fn into_stored(self, previous_refresh: Option<&str>) -> StoredToken {
        let expires_at = self
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        let mut token = StoredToken::new(self.access_token, expires_at);
        token.scope = self.scope;
        if let Some(refresh) = self
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))
        {
            token = token.with_refresh_token(refresh);
        }
        token
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

/// Posts a form to the token endpoint and parses the response
///
/// 400 and 401 answers mean the grant was rejected.
pub(crate) async fn request_token<T: Serialize + ?Sized>(
    http: &reqwest::Client,
    token_uri: &str,
    form: &T,
) -> Result<TokenResponse> {
    let response = http.post(token_uri).form(form).send().await.map_err(|e| {
        Md2NoteError::TransientNetwork(format!("Token request to {token_uri} failed: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match status.as_u16() {
            400 | 401 | 403 => Md2NoteError::Authentication(format!(
                "Token endpoint rejected the request ({status}): {body}"
            )),
            _ => Md2NoteError::TransientNetwork(format!(
                "Token endpoint returned {status}: {body}"
            )),
        });
    }

    response.json::<TokenResponse>().await.map_err(|e| {
        Md2NoteError::Authentication(format!("Invalid token endpoint response: {e}"))
    })
}

/// Session provider backed by a token store and the OAuth refresh grant
pub struct OAuthSessionProvider {
    store: Arc<dyn TokenStore>,
    credentials_path: PathBuf,
    http: reqwest::Client,
}

impl OAuthSessionProvider {
    pub fn new(
        store: Arc<dyn TokenStore>,
        credentials_path: impl Into<PathBuf>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            store,
            credentials_path: credentials_path.into(),
            http,
        }
    }

    async fn refresh(&self, token: &StoredToken) -> Result<StoredToken> {
        let refresh_token = token.refresh_token().ok_or_else(|| {
            Md2NoteError::Authentication(
                "Stored token has expired and has no refresh token; run `md2note login`"
                    .to_string(),
            )
        })?;
        let secrets = ClientSecrets::load(&self.credentials_path)?;

        tracing::debug!(token_uri = %secrets.token_uri, "Refreshing access token");

        let request = RefreshRequest {
            grant_type: "refresh_token",
            client_id: &secrets.client_id,
            client_secret: secrets.client_secret.expose_secret().as_ref(),
            refresh_token,
        };
        let response = request_token(&self.http, &secrets.token_uri, &request).await?;
        let refreshed = response.into_stored(Some(refresh_token));

        self.store.save(TOKEN_KEY, &refreshed)?;

        tracing::info!(
            expires_at = ?refreshed.expires_at,
            "Access token refreshed"
        );
        Ok(refreshed)
    }
}

#[async_trait]
impl SessionProvider for OAuthSessionProvider {
    async fn session(&self) -> Result<Session> {
        let token = self.store.load(TOKEN_KEY)?.ok_or_else(|| {
            Md2NoteError::Authentication(
                "No stored Google credentials; run `md2note login` first".to_string(),
            )
        })?;

        let token = if token.is_expired_at(Utc::now()) {
            self.refresh(&token).await?
        } else {
            token
        };

        Ok(Session::new(token.access_token()).with_expiry(token.expires_at))
    }
}
