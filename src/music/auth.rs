// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Music-service authorization.
//!
//! The engine does not implement OAuth itself. It builds the authorization
//! URL and hands everything else to an [`Authenticator`]: opening a browser,
//! receiving the callback, exchanging and refreshing tokens, and opening an
//! authenticated [`PlaybackSource`].

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;

use crate::error::{AuthError, Result};

use super::{Credentials, PlaybackSource};

/// Authorization endpoint used when none is given.
pub const DEFAULT_AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

/// Local callback that receives the authorization code.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5050/callback";

/// Permissions requested from the user.
pub const DEFAULT_SCOPES: [&str; 9] = [
    "user-read-email",
    "user-read-private",
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-library-read",
    "user-library-modify",
    "user-read-currently-playing",
    "user-read-playback-position",
    "user-read-playback-state",
];

/// Application id and secret registered with the music service.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Creates client credentials.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Builds client credentials from optional configuration values.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingClientCredentials` if either value is
    /// missing or blank.
    pub fn from_parts(
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> std::result::Result<Self, AuthError> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
                Ok(Self::new(id.trim(), secret.trim()))
            }
            _ => Err(AuthError::MissingClientCredentials),
        }
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Parameters of the interactive authorization-code flow.
///
/// # Examples
///
/// ```
/// use lightgrid::music::AuthorizationRequest;
///
/// let request = AuthorizationRequest::new("my-client")
///     .with_scopes(["user-read-playback-state"])
///     .with_state("xyz");
///
/// assert_eq!(
///     request.url(),
///     "https://accounts.spotify.com/authorize?client_id=my-client&response_type=code\
///      &redirect_uri=http%3A%2F%2Flocalhost%3A5050%2Fcallback\
///      &scope=user-read-playback-state&state=xyz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    endpoint: String,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    state: Option<String>,
}

impl AuthorizationRequest {
    /// Creates a request with the default endpoint, redirect URI and scopes.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_AUTHORIZE_ENDPOINT.to_string(),
            client_id: client_id.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            state: None,
        }
    }

    /// Sets the authorization endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Replaces the requested scopes.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the opaque `state` value echoed back in the callback.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the requested scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Builds the URL the user has to open.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = format!(
            "{}?client_id={}&response_type=code&redirect_uri={}",
            self.endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
        );

        if !self.scopes.is_empty() {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(&self.scopes.join(" ")));
        }

        if let Some(state) = &self.state {
            url.push_str("&state=");
            url.push_str(&urlencoding::encode(state));
        }

        url
    }
}

/// Token lifecycle against the music service.
///
/// Implementations talk to the service's OAuth endpoints and player API.
/// Failures should be reported as [`AuthError`]s so music mode can tell the
/// user why it did not start.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticated player API connection.
    type Session: PlaybackSource + 'static;

    /// Runs the interactive authorization-code flow described by `request`
    /// and exchanges the code for credentials.
    fn authorize(
        &self,
        client: &ClientCredentials,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<Credentials>> + Send;

    /// Obtains a fresh access token for expired `credentials`.
    fn refresh(
        &self,
        client: &ClientCredentials,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Credentials>> + Send;

    /// Opens a playback session.
    ///
    /// Whenever the session refreshes its token on its own, it must send the
    /// new credentials on `refreshed` so they can be persisted.
    fn log_in(
        &self,
        client: &ClientCredentials,
        credentials: Credentials,
        refreshed: mpsc::UnboundedSender<Credentials>,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_asks_for_playback_scopes() {
        let request = AuthorizationRequest::new("abc");
        assert_eq!(request.scopes().len(), 9);
        assert!(
            request
                .scopes()
                .iter()
                .any(|s| s == "user-read-playback-state")
        );
        assert_eq!(request.redirect_uri(), DEFAULT_REDIRECT_URI);
    }

    #[test]
    fn url_encodes_every_parameter() {
        let url = AuthorizationRequest::new("id with space")
            .with_endpoint("https://auth.example/authorize")
            .with_redirect_uri("http://localhost:9000/cb")
            .with_scopes(["a", "b"])
            .url();

        assert_eq!(
            url,
            "https://auth.example/authorize?client_id=id%20with%20space&response_type=code\
             &redirect_uri=http%3A%2F%2Flocalhost%3A9000%2Fcb&scope=a%20b"
        );
    }

    #[test]
    fn client_credentials_require_both_parts() {
        assert!(ClientCredentials::from_parts(Some("id"), Some("secret")).is_ok());
        assert_eq!(
            ClientCredentials::from_parts(Some("id"), None),
            Err(AuthError::MissingClientCredentials)
        );
        assert_eq!(
            ClientCredentials::from_parts(Some("  "), Some("secret")),
            Err(AuthError::MissingClientCredentials)
        );
    }

    #[test]
    fn client_secret_is_not_logged() {
        let client = ClientCredentials::new("id", "hunter2");
        assert!(!format!("{client:?}").contains("hunter2"));
        assert_eq!(client.client_secret(), "hunter2");
    }
}
