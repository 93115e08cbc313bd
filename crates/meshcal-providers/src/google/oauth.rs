//! OAuth 2.0 authorization-code grant for Google APIs.
//!
//! This is the out-of-band console variant of the flow: the operator
//! visits the authorization URL, approves the consent screen, and pastes
//! the one-time grant code back on standard input. The code is then
//! exchanged for an access/refresh token pair at Google's token endpoint.
//!
//! The flow runs strictly sequentially, once, with no timeout on the
//! interactive read and no retry on the exchange.

use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::BoxFuture;

use super::config::GoogleCredentials;
use super::tokens::TokenInfo;

/// Google OAuth endpoints.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// The interactive step of the grant flow.
///
/// Presenting the URL and collecting the code is a seam so the plugin's
/// boot path can be exercised without a terminal; the production
/// implementation is [`TerminalPrompt`].
pub trait GrantPrompt: Send + Sync {
    /// Presents the authorization URL to the operator and resolves with
    /// the grant code they obtained from the consent screen.
    fn obtain_code(&self, auth_url: String) -> BoxFuture<'_, ProviderResult<String>>;
}

/// Prompt that prints the URL to stdout and reads one line from stdin.
///
/// The stdin handle is scoped to the call, so it is released on every
/// exit path, including a failed read.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl GrantPrompt for TerminalPrompt {
    fn obtain_code(&self, auth_url: String) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move {
            use std::io::Write;
            use tokio::io::{AsyncBufReadExt, BufReader};

            println!("Authorize this app by visiting this url:\n\n{auth_url}\n");
            print!("Enter the code from that page here: ");
            std::io::stdout()
                .flush()
                .map_err(|e| ProviderError::internal(format!("failed to flush stdout: {}", e)))?;

            let mut line = String::new();
            let mut reader = BufReader::new(tokio::io::stdin());
            reader
                .read_line(&mut line)
                .await
                .map_err(|e| ProviderError::internal(format!("failed to read grant code: {}", e)))?;

            let code = line.trim().to_string();
            if code.is_empty() {
                return Err(ProviderError::authentication("no grant code entered"));
            }
            Ok(code)
        })
    }
}

/// OAuth client for the one-time grant flow.
#[derive(Debug)]
pub struct OAuthFlow {
    credentials: GoogleCredentials,
    http_client: reqwest::Client,
}

impl OAuthFlow {
    /// Creates a flow from the loaded client credentials.
    pub fn new(credentials: GoogleCredentials) -> Self {
        Self {
            credentials,
            // No explicit timeout: the transport default applies.
            http_client: reqwest::Client::new(),
        }
    }

    /// Builds the authorization URL the operator must visit.
    ///
    /// Requests offline access so the response includes a refresh token,
    /// and uses the first redirect URI from the credentials file.
    pub fn authorization_url(&self, scopes: &[String]) -> ProviderResult<String> {
        let redirect_uri = self.credentials.first_redirect_uri()?;

        let mut url = Url::parse(GOOGLE_AUTH_URL)
            .map_err(|e| ProviderError::internal(format!("failed to parse auth URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &scopes.join(" "))
            .append_pair("access_type", "offline");

        Ok(url.into())
    }

    /// Exchanges a grant code for tokens.
    ///
    /// A failed exchange is returned as-is; there is no retry.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<TokenInfo> {
        let redirect_uri = self.credentials.first_redirect_uri()?;

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })?;

        info!("successfully obtained tokens");
        Ok(TokenInfo::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
        ))
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_flow() -> OAuthFlow {
        OAuthFlow::new(GoogleCredentials::new(
            "test-client.apps.googleusercontent.com",
            "test-secret",
            vec!["urn:ietf:wg:oauth:2.0:oob".to_string()],
        ))
    }

    fn scopes() -> Vec<String> {
        vec![
            "https://www.googleapis.com/auth/calendar".to_string(),
            "https://www.googleapis.com/auth/calendar.events".to_string(),
        ]
    }

    #[test]
    fn auth_url_format() {
        let url = test_flow().authorization_url(&scopes()).unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=test-client.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        // Both scopes, space-joined then encoded
        assert!(url.contains("auth%2Fcalendar+https") || url.contains("auth%2Fcalendar%20https"));
        assert!(url.contains("calendar.events"));
    }

    #[test]
    fn auth_url_requires_redirect_uri() {
        let flow = OAuthFlow::new(GoogleCredentials::new(
            "test-client.apps.googleusercontent.com",
            "test-secret",
            vec![],
        ));
        assert!(flow.authorization_url(&scopes()).is_err());
    }

    #[test]
    fn token_response_parsing() {
        let json = r#"{
            "access_token": "ya29.a0Af",
            "refresh_token": "1//0gRef",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/calendar",
            "token_type": "Bearer"
        }"#;

        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "ya29.a0Af");
        assert_eq!(parsed.refresh_token, Some("1//0gRef".to_string()));
        assert_eq!(parsed.expires_in, Some(3599));
    }

    #[test]
    fn token_response_without_refresh_token() {
        let json = r#"{"access_token": "ya29", "expires_in": 3599}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.refresh_token.is_none());
    }
}
