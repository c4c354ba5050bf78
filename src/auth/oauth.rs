//! OAuth2 authorization-code flow against the provider
//!
//! Login happens in two halves: `authorize_url` mints a session ID and the
//! URL the user must visit (the session ID rides along as the `state`
//! parameter), and `complete_login` exchanges the returned code for tokens
//! and stores them under that session. `refresh_credentials` is the
//! refresh-token exchange the session manager performs when a stored token
//! nears expiry.

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    RedirectUrl, RefreshToken, TokenResponse, TokenUrl,
};

use super::tokens::{CredentialRecord, TokenStore};
use crate::config::Config;

/// Build the OAuth2 client for the provider's authorize/token endpoints.
fn build_client(config: &Config) -> Result<BasicClient> {
    let auth_url = AuthUrl::new(format!("{}/restapi/oauth/authorize", config.server_url))?;
    let token_url = TokenUrl::new(format!("{}/restapi/oauth/token", config.server_url))?;
    let redirect_url = RedirectUrl::new(config.redirect_uri.clone())?;

    Ok(BasicClient::new(
        ClientId::new(config.client_id.clone()),
        Some(ClientSecret::new(config.client_secret.clone())),
        auth_url,
        Some(token_url),
    )
    .set_redirect_uri(redirect_url))
}

/// Start a login: returns the authorize URL and the freshly minted session
/// ID carried in its `state` parameter.
pub fn authorize_url(config: &Config) -> Result<(String, String)> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let client = build_client(config)?;

    let state = session_id.clone();
    let (url, _csrf) = client
        .authorize_url(move || CsrfToken::new(state.clone()))
        .url();

    tracing::info!("generated authorize URL for session {}", session_id);
    Ok((url.to_string(), session_id))
}

/// Complete a login: exchange the authorization code and persist the
/// credentials under the session ID that came back as `state`.
pub async fn complete_login<S: TokenStore>(
    config: &Config,
    store: &mut S,
    code: &str,
    state: &str,
) -> Result<()> {
    let client = build_client(config)?;

    let token_response = client
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .context("Authorization code exchange failed")?;

    let record = record_from_response(&token_response);
    store
        .put(state, record)
        .context("Failed to persist credentials")?;

    tracing::info!("login complete for session {}", state);
    Ok(())
}

/// Exchange a refresh token for a fresh credential record.
///
/// The provider may rotate the refresh token; when it does not return one,
/// the caller keeps the old token.
pub async fn refresh_credentials(config: &Config, refresh_token: &str) -> Result<CredentialRecord> {
    let client = build_client(config)?;

    let token_response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .context("Refresh token exchange failed")?;

    Ok(record_from_response(&token_response))
}

fn record_from_response(
    response: &oauth2::basic::BasicTokenResponse,
) -> CredentialRecord {
    CredentialRecord::new(
        response.access_token().secret().to_string(),
        response.refresh_token().map(|rt| rt.secret().to_string()),
        response.expires_in().map(|d| d.as_secs()),
    )
}
