//! Gmail mail source.
//!
//! Lists messages newer than the checkpoint with the `after:` search
//! operator and fetches full payloads. Uses OAuth2 with the read-only
//! Gmail scope; tokens live in the OS keyring.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::keyring_store;
use super::oauth::{self, OAuthConfig, OAuthTokens};
use crate::error::{CoreError, OAuthError, Result};
use crate::mail::{MailSource, MessagePayload};
use crate::storage::GmailConfig;

const SOURCE_NAME: &str = "gmail";
const TOKEN_KEY: &str = "gmail";
const CLIENT_ID_KEY: &str = "gmail_client_id";
const CLIENT_SECRET_KEY: &str = "gmail_client_secret";
const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";
const REDIRECT_PORT: u16 = 19822;

#[derive(Debug, Clone)]
enum TokenSource {
    Keyring {
        client_id: String,
        client_secret: String,
    },
    Static(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    payload: MessagePayload,
}

/// Gmail REST API mail source.
pub struct GmailSource {
    http: Client,
    api_base: String,
    user_id: String,
    tokens: TokenSource,
}

impl GmailSource {
    /// Load client credentials from the keyring. Missing ones are empty.
    pub fn new(config: &GmailConfig) -> Self {
        let client_id = keyring_store::get(CLIENT_ID_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();
        let client_secret = keyring_store::get(CLIENT_SECRET_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();

        Self::with_tokens(
            config,
            TokenSource::Keyring {
                client_id,
                client_secret,
            },
        )
    }

    /// Source that always presents `access_token`.
    pub fn with_access_token(config: &GmailConfig, access_token: impl Into<String>) -> Self {
        Self::with_tokens(config, TokenSource::Static(access_token.into()))
    }

    fn with_tokens(config: &GmailConfig, tokens: TokenSource) -> Self {
        Self {
            http: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            tokens,
        }
    }

    /// Persist Gmail OAuth client credentials to the OS keyring.
    pub fn set_credentials(client_id: &str, client_secret: &str) -> Result<()> {
        keyring_store::set(CLIENT_ID_KEY, client_id)?;
        keyring_store::set(CLIENT_SECRET_KEY, client_secret)?;
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        match &self.tokens {
            TokenSource::Keyring {
                client_id,
                client_secret,
            } => !client_id.is_empty() && !client_secret.is_empty(),
            TokenSource::Static(_) => true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        match &self.tokens {
            TokenSource::Keyring { .. } => oauth::load_tokens(TOKEN_KEY).is_some(),
            TokenSource::Static(_) => true,
        }
    }

    fn oauth_config(&self) -> Result<OAuthConfig> {
        let TokenSource::Keyring {
            client_id,
            client_secret,
        } = &self.tokens
        else {
            return Err(OAuthError::CredentialsNotConfigured {
                service: SOURCE_NAME.into(),
            }
            .into());
        };
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(OAuthError::CredentialsNotConfigured {
                service: SOURCE_NAME.into(),
            }
            .into());
        }

        Ok(OAuthConfig {
            service_name: TOKEN_KEY.to_string(),
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec![READONLY_SCOPE.to_string()],
            redirect_port: REDIRECT_PORT,
        })
    }

    /// Run the browser authorization flow and store the tokens.
    pub async fn authenticate(&self) -> Result<OAuthTokens> {
        let config = self.oauth_config()?;
        oauth::authorize(&config).await
    }

    /// Forget stored tokens.
    pub fn disconnect(&self) -> Result<()> {
        keyring_store::delete(TOKEN_KEY)
    }

    /// Return a valid access token, refreshing if expired.
    pub async fn access_token(&self) -> Result<String> {
        if let TokenSource::Static(token) = &self.tokens {
            return Ok(token.clone());
        }

        let tokens = oauth::load_tokens(TOKEN_KEY).ok_or_else(|| OAuthError::NotAuthenticated {
            service: SOURCE_NAME.into(),
        })?;

        if !oauth::is_expired(&tokens) {
            return Ok(tokens.access_token);
        }

        let refresh = tokens.refresh_token.as_deref().ok_or_else(|| {
            OAuthError::TokenRefreshFailed("no refresh token available".into())
        })?;

        let config = self.oauth_config()?;
        let refreshed = oauth::refresh_token(&config, refresh).await?;
        tracing::debug!("refreshed Gmail access token");
        Ok(refreshed.access_token)
    }

    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", self.api_base, self.user_id)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let token = self.access_token().await?;
        let resp = request.bearer_auth(token).send().await?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if let Some(err) = body.get("error") {
            return Err(CoreError::mail(SOURCE_NAME, format!("API error: {err}")));
        }
        if !status.is_success() {
            return Err(CoreError::mail(SOURCE_NAME, format!("HTTP {status}")));
        }
        serde_json::from_value(body)
            .map_err(|e| CoreError::mail(SOURCE_NAME, format!("unexpected response: {e}")))
    }
}

#[async_trait]
impl MailSource for GmailSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn list(&self, since: Option<i64>) -> Result<Vec<String>> {
        let query = since.map(|epoch| format!("after:{epoch}"));
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(self.messages_url());
            if let Some(q) = &query {
                request = request.query(&[("q", q.as_str())]);
            }
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListResponse = self.send_json(request).await?;
            ids.extend(page.messages.into_iter().map(|m| m.id));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(count = ids.len(), ?since, "listed Gmail messages");
        Ok(ids)
    }

    async fn get(&self, message_id: &str) -> Result<MessagePayload> {
        let request = self
            .http
            .get(format!("{}/{message_id}", self.messages_url()))
            .query(&[("format", "full")]);
        let message: MessageResponse = self.send_json(request).await?;
        Ok(message.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn source(server: &mockito::Server) -> GmailSource {
        let config = GmailConfig {
            api_base: server.url(),
            ..GmailConfig::default()
        };
        GmailSource::with_access_token(&config, "tok")
    }

    #[tokio::test]
    async fn list_follows_pages_and_sends_after_query() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/users/me/messages")
            .match_query(Matcher::UrlEncoded("q".into(), "after:1700000000".into()))
            .match_header("authorization", "Bearer tok")
            .with_header("content-type", "application/json")
            .with_body(r#"{"messages":[{"id":"a","threadId":"t"},{"id":"b","threadId":"t"}],"nextPageToken":"p2"}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/users/me/messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "after:1700000000".into()),
                Matcher::UrlEncoded("pageToken".into(), "p2".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"messages":[{"id":"c","threadId":"u"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let ids = source(&server).list(Some(1_700_000_000)).await.unwrap();

        assert_eq!(ids, ["a", "b", "c"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn empty_mailbox_lists_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/messages")
            .with_header("content-type", "application/json")
            .with_body(r#"{"resultSizeEstimate":0}"#)
            .create_async()
            .await;

        assert!(source(&server).list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_returns_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/messages/a")
            .match_query(Matcher::UrlEncoded("format".into(), "full".into()))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"a","payload":{"mimeType":"text/plain","body":{"size":5,"data":"aGVsbG8"}}}"#,
            )
            .create_async()
            .await;

        let payload = source(&server).get("a").await.unwrap();

        assert_eq!(payload.mime_type, "text/plain");
        assert_eq!(payload.body.data.as_deref(), Some("aGVsbG8"));
        assert_eq!(payload.body.size, Some(5));
        assert!(payload.parts.is_none());
    }

    #[tokio::test]
    async fn api_errors_become_mail_source_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/messages")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
            .create_async()
            .await;

        let err = source(&server).list(None).await.unwrap_err();

        assert!(matches!(err, CoreError::MailSource { .. }));
        assert!(err.to_string().contains("Invalid Credentials"));
    }

    #[test]
    fn static_token_counts_as_authenticated() {
        let s = GmailSource::with_access_token(&GmailConfig::default(), "tok");
        assert!(s.is_authenticated());
        assert!(s.has_credentials());
        assert!(s.oauth_config().is_err());
    }
}
