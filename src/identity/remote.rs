use super::{Credentials, IdentityError, IdentityResolver, ResolveFuture, UserId};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};
use tracing::{debug, instrument};
use url::Url;

const REQUEST_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Deserialize)]
struct VerifiedSession {
    user_id: Option<String>,
}

/// Verifies session tokens against the identity provider over HTTP.
///
/// `POST {url}` with `{"token": "..."}`. A `200` carries `{"user_id": ...}`
/// (`null` for a signed-out session); `401`, `403` and `404` mean the token is
/// not valid. Anything else is an error.
#[derive(Debug, Clone)]
pub struct RemoteIdentity {
    url: Url,
    client: Client,
}

impl RemoteIdentity {
    /// # Errors
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(url: &str) -> Result<Self, IdentityError> {
        let url = Url::parse(url).map_err(|_| IdentityError::InvalidUrl(url.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(IdentityError::InvalidUrl(url.to_string()));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self { url, client })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[instrument(skip(self))]
    async fn verify(&self, credentials: &Credentials) -> Result<Option<UserId>, IdentityError> {
        let mut map = HashMap::new();
        map.insert("token", credentials.token());

        let response = self
            .client
            .post(self.url.clone())
            .json(&map)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await?;
                let session: VerifiedSession = serde_json::from_slice(&body)?;
                session.user_id.map(UserId::parse).transpose()
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!("Session rejected: {}", response.status());
                Ok(None)
            }
            status => Err(IdentityError::UnexpectedStatus(status.as_u16())),
        }
    }
}

impl IdentityResolver for RemoteIdentity {
    fn resolve<'a>(&'a self, credentials: &'a Credentials) -> ResolveFuture<'a> {
        Box::pin(self.verify(credentials))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn verify_handler(Json(body): Json<HashMap<String, String>>) -> (AxumStatus, Json<Value>) {
        match body.get("token").map(String::as_str) {
            Some("good") => (AxumStatus::OK, Json(json!({ "user_id": "user_42" }))),
            Some("signed-out") => (AxumStatus::OK, Json(json!({ "user_id": null }))),
            Some("blank") => (AxumStatus::OK, Json(json!({ "user_id": "" }))),
            Some("garbage") => (AxumStatus::OK, Json(json!(["not", "an", "object"]))),
            Some("broken") => (AxumStatus::BAD_GATEWAY, Json(json!({}))),
            _ => (AxumStatus::UNAUTHORIZED, Json(json!({}))),
        }
    }

    async fn spawn_provider() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/verify", post(verify_handler));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/verify")
    }

    async fn resolve(token: &str) -> Result<Option<UserId>, IdentityError> {
        let url = spawn_provider().await;
        let identity = RemoteIdentity::new(&url).unwrap();
        identity.resolve(&Credentials::new(token)).await
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            RemoteIdentity::new("ftp://idp.example.com/verify"),
            Err(IdentityError::InvalidUrl(_))
        ));
        assert!(matches!(
            RemoteIdentity::new("not a url"),
            Err(IdentityError::InvalidUrl(_))
        ));
        assert!(RemoteIdentity::new("https://idp.example.com/verify").is_ok());
    }

    #[tokio::test]
    async fn valid_session_resolves_user() {
        let user = resolve("good").await.unwrap();
        assert_eq!(user.map(String::from), Some("user_42".to_string()));
    }

    #[tokio::test]
    async fn signed_out_session_is_none() {
        assert!(resolve("signed-out").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_session_is_none() {
        assert!(resolve("expired").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_user_id_is_an_error() {
        assert!(matches!(
            resolve("blank").await,
            Err(IdentityError::EmptyUserId)
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        assert!(matches!(
            resolve("garbage").await,
            Err(IdentityError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn unexpected_status_is_an_error() {
        assert!(matches!(
            resolve("broken").await,
            Err(IdentityError::UnexpectedStatus(502))
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let identity = RemoteIdentity::new(&format!("http://{addr}/verify")).unwrap();
        let result = identity.resolve(&Credentials::new("good")).await;
        assert!(matches!(result, Err(IdentityError::Transport(_))));
    }
}
