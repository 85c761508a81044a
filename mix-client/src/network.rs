//! HTTP backend implementation

use crate::backend::{Auth, AuthEvent, Rows, Session, Storage};
use crate::error::{ClientError, ClientResult, PostgrestError};
use crate::query::Query;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Auth-event channel capacity; events are tiny and consumers are few
const AUTH_CHANNEL_CAPACITY: usize = 16;

/// Network backend speaking the hosted service's REST conventions
///
/// Routes:
/// - rows: `/rest/v1/{table}`, RPC: `/rest/v1/rpc/{fn}`
/// - auth: `/auth/v1/token`, `/auth/v1/signup`, `/auth/v1/logout`
/// - storage: `/storage/v1/object/{bucket}/{path}`
#[derive(Clone)]
pub struct NetworkBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
    auth_tx: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for NetworkBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkBackend")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.session.read().is_some())
            .finish()
    }
}

impl NetworkBackend {
    /// Create a new network backend
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        let (auth_tx, _) = broadcast::channel(AUTH_CHANNEL_CAPACITY);

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: Arc::new(RwLock::new(None)),
            auth_tx,
        }
    }

    /// Bearer token: the signed-in session's token, else the anon key
    fn bearer(&self) -> String {
        let token = self
            .session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        format!("Bearer {}", token)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
    }

    async fn handle_rows_response(resp: reqwest::Response) -> ClientResult<Vec<Value>> {
        let body: Value = Self::handle_response(resp).await?;
        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn handle_response(resp: reqwest::Response) -> ClientResult<Value> {
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::error_for(status, text));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    fn error_for(status: StatusCode, body: String) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(body),
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            _ => {
                // Row-store errors arrive as a structured JSON body
                match serde_json::from_str::<PostgrestError>(&body) {
                    Ok(pg) if !pg.message.is_empty() => ClientError::Backend(pg),
                    _ => ClientError::Internal(body),
                }
            }
        }
    }
}

#[async_trait]
impl Rows for NetworkBackend {
    async fn select(&self, table: &str, query: Query) -> ClientResult<Vec<Value>> {
        let req = self
            .with_auth(self.client.get(self.rest_url(table)))
            .query(&query.to_params());
        let resp = req.send().await?;
        Self::handle_rows_response(resp).await
    }

    async fn insert(&self, table: &str, rows: Value) -> ClientResult<Vec<Value>> {
        let req = self
            .with_auth(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(&rows);
        let resp = req.send().await?;
        Self::handle_rows_response(resp).await
    }

    async fn update(&self, table: &str, query: Query, patch: Value) -> ClientResult<Vec<Value>> {
        let req = self
            .with_auth(self.client.patch(self.rest_url(table)))
            .query(&query.to_params())
            .header("Prefer", "return=representation")
            .json(&patch);
        let resp = req.send().await?;
        Self::handle_rows_response(resp).await
    }

    async fn delete(&self, table: &str, query: Query) -> ClientResult<()> {
        let req = self
            .with_auth(self.client.delete(self.rest_url(table)))
            .query(&query.to_params());
        let resp = req.send().await?;
        Self::handle_response(resp).await?;
        Ok(())
    }

    async fn rpc(&self, function: &str, params: Value) -> ClientResult<Value> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let req = self.with_auth(self.client.post(&url)).json(&params);
        let resp = req.send().await?;
        Self::handle_response(resp).await
    }
}

#[async_trait]
impl Auth for NetworkBackend {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
                _ => Self::error_for(status, text),
            });
        }

        let session: Session = resp.json().await?;
        *self.session.write() = Some(session.clone());
        let _ = self.auth_tx.send(AuthEvent::SignedIn(session.clone()));
        tracing::info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> ClientResult<()> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        });
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::error_for(status, text));
        }
        Ok(())
    }

    async fn sign_out(&self) -> ClientResult<()> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let result = self
            .with_auth(self.client.post(&url))
            .send()
            .await
            .map_err(ClientError::from);

        // The local session is dropped even when the remote call fails;
        // the caller decides whether to surface the error.
        *self.session.write() = None;
        let _ = self.auth_tx.send(AuthEvent::SignedOut);

        let resp = result?;
        let status = resp.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::error_for(status, text));
        }
        Ok(())
    }

    async fn session(&self) -> ClientResult<Option<Session>> {
        Ok(self.session.read().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl Storage for NetworkBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ClientResult<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let resp = self
            .with_auth(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::error_for(status, text));
        }
        Ok(path.to_string())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> ClientResult<()> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
        let body = serde_json::json!({ "prefixes": paths });
        let resp = self
            .with_auth(self.client.delete(&url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::error_for(status, text));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_format() {
        let backend = NetworkBackend::new("https://backend.example.com/", "anon");
        assert_eq!(
            backend.public_url("produtos", "123_abc.jpg"),
            "https://backend.example.com/storage/v1/object/public/produtos/123_abc.jpg"
        );
    }

    #[test]
    fn test_error_for_statuses() {
        assert!(matches!(
            NetworkBackend::error_for(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            NetworkBackend::error_for(StatusCode::FORBIDDEN, "nope".into()),
            ClientError::Forbidden(_)
        ));

        let body = r#"{"code":"42501","message":"permission denied for table pedidos"}"#;
        match NetworkBackend::error_for(StatusCode::BAD_REQUEST, body.into()) {
            ClientError::Backend(pg) => assert!(pg.is_policy_denied()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_session_parse() {
        let json = r#"{
            "access_token": "jwt",
            "user": {
                "id": "u1",
                "email": "maria@example.com",
                "user_metadata": {"full_name": "Maria", "city": "Curitiba"}
            }
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.user_metadata["full_name"], "Maria");
    }
}
