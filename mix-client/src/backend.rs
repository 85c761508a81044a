//! Backend trait family
//!
//! The storefront never talks to a global client; every service holds
//! an `Arc<dyn Backend>` handed to it at construction. `Backend` is a
//! blanket over the three concerns the hosted service exposes: rows,
//! auth/session, and object storage.

use crate::error::ClientResult;
use crate::query::Query;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Authenticated identity as returned by the auth provider
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Arbitrary signup metadata (full_name, city, telefone)
    #[serde(default)]
    pub user_metadata: Value,
}

/// An authenticated session
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}

/// Auth-state change delivered to subscribers
///
/// Every subsequent sign-in/sign-out is broadcast; the session resolver
/// re-resolves the profile on each event.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

/// Row read/write/delete by table name with filter predicates
#[async_trait]
pub trait Rows: Send + Sync {
    /// Select rows matching the query
    async fn select(&self, table: &str, query: Query) -> ClientResult<Vec<Value>>;

    /// Insert one row (object) or several (array); returns the stored
    /// representation including server-assigned columns
    async fn insert(&self, table: &str, rows: Value) -> ClientResult<Vec<Value>>;

    /// Update rows matching the query; returns the rows that matched
    ///
    /// An empty result on a filtered update means no row satisfied the
    /// predicates (used for conditional status transitions).
    async fn update(&self, table: &str, query: Query, patch: Value) -> ClientResult<Vec<Value>>;

    /// Delete rows matching the query
    async fn delete(&self, table: &str, query: Query) -> ClientResult<()>;

    /// Invoke a named remote procedure with JSON parameters
    async fn rpc(&self, function: &str, params: Value) -> ClientResult<Value>;
}

/// Session primitives
#[async_trait]
pub trait Auth: Send + Sync {
    /// Sign in with credentials; stores and returns the session
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session>;

    /// Sign up with credentials plus arbitrary metadata
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> ClientResult<()>;

    /// Sign out; local session state is cleared even if the remote call
    /// fails
    async fn sign_out(&self) -> ClientResult<()>;

    /// Current session, if any
    async fn session(&self) -> ClientResult<Option<Session>>;

    /// Subscribe to subsequent auth-state changes
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Object storage: upload, remove, public URL derivation
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload bytes to `bucket/path`; returns the stored path
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ClientResult<String>;

    /// Remove the given paths from a bucket
    async fn remove(&self, bucket: &str, paths: &[String]) -> ClientResult<()>;

    /// Public URL for a stored object
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Everything the storefront needs from the hosted backend
pub trait Backend: Rows + Auth + Storage {}

impl<T: Rows + Auth + Storage> Backend for T {}
