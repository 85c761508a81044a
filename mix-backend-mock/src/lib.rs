//! In-memory backend for tests
//!
//! Implements the full `Backend` trait family against JSON tables held
//! in process memory, including the `authorize_order` remote procedure,
//! a credential registry for auth flows, an object-storage map, and
//! one-shot failure injection for exercising compensation paths.

mod store;

use async_trait::async_trait;
use mix_client::{
    Auth, AuthEvent, AuthUser, ClientError, ClientResult, PostgrestError, Query, Rows, Session,
    Storage,
};
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use store::RowStore;
use tokio::sync::broadcast;

const AUTH_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
struct MockUser {
    id: String,
    password: String,
    metadata: Value,
}

/// In-memory stand-in for the hosted backend
#[derive(Clone)]
pub struct MockBackend {
    rows: Arc<RwLock<RowStore>>,
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    users: Arc<RwLock<HashMap<String, MockUser>>>,
    session: Arc<RwLock<Option<Session>>>,
    auth_tx: broadcast::Sender<AuthEvent>,
    fail_insert: Arc<RwLock<HashSet<String>>>,
    fail_remove: Arc<RwLock<bool>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let (auth_tx, _) = broadcast::channel(AUTH_CHANNEL_CAPACITY);
        Self {
            rows: Arc::new(RwLock::new(RowStore::default())),
            objects: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            session: Arc::new(RwLock::new(None)),
            auth_tx,
            fail_insert: Arc::new(RwLock::new(HashSet::new())),
            fail_remove: Arc::new(RwLock::new(false)),
        }
    }

    /// Seed rows into a table
    pub fn seed_table(&self, table: &str, rows: Vec<Value>) {
        self.rows.write().seed(table, rows);
    }

    /// All rows currently in a table (for assertions)
    pub fn table_rows(&self, table: &str) -> Vec<Value> {
        self.rows.read().all(table)
    }

    /// Register a user in the credential registry without signing in
    pub fn register_user(&self, email: &str, password: &str, metadata: Value) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.users.write().insert(
            email.to_string(),
            MockUser {
                id: id.clone(),
                password: password.to_string(),
                metadata,
            },
        );
        id
    }

    /// Make the next insert into `table` fail with a backend error
    pub fn fail_next_insert(&self, table: &str) {
        self.fail_insert.write().insert(table.to_string());
    }

    /// Make subsequent storage removals fail
    pub fn fail_storage_remove(&self, fail: bool) {
        *self.fail_remove.write() = fail;
    }

    /// Paths currently stored in object storage
    pub fn stored_objects(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    fn backend_error(message: impl Into<String>) -> ClientError {
        ClientError::Backend(PostgrestError {
            code: None,
            message: message.into(),
            details: None,
            hint: None,
        })
    }

    /// Authorize a pending order: validate stock for every line before
    /// deducting anything, then deduct and move the order to
    /// "Em Processamento". Mirrors the server-side procedure.
    fn authorize_order(&self, params: &Value) -> ClientResult<Value> {
        let order_id = params
            .get("p_order_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Self::backend_error("p_order_id is required"))?;

        let mut rows = self.rows.write();

        let order = rows
            .select("pedidos", &Query::new().eq("id", order_id))
            .into_iter()
            .next()
            .ok_or_else(|| Self::backend_error("Pedido não encontrado"))?;

        if order.get("status").and_then(Value::as_str) != Some("Pendente") {
            return Err(Self::backend_error("Pedido não está mais pendente"));
        }

        let items = rows.select("pedido_items", &Query::new().eq("pedido_id", order_id));

        // First pass: validate every line
        let mut deductions: Vec<(String, i64)> = Vec::new();
        for item in &items {
            let produto_id = item
                .get("produto_id")
                .and_then(Value::as_str)
                .ok_or_else(|| Self::backend_error("item sem produto"))?;
            let quantity = item.get("quantity").and_then(Value::as_i64).unwrap_or(0);

            let product = rows
                .select("produtos", &Query::new().eq("id", produto_id))
                .into_iter()
                .next()
                .ok_or_else(|| Self::backend_error("Produto não encontrado"))?;

            let per_box = product
                .get("quantity_per_box")
                .and_then(Value::as_i64)
                .unwrap_or(1)
                .max(1);
            let stock = product.get("stock").and_then(Value::as_i64).unwrap_or(0);
            let boxes = quantity / per_box;

            if boxes > stock {
                let codigo = product
                    .get("codigo")
                    .and_then(Value::as_str)
                    .unwrap_or(produto_id);
                return Err(Self::backend_error(format!(
                    "Estoque insuficiente para o produto {}",
                    codigo
                )));
            }
            deductions.push((produto_id.to_string(), stock - boxes));
        }

        // Second pass: apply deductions and transition the order
        for (produto_id, remaining) in deductions {
            rows.update(
                "produtos",
                &Query::new().eq("id", &produto_id),
                &json!({"stock": remaining}),
            );
        }
        rows.update(
            "pedidos",
            &Query::new().eq("id", order_id),
            &json!({"status": "Em Processamento"}),
        );
        Ok(Value::Null)
    }
}

#[async_trait]
impl Rows for MockBackend {
    async fn select(&self, table: &str, query: Query) -> ClientResult<Vec<Value>> {
        Ok(self.rows.read().select(table, &query))
    }

    async fn insert(&self, table: &str, rows: Value) -> ClientResult<Vec<Value>> {
        if self.fail_insert.write().remove(table) {
            return Err(Self::backend_error(format!(
                "insert into {} failed (injected)",
                table
            )));
        }
        let mut store = self.rows.write();
        let inserted = match rows {
            Value::Array(items) => items
                .into_iter()
                .map(|row| store.insert(table, row))
                .collect(),
            row => vec![store.insert(table, row)],
        };
        Ok(inserted)
    }

    async fn update(&self, table: &str, query: Query, patch: Value) -> ClientResult<Vec<Value>> {
        Ok(self.rows.write().update(table, &query, &patch))
    }

    async fn delete(&self, table: &str, query: Query) -> ClientResult<()> {
        self.rows.write().delete(table, &query);
        Ok(())
    }

    async fn rpc(&self, function: &str, params: Value) -> ClientResult<Value> {
        match function {
            "authorize_order" => self.authorize_order(&params),
            other => Err(Self::backend_error(format!(
                "unknown function: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl Auth for MockBackend {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let user = self
            .users
            .read()
            .get(email)
            .filter(|u| u.password == password)
            .cloned()
            .ok_or(ClientError::Unauthorized)?;

        let session = Session {
            access_token: format!("mock-token-{}", user.id),
            user: AuthUser {
                id: user.id,
                email: Some(email.to_string()),
                user_metadata: user.metadata,
            },
        };
        *self.session.write() = Some(session.clone());
        let _ = self.auth_tx.send(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> ClientResult<()> {
        if self.users.read().contains_key(email) {
            return Err(Self::backend_error("User already registered"));
        }
        self.register_user(email, password, metadata);
        Ok(())
    }

    async fn sign_out(&self) -> ClientResult<()> {
        *self.session.write() = None;
        let _ = self.auth_tx.send(AuthEvent::SignedOut);
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
impl Storage for MockBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> ClientResult<String> {
        self.objects
            .write()
            .insert(format!("{}/{}", bucket, path), bytes);
        Ok(path.to_string())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> ClientResult<()> {
        if *self.fail_remove.read() {
            return Err(ClientError::Internal("storage removal failed".into()));
        }
        let mut objects = self.objects.write();
        for path in paths {
            objects.remove(&format!("{}/{}", bucket, path));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("mock://{}/{}", bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_order(backend: &MockBackend, status: &str, quantity: i64, per_box: i64, stock: i64) {
        backend.seed_table(
            "produtos",
            vec![json!({
                "id": "p1", "codigo": "MX-001", "name": "Caneca",
                "quantity_per_box": per_box, "stock": stock,
            })],
        );
        backend.seed_table("pedidos", vec![json!({"id": "o1", "status": status})]);
        backend.seed_table(
            "pedido_items",
            vec![json!({
                "id": 1, "pedido_id": "o1", "produto_id": "p1",
                "quantity": quantity, "price_at_purchase": 10.0,
            })],
        );
    }

    #[tokio::test]
    async fn test_authorize_deducts_stock_and_transitions() {
        let backend = MockBackend::new();
        seed_order(&backend, "Pendente", 30, 10, 5);

        backend
            .rpc("authorize_order", json!({"p_order_id": "o1"}))
            .await
            .unwrap();

        let order = &backend.table_rows("pedidos")[0];
        assert_eq!(order["status"], "Em Processamento");
        let product = &backend.table_rows("produtos")[0];
        assert_eq!(product["stock"], 2);
    }

    #[tokio::test]
    async fn test_authorize_rejects_insufficient_stock_without_deducting() {
        let backend = MockBackend::new();
        seed_order(&backend, "Pendente", 60, 10, 5);

        let err = backend
            .rpc("authorize_order", json!({"p_order_id": "o1"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Estoque insuficiente"));

        let product = &backend.table_rows("produtos")[0];
        assert_eq!(product["stock"], 5);
        let order = &backend.table_rows("pedidos")[0];
        assert_eq!(order["status"], "Pendente");
    }

    #[tokio::test]
    async fn test_authorize_rejects_non_pending_order() {
        let backend = MockBackend::new();
        seed_order(&backend, "Enviado", 10, 10, 5);

        let err = backend
            .rpc("authorize_order", json!({"p_order_id": "o1"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("pendente"));
    }

    #[tokio::test]
    async fn test_injected_insert_failure_is_one_shot() {
        let backend = MockBackend::new();
        backend.fail_next_insert("pedido_items");

        assert!(backend
            .insert("pedido_items", json!({"pedido_id": "o1"}))
            .await
            .is_err());
        assert!(backend
            .insert("pedido_items", json!({"pedido_id": "o1"}))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sign_in_and_out_broadcasts() {
        let backend = MockBackend::new();
        backend.register_user("maria@example.com", "secret", json!({"full_name": "Maria"}));
        let mut events = backend.subscribe();

        assert!(backend.sign_in("maria@example.com", "wrong").await.is_err());
        let session = backend
            .sign_in("maria@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(session.user.user_metadata["full_name"], "Maria");

        backend.sign_out().await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedOut));
        assert!(backend.session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_round_trip() {
        let backend = MockBackend::new();
        backend
            .upload("produtos", "a.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(backend.stored_objects(), vec!["produtos/a.jpg".to_string()]);

        backend
            .remove("produtos", &["a.jpg".to_string()])
            .await
            .unwrap();
        assert!(backend.stored_objects().is_empty());
    }
}
