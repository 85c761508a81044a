//! Order listing and lifecycle
//!
//! Orders come off the wire as bare header rows; this service hydrates
//! line items, their products, and (for the admin view) seller names
//! with explicit in-filtered queries.

use mix_client::{Backend, ClientError, Query};
use shared::models::{Order, OrderItem, OrderStatus, Product};
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;

pub struct OrdersService {
    backend: Arc<dyn Backend>,
}

impl OrdersService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// A seller's order history, newest first, cancelled orders hidden
    pub async fn seller_orders(&self, user_id: &str) -> AppResult<Vec<Order>> {
        let rows = self
            .backend
            .select(
                "pedidos",
                Query::new()
                    .eq("user_id", user_id)
                    .neq("status", OrderStatus::Cancelado.as_str())
                    .order_desc("created_at"),
            )
            .await
            .map_err(AppError::from)?;
        let mut orders = parse_orders(rows)?;
        self.hydrate_items(&mut orders).await?;
        Ok(orders)
    }

    /// One order with its items, for review or editing
    pub async fn order(&self, order_id: &str) -> AppResult<Order> {
        let rows = self
            .backend
            .select("pedidos", Query::new().eq("id", order_id))
            .await
            .map_err(AppError::from)?;
        let mut orders = parse_orders(rows)?;
        if orders.is_empty() {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }
        self.hydrate_items(&mut orders).await?;
        Ok(orders.remove(0))
    }

    /// Every order, newest first, with seller names (admin view)
    pub async fn all_orders(&self) -> AppResult<Vec<Order>> {
        let rows = self
            .backend
            .select("pedidos", Query::new().order_desc("created_at"))
            .await
            .map_err(|err| remediate_admin(err, "listing all orders"))?;
        let mut orders = parse_orders(rows)?;
        self.hydrate_items(&mut orders).await?;
        self.hydrate_seller_names(&mut orders).await?;
        Ok(orders)
    }

    /// Move an order to a new status (admin)
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> AppResult<()> {
        let updated = self
            .backend
            .update(
                "pedidos",
                Query::new().eq("id", order_id),
                serde_json::json!({ "status": status.as_str() }),
            )
            .await
            .map_err(|err| remediate_admin(err, "updating order status"))?;
        if updated.is_empty() {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }
        tracing::info!(order = %order_id, status = %status, "order status updated");
        Ok(())
    }

    /// Authorize a pending order via the server-side procedure
    ///
    /// Stock validation and deduction happen atomically on the backend;
    /// its error message is surfaced as-is.
    pub async fn authorize(&self, order_id: &str) -> AppResult<()> {
        self.backend
            .rpc(
                "authorize_order",
                serde_json::json!({ "p_order_id": order_id }),
            )
            .await
            .map_err(|err| remediate_admin(err, "authorizing order"))?;
        tracing::info!(order = %order_id, "order authorized");
        Ok(())
    }

    /// Cancel one of the seller's own orders, only while still pending
    ///
    /// The status predicate rides on the update itself, so a
    /// concurrently authorized order can no longer be cancelled.
    pub async fn cancel(&self, order_id: &str, user_id: &str) -> AppResult<()> {
        let updated = self
            .backend
            .update(
                "pedidos",
                Query::new()
                    .eq("id", order_id)
                    .eq("user_id", user_id)
                    .eq("status", OrderStatus::Pendente.as_str()),
                serde_json::json!({ "status": OrderStatus::Cancelado.as_str() }),
            )
            .await
            .map_err(AppError::from)?;
        if !updated.is_empty() {
            tracing::info!(order = %order_id, "order cancelled");
            return Ok(());
        }

        // Zero rows: either the order is not this seller's, or it
        // already left Pendente
        let owned = self
            .backend
            .select(
                "pedidos",
                Query::new().eq("id", order_id).eq("user_id", user_id),
            )
            .await
            .map_err(AppError::from)?;
        if owned.is_empty() {
            Err(AppError::new(ErrorCode::OrderNotFound))
        } else {
            Err(AppError::new(ErrorCode::OrderNotPending))
        }
    }

    /// Attach line items and their products to the given orders
    async fn hydrate_items(&self, orders: &mut [Order]) -> AppResult<()> {
        if orders.is_empty() {
            return Ok(());
        }
        let order_ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let item_rows = self
            .backend
            .select(
                "pedido_items",
                Query::new().within("pedido_id", order_ids),
            )
            .await
            .map_err(AppError::from)?;
        let mut items: Vec<OrderItem> = item_rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;

        let mut product_ids: Vec<String> =
            items.iter().map(|i| i.produto_id.clone()).collect();
        product_ids.sort();
        product_ids.dedup();
        if !product_ids.is_empty() {
            let product_rows = self
                .backend
                .select("produtos", Query::new().within("id", product_ids))
                .await
                .map_err(AppError::from)?;
            let products: HashMap<String, Product> = product_rows
                .into_iter()
                .map(serde_json::from_value::<Product>)
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect();
            for item in &mut items {
                item.produto = products.get(&item.produto_id).cloned();
            }
        }

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.pedido_id.clone()).or_default().push(item);
        }
        for order in orders {
            order.pedido_items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Attach seller display names
    ///
    /// Zero profiles coming back while orders exist means the access
    /// policy silently filtered the read, which only happens without
    /// the admin role.
    async fn hydrate_seller_names(&self, orders: &mut [Order]) -> AppResult<()> {
        let mut user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        if user_ids.is_empty() {
            return Ok(());
        }

        let rows = self
            .backend
            .select("profiles", Query::new().within("id", user_ids))
            .await
            .map_err(|err| remediate_admin(err, "reading seller profiles"))?;
        if rows.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::AdminRequired,
                "admin access is required to read seller profiles",
            ));
        }
        let names: HashMap<String, String> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.get("id")?.as_str()?.to_string();
                let name = row.get("full_name")?.as_str()?.to_string();
                Some((id, name))
            })
            .collect();
        for order in orders {
            order.seller_name = names.get(&order.user_id).cloned();
        }
        Ok(())
    }
}

fn parse_orders(rows: Vec<serde_json::Value>) -> AppResult<Vec<Order>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

/// Permission failures on admin surfaces get a pointed message
pub(crate) fn remediate_admin(err: ClientError, action: &str) -> AppError {
    if err.is_permission_denied() {
        AppError::with_message(
            ErrorCode::AdminRequired,
            format!("admin access is required for {}", action),
        )
    } else {
        AppError::from(err)
    }
}
