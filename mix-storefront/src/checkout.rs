//! Checkout flow
//!
//! Walks a cart through address resolution, shipping selection, and
//! submission. Submission writes the order header first and the line
//! items second; if the items fail to write, the freshly created
//! header is deleted so no empty order survives. Each submission
//! attempt carries a fresh idempotency key, letting the backend drop
//! duplicate headers from retried requests.
//!
//! The cart is deliberately kept intact after a successful submission;
//! `start_new_order` resets everything once the confirmation has been
//! shown.

use crate::cart::Cart;
use crate::money;
use crate::shipping::ShippingCalculator;
use mix_client::{Backend, Query};
use shared::models::{
    DeliveryAddress, NewOrder, NewOrderItem, Order, OrderStatus, PaymentMethod, ShippingOption,
};
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

pub struct Checkout {
    backend: Arc<dyn Backend>,
    shipping: ShippingCalculator,
    pub cart: Cart,
    payment: PaymentMethod,
    cep: Option<String>,
    address: Option<DeliveryAddress>,
    options: Vec<ShippingOption>,
    selected: Option<usize>,
    placed: Option<Order>,
}

impl Checkout {
    pub fn new(backend: Arc<dyn Backend>, shipping: ShippingCalculator) -> Self {
        Self {
            backend,
            shipping,
            cart: Cart::new(),
            payment: PaymentMethod::default(),
            cep: None,
            address: None,
            options: Vec::new(),
            selected: None,
            placed: None,
        }
    }

    pub fn payment(&self) -> PaymentMethod {
        self.payment
    }

    pub fn set_payment(&mut self, payment: PaymentMethod) {
        self.payment = payment;
    }

    pub fn address(&self) -> Option<&DeliveryAddress> {
        self.address.as_ref()
    }

    pub fn shipping_options(&self) -> &[ShippingOption] {
        &self.options
    }

    pub fn selected_shipping(&self) -> Option<&ShippingOption> {
        self.selected.and_then(|i| self.options.get(i))
    }

    pub fn placed_order(&self) -> Option<&Order> {
        self.placed.as_ref()
    }

    /// Resolve a postal code and quote shipping for it
    ///
    /// Everything derived from the previous lookup is dropped up
    /// front; a failed lookup leaves no address and no quotable
    /// options behind.
    pub async fn lookup_postal(&mut self, raw_code: &str) -> AppResult<&DeliveryAddress> {
        self.cep = None;
        self.address = None;
        self.options.clear();
        self.selected = None;

        let postal = self.shipping.resolve_address(raw_code).await?;
        self.cep = Some(crate::shipping::normalize_postal_code(raw_code)?);
        self.options = self.shipping.quote();
        Ok(self.address.insert(DeliveryAddress::from_postal(&postal)))
    }

    /// Fill in the user-typed address fields
    pub fn set_street_number(&mut self, numero: &str, complemento: &str) -> AppResult<()> {
        let address = self
            .address
            .as_mut()
            .ok_or_else(|| AppError::new(ErrorCode::AddressIncomplete))?;
        address.numero = numero.trim().to_string();
        address.complemento = complemento.trim().to_string();
        Ok(())
    }

    pub fn select_shipping(&mut self, index: usize) -> AppResult<()> {
        if index >= self.options.len() {
            return Err(AppError::new(ErrorCode::ShippingNotSelected));
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Goods plus selected shipping under the current payment mode
    pub fn total(&self) -> f64 {
        self.cart
            .total(self.payment, self.selected_shipping().map(|o| o.cost))
    }

    /// Submit the order
    ///
    /// Preconditions are checked before anything is written: a
    /// non-empty cart, a selected shipping option, and an address with
    /// a street number.
    pub async fn place_order(&mut self, user_id: &str) -> AppResult<Order> {
        if self.cart.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        let shipping = self
            .selected_shipping()
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::ShippingNotSelected))?;
        let (cep, address) = match (&self.cep, &self.address) {
            (Some(cep), Some(address)) if !address.numero.is_empty() => (cep.clone(), address.clone()),
            _ => return Err(AppError::new(ErrorCode::AddressIncomplete)),
        };

        // When editing, the source order must still be pending before
        // anything is written; an authorized or cancelled order cannot
        // be replaced
        if let Some(old_id) = self.cart.editing_order_id() {
            let pending = self
                .backend
                .select(
                    "pedidos",
                    Query::new()
                        .eq("id", old_id)
                        .eq("status", OrderStatus::Pendente.as_str()),
                )
                .await
                .map_err(AppError::from)?;
            if pending.is_empty() {
                return Err(AppError::new(ErrorCode::OrderNotPending));
            }
        }

        let header = NewOrder {
            user_id: user_id.to_string(),
            total_price: self.total(),
            shipping_cost: money::round2(money::to_decimal(shipping.cost)),
            status: OrderStatus::Pendente,
            payment_method: self.payment,
            cep,
            logradouro: address.logradouro,
            numero: address.numero,
            complemento: address.complemento,
            bairro: address.bairro,
            cidade: address.cidade,
            estado: address.estado,
            idempotency_key: uuid::Uuid::new_v4().to_string(),
        };

        let inserted = self
            .backend
            .insert("pedidos", serde_json::to_value(&header)?)
            .await
            .map_err(AppError::from)?;
        let order: Order = inserted
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| AppError::backend("order insert returned no row"))?;

        let items: Vec<NewOrderItem> = self
            .cart
            .lines()
            .iter()
            .map(|line| NewOrderItem {
                pedido_id: order.id.clone(),
                produto_id: line.product.id.clone(),
                quantity: line.quantity,
                price_at_purchase: line.product.unit_price(self.payment),
            })
            .collect();

        if let Err(err) = self
            .backend
            .insert("pedido_items", serde_json::to_value(&items)?)
            .await
        {
            // Remove the header so the failure leaves nothing behind
            tracing::error!(order = %order.id, error = %err, "item write failed, deleting order header");
            if let Err(cleanup) = self
                .backend
                .delete("pedidos", Query::new().eq("id", &order.id))
                .await
            {
                tracing::error!(order = %order.id, error = %cleanup, "compensating delete failed");
            }
            return Err(AppError::with_message(
                ErrorCode::OrderPartialWrite,
                err.to_string(),
            ));
        }

        // When editing, the submitted order replaces the pending one
        if let Some(old_id) = self.cart.editing_order_id().map(String::from) {
            self.retire_edited_order(&old_id).await;
        }

        tracing::info!(order = %order.id, total = order.total_price, "order placed");
        self.placed = Some(order.clone());
        Ok(order)
    }

    /// Best-effort removal of the pending order a submission replaced
    ///
    /// Header first, conditionally on `Pendente`, then the items, and
    /// only once the header is confirmed gone. An order that left
    /// Pendente concurrently keeps its items intact.
    async fn retire_edited_order(&self, old_id: &str) {
        if let Err(err) = self
            .backend
            .delete(
                "pedidos",
                Query::new()
                    .eq("id", old_id)
                    .eq("status", OrderStatus::Pendente.as_str()),
            )
            .await
        {
            tracing::warn!(order = %old_id, error = %err, "failed to remove replaced order");
            return;
        }

        match self
            .backend
            .select("pedidos", Query::new().eq("id", old_id))
            .await
        {
            Ok(rows) if rows.is_empty() => {
                if let Err(err) = self
                    .backend
                    .delete("pedido_items", Query::new().eq("pedido_id", old_id))
                    .await
                {
                    tracing::warn!(order = %old_id, error = %err, "failed to remove items of replaced order");
                }
            }
            Ok(_) => {
                tracing::warn!(order = %old_id, "replaced order left Pendente concurrently, keeping its items");
            }
            Err(err) => {
                tracing::warn!(order = %old_id, error = %err, "could not confirm removal of replaced order");
            }
        }
    }

    /// Reset the flow for a fresh order
    pub fn start_new_order(&mut self) {
        self.cart.clear();
        self.payment = PaymentMethod::default();
        self.cep = None;
        self.address = None;
        self.options.clear();
        self.selected = None;
        self.placed = None;
    }
}
