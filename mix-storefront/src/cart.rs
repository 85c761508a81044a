//! Shopping cart
//!
//! Quantities are held in base units but only change in whole-box
//! steps (`quantity_per_box` units at a time), and a line never holds
//! more boxes than the product's stock. The stock clamp is advisory:
//! the authorization procedure on the backend re-validates against
//! live stock before any deduction.

use crate::money;
use shared::models::{Order, PaymentMethod, Product};
use shared::{AppError, AppResult, ErrorCode};

/// One product in the cart with its quantity in base units
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    pub fn boxes(&self) -> i64 {
        self.quantity / self.product.units_per_box()
    }

    pub fn line_total(&self, mode: PaymentMethod) -> f64 {
        money::line_total(self.product.unit_price(mode), self.quantity)
    }
}

/// Cart contents, optionally tied to a pending order being edited
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    editing_order_id: Option<String>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Order this cart was loaded from, if editing one
    pub fn editing_order_id(&self) -> Option<&str> {
        self.editing_order_id.as_deref()
    }

    /// Add one box of a product (or start a line with one box)
    pub fn add_box(&mut self, product: &Product) -> AppResult<()> {
        let per_box = product.units_per_box();
        let current = self
            .lines
            .iter()
            .find(|l| l.product.id == product.id)
            .map(|l| l.quantity)
            .unwrap_or(0);
        self.set_quantity_inner(product, current + per_box)
    }

    /// Set a line's quantity in base units
    ///
    /// Zero or negative removes the line. The quantity must be a whole
    /// number of boxes and fit within stock.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> AppResult<()> {
        if quantity <= 0 {
            self.remove_line(product_id);
            return Ok(());
        }
        let product = self
            .lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map(|l| l.product.clone())
            .ok_or_else(|| AppError::not_found(format!("product {}", product_id)))?;
        self.set_quantity_inner(&product, quantity)
    }

    fn set_quantity_inner(&mut self, product: &Product, quantity: i64) -> AppResult<()> {
        let per_box = product.units_per_box();
        if quantity % per_box != 0 {
            return Err(AppError::validation(format!(
                "quantity for {} must be a multiple of {} units",
                product.name, per_box
            )));
        }
        let boxes = quantity / per_box;
        if boxes > product.stock {
            return Err(AppError::with_message(
                ErrorCode::StockExceeded,
                format!(
                    "only {} boxes of {} in stock",
                    product.stock, product.name
                ),
            ));
        }

        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity,
            }),
        }
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.editing_order_id = None;
    }

    /// Sum of line totals under a payment mode
    pub fn subtotal(&self, mode: PaymentMethod) -> f64 {
        money::sum(self.lines.iter().map(|l| l.line_total(mode)))
    }

    /// Subtotal plus shipping, when a shipping cost is known
    pub fn total(&self, mode: PaymentMethod, shipping_cost: Option<f64>) -> f64 {
        money::sum(
            self.lines
                .iter()
                .map(|l| l.line_total(mode))
                .chain(shipping_cost),
        )
    }

    /// Replace the cart with the lines of a pending order being edited
    ///
    /// Requires the order's items to be hydrated with their products.
    pub fn load_order(&mut self, order: &Order) -> AppResult<()> {
        if !order.status.is_pending() {
            return Err(AppError::new(ErrorCode::OrderNotPending));
        }

        let mut lines = Vec::with_capacity(order.pedido_items.len());
        for item in &order.pedido_items {
            let product = item.produto.clone().ok_or_else(|| {
                AppError::internal(format!("order item {} missing its product", item.id))
            })?;
            lines.push(CartLine {
                product,
                quantity: item.quantity,
            });
        }

        self.lines = lines;
        self.editing_order_id = Some(order.id.clone());
        Ok(())
    }
}
