//! Domain models
//!
//! Row structs mirror the backend tables (`produtos`, `pedidos`,
//! `pedido_items`, `profiles`); field names are the wire column names.
//! Create/update payloads are separate structs so partial writes never
//! touch server-managed columns (ids, timestamps).

mod order;
mod product;
mod profile;
mod report;
mod shipping;

pub use order::{
    DeliveryAddress, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, PaymentMethod,
};
pub use product::{NewProduct, Product, ProductUpdate};
pub use profile::{NewProfile, Profile, Role};
pub use report::{MonthlySales, SellerReport};
pub use shipping::{PostalAddress, ShippingOption};
