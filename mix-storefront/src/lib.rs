//! Mix storefront
//!
//! Business logic for a wholesale ordering storefront backed by a
//! hosted row/auth/storage service. Sellers browse the catalog, build
//! box-stepped carts, and place orders; admins manage products, walk
//! orders through their lifecycle, and read per-seller sales reports.
//!
//! Every service takes an `Arc<dyn Backend>` at construction; nothing
//! in this crate reaches for a global client.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod logging;
pub mod money;
pub mod notify;
pub mod orders;
pub mod policy;
pub mod reports;
pub mod session;
pub mod shipping;

pub use config::Config;
pub use notify::{Notifier, Toast, ToastKind};
