//! Backend access for the Mix storefront
//!
//! This crate owns every wire conversation the storefront has:
//!
//! - **Rows** (`backend`): filterable row read/write/delete against the
//!   hosted backend's REST surface, plus the `authorize_order` RPC
//! - **Auth** (`backend`): credential sign-in/sign-up/sign-out, current
//!   session, and an auth-state broadcast subscription
//! - **Storage** (`backend`): object upload/remove and public URLs
//! - **Postal lookup** (`postal`): postal-code to partial-address
//!   resolution
//!
//! Services hold an `Arc<dyn Backend>` so tests can substitute the
//! in-memory implementation from `mix-backend-mock`.

mod backend;
mod error;
mod network;
mod postal;
mod query;

pub use backend::{Auth, AuthEvent, AuthUser, Backend, Rows, Session, Storage};
pub use error::{ClientError, ClientResult, PostgrestError};
pub use network::NetworkBackend;
pub use postal::{PostalLookup, ViaCepClient};
pub use query::{Filter, Query};
