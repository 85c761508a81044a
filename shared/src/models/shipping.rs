//! Shipping Model

use serde::{Deserialize, Serialize};

/// One priced/timed carrier option derived for a postal code
///
/// Quotes are ephemeral: discarded on cart reset or re-lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingOption {
    /// Carrier display name (e.g. "PAC", "SEDEX")
    pub name: String,
    pub cost: f64,
    /// Estimated delivery in days
    pub days: u32,
}

/// Partial address returned by the postal lookup service
///
/// House number and complement are never guessed; they stay with the
/// user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostalAddress {
    pub logradouro: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
}
