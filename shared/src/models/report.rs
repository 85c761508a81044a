//! Seller Report Model

use serde::{Deserialize, Serialize};

/// Sales total for one `MM/YYYY` bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySales {
    /// Bucket key, e.g. "07/2024"
    pub month: String,
    pub total: f64,
}

/// Aggregated sales for one seller, months listed newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerReport {
    pub id: String,
    pub full_name: String,
    pub city: String,
    pub total_sales: f64,
    pub monthly_sales: Vec<MonthlySales>,
}
