//! Per-seller sales reports
//!
//! Aggregates every non-cancelled order into one report per seller:
//! a lifetime total plus MM/YYYY monthly buckets. Totals are summed
//! with decimal arithmetic so report figures match order figures.

use crate::money;
use crate::orders::remediate_admin;
use chrono::{DateTime, Datelike};
use mix_client::{Backend, Query};
use rust_decimal::Decimal;
use shared::models::{MonthlySales, OrderStatus, SellerReport};
use shared::AppResult;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ReportsService {
    backend: Arc<dyn Backend>,
}

#[derive(Default)]
struct SellerAccumulator {
    total: Decimal,
    // key: (year, month)
    months: HashMap<(i32, u32), Decimal>,
}

impl ReportsService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Sales per seller, largest total first
    pub async fn seller_reports(&self) -> AppResult<Vec<SellerReport>> {
        let order_rows = self
            .backend
            .select(
                "pedidos",
                Query::new().neq("status", OrderStatus::Cancelado.as_str()),
            )
            .await
            .map_err(|err| remediate_admin(err, "reading sales reports"))?;
        let profile_rows = self
            .backend
            .select("profiles", Query::new().eq("role", "vendedor"))
            .await
            .map_err(|err| remediate_admin(err, "reading seller profiles"))?;

        let mut sellers: HashMap<String, SellerAccumulator> = HashMap::new();
        for row in order_rows {
            let Some(user_id) = row.get("user_id").and_then(|v| v.as_str()) else {
                continue;
            };
            let total = row
                .get("total_price")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);
            let acc = sellers.entry(user_id.to_string()).or_default();
            let amount = money::to_decimal(total);
            acc.total += amount;
            if let Some(bucket) = row
                .get("created_at")
                .and_then(|v| v.as_str())
                .and_then(month_of)
            {
                *acc.months.entry(bucket).or_default() += amount;
            }
        }

        let mut reports: Vec<SellerReport> = Vec::with_capacity(sellers.len());
        for row in profile_rows {
            let (Some(id), Some(full_name)) = (
                row.get("id").and_then(|v| v.as_str()),
                row.get("full_name").and_then(|v| v.as_str()),
            ) else {
                continue;
            };
            let Some(acc) = sellers.remove(id) else {
                continue;
            };

            let mut keys: Vec<(i32, u32)> = acc.months.keys().copied().collect();
            keys.sort_by(|a, b| b.cmp(a));
            let monthly_sales = keys
                .into_iter()
                .map(|key| MonthlySales {
                    month: format!("{:02}/{}", key.1, key.0),
                    total: money::round2(acc.months[&key]),
                })
                .collect();

            reports.push(SellerReport {
                id: id.to_string(),
                full_name: full_name.to_string(),
                city: row
                    .get("city")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                total_sales: money::round2(acc.total),
                monthly_sales,
            });
        }

        reports.sort_by(|a, b| {
            b.total_sales
                .partial_cmp(&a.total_sales)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if !sellers.is_empty() {
            tracing::warn!(count = sellers.len(), "orders from users without profiles skipped");
        }
        Ok(reports)
    }
}

fn month_of(created_at: &str) -> Option<(i32, u32)> {
    let parsed = DateTime::parse_from_rfc3339(created_at).ok()?;
    Some((parsed.year(), parsed.month()))
}
