//! Postal-code handling and shipping quotes
//!
//! Carrier quotes are simulated: a randomized base cost with fixed
//! per-carrier multipliers and delivery windows. Wiring a real carrier
//! API in means replacing `quote` while keeping the option shape.

use crate::money;
use mix_client::{ClientError, PostalLookup};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::models::{PostalAddress, ShippingOption};
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

/// Normalize a postal code to its 8-digit form
///
/// Strips every non-digit; anything other than exactly 8 digits is
/// rejected.
pub fn normalize_postal_code(raw: &str) -> AppResult<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return Err(AppError::new(ErrorCode::PostalCodeInvalid));
    }
    Ok(digits)
}

pub struct ShippingCalculator {
    postal: Arc<dyn PostalLookup>,
    rng: Mutex<StdRng>,
}

impl ShippingCalculator {
    pub fn new(postal: Arc<dyn PostalLookup>) -> Self {
        Self {
            postal,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic quotes for tests
    pub fn with_seed(postal: Arc<dyn PostalLookup>, seed: u64) -> Self {
        Self {
            postal,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Normalize and resolve a postal code to a partial address
    pub async fn resolve_address(&self, raw_code: &str) -> AppResult<PostalAddress> {
        let code = normalize_postal_code(raw_code)?;
        self.postal.lookup(&code).await.map_err(|err| match err {
            ClientError::NotFound(_) => AppError::new(ErrorCode::PostalCodeNotFound),
            other => AppError::with_message(ErrorCode::PostalLookupFailed, other.to_string()),
        })
    }

    /// Simulated carrier quotes
    pub fn quote(&self) -> Vec<ShippingOption> {
        let mut rng = self.rng.lock();
        let base = 20.0 + rng.gen_range(0.0..20.0);
        vec![
            ShippingOption {
                name: "PAC".into(),
                cost: money::round2(money::to_decimal(base)),
                days: 8 + rng.gen_range(0..4),
            },
            ShippingOption {
                name: "SEDEX".into(),
                cost: money::round2(money::to_decimal(base * 1.8)),
                days: 3 + rng.gen_range(0..2),
            },
            ShippingOption {
                name: "Jadlog".into(),
                cost: money::round2(money::to_decimal(base * 1.4)),
                days: 5 + rng.gen_range(0..3),
            },
        ]
    }
}
