//! Postal-code lookup
//!
//! Resolves a normalized 8-digit postal code to a partial address via
//! the public ViaCEP service. The service answers HTTP 200 with an
//! `{"erro": true}` body for codes that do not exist.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde::Deserialize;
use shared::models::PostalAddress;

/// Postal-code to partial-address resolution
#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// Look up a normalized (exactly 8 digits) postal code
    async fn lookup(&self, code: &str) -> ClientResult<PostalAddress>;
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    erro: bool,
}

/// ViaCEP HTTP client
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ViaCepClient {
    fn default() -> Self {
        Self::new("https://viacep.com.br")
    }
}

impl ViaCepClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PostalLookup for ViaCepClient {
    async fn lookup(&self, code: &str) -> ClientResult<PostalAddress> {
        let url = format!("{}/ws/{}/json/", self.base_url, code);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(ClientError::Internal(format!(
                "postal lookup failed with status {}",
                resp.status()
            )));
        }

        let body: ViaCepResponse = resp.json().await?;
        if body.erro {
            return Err(ClientError::NotFound(format!("postal code {}", code)));
        }

        Ok(PostalAddress {
            logradouro: body.logradouro,
            bairro: body.bairro,
            cidade: body.localidade,
            estado: body.uf,
        })
    }
}
