/// Ledger resolver adapter
///
/// Narrow capability trait over the two ledger reads the verifier needs,
/// plus a JSON-RPC implementation against a rippled endpoint. Keeping the
/// trait small lets tests substitute an in-memory fake for the network.
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{Result, VouchError};

/// Public JSON-RPC cluster, used when no endpoint is configured.
const DEFAULT_ENDPOINT: &str = "https://s1.ripple.com:51234/";

/// Read-only ledger queries consumed by the verifier.
#[async_trait]
pub trait LedgerResolver: Send + Sync {
    /// The hex-encoded domain field of the account root, if any.
    ///
    /// `Ok(None)` covers both a missing account and an account without a
    /// domain field; the caller decides what absence means.
    async fn domain_attribute(&self, address: &str) -> Result<Option<String>>;

    /// The master key delegating to the given ephemeral signing key, if
    /// the network knows such a mapping.
    async fn master_key(&self, ephemeral: &str) -> Result<Option<String>>;
}

/// `LedgerResolver` over rippled's JSON-RPC API.
pub struct RippledClient {
    client: reqwest::Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: T,
}

#[derive(Deserialize)]
struct AccountInfoResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    account_data: Option<AccountData>,
}

#[derive(Deserialize)]
struct AccountData {
    #[serde(rename = "Domain")]
    domain: Option<String>,
}

#[derive(Deserialize)]
struct ManifestResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<ManifestDetails>,
}

#[derive(Deserialize)]
struct ManifestDetails {
    #[serde(default)]
    master_key: Option<String>,
}

impl Default for RippledClient {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_ENDPOINT).unwrap())
    }
}

impl RippledClient {
    pub fn new(endpoint: Url) -> Self {
        RippledClient {
            client: reqwest::Client::builder()
                .user_agent(concat!("vouch/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap(),
            endpoint,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let body = serde_json::json!({
            "method": method,
            "params": [params],
        });
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: RpcResponse<T> = response.json().await?;
        Ok(parsed.result)
    }
}

#[async_trait]
impl LedgerResolver for RippledClient {
    async fn domain_attribute(&self, address: &str) -> Result<Option<String>> {
        tracing::debug!(address, "querying account domain attribute");
        let result: AccountInfoResult = self
            .call(
                "account_info",
                serde_json::json!({ "account": address, "ledger_index": "validated" }),
            )
            .await?;

        match result.error.as_deref() {
            Some("actNotFound") => Ok(None),
            Some(err) => Err(VouchError::LedgerRpc(err.to_string())),
            None => Ok(result
                .account_data
                .and_then(|data| data.domain)
                .filter(|hex| !hex.is_empty())),
        }
    }

    async fn master_key(&self, ephemeral: &str) -> Result<Option<String>> {
        tracing::debug!(key = ephemeral, "resolving master key via manifest");
        let result: ManifestResult = self
            .call("manifest", serde_json::json!({ "public_key": ephemeral }))
            .await?;

        match result.error.as_deref() {
            // No manifest is known for this key; there is no delegation.
            Some("actNotFound") | Some("unknownValidator") => Ok(None),
            Some(err) => Err(VouchError::LedgerRpc(err.to_string())),
            None => Ok(result.details.and_then(|details| details.master_key)),
        }
    }
}
