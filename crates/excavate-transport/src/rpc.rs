//! Solana JSON-RPC clock source
//!
//! Issues `getSlot` and `getEpochInfo` together per reading. Any transport
//! failure, non-success HTTP status, JSON-RPC error object or ill-typed
//! payload surfaces as a network-kind `ExcavateError`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use excavate_core::{ExcavateError, ExcavateResult};

use crate::{ClockReading, RemoteClockSource};

/// Primary environment variable holding the RPC endpoint
pub const RPC_URL_ENV: &str = "EXCAVATE_RPC_URL";

/// Consulted when `RPC_URL_ENV` is unset
pub const RPC_URL_FALLBACK_ENV: &str = "EXCAVATE_MAINNET_RPC_URL";

/// Per-request timeout
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// RPC endpoint configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcConfig {
    /// HTTP(S) JSON-RPC endpoint
    pub url: String,
    /// Timeout applied to each request
    pub timeout: Duration,
    /// Commitment level passed to both calls
    pub commitment: String,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RpcConfig {
            url: url.into(),
            timeout: DEFAULT_RPC_TIMEOUT,
            commitment: "confirmed".to_string(),
        }
    }

    /// Read the endpoint from the environment
    pub fn from_env() -> ExcavateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ExcavateResult<Self> {
        let url = [RPC_URL_ENV, RPC_URL_FALLBACK_ENV]
            .iter()
            .filter_map(|key| lookup(*key))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or_else(|| {
                ExcavateError::Config(format!("{RPC_URL_ENV} or {RPC_URL_FALLBACK_ENV} must be set"))
            })?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ExcavateError::Config(format!("RPC url must be http(s): {url}")));
        }

        Ok(Self::new(url))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `getEpochInfo` result
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub slots_in_epoch: u64,
    pub slot_index: u64,
    #[serde(default)]
    pub epoch: u64,
    #[serde(default)]
    pub absolute_slot: u64,
}

/// Decode a JSON-RPC response body into its result
fn parse_response<T: DeserializeOwned>(method: &str, body: Value) -> ExcavateResult<T> {
    let response: RpcResponse<T> = serde_json::from_value(body)
        .map_err(|e| ExcavateError::MalformedResponse(format!("{method}: {e}")))?;

    if let Some(err) = response.error {
        return Err(ExcavateError::MalformedResponse(format!(
            "{method} error {}: {}",
            err.code, err.message
        )));
    }

    response
        .result
        .ok_or_else(|| ExcavateError::MalformedResponse(format!("{method}: missing 'result'")))
}

/// Clock source backed by a Solana JSON-RPC endpoint
pub struct RpcClockSource {
    client: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl RpcClockSource {
    pub fn new(config: RpcConfig) -> ExcavateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExcavateError::Config(format!("http client: {e}")))?;

        Ok(RpcClockSource {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ExcavateResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExcavateError::Network(format!("{method}: {e}")))?;

        if !response.status().is_success() {
            return Err(ExcavateError::Network(format!(
                "{method}: HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ExcavateError::MalformedResponse(format!("{method}: {e}")))?;

        parse_response(method, body)
    }

    /// Current slot at the configured commitment
    pub async fn get_slot(&self) -> ExcavateResult<u64> {
        self.call("getSlot", json!([{ "commitment": self.config.commitment }]))
            .await
    }

    /// Epoch progress at the configured commitment
    pub async fn get_epoch_info(&self) -> ExcavateResult<EpochInfo> {
        self.call("getEpochInfo", json!([{ "commitment": self.config.commitment }]))
            .await
    }
}

impl RemoteClockSource for RpcClockSource {
    fn read(&self) -> impl Future<Output = ExcavateResult<ClockReading>> + Send {
        async move {
            let (slot, epoch) = tokio::try_join!(self.get_slot(), self.get_epoch_info())?;
            let reading = ClockReading::new(slot, epoch.slots_in_epoch, epoch.slot_index);
            debug!(slot, epoch = epoch.epoch, slot_index = epoch.slot_index, "rpc clock reading");
            Ok(reading)
        }
    }
}

impl std::fmt::Debug for RpcClockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClockSource")
            .field("url", &self.config.url)
            .finish_non_exhaustive()
    }
}

/// Read once from `url`, for diagnostics
#[instrument(skip_all, fields(url = %config.url))]
pub async fn read_once(config: RpcConfig) -> ExcavateResult<ClockReading> {
    RpcClockSource::new(config)?.read().await
}
