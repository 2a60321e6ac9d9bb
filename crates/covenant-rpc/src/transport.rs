//! Transport layer for RPC communication

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::RpcError;

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get the JSON `result`
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::Serialization(e.to_string()))
}

type Responses = HashMap<String, Result<Value, RpcError>>;

/// Mock transport for testing.
///
/// Answers from per-method canned responses and records every request.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<Responses>>,
    default_responses: Arc<Responses>,
    requests: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = Responses::new();
        let mut default = |method: &str, value: &str| {
            defaults.insert(method.to_string(), Ok(Value::String(value.to_string())));
        };

        default("eth_chainId", "0x1");
        default("eth_gasPrice", "0x3b9aca00"); // 1 gwei
        default("eth_blockNumber", "0x100"); // Block 256
        default("eth_getTransactionCount", "0x0");
        default(
            "eth_sendRawTransaction",
            "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
        );
        default("eth_call", "0x");
        defaults.insert("eth_getTransactionReceipt".to_string(), Ok(Value::Null));

        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_responses: Arc::new(defaults),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a mock response for a specific method
    pub fn set_response(&self, method: &str, response: Value) {
        self.set(method, Ok(response));
    }

    /// Make a method fail with a node error
    pub fn set_error(&self, method: &str, code: i64, message: &str) {
        self.set(method, Err(RpcError::node(code, message)));
    }

    fn set(&self, method: &str, response: Result<Value, RpcError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(method.to_string(), response);
        }
    }

    /// Clear custom responses
    pub fn clear_responses(&self) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.clear();
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let poisoned = || RpcError::Transport("MockTransport mutex poisoned".to_string());

        self.requests
            .lock()
            .map_err(|_| poisoned())?
            .push((method.to_string(), params));

        // Check custom responses first
        let custom_response = self
            .responses
            .lock()
            .map_err(|_| poisoned())?
            .get(method)
            .cloned();

        custom_response
            .or_else(|| self.default_responses.get(method).cloned())
            .unwrap_or_else(|| Err(RpcError::node(-32601, format!("Method not found: {}", method))))
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        response.into_result()
    }
}

#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl JsonRpcResponse {
    /// A `null` result is a valid answer (e.g. a receipt not mined yet)
    fn into_result(self) -> Result<Value, RpcError> {
        if let Some(error) = self.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}
