// HTTP client for the sequencer gateway
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{AddTransactionResult, CallContractResult, Provider};
use crate::config::GatewayConfig;
use crate::crypto::{parse_felt, FieldElement, Signature};
use crate::error::{AccountError, Result};
use crate::transaction::ContractCall;

const CALL_CONTRACT_PATH: &str = "feeder_gateway/call_contract?blockId=pending";
const ADD_TRANSACTION_PATH: &str = "gateway/add_transaction";

#[derive(Debug, Serialize)]
struct CallContractRequest {
    contract_address: String,
    entry_point_selector: String,
    calldata: Vec<String>,
    signature: Vec<String>,
}

#[derive(Debug, Serialize)]
struct InvokeFunctionRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    contract_address: String,
    entry_point_selector: String,
    calldata: Vec<String>,
    signature: Vec<String>,
}

fn hex(felt: &FieldElement) -> String {
    format!("{:#x}", felt)
}

fn hex_all(felts: &[FieldElement]) -> Vec<String> {
    felts.iter().map(hex).collect()
}

fn call_request(call: &ContractCall) -> CallContractRequest {
    CallContractRequest {
        contract_address: hex(&call.contract_address),
        entry_point_selector: hex(&call.entry_point_selector),
        calldata: hex_all(&call.calldata),
        signature: Vec::new(),
    }
}

fn invoke_request(call: &ContractCall, signature: &Signature) -> InvokeFunctionRequest {
    InvokeFunctionRequest {
        kind: "INVOKE_FUNCTION",
        contract_address: hex(&call.contract_address),
        entry_point_selector: hex(&call.entry_point_selector),
        calldata: hex_all(&call.calldata),
        signature: hex_all(&signature.to_vec()),
    }
}

/// Extracts the gateway's error message, if the response carries one.
fn gateway_error(status: StatusCode, json: &Value) -> Option<String> {
    let message = json.get("message").and_then(Value::as_str);
    let code = json.get("code").and_then(Value::as_str);
    if !status.is_success() {
        return Some(format!(
            "{} ({})",
            message.unwrap_or("Unknown error"),
            code.unwrap_or(status.as_str())
        ));
    }
    match (code, message) {
        (Some(code), Some(message)) if code.starts_with("StarknetErrorCode") => {
            Some(format!("{} ({})", message, code))
        }
        _ => None,
    }
}

fn parse_call_result(status: StatusCode, json: &Value) -> Result<CallContractResult> {
    if let Some(err) = gateway_error(status, json) {
        return Err(AccountError::ContractRead(err));
    }
    let values = json
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| AccountError::Network("No 'result' field in response".to_string()))?;

    let result = values
        .iter()
        .map(|v| {
            v.as_str()
                .ok_or_else(|| AccountError::Network(format!("non-string result element {}", v)))
                .and_then(|s| parse_felt(s).map_err(|e| AccountError::Network(e.to_string())))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CallContractResult { result })
}

fn parse_add_transaction(status: StatusCode, json: &Value) -> Result<AddTransactionResult> {
    if let Some(err) = gateway_error(status, json) {
        return Err(AccountError::Network(err));
    }
    let code = json["code"].as_str().unwrap_or("").to_string();
    let transaction_hash = json["transaction_hash"]
        .as_str()
        .ok_or_else(|| AccountError::Network("No 'transaction_hash' field in response".to_string()))
        .and_then(|s| parse_felt(s).map_err(|e| AccountError::Network(e.to_string())))?;
    Ok(AddTransactionResult { code, transaction_hash })
}

pub struct GatewayClient {
    base_url: String,
    client: Client,
}

impl GatewayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AccountError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    // Helper for sending requests
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(StatusCode, Value)> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AccountError::Network(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        let json: Value = response
            .json()
            .await
            .map_err(|e| AccountError::Network(format!("Failed to parse response: {}", e)))?;
        Ok((status, json))
    }
}

#[async_trait]
impl Provider for GatewayClient {
    async fn call_contract(&self, call: &ContractCall) -> Result<CallContractResult> {
        let (status, json) = self.post(CALL_CONTRACT_PATH, &call_request(call)).await?;
        parse_call_result(status, &json)
    }

    async fn invoke_function(
        &self,
        call: &ContractCall,
        signature: &Signature,
    ) -> Result<AddTransactionResult> {
        let (status, json) = self
            .post(ADD_TRANSACTION_PATH, &invoke_request(call, signature))
            .await?;
        parse_add_transaction(status, &json)
    }
}
