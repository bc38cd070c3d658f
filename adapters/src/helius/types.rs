use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SPL Token program; every token account change is published under it.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'a str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub struct RpcEnvelope {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<NotificationParams>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationParams {
    pub result: NotificationResult,
}

#[derive(Debug, Deserialize)]
pub struct NotificationResult {
    pub value: KeyedAccount,
}

#[derive(Debug, Deserialize)]
pub struct KeyedAccount {
    #[serde(default)]
    pub pubkey: Option<String>,
    pub account: Account,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    /// `jsonParsed` encoding yields an object; other encodings an array.
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct ParsedData {
    pub parsed: ParsedAccount,
}

#[derive(Debug, Deserialize)]
pub struct ParsedAccount {
    #[serde(rename = "type")]
    pub kind: String,
    pub info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
pub struct TokenAccountInfo {
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(rename = "tokenAmount", default)]
    pub token_amount: Option<TokenAmount>,
}

#[derive(Debug, Deserialize)]
pub struct TokenAmount {
    #[serde(rename = "uiAmount", default)]
    pub ui_amount: Option<f64>,
    #[serde(rename = "uiAmountString", default)]
    pub ui_amount_string: Option<String>,
}
