//! Helius `programNotification` parser for token-account balance changes.
//!
//! ```jsonc
//! { "jsonrpc": "2.0", "method": "programNotification",
//!   "params": { "subscription": 24040, "result": { "context": { "slot": 5208469 },
//!     "value": { "pubkey": "...", "account": { "data": {
//!       "program": "spl-token",
//!       "parsed": { "type": "account", "info": {
//!         "mint": "...", "owner": "...",
//!         "tokenAmount": { "uiAmount": 12.5, "uiAmountString": "12.5" } } } } } } } }
//! ```
//!
//! The `{"result": <id>, "id": 1}` subscription reply parses to `None`.

use super::types::{ParsedData, RpcEnvelope};
use crate::error::FeedError;

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceUpdate {
    pub mint: String,
    pub owner: String,
    pub balance: f64,
}

pub fn parse_balance_update(raw: &str) -> Result<Option<BalanceUpdate>, FeedError> {
    let env: RpcEnvelope = serde_json::from_str(raw)?;

    if let Some(err) = env.error {
        return Err(FeedError::Rpc(format!("{} ({})", err.message, err.code)));
    }
    if env.method.as_deref() != Some("programNotification") {
        return Ok(None);
    }
    let Some(params) = env.params else {
        return Err(FeedError::MissingField("params"));
    };

    let data: ParsedData = serde_json::from_value(params.result.value.account.data)?;
    if data.parsed.kind != "account" {
        // mint and multisig accounts carry no balance
        return Ok(None);
    }

    let info = data.parsed.info;
    let mint = info.mint.ok_or(FeedError::MissingField("mint"))?;
    let owner = info.owner.ok_or(FeedError::MissingField("owner"))?;
    let amount = info
        .token_amount
        .ok_or(FeedError::MissingField("tokenAmount"))?;

    let balance = match (amount.ui_amount_string, amount.ui_amount) {
        (Some(s), _) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FeedError::InvalidNumber {
                field: "uiAmountString",
                value: s.clone(),
            })?,
        (None, Some(n)) => n,
        (None, None) => return Err(FeedError::MissingField("uiAmount")),
    };
    if !balance.is_finite() || balance < 0.0 {
        return Err(FeedError::InvalidNumber {
            field: "uiAmount",
            value: balance.to_string(),
        });
    }

    Ok(Some(BalanceUpdate {
        mint,
        owner,
        balance,
    }))
}
