use serde::{Deserialize, Serialize};

/// Every PumpPortal data frame, flattened. Which fields are present depends
/// on `txType`.
#[derive(Debug, Clone, Deserialize)]
pub struct PumpMessage {
    #[serde(rename = "txType", default)]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(rename = "vSolInBondingCurve", default)]
    pub v_sol_in_bonding_curve: Option<f64>,
    #[serde(rename = "vTokensInBondingCurve", default)]
    pub v_tokens_in_bonding_curve: Option<f64>,
    #[serde(rename = "marketCapSol", default)]
    pub market_cap_sol: Option<f64>,
    /// Subscription acknowledgements carry only this.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest<'a> {
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<&'a str>>,
}
