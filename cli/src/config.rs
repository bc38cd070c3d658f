use adapters::{helius, pumpportal};

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Discovery / migration / curve-update feed.
    pub pumpportal_url: String,

    /// Balance-change feed endpoint with the api key applied.
    ///
    /// `None` when no `HELIUS_API_KEY` is set; the scanner then runs without
    /// trade metrics.
    pub helius_url: Option<String>,

    /// `APP_ENV=production` switches logs to JSON.
    pub is_production: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let pumpportal_url = get("PUMPPORTAL_WS_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| pumpportal::DEFAULT_URL.to_string());

        let helius_base = get("HELIUS_WS_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| helius::DEFAULT_URL.to_string());

        let helius_url = get("HELIUS_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|key| helius::endpoint(&helius_base, &key));

        Self {
            pumpportal_url,
            helius_url,
            is_production: get("APP_ENV").unwrap_or_default() == "production",
        }
    }
}
