/// Runtime settings for talking to the CJ Dropshipping API.
#[derive(Clone)]
pub struct AppConfig {
    /// Vendor API key exchanged for an access token on first use.
    pub cj_api_key: String,
    pub base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Pause between sequential product-detail lookups made by callers.
    /// The client itself never sleeps between requests.
    pub lookup_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("cj_api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("lookup_delay_ms", &self.lookup_delay_ms)
            .finish()
    }
}
