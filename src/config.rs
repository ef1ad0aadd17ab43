/// Everything needed to construct a [`crate::Provider`] against a real
/// server. Validation happens at construction time, not here.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Server base address, e.g. "http://127.0.0.1:8081".
    pub server_url: String,
    /// Value for the X-API-Key header.
    pub api_key: String,
    /// Server id within the API, almost always "localhost" unless something
    /// like pdnsproxy sits in between.
    pub server_id: String,
    /// Only the degenerate "no filter" configuration is accepted: empty, or
    /// entries that are all empty strings.
    pub domain_filter: Vec<String>,
    /// Not supported; rejected at construction rather than silently ignored.
    pub dry_run: bool,
}

impl ProviderConfig {
    /// Full API base URL (e.g. "http://127.0.0.1:8081/api/v1").
    pub fn api_base_url(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), API_BASE)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            api_key: String::new(),
            server_id: DEFAULT_SERVER_ID.to_string(),
            domain_filter: Vec::new(),
            dry_run: false,
        }
    }
}

const API_BASE: &str = "/api/v1";

pub const DEFAULT_SERVER_ID: &str = "localhost";
