//! Client configuration

/// Client configuration for the remote ordering API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g. "https://api.example.com")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
        }
    }

    /// Load from environment variables, falling back to defaults
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | API_URL | http://localhost:8000 |
    /// | REQUEST_TIMEOUT_SECS | 30 |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_client(&self) -> super::HttpClient {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
