/// Path prefix of the email stream endpoint, relative to the API base URL.
pub const EMAIL_STREAM_PATH: &str = "/api/stream/emails/";

/// Settings resolved once at startup and handed to the bridge constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    base_api_url: String,
}

impl BridgeConfig {
    pub fn new(base_api_url: impl Into<String>) -> Self {
        Self {
            base_api_url: base_api_url.into(),
        }
    }

    pub fn base_api_url(&self) -> &str {
        &self.base_api_url
    }

    /// Endpoint URL for an application identifier. The identifier is appended
    /// verbatim; it is an opaque token owned by the runtime.
    pub fn email_stream_url(&self, application_identifier: &str) -> String {
        format!(
            "{}{}{}",
            self.base_api_url.trim_end_matches('/'),
            EMAIL_STREAM_PATH,
            application_identifier
        )
    }
}
