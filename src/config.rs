/// Client configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Game server URL the transport should connect to.
    pub server_url: String,
    /// How many reconnect attempts the transport should make.
    pub reconnect_attempts: u32,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        ClientConfig {
            server_url: std::env::var("FOG_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            reconnect_attempts: std::env::var("FOG_RECONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: "http://localhost:3001".to_string(),
            reconnect_attempts: 5,
        }
    }
}
