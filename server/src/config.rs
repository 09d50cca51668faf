use std::time::Duration;

/// Runtime settings for the network server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind, e.g. `0.0.0.0` or `127.0.0.1`.
    pub host: String,
    /// TCP port to listen on. Port 0 picks an ephemeral port.
    pub port: u16,
    /// Upper bound on a single write to one client. `None` waits indefinitely.
    pub send_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
            send_timeout: None,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
