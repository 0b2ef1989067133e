use std::env;

/// HTTP server bind settings. Defaults to loopback:8080 so a bare
/// `cargo run` never exposes the service on an external interface.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl AppConfig {
    /// Load from APP_HOST / APP_PORT, falling back to the defaults when
    /// unset or unparseable.
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| AppConfig::default().host);
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| AppConfig::default().port);
        AppConfig { host, port }
    }

    /// `host:port` string handed to the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_loopback() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bind_addr_format() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
