//! Server configuration for the JSON:API listing server.
//!
//! Supports programmatic configuration, command line arguments and
//! environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TESSERA_SERVER_PORT` | 8080 | Server port |
//! | `TESSERA_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `TESSERA_LOG_LEVEL` | info | Log level |
//! | `TESSERA_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `TESSERA_ENABLE_CORS` | true | Enable CORS |
//! | `TESSERA_CORS_ORIGINS` | * | Allowed origins |
//! | `TESSERA_BASE_URL` | http://localhost:8080 | Base URL used in links |
//! | `TESSERA_DEFAULT_PAGE_SIZE` | 20 | Page size when none is requested |
//! | `TESSERA_MAX_PAGE_SIZE` | 50 | Largest page a client may request |
//!
//! # Example
//!
//! ```rust
//! use tessera_jsonapi::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(config.socket_addr(), "0.0.0.0:3000");
//! ```

use clap::Parser;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tessera")]
#[command(about = "JSON:API resource listing server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "TESSERA_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "TESSERA_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TESSERA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "TESSERA_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "TESSERA_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "TESSERA_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Base URL for the server (used in document and resource links).
    #[arg(long, env = "TESSERA_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Default page size for listings.
    #[arg(long, env = "TESSERA_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: u64,

    /// Maximum page size for listings.
    #[arg(long, env = "TESSERA_MAX_PAGE_SIZE", default_value = "50")]
    pub max_page_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            base_url: "http://localhost:8080".to_string(),
            default_page_size: 20,
            max_page_size: 50,
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            errors.push(format!("Base URL is not a valid URL: {}", self.base_url));
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            base_url: "http://localhost".to_string(),
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}
