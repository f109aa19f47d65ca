use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Runtime configuration for the recognition server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: IpAddr,

    /// Port to bind (default: 5000)
    pub port: u16,

    /// Directory where decoded uploads are written (default: "received_images")
    pub upload_dir: PathBuf,

    /// Directory holding the append-only log file (default: ".")
    pub log_dir: PathBuf,

    /// Log file name inside `log_dir` (default: "server.log")
    pub log_file: String,

    /// Maximum request body size in bytes (default: 10 MB)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            upload_dir: PathBuf::from("received_images"),
            log_dir: PathBuf::from("."),
            log_file: "server.log".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.host),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.log_dir),

            log_file: env::var("LOG_FILE").unwrap_or(default.log_file),

            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_body_size),
        }
    }

    /// Config for tests and local runs: loopback only, uploads under `upload_dir`
    pub fn development(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            upload_dir: upload_dir.into(),
            ..Self::default()
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
