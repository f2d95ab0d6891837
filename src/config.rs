use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Attendance reporting server.
#[derive(Parser, Debug, Clone)]
#[command(name = "attendanced", about = "Attendance reporting server", version)]
pub struct ServerConfig {
    /// Listen address for the HTTP server.
    #[arg(long, env = "ATTENDANCED_LISTEN", default_value = "0.0.0.0:4000")]
    pub listen: String,

    /// Workspace directory holding the SQLite database.
    #[arg(long, env = "ATTENDANCED_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Path prefix every route is mounted under.
    #[arg(long, env = "ATTENDANCED_BASE_PATH", default_value = "/api")]
    pub base_path: String,

    /// Per-request deadline in seconds.
    #[arg(long, env = "ATTENDANCED_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen.trim().is_empty() {
            anyhow::bail!("listen address is empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request timeout must be at least one second");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_mobile_client() {
        let cfg = ServerConfig::try_parse_from(["attendanced"]).expect("parse");
        assert_eq!(cfg.listen, "0.0.0.0:4000");
        assert_eq!(cfg.base_path, "/api");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        cfg.validate().expect("valid defaults");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = ServerConfig::try_parse_from(["attendanced", "--request-timeout-secs", "0"])
            .expect("parse");
        assert!(cfg.validate().is_err());
    }
}
