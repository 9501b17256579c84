use std::env;
use std::path::PathBuf;

/// Upload ceiling applied when `MAX_UPLOAD_BYTES` is unset (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub frontend_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiry_secs: env::var("JWT_EXPIRY_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            tls_cert_path: env::var("TLS_CERT_PATH").ok().map(PathBuf::from),
            tls_key_path: env::var("TLS_KEY_PATH").ok().map(PathBuf::from),
        })
    }

    /// Both halves of the TLS key pair, if HTTPS is configured.
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert_path.as_ref().zip(self.tls_key_path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/smartlearn".to_string(),
            database_max_connections: 10,
            host: "0.0.0.0".to_string(),
            port: 5000,
            jwt_secret: "secret".to_string(),
            jwt_expiry_secs: 86400,
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: "uploads".into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }

    #[test]
    fn default_upload_ceiling_is_fifty_mebibytes() {
        assert_eq!(DEFAULT_MAX_UPLOAD_BYTES, 52_428_800);
    }

    #[test]
    fn tls_requires_both_paths() {
        let mut config = sample();
        assert!(config.tls_paths().is_none());

        config.tls_cert_path = Some("cert.pem".into());
        assert!(config.tls_paths().is_none());

        config.tls_key_path = Some("key.pem".into());
        assert!(config.tls_paths().is_some());
    }
}
