use std::path::PathBuf;

use realeagent_cloud::S3Config;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the template PDFs.
    pub templates_dir: PathBuf,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

/// Where generated PDFs are written.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Local fallback directory (and the only store when S3 is unset).
    pub local_dir: PathBuf,
    /// Present only when endpoint, bucket, and both keys are configured.
    pub s3: Option<S3Config>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                        |
    /// |------------------------|------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                      |
    /// | `PORT`                 | `3000`                                         |
    /// | `CORS_ORIGINS`         | `http://localhost:3000,http://localhost:8081`  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                           |
    /// | `TEMPLATES_DIR`        | `./templates`                                  |
    ///
    /// See [`JwtConfig::from_env`] and [`StorageConfig::from_env`] for the
    /// remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8081".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let templates_dir = std::env::var("TEMPLATES_DIR")
            .unwrap_or_else(|_| "./templates".into())
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            templates_dir,
            jwt: JwtConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

impl StorageConfig {
    /// | Env Var             | Default       |
    /// |---------------------|---------------|
    /// | `LOCAL_STORAGE_DIR` | `./storage`   |
    /// | `S3_ENDPOINT`       | --            |
    /// | `S3_BUCKET`         | --            |
    /// | `S3_REGION`         | `us-east-1`   |
    /// | `S3_ACCESS_KEY`     | --            |
    /// | `S3_SECRET_KEY`     | --            |
    pub fn from_env() -> Self {
        let local_dir = std::env::var("LOCAL_STORAGE_DIR")
            .unwrap_or_else(|_| "./storage".into())
            .into();

        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let s3 = match (
            var("S3_ENDPOINT"),
            var("S3_BUCKET"),
            var("S3_ACCESS_KEY"),
            var("S3_SECRET_KEY"),
        ) {
            (Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)) => Some(S3Config {
                endpoint,
                bucket,
                region: var("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
                access_key,
                secret_key,
            }),
            _ => None,
        };

        Self { local_dir, s3 }
    }
}
