use hearth_events::VapidConfig;

use crate::auth::jwt::JwtConfig;

/// Default interval between overdue receivable scans.
const DEFAULT_RECEIVABLE_CHECK_INTERVAL_SECS: u64 = 3600;

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
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Web Push identity. `None` disables push delivery.
    pub vapid: Option<VapidConfig>,
    /// Seconds between overdue receivable scans (default: `3600`).
    pub receivable_check_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                   |
    /// |----------------------------------|---------------------------|
    /// | `HOST`                           | `0.0.0.0`                 |
    /// | `PORT`                           | `3000`                    |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`   |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                      |
    /// | `VAPID_PUBLIC_KEY`               | unset (push disabled)     |
    /// | `VAPID_PRIVATE_KEY_PEM`          | unset (push disabled)     |
    /// | `VAPID_SUBJECT`                  | `mailto:admin@localhost`  |
    /// | `RECEIVABLE_CHECK_INTERVAL_SECS` | `3600`                    |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let receivable_check_interval_secs: u64 = std::env::var("RECEIVABLE_CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_RECEIVABLE_CHECK_INTERVAL_SECS.to_string())
            .parse()
            .expect("RECEIVABLE_CHECK_INTERVAL_SECS must be a valid u64");
        assert!(
            receivable_check_interval_secs > 0,
            "RECEIVABLE_CHECK_INTERVAL_SECS must be greater than zero"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            vapid: vapid_from_env(),
            receivable_check_interval_secs,
        }
    }
}

/// Read the VAPID key pair. Push stays disabled unless both keys are set.
fn vapid_from_env() -> Option<VapidConfig> {
    let public_key = std::env::var("VAPID_PUBLIC_KEY").ok().filter(|v| !v.is_empty());
    let private_key_pem = std::env::var("VAPID_PRIVATE_KEY_PEM")
        .ok()
        .filter(|v| !v.is_empty());

    match (public_key, private_key_pem) {
        (Some(public_key), Some(private_key_pem)) => Some(VapidConfig {
            public_key,
            // Allow single-line env values with literal `\n`.
            private_key_pem: private_key_pem.replace("\\n", "\n"),
            subject: std::env::var("VAPID_SUBJECT")
                .unwrap_or_else(|_| "mailto:admin@localhost".into()),
        }),
        _ => None,
    }
}
