//! Settings management
//!
//! Environment-driven configuration for the recovery core, mirroring the
//! daemon's view of the backend it fronts.

use serde::{Deserialize, Serialize};

// ============================================================================
// Settings Constants
// ============================================================================

/// Default backend base URL (the engine's HTTP statement endpoint).
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:9308";

/// Default backend request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Endpoint path used for statements that are not the caller-facing final
/// statement of a batch.
pub const DEFAULT_SQL_PATH: &str = "sql?mode=raw";

/// Recovery core settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Backend base URL
    pub backend_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Whether the backend runs in a mode that supports dynamic table
    /// creation (real-time mode); recovery is impossible without it
    pub rt_mode: bool,

    /// Whether the auto-schema feature is enabled
    pub auto_schema: bool,
}

impl Settings {
    /// Load settings from environment variables and defaults
    ///
    /// Environment variables:
    /// - `AUTOTABLE_BACKEND_URL`: backend base URL
    /// - `AUTOTABLE_REQUEST_TIMEOUT`: request timeout in seconds
    /// - `AUTOTABLE_RT_MODE`: dynamic-schema-capable backend mode (bool)
    /// - `AUTOTABLE_AUTO_SCHEMA`: auto-schema feature flag (bool)
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Settings {
            backend_url: std::env::var("AUTOTABLE_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            request_timeout_secs: std::env::var("AUTOTABLE_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            rt_mode: std::env::var("AUTOTABLE_RT_MODE")
                .map(|s| parse_bool(&s))
                .unwrap_or(true),
            auto_schema: std::env::var("AUTOTABLE_AUTO_SCHEMA")
                .map(|s| parse_bool(&s))
                .unwrap_or(true),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend_url.is_empty() {
            anyhow::bail!("Backend URL cannot be empty");
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            rt_mode: true,
            auto_schema: true,
        }
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
