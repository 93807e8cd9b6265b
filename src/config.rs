use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Origins always permitted by CORS (local frontend dev servers).
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub credentials: CredentialConfig,
    pub cors: CorsConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 600,
        }
    }
}

/// Optional alias credential: a non-secret token that stands in for a real key.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub alias_name: Option<String>,
    pub alias_value: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("alias_name", &self.alias_name)
            .field("alias_value", &self.alias_value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Extra host (without scheme) added to the allow-list as `https://<host>`
    pub extra_origin: Option<String>,
    /// Mirror any request origin instead of using the allow-list
    pub allow_any_origin: bool,
}

impl CorsConfig {
    /// Full allow-list: the local dev origins plus the configured extra origin
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(host) = self.extra_origin.as_deref().filter(|h| !h.is_empty()) {
            origins.push(format!("https://{}", host));
        }
        origins
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub static_dir: PathBuf,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (process env, a parsed `.env` file)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = GatewayConfig::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            config.server.port = port
                .parse::<u16>()
                .map_err(|e| GatewayError::ConfigError(format!("Invalid port value: {}", e)))?;
        }

        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            config.upstream.base_url = base_url;
        }

        if let Some(timeout) = lookup("OPENAI_TIMEOUT_SECS") {
            config.upstream.timeout_secs = timeout.parse::<u64>().map_err(|e| {
                GatewayError::ConfigError(format!("Invalid timeout value: {}", e))
            })?;
        }

        if let Some(dir) = lookup("STATIC_DIR") {
            config.frontend.static_dir = PathBuf::from(dir);
        }

        if let Some(flag) = lookup("CORS_ALLOW_ANY_ORIGIN") {
            config.cors.allow_any_origin = parse_flag(&flag);
        }

        config.cors.extra_origin = lookup("RAILWAY_STATIC_URL");
        config.apply_credentials(&lookup);

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| GatewayError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&contents)?;

        // Secrets from the environment win over the file
        config.apply_credentials(&|key: &str| env::var(key).ok());

        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| GatewayError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    fn apply_credentials(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("CUSTOM_API_KEY_NAME") {
            self.credentials.alias_name = Some(name);
        }
        if let Some(value) = lookup("CUSTOM_API_KEY_VALUE") {
            self.credentials.alias_value = Some(value);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.upstream.base_url.is_empty() {
            return Err(GatewayError::ConfigError(
                "Upstream base URL is empty".to_string(),
            ));
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(GatewayError::ConfigError(format!(
                "Upstream base URL must be http(s): {}",
                self.upstream.base_url
            )));
        }

        if self.upstream.timeout_secs == 0 {
            return Err(GatewayError::ConfigError(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        // A half-configured alias would silently never match
        let name_set = self.credentials.alias_name.as_deref().is_some_and(|s| !s.is_empty());
        let value_set = self.credentials.alias_value.as_deref().is_some_and(|s| !s.is_empty());
        if name_set != value_set {
            tracing::warn!(
                "Only one of CUSTOM_API_KEY_NAME / CUSTOM_API_KEY_VALUE is set; alias credential disabled"
            );
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_validation() {
        let valid_config = GatewayConfig::default();
        assert!(valid_config.validate().is_ok());

        let mut invalid_config = GatewayConfig::default();
        invalid_config.upstream.timeout_secs = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = GatewayConfig::default();
        invalid_config.upstream.base_url = "api.openai.com".to_string();
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.upstream.base_url, "https://api.openai.com/v1");
        assert!(config.credentials.alias_name.is_none());
        assert!(!config.cors.allow_any_origin);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [server]
            port = 9090

            [credentials]
            alias_name = "GIFT-2024"
            alias_value = "sk-real"

            [cors]
            extra_origin = "app.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.credentials.alias_name.as_deref(), Some("GIFT-2024"));
        assert_eq!(config.upstream.timeout_secs, 600);
        assert_eq!(
            config.cors.allowed_origins(),
            vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "https://app.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert!(GatewayConfig::from_toml_str("[server]\nport = \"abc\"").is_err());
    }

    #[test]
    fn test_credential_debug_redacts_value() {
        let creds = CredentialConfig {
            alias_name: Some("GIFT".to_string()),
            alias_value: Some("sk-secret".to_string()),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("GIFT"));
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn test_dotenv_file_supplies_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "CUSTOM_API_KEY_NAME=GIFT-2024\nCUSTOM_API_KEY_VALUE=sk-real\nRAILWAY_STATIC_URL=app.example.com\nPORT=9000\n",
        )
        .unwrap();

        let vars: HashMap<String, String> = dotenvy::from_path_iter(&path)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();
        let config = GatewayConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.credentials.alias_name.as_deref(), Some("GIFT-2024"));
        assert_eq!(config.credentials.alias_value.as_deref(), Some("sk-real"));
        assert_eq!(
            config.cors.allowed_origins().last().map(String::as_str),
            Some("https://app.example.com")
        );
    }

    #[test]
    fn test_lookup_rejects_bad_port() {
        let result = GatewayConfig::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(GatewayError::ConfigError(_))));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("no"));
    }
}
