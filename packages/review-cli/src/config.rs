use anyhow::{bail, Result};
use dotenvy::dotenv;
use review_client::DEFAULT_BASE_URL;
use review_workflow::ApiKey;
use std::env;
use std::path::PathBuf;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub export_dir: PathBuf,
    /// Only held for this process; never written anywhere.
    pub api_key: Option<ApiKey>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config = Self {
            api_url: env::var("REVIEW_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            export_dir: env::var("REVIEW_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(ApiKey::new)
                .filter(|key| !key.is_empty()),
        };
        validate_api_url(&config.api_url)?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, export_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(url) = api_url {
            validate_api_url(&url)?;
            self.api_url = url;
        }
        if let Some(dir) = export_dir {
            self.export_dir = dir;
        }
        Ok(self)
    }
}

fn validate_api_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("API URL must start with http:// or https:// (got {:?})", url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            api_url: DEFAULT_BASE_URL.to_string(),
            export_dir: PathBuf::from("."),
            api_key: None,
        }
    }

    #[test]
    fn test_overrides_apply() {
        let config = base()
            .with_overrides(Some("https://reviews.example.com".into()), Some("out".into()))
            .unwrap();
        assert_eq!(config.api_url, "https://reviews.example.com");
        assert_eq!(config.export_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_no_overrides_keeps_env_values() {
        let config = base().with_overrides(None, None).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(base().with_overrides(Some("localhost:8000".into()), None).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config {
            api_key: Some(ApiKey::new("AIza-secret")),
            ..base()
        };
        assert!(!format!("{:?}", config).contains("AIza"));
    }
}
