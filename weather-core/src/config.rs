use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_QWEATHER_HOST: &str = "https://devapi.qweather.com";

pub const ENV_QWEATHER_HOST: &str = "QWEATHER_HOST";
pub const ENV_QWEATHER_API_KEY: &str = "QWEATHER_API_KEY";
pub const ENV_LOCATION: &str = "LOCATION";
pub const ENV_WEBHOOK: &str = "DINGTALK_WEBHOOK";
pub const ENV_WEBHOOK_SECRET: &str = "DINGTALK_SECRET";
pub const ENV_REPORT_PLACE: &str = "REPORT_PLACE";

/// Weather provider access for one fixed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QWeatherConfig {
    /// Base URL without trailing slash, e.g. `https://devapi.qweather.com`.
    pub host: String,
    pub api_key: String,
    /// `longitude,latitude` or a provider location id.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Full webhook URL, including its `access_token` query parameter.
    pub url: String,
    /// Signing secret; `None` disables request signing.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Place name shown in the header and title, e.g. "如皋".
    pub place_name: Option<String>,
}

impl ReportConfig {
    pub fn place(&self) -> &str {
        self.place_name.as_deref().unwrap_or_default()
    }

    pub fn title(&self) -> String {
        format!("{}天气播报", self.place())
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub qweather: QWeatherConfig,
    pub webhook: WebhookConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Load `.env`, the config file and the environment, then validate.
    ///
    /// Environment variables win over the file.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {e}");
        }

        let mut file = ConfigFile::load()?;
        file.apply_env(|key| std::env::var(key).ok());
        file.resolve()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QWeatherSection {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSection {
    pub url: Option<String>,
    pub secret: Option<String>,
}

/// Partial configuration as stored on disk.
///
/// Example TOML:
/// [qweather]
/// api_key = "..."
/// location = "120.57,32.39"
///
/// [webhook]
/// url = "https://oapi.dingtalk.com/robot/send?access_token=..."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub qweather: QWeatherSection,
    #[serde(default)]
    pub webhook: WebhookSection,
    #[serde(default)]
    pub report: ReportConfig,
}

impl ConfigFile {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-notify", "weather-notify")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from an environment lookup; set variables replace file values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overlay = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        };

        overlay(&mut self.qweather.host, ENV_QWEATHER_HOST);
        overlay(&mut self.qweather.api_key, ENV_QWEATHER_API_KEY);
        overlay(&mut self.qweather.location, ENV_LOCATION);
        overlay(&mut self.webhook.url, ENV_WEBHOOK);
        overlay(&mut self.webhook.secret, ENV_WEBHOOK_SECRET);
        overlay(&mut self.report.place_name, ENV_REPORT_PLACE);
    }

    /// Validate into a runtime [`Config`], reporting every missing required key at once.
    pub fn resolve(&self) -> Result<Config> {
        let api_key = non_blank(&self.qweather.api_key);
        let location = non_blank(&self.qweather.location);
        let url = non_blank(&self.webhook.url);

        let mut missing = Vec::new();
        if api_key.is_none() {
            missing.push(ENV_QWEATHER_API_KEY);
        }
        if location.is_none() {
            missing.push(ENV_LOCATION);
        }
        if url.is_none() {
            missing.push(ENV_WEBHOOK);
        }

        match (api_key, location, url) {
            (Some(api_key), Some(location), Some(url)) => {
                let host = non_blank(&self.qweather.host)
                    .unwrap_or(DEFAULT_QWEATHER_HOST)
                    .trim_end_matches('/')
                    .to_string();

                Ok(Config {
                    qweather: QWeatherConfig {
                        host,
                        api_key: api_key.to_string(),
                        location: location.to_string(),
                    },
                    webhook: WebhookConfig {
                        url: url.to_string(),
                        secret: non_blank(&self.webhook.secret).map(str::to_string),
                    },
                    report: ReportConfig {
                        place_name: non_blank(&self.report.place_name).map(str::to_string),
                    },
                })
            }
            _ => Err(anyhow!(
                "Missing required configuration: {}.\n\
                 Hint: set the environment variables or run `weather-notify configure`.",
                missing.join(", ")
            )),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete_file() -> ConfigFile {
        ConfigFile {
            qweather: QWeatherSection {
                host: None,
                api_key: Some("FILE_KEY".into()),
                location: Some("101190508".into()),
            },
            webhook: WebhookSection {
                url: Some("https://oapi.dingtalk.com/robot/send?access_token=abc".into()),
                secret: None,
            },
            report: ReportConfig::default(),
        }
    }

    #[test]
    fn resolve_errors_list_every_missing_key() {
        let err = ConfigFile::default().resolve().unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("Missing required configuration"));
        assert!(msg.contains(ENV_QWEATHER_API_KEY));
        assert!(msg.contains(ENV_LOCATION));
        assert!(msg.contains(ENV_WEBHOOK));
        assert!(msg.contains("weather-notify configure"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut file = complete_file();
        file.qweather.api_key = Some("   ".into());

        let err = file.resolve().unwrap_err();
        assert!(err.to_string().contains(ENV_QWEATHER_API_KEY));
        assert!(!err.to_string().contains(ENV_LOCATION));
    }

    #[test]
    fn host_defaults_and_loses_trailing_slash() {
        let cfg = complete_file().resolve().expect("complete config");
        assert_eq!(cfg.qweather.host, DEFAULT_QWEATHER_HOST);

        let mut file = complete_file();
        file.qweather.host = Some("https://example.qweatherapi.com/".into());
        let cfg = file.resolve().expect("complete config");
        assert_eq!(cfg.qweather.host, "https://example.qweatherapi.com");
    }

    #[test]
    fn empty_secret_disables_signing() {
        let mut file = complete_file();
        file.webhook.secret = Some(String::new());

        let cfg = file.resolve().expect("complete config");
        assert_eq!(cfg.webhook.secret, None);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_QWEATHER_API_KEY, "ENV_KEY"),
            (ENV_WEBHOOK_SECRET, "SECxyz"),
            (ENV_REPORT_PLACE, "如皋"),
        ]);

        let mut file = complete_file();
        file.apply_env(|key| env.get(key).map(|v| v.to_string()));
        let cfg = file.resolve().expect("complete config");

        assert_eq!(cfg.qweather.api_key, "ENV_KEY");
        assert_eq!(cfg.qweather.location, "101190508");
        assert_eq!(cfg.webhook.secret.as_deref(), Some("SECxyz"));
        assert_eq!(cfg.report.title(), "如皋天气播报");
    }

    #[test]
    fn file_roundtrips_through_toml() {
        let mut file = complete_file();
        file.report.place_name = Some("如皋".into());

        let text = toml::to_string_pretty(&file).expect("serialize");
        let parsed: ConfigFile = toml::from_str(&text).expect("parse");

        assert_eq!(parsed, file);
    }
}
