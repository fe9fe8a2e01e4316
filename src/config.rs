/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/config.rs
 * Responsibility: Settings model, loading and saving (YAML or JSON)
 */
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PLACEHOLDER_WEBHOOK: &str =
    "https://discord.com/api/webhooks/123456789/abcdefghijklmnopqrstuvwxyz";

pub const DEFAULT_TEMPLATE: &str = "Character decloaked: **{CHARNAME}**";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub notification: NotificationConfig,
    pub ignore: IgnoreConfig,
    pub watch: WatchConfig,
}

/// Everything the alert path needs: where to post and what to say.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub webhook_url: String,
    pub mentions: MentionConfig,
    pub custom_message: CustomMessageConfig,
    pub multi_ping: MultiPingConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: PLACEHOLDER_WEBHOOK.to_string(),
            mentions: MentionConfig::default(),
            custom_message: CustomMessageConfig::default(),
            multi_ping: MultiPingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MentionConfig {
    pub everyone: bool,
    pub here: bool,
    pub role: bool,
    pub user: bool,
    pub role_id: String,
    pub user_id: String,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            everyone: true,
            here: false,
            role: false,
            user: false,
            role_id: String::new(),
            user_id: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CustomMessageConfig {
    pub enabled: bool,
    pub template: String, // `{CHARNAME}` is replaced with the listener name
}

impl Default for CustomMessageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MultiPingConfig {
    pub enabled: bool,
    pub count: u32,
}

impl Default for MultiPingConfig {
    fn default() -> Self {
        Self { enabled: false, count: 1 }
    }
}

impl MultiPingConfig {
    /// Number of sends per detection. Never zero.
    pub fn repeats(&self) -> u32 {
        if self.enabled { self.count.max(1) } else { 1 }
    }
}

/// Ignore-category toggles. Keywords live in `filter`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct IgnoreConfig {
    pub mobile_observatory: bool,
    pub stargates: bool,
    pub wormholes: bool,
    pub stations: bool,
    pub citadels: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    pub log_dir: Option<PathBuf>,
    pub extension: String,
    pub untimestamped: UntimestampedPolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            extension: "txt".to_string(),
            untimestamped: UntimestampedPolicy::default(),
        }
    }
}

/// What to do with a trigger line that carries no `[ timestamp ]` prefix.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UntimestampedPolicy {
    /// Fire on every detection without touching dedup state.
    #[default]
    AlwaysNotify,
    /// Use the trimmed line text as the dedup key.
    DedupByLine,
}

/// Flat `settings.json` written by the original desktop tool.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LegacySettings {
    pub webhook_url: String,
    pub mention_everyone: bool,
    pub mention_here: bool,
    pub mention_role: bool,
    pub mention_user: bool,
    pub role_id: String,
    pub user_id: String,
    pub ignore_mobile_observatory: bool,
    pub ignore_stargates: bool,
    pub ignore_wormholes: bool,
    pub ignore_stations: bool,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self {
            webhook_url: PLACEHOLDER_WEBHOOK.to_string(),
            mention_everyone: true,
            mention_here: false,
            mention_role: false,
            mention_user: false,
            role_id: String::new(),
            user_id: String::new(),
            ignore_mobile_observatory: false,
            ignore_stargates: false,
            ignore_wormholes: false,
            ignore_stations: false,
        }
    }
}

impl LegacySettings {
    const KEYS: [&'static str; 11] = [
        "webhook_url",
        "mention_everyone",
        "mention_here",
        "mention_role",
        "mention_user",
        "role_id",
        "user_id",
        "ignore_mobile_observatory",
        "ignore_stargates",
        "ignore_wormholes",
        "ignore_stations",
    ];

    /// Flat top-level keys and none of the nested sections.
    pub fn matches(value: &serde_json::Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        let nested = ["notification", "ignore", "watch"]
            .iter()
            .any(|section| object.contains_key(*section));
        !nested && object.keys().any(|key| Self::KEYS.contains(&key.as_str()))
    }
}

impl From<LegacySettings> for Config {
    fn from(legacy: LegacySettings) -> Self {
        Config {
            notification: NotificationConfig {
                webhook_url: legacy.webhook_url,
                mentions: MentionConfig {
                    everyone: legacy.mention_everyone,
                    here: legacy.mention_here,
                    role: legacy.mention_role,
                    user: legacy.mention_user,
                    role_id: legacy.role_id,
                    user_id: legacy.user_id,
                },
                ..Default::default()
            },
            ignore: IgnoreConfig {
                mobile_observatory: legacy.ignore_mobile_observatory,
                stargates: legacy.ignore_stargates,
                wormholes: legacy.ignore_wormholes,
                stations: legacy.ignore_stations,
                citadels: false,
            },
            watch: WatchConfig::default(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        let config: Config = if is_json(path) {
            let value: serde_json::Value =
                serde_json::from_str(&content).context("Failed to parse config file")?;
            if LegacySettings::matches(&value) {
                serde_json::from_value::<LegacySettings>(value)
                    .context("Failed to parse legacy settings")?
                    .into()
            } else {
                serde_json::from_value(value).context("Failed to parse config file")?
            }
        } else {
            serde_yaml::from_str(&content).context("Failed to parse config file")?
        };
        Ok(config)
    }

    /// Missing file means defaults; a present but broken file is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory {:?}", parent))?;
            }
        }
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        } else {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        };
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file at {:?}", path))?;
        Ok(())
    }

    pub fn is_placeholder_webhook(&self) -> bool {
        let url = self.notification.webhook_url.trim();
        url.is_empty() || url == PLACEHOLDER_WEBHOOK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_yaml_merges_onto_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cloakwatch.yml");
        fs::write(
            &path,
            "notification:\n  webhook_url: https://example.test/hook\nignore:\n  stations: true\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.notification.webhook_url, "https://example.test/hook");
        assert!(config.notification.mentions.everyone);
        assert!(config.ignore.stations);
        assert!(!config.ignore.stargates);
        assert_eq!(config.watch.extension, "txt");
        assert_eq!(config.watch.untimestamped, UntimestampedPolicy::AlwaysNotify);
    }

    #[test]
    fn test_json_settings_are_read_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"notification": {"mentions": {"everyone": false, "role": true, "role_id": "55"}},
                "watch": {"untimestamped": "dedup_by_line"}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.notification.mentions.everyone);
        assert_eq!(config.notification.mentions.role_id, "55");
        assert_eq!(config.watch.untimestamped, UntimestampedPolicy::DedupByLine);
        assert!(config.is_placeholder_webhook());
    }

    #[test]
    fn test_original_flat_settings_are_understood() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
    "webhook_url": "https://discord.com/api/webhooks/1/real",
    "mention_everyone": false,
    "mention_here": true,
    "mention_role": true,
    "mention_user": false,
    "role_id": "55",
    "user_id": "",
    "ignore_mobile_observatory": false,
    "ignore_stargates": true,
    "ignore_wormholes": false,
    "ignore_stations": true
}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.notification.webhook_url, "https://discord.com/api/webhooks/1/real");
        assert!(!config.is_placeholder_webhook());
        assert!(!config.notification.mentions.everyone);
        assert!(config.notification.mentions.here);
        assert!(config.notification.mentions.role);
        assert_eq!(config.notification.mentions.role_id, "55");
        assert!(config.ignore.stargates);
        assert!(config.ignore.stations);
        assert!(!config.ignore.wormholes);
        assert_eq!(config.watch, WatchConfig::default());
    }

    #[test]
    fn test_partial_flat_settings_keep_original_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"ignore_stations": true}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.ignore.stations);
        assert!(config.notification.mentions.everyone);
        assert!(config.is_placeholder_webhook());
    }

    #[test]
    fn test_save_then_load_keeps_values() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.notification.webhook_url = "https://example.test/hook".to_string();
        config.notification.multi_ping = MultiPingConfig { enabled: true, count: 3 };
        config.ignore.citadels = true;

        for name in ["nested/cloakwatch.yml", "settings.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_load_or_default_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config, Config::default());

        let broken = dir.path().join("broken.yml");
        fs::write(&broken, "notification: [unterminated").unwrap();
        assert!(Config::load_or_default(&broken).is_err());
    }

    #[test]
    fn test_multi_ping_repeats() {
        assert_eq!(MultiPingConfig { enabled: false, count: 5 }.repeats(), 1);
        assert_eq!(MultiPingConfig { enabled: true, count: 3 }.repeats(), 3);
        assert_eq!(MultiPingConfig { enabled: true, count: 0 }.repeats(), 1);
    }
}
