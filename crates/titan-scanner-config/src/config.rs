//! # Scanner Configuration
//!
//! Loads scanner settings and custom barcode rules.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TITAN_SCANNER_ENDING_KEYS=Enter,NumpadEnter                        │
//! │     TITAN_SCANNER_TIMEOUT_MS=60                                        │
//! │     TITAN_SCANNER_ALLOW_PASTE=true                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/titan-pos/scanner.toml (Linux)                           │
//! │     ~/Library/Application Support/com.titan.pos/scanner.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Enter/Tab, 100 ms, paste disabled, no custom rules                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanner.toml
//! [scanner]
//! ending_keys = ["Enter", "Tab"]
//! inter_key_timeout_ms = 100
//! paste_enabled = false
//!
//! # Tried in file order, before the built-in EAN/UPC/FNSKU rules.
//! # Most restrictive first!
//! [[rules]]
//! key = "isbn"
//! name = "ISBN"
//! pattern = '\b97[89]\d{10}\b'
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use titan_scanner::validation::{validate_display_name, validate_pattern, validate_rule_key};
use titan_scanner::{
    ScanSession, ScanSessionBuilder, ScannerSettings, DEFAULT_ENDING_KEYS,
    DEFAULT_INTER_KEY_TIMEOUT_MS,
};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable: comma-separated ending key codes.
pub const ENV_ENDING_KEYS: &str = "TITAN_SCANNER_ENDING_KEYS";
/// Environment variable: inter-key timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "TITAN_SCANNER_TIMEOUT_MS";
/// Environment variable: `true`/`false` paste support.
pub const ENV_ALLOW_PASTE: &str = "TITAN_SCANNER_ALLOW_PASTE";

// =============================================================================
// Scanner Section
// =============================================================================

/// The `[scanner]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSection {
    /// Key codes that end a scan.
    #[serde(default = "default_ending_keys")]
    pub ending_keys: Vec<String>,

    /// Maximum gap between keys of one scan (1-999 ms).
    #[serde(default = "default_timeout")]
    pub inter_key_timeout_ms: u64,

    /// Classify paste events as scans.
    #[serde(default)]
    pub paste_enabled: bool,
}

fn default_ending_keys() -> Vec<String> {
    DEFAULT_ENDING_KEYS.iter().map(|k| k.to_string()).collect()
}

fn default_timeout() -> u64 {
    DEFAULT_INTER_KEY_TIMEOUT_MS
}

impl Default for ScannerSection {
    fn default() -> Self {
        ScannerSection {
            ending_keys: default_ending_keys(),
            inter_key_timeout_ms: default_timeout(),
            paste_enabled: false,
        }
    }
}

// =============================================================================
// Rule Configuration
// =============================================================================

/// One `[[rules]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Unique key; becomes `BarcodeType::Custom(key)`.
    pub key: String,

    /// Human-readable name reported with each scan.
    pub name: String,

    /// Regular expression (contains-a-match semantics).
    pub pattern: String,
}

// =============================================================================
// Main Scanner Configuration
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Timing and key settings.
    #[serde(default)]
    pub scanner: ScannerSection,

    /// Custom rules, in classification order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl ScannerConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Does not validate.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scanner.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Scanner config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load scanner config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// Checks everything the scanner would reject plus duplicate rule keys,
    /// so that [`apply_to`](Self::apply_to) cannot fail halfway.
    pub fn validate(&self) -> ConfigResult<()> {
        self.to_settings()?;

        let mut seen = HashSet::new();
        for rule in &self.rules {
            validate_rule_key(&rule.key)?;
            validate_display_name(&rule.name)?;
            validate_pattern(&rule.pattern)?;

            if !seen.insert(rule.key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "rule key '{}' is defined more than once",
                    rule.key
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are logged and ignored; out-of-range values are
    /// kept so that [`validate`](Self::validate) reports them.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(keys) = lookup(ENV_ENDING_KEYS) {
            let keys: Vec<String> = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            debug!(?keys, "Overriding ending keys from environment");
            self.scanner.ending_keys = keys;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            match timeout.trim().parse::<u64>() {
                Ok(ms) => {
                    debug!(timeout_ms = ms, "Overriding inter-key timeout from environment");
                    self.scanner.inter_key_timeout_ms = ms;
                }
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric {}", ENV_TIMEOUT_MS),
            }
        }

        if let Some(paste) = lookup(ENV_ALLOW_PASTE) {
            match paste.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.scanner.paste_enabled = true,
                "0" | "false" | "no" | "off" => self.scanner.paste_enabled = false,
                _ => warn!(value = %paste, "Ignoring unknown {} value", ENV_ALLOW_PASTE),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "titan", "pos")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }

    // =========================================================================
    // Session Construction
    // =========================================================================

    /// Converts the `[scanner]` table into validated settings.
    pub fn to_settings(&self) -> ConfigResult<ScannerSettings> {
        let mut settings = ScannerSettings::default();
        settings.set_ending_keys(self.scanner.ending_keys.iter().cloned())?;
        settings.set_inter_key_timeout(self.scanner.inter_key_timeout_ms)?;
        settings.set_paste_enabled(self.scanner.paste_enabled);
        Ok(settings)
    }

    /// Applies settings and rules to an existing session.
    ///
    /// Validates first; on error the session is untouched. Configured rules
    /// are appended in file order after the session's other rules; a key the
    /// session already holds is moved to its file position.
    pub fn apply_to(&self, session: &mut ScanSession) -> ConfigResult<()> {
        self.validate()?;

        session.set_settings(self.to_settings()?);
        for rule in &self.rules {
            session.unregister_rule(&rule.key);
            session.register_rule(&rule.key, &rule.name, &rule.pattern)?;
        }

        debug!(rules = self.rules.len(), "Scanner config applied");
        Ok(())
    }

    /// Builds a session with default callback and clock.
    pub fn build_session(&self) -> ConfigResult<ScanSession> {
        self.build_session_with(ScanSession::builder())
    }

    /// Builds a session from a caller-prepared builder (custom `on_scan`,
    /// clock, ...). Settings in the builder are replaced by this config.
    pub fn build_session_with(&self, builder: ScanSessionBuilder) -> ConfigResult<ScanSession> {
        let mut session = builder.build();
        self.apply_to(&mut session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use titan_scanner::BarcodeType;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.scanner.ending_keys, vec!["Enter", "Tab"]);
        assert_eq!(config.scanner.inter_key_timeout_ms, 100);
        assert!(!config.scanner.paste_enabled);
        assert!(config.rules.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = ScannerConfig::from_toml_str(
            r#"
            [scanner]
            inter_key_timeout_ms = 40
            paste_enabled = true

            [[rules]]
            key = "isbn"
            name = "ISBN"
            pattern = '\b97[89]\d{10}\b'

            [[rules]]
            key = "bin"
            name = "Warehouse Bin"
            pattern = '^BIN-\d{4}$'
            "#,
        )
        .unwrap();

        // Missing fields fall back to defaults.
        assert_eq!(config.scanner.ending_keys, vec!["Enter", "Tab"]);
        assert_eq!(config.scanner.inter_key_timeout_ms, 40);
        assert!(config.scanner.paste_enabled);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].key, "isbn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let err = ScannerConfig::from_toml_str("[scanner]\ninter_key_timeout_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ScannerConfig::default();
        config.scanner.inter_key_timeout_ms = 1000;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = ScannerConfig::default();
        config.scanner.ending_keys.clear();
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.rules.push(RuleConfig {
            key: "ean".to_string(),
            name: "Mine".to_string(),
            pattern: "x".to_string(),
        });
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = ScannerConfig::default();
        config.rules.push(RuleConfig {
            key: "bad".to_string(),
            name: "Bad".to_string(),
            pattern: "(".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_rule_keys_rejected() {
        let rule = RuleConfig {
            key: "bin".to_string(),
            name: "Bin".to_string(),
            pattern: "^BIN".to_string(),
        };
        let config = ScannerConfig {
            rules: vec![rule.clone(), rule],
            ..ScannerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ScannerConfig::default();
        config.apply_overrides_from(lookup(&[
            (ENV_ENDING_KEYS, "Enter, NumpadEnter ,"),
            (ENV_TIMEOUT_MS, "60"),
            (ENV_ALLOW_PASTE, "yes"),
        ]));

        assert_eq!(config.scanner.ending_keys, vec!["Enter", "NumpadEnter"]);
        assert_eq!(config.scanner.inter_key_timeout_ms, 60);
        assert!(config.scanner.paste_enabled);
    }

    #[test]
    fn test_bad_env_values_ignored() {
        let mut config = ScannerConfig::default();
        config.apply_overrides_from(lookup(&[(ENV_TIMEOUT_MS, "soon"), (ENV_ALLOW_PASTE, "maybe")]));

        assert_eq!(config.scanner.inter_key_timeout_ms, 100);
        assert!(!config.scanner.paste_enabled);
    }

    #[test]
    fn test_build_session_applies_rules_in_order() {
        let config = ScannerConfig {
            scanner: ScannerSection {
                inter_key_timeout_ms: 50,
                ..ScannerSection::default()
            },
            rules: vec![
                RuleConfig {
                    key: "isbn".to_string(),
                    name: "ISBN".to_string(),
                    pattern: r"^97[89]\d{10}$".to_string(),
                },
                RuleConfig {
                    key: "digits".to_string(),
                    name: "Digits".to_string(),
                    pattern: r"^\d+$".to_string(),
                },
            ],
        };

        let session = config.build_session().unwrap();
        assert_eq!(session.settings().inter_key_timeout_ms(), 50);
        assert_eq!(session.registry().keys(), vec!["isbn", "digits"]);
        assert_eq!(
            session.classify("9780306406157").barcode_type,
            BarcodeType::Custom("isbn".into())
        );
        assert_eq!(
            session.classify("4006381333931").barcode_type,
            BarcodeType::Custom("digits".into())
        );
    }

    #[test]
    fn test_apply_to_keeps_file_order_for_existing_keys() {
        let mut session = ScanSession::new();
        session.register_rule("digits", "Old Digits", r"^\d+$").unwrap();
        session.register_rule("manual", "Manual", r"^M-").unwrap();

        let config = ScannerConfig {
            rules: vec![
                RuleConfig {
                    key: "isbn".to_string(),
                    name: "ISBN".to_string(),
                    pattern: r"^97[89]\d{10}$".to_string(),
                },
                RuleConfig {
                    key: "digits".to_string(),
                    name: "Digits".to_string(),
                    pattern: r"^\d+$".to_string(),
                },
            ],
            ..ScannerConfig::default()
        };
        config.apply_to(&mut session).unwrap();

        assert_eq!(session.registry().keys(), vec!["manual", "isbn", "digits"]);
        assert_eq!(
            session.classify("9780306406157").barcode_type,
            BarcodeType::Custom("isbn".into())
        );
        assert_eq!(session.classify("12345").display_name, "Digits");
    }

    #[test]
    fn test_apply_to_invalid_config_leaves_session_untouched() {
        let mut session = ScanSession::new();
        let config = ScannerConfig {
            scanner: ScannerSection {
                inter_key_timeout_ms: 0,
                ..ScannerSection::default()
            },
            rules: vec![RuleConfig {
                key: "bin".to_string(),
                name: "Bin".to_string(),
                pattern: "^BIN".to_string(),
            }],
        };

        assert!(config.apply_to(&mut session).is_err());
        assert!(session.registry().is_empty());
        assert_eq!(session.settings(), &ScannerSettings::default());
    }

    #[test]
    fn test_toml_serialization() {
        let config = ScannerConfig {
            rules: vec![RuleConfig {
                key: "bin".to_string(),
                name: "Bin".to_string(),
                pattern: "^BIN".to_string(),
            }],
            ..ScannerConfig::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[[rules]]"));

        let parsed = ScannerConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
