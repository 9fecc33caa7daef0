//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        // Custom TOML is validated by `init_custom`; the embedded default is
        // covered by tests.
        parse_settings_toml(toml_str).unwrap_or_default()
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub detect: DetectSettings,
    pub format: FormatSettings,
    pub index: IndexSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetectSettings {
    pub sample_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatSettings {
    pub sample_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexSettings {
    pub extension: String,
    pub verify_checksum: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detect: DetectSettings { sample_chars: 1000 },
            format: FormatSettings { sample_lines: 10 },
            index: IndexSettings {
                extension: "iidx".to_string(),
                verify_checksum: true,
            },
        }
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(detect.sample_chars);
    check_positive_usize!(format.sample_lines);

    let ext = &s.index.extension;
    if ext.is_empty() || ext.contains(['/', '\\']) || ext.starts_with('.') {
        return Err(SettingsError::InvalidValue {
            field: "index.extension".to_string(),
            reason: "must be a bare, non-empty file extension".to_string(),
        });
    }

    Ok(())
}
