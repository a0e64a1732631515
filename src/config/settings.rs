//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::rules::RuleId;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Numeric conventions the rules check against.
    #[serde(default)]
    pub conventions: Conventions,

    /// Rule selection.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.conventions.validate()?;

        if let Some(ref enabled) = self.rules.enabled {
            for id in enabled {
                if id.parse::<RuleId>().is_err() {
                    return Err(ConfigError::ValidationError {
                        message: format!("Unknown rule '{id}' in rules.enabled"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the rules selected by the configuration (all rules if unset).
    #[must_use]
    pub fn enabled_rules(&self) -> Vec<RuleId> {
        self.rules.enabled.as_ref().map_or_else(
            || RuleId::ALL.to_vec(),
            |ids| ids.iter().filter_map(|id| id.parse().ok()).collect(),
        )
    }
}

/// Library convention constants.
///
/// Footprint values are in millimetres, `symbol_text_size` is in mils.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Conventions {
    /// Standard footprint text height and width.
    #[serde(default = "default_text_size")]
    pub text_size: f64,

    /// Standard footprint text stroke thickness.
    #[serde(default = "default_text_thickness")]
    pub text_thickness: f64,

    /// Smallest allowed footprint text size.
    #[serde(default = "default_text_size_min")]
    pub text_size_min: f64,

    /// Largest allowed footprint text size.
    #[serde(default = "default_text_size_max")]
    pub text_size_max: f64,

    /// Thinnest allowed footprint text stroke.
    #[serde(default = "default_text_thickness_min")]
    pub text_thickness_min: f64,

    /// Thickest allowed footprint text stroke.
    #[serde(default = "default_text_thickness_max")]
    pub text_thickness_max: f64,

    /// Width fabrication lines are set to when fixed.
    #[serde(default = "default_fab_line_width")]
    pub fab_line_width: f64,

    /// Thinnest allowed fabrication line.
    #[serde(default = "default_fab_line_width_min")]
    pub fab_line_width_min: f64,

    /// Thickest allowed fabrication line.
    #[serde(default = "default_fab_line_width_max")]
    pub fab_line_width_max: f64,

    /// Standard symbol field and pin text size.
    #[serde(default = "default_symbol_text_size")]
    pub symbol_text_size: u32,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            text_size: default_text_size(),
            text_thickness: default_text_thickness(),
            text_size_min: default_text_size_min(),
            text_size_max: default_text_size_max(),
            text_thickness_min: default_text_thickness_min(),
            text_thickness_max: default_text_thickness_max(),
            fab_line_width: default_fab_line_width(),
            fab_line_width_min: default_fab_line_width_min(),
            fab_line_width_max: default_fab_line_width_max(),
            symbol_text_size: default_symbol_text_size(),
        }
    }
}

impl Conventions {
    /// Validates that every range is well formed and contains its standard value.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistent setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("text_size", self.text_size, self.text_size_min, self.text_size_max),
            (
                "text_thickness",
                self.text_thickness,
                self.text_thickness_min,
                self.text_thickness_max,
            ),
            (
                "fab_line_width",
                self.fab_line_width,
                self.fab_line_width_min,
                self.fab_line_width_max,
            ),
        ];

        for (name, standard, min, max) in ranges {
            if min <= 0.0 || max <= 0.0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} limits must be positive"),
                });
            }
            if min > max {
                return Err(ConfigError::ValidationError {
                    message: format!("{name}_min ({min}) is larger than {name}_max ({max})"),
                });
            }
            if standard < min || standard > max {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} ({standard}) is outside [{min}, {max}]"),
                });
            }
        }

        if self.symbol_text_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "symbol_text_size must be positive".to_string(),
            });
        }
        Ok(())
    }
}

const fn default_text_size() -> f64 {
    1.0
}

const fn default_text_thickness() -> f64 {
    0.15
}

const fn default_text_size_min() -> f64 {
    0.25
}

const fn default_text_size_max() -> f64 {
    2.0
}

const fn default_text_thickness_min() -> f64 {
    0.05
}

const fn default_text_thickness_max() -> f64 {
    0.3
}

const fn default_fab_line_width() -> f64 {
    0.1
}

const fn default_fab_line_width_min() -> f64 {
    0.025
}

const fn default_fab_line_width_max() -> f64 {
    0.25
}

const fn default_symbol_text_size() -> u32 {
    50
}

/// Rule selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule ids to run ("7.4", "4.3", ...). All rules run when unset.
    #[serde(default)]
    pub enabled: Option<Vec<String>>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.enabled_rules(), RuleId::ALL.to_vec());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "conventions": {
                "text_size": 1.0,
                "text_thickness": 0.15,
                "text_size_min": 0.25,
                "text_size_max": 2.0,
                "text_thickness_min": 0.05,
                "text_thickness_max": 0.3,
                "fab_line_width": 0.12,
                "fab_line_width_min": 0.05,
                "fab_line_width_max": 0.2,
                "symbol_text_size": 40
            },
            "rules": {
                "enabled": ["7.4", "4.3"]
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!((config.conventions.fab_line_width - 0.12).abs() < f64::EPSILON);
        assert_eq!(config.conventions.symbol_text_size, 40);
        assert_eq!(
            config.enabled_rules(),
            vec![RuleId::FabricationLayer, RuleId::PinStacking]
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn conventions_defaults() {
        let conventions = Conventions::default();
        assert!((conventions.text_size - 1.0).abs() < f64::EPSILON);
        assert!((conventions.text_thickness - 0.15).abs() < f64::EPSILON);
        assert!((conventions.fab_line_width - 0.1).abs() < f64::EPSILON);
        assert_eq!(conventions.symbol_text_size, 50);
        assert!(conventions.validate().is_ok());
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_inverted_range() {
        let json = r#"{
            "conventions": {
                "fab_line_width_min": 0.3,
                "fab_line_width_max": 0.1
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_standard_outside_range() {
        let json = r#"{
            "conventions": {
                "text_size": 3.0
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_rule() {
        let json = r#"{
            "rules": {
                "enabled": ["9.9"]
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
