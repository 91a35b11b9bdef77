//! Sensor configuration.
//!
//! Bias and amplifier settings are written once at startup. The amplifier
//! flag travels with the configuration into every scan, so a scan's
//! behaviour is fully determined by its arguments.

use super::register::Binning;
use crate::flow::FlowConfig;
use crate::scan::{ScanSettings, ScanWindow};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest value the six-bit bias registers accept.
pub const MAX_BIAS: u8 = 63;
/// Largest amplifier gain.
pub const MAX_GAIN: u8 = 7;

/// Configuration for the vision chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// VREF register value (0-63).
    pub vref: u8,
    /// NBIAS register value (0-63).
    pub nbias: u8,
    /// AOBIAS register value (0-63).
    pub aobias: u8,
    /// Amplifier gain 1-7; 0 bypasses the amplifier.
    pub amp_gain: u8,
    /// Horizontal binning factor.
    pub hbin: Binning,
    /// Vertical binning factor.
    pub vbin: Binning,
    /// ADC channel the analog output is wired to.
    pub analog_channel: u8,
    /// Settle delay before each pixel sample, in microseconds.
    pub settle_us: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            vref: 30,
            nbias: 40,
            aobias: 40,
            amp_gain: 0,
            hbin: Binning::None,
            vbin: Binning::None,
            analog_channel: 0,
            settle_us: 1,
        }
    }
}

impl SensorConfig {
    /// Bias preset for a 5 V supply.
    pub fn supply_5v() -> Self {
        Self {
            vref: 30,
            nbias: 55,
            aobias: 55,
            ..Default::default()
        }
    }

    /// Returns true if the amplifier is connected.
    #[inline]
    pub fn amplifier_enabled(&self) -> bool {
        self.amp_gain > 0
    }

    /// Per-scan settings derived from this configuration.
    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            amplifier: self.amplifier_enabled(),
            analog_channel: self.analog_channel,
            settle_us: self.settle_us,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("vref", self.vref),
            ("nbias", self.nbias),
            ("aobias", self.aobias),
        ] {
            if value > MAX_BIAS {
                return Err(ConfigError::InvalidBias { name, value });
            }
        }
        if self.amp_gain > MAX_GAIN {
            return Err(ConfigError::InvalidGain(self.amp_gain));
        }
        if self.settle_us == 0 {
            return Err(ConfigError::InvalidSettle);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// A bias register value above [`MAX_BIAS`].
    #[error("{name} bias {value} exceeds 63")]
    InvalidBias {
        /// Which bias.
        name: &'static str,
        /// Rejected value.
        value: u8,
    },
    /// Amplifier gain above [`MAX_GAIN`].
    #[error("amplifier gain {0} exceeds 7")]
    InvalidGain(u8),
    /// Amplifier selected with gain 0.
    #[error("a connected amplifier needs gain 1-7")]
    AmplifierWithoutGain,
    /// Zero settle delay.
    #[error("settle delay must be at least 1 microsecond")]
    InvalidSettle,
    /// The `[window]` table failed validation.
    #[error("invalid scan window: {0}")]
    InvalidWindow(String),
    /// The `[flow]` table failed validation.
    #[error("invalid flow settings: {0}")]
    InvalidFlow(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Chip biases, amplifier and binning.
    #[serde(default)]
    pub sensor: SensorConfig,
    /// Region scanned for each frame.
    #[serde(default)]
    pub window: ScanWindow,
    /// Flow estimation and odometry.
    #[serde(default)]
    pub flow: FlowConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sensor.validate()?;
        self.window
            .validate()
            .map_err(|e| ConfigError::InvalidWindow(e.to_string()))?;
        self.flow
            .validate()
            .map_err(|e| ConfigError::InvalidFlow(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Algorithm, Neighborhood};

    #[test]
    fn test_default_config_valid() {
        let config = SensorConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.amplifier_enabled());
    }

    #[test]
    fn test_bias_out_of_range_invalid() {
        let mut config = SensorConfig::default();
        config.nbias = 64;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBias { name: "nbias", value: 64 })
        ));
    }

    #[test]
    fn test_gain_enables_amplifier() {
        let mut config = SensorConfig::default();
        config.amp_gain = 4;
        assert!(config.scan_settings().amplifier);

        config.amp_gain = 9;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGain(9))));
    }

    #[test]
    fn test_parse_file_config() {
        let text = r#"
            [sensor]
            amp_gain = 3
            hbin = 2

            [window]
            row_start = 8
            row_count = 16
            row_stride = 4
            col_start = 8
            col_count = 16
            col_stride = 4

            [flow]
            algorithm = "least-squares"
            neighborhood = "square"
            scale = 50
        "#;

        let config = FileConfig::from_toml(text).unwrap();
        assert_eq!(config.sensor.amp_gain, 3);
        assert_eq!(config.sensor.hbin, Binning::By2);
        assert_eq!(config.sensor.vref, 30);
        assert_eq!(config.window.row_stride, 4);
        assert_eq!(config.flow.algorithm, Algorithm::LeastSquares);
        assert_eq!(config.flow.neighborhood, Neighborhood::Square);
        assert_eq!(config.flow.scale, 50);
    }

    #[test]
    fn test_bad_binning_rejected() {
        let text = "[sensor]\nvbin = 3\n";
        assert!(matches!(
            FileConfig::from_toml(text),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_window_outside_grid_rejected() {
        let text = "[window]\nrow_start = 100\nrow_count = 20\n";
        assert!(matches!(
            FileConfig::from_toml(text),
            Err(ConfigError::InvalidWindow(_))
        ));
    }
}
