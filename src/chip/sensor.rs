//! Configured vision chip.

use super::config::{ConfigError, SensorConfig, MAX_BIAS, MAX_GAIN};
use super::port::{ChipIo, RegisterPort};
use super::register::{config_value, Binning, Register};
use crate::scan::ScanEngine;

/// A Stonyman chip behind a register port.
///
/// Holds the configuration that was written to the chip, so the amplifier
/// flag a scan needs is always the one the CONFIG register actually carries.
#[derive(Debug)]
pub struct Sensor<IO> {
    port: RegisterPort<IO>,
    config: SensorConfig,
}

impl<IO: ChipIo> Sensor<IO> {
    /// Initializes the chip for normal operation.
    ///
    /// Drives all lines low, clears every register, then writes biases,
    /// CONFIG and binning from `config`.
    pub fn begin(io: IO, config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut port = RegisterPort::new(io);
        port.init_lines();
        port.clear_values();

        let mut sensor = Self { port, config };
        sensor.write_biases();
        sensor.write_config();
        sensor.write_binning();

        tracing::info!(
            vref = sensor.config.vref,
            nbias = sensor.config.nbias,
            aobias = sensor.config.aobias,
            amplifier = sensor.config.amplifier_enabled(),
            "Sensor initialized"
        );
        Ok(sensor)
    }

    /// Writes CONFIG directly: gain, amplifier select and VDDA connect.
    ///
    /// A connected amplifier needs gain 1-7, since gain 0 is how the
    /// configuration records a bypassed amplifier. Gain bits written with
    /// the amplifier bypassed have no effect and are recorded as 0.
    pub fn set_config(&mut self, gain: u8, amplifier: bool, cvdda: bool) -> Result<(), ConfigError> {
        if gain > MAX_GAIN {
            return Err(ConfigError::InvalidGain(gain));
        }
        if amplifier && gain == 0 {
            return Err(ConfigError::AmplifierWithoutGain);
        }
        self.config.amp_gain = if amplifier { gain } else { 0 };
        self.port
            .set_pointer_value(Register::Config, config_value(gain, amplifier, cvdda));
        tracing::debug!(gain, amplifier, cvdda, "CONFIG written");
        Ok(())
    }

    /// Connects the amplifier at `gain` (1-7), or bypasses it for any other value.
    pub fn set_amp_gain(&mut self, gain: u8) {
        self.config.amp_gain = if (1..=MAX_GAIN).contains(&gain) { gain } else { 0 };
        self.write_config();
        tracing::info!(
            gain = self.config.amp_gain,
            amplifier = self.config.amplifier_enabled(),
            "Amplifier gain set"
        );
    }

    /// Configures focal-plane binning.
    pub fn set_binning(&mut self, hbin: Binning, vbin: Binning) {
        self.config.hbin = hbin;
        self.config.vbin = vbin;
        self.write_binning();
    }

    /// Sets all three biases.
    pub fn set_biases(&mut self, vref: u8, nbias: u8, aobias: u8) -> Result<(), ConfigError> {
        for (name, value) in [("vref", vref), ("nbias", nbias), ("aobias", aobias)] {
            if value > MAX_BIAS {
                return Err(ConfigError::InvalidBias { name, value });
            }
        }
        self.config.vref = vref;
        self.config.nbias = nbias;
        self.config.aobias = aobias;
        self.write_biases();
        Ok(())
    }

    /// Applies the 5 V bias preset.
    pub fn set_biases_5v(&mut self) {
        let preset = SensorConfig::supply_5v();
        self.config.vref = preset.vref;
        self.config.nbias = preset.nbias;
        self.config.aobias = preset.aobias;
        self.write_biases();
    }

    /// Returns the configuration currently written to the chip.
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Returns a scan engine bound to this chip.
    pub fn engine(&mut self) -> ScanEngine<'_, IO> {
        let settings = self.config.scan_settings();
        ScanEngine::new(&mut self.port, settings)
    }

    /// Returns the underlying register port.
    pub fn port(&self) -> &RegisterPort<IO> {
        &self.port
    }

    /// Returns the underlying register port mutably.
    pub fn port_mut(&mut self) -> &mut RegisterPort<IO> {
        &mut self.port
    }

    /// Releases the IO capability.
    pub fn into_inner(self) -> IO {
        self.port.into_inner()
    }

    fn write_biases(&mut self) {
        self.port
            .set_pointer_value(Register::Nbias, u16::from(self.config.nbias));
        self.port
            .set_pointer_value(Register::Aobias, u16::from(self.config.aobias));
        self.port
            .set_pointer_value(Register::Vref, u16::from(self.config.vref));
    }

    fn write_config(&mut self) {
        let value = config_value(self.config.amp_gain, self.config.amplifier_enabled(), true);
        self.port.set_pointer_value(Register::Config, value);
    }

    fn write_binning(&mut self) {
        self.port
            .set_pointer_value(Register::Hsw, self.config.hbin.switch_pattern());
        self.port
            .set_pointer_value(Register::Vsw, self.config.vbin.switch_pattern());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::SimulatedChip;

    #[test]
    fn test_begin_writes_registers() {
        let config = SensorConfig {
            hbin: Binning::By4,
            ..SensorConfig::default()
        };
        let sensor = Sensor::begin(SimulatedChip::new(), config).unwrap();
        let chip = sensor.port().io();

        assert_eq!(chip.register(Register::Vref), 30);
        assert_eq!(chip.register(Register::Nbias), 40);
        assert_eq!(chip.register(Register::Aobias), 40);
        assert_eq!(chip.register(Register::Config), 16);
        assert_eq!(chip.register(Register::Hsw), 0xEE);
        assert_eq!(chip.register(Register::Vsw), 0x00);
    }

    #[test]
    fn test_begin_rejects_invalid_config() {
        let config = SensorConfig {
            vref: 200,
            ..SensorConfig::default()
        };
        assert!(Sensor::begin(SimulatedChip::new(), config).is_err());
    }

    #[test]
    fn test_set_amp_gain_toggles_amplifier() {
        let mut sensor = Sensor::begin(SimulatedChip::new(), SensorConfig::default()).unwrap();

        sensor.set_amp_gain(4);
        assert!(sensor.config().amplifier_enabled());
        assert_eq!(sensor.port().io().register(Register::Config), 4 + 8 + 16);

        sensor.set_amp_gain(0);
        assert!(!sensor.config().amplifier_enabled());
        assert_eq!(sensor.port().io().register(Register::Config), 16);

        // Out of range bypasses
        sensor.set_amp_gain(9);
        assert!(!sensor.config().amplifier_enabled());
        assert_eq!(sensor.port().io().register(Register::Config), 16);
    }

    #[test]
    fn test_set_config_updates_amplifier_flag() {
        let mut sensor = Sensor::begin(SimulatedChip::new(), SensorConfig::default()).unwrap();

        sensor.set_config(2, true, true).unwrap();
        assert!(sensor.engine().settings().amplifier);
        assert_eq!(sensor.port().io().register(Register::Config), 26);

        sensor.set_config(2, false, true).unwrap();
        assert!(!sensor.engine().settings().amplifier);
        assert!(sensor.set_config(8, true, true).is_err());
    }

    #[test]
    fn test_set_config_records_written_gain() {
        let mut sensor = Sensor::begin(SimulatedChip::new(), SensorConfig::default()).unwrap();

        sensor.set_config(5, true, true).unwrap();
        assert_eq!(sensor.config().amp_gain, 5);
        assert_eq!(sensor.port().io().register(Register::Config), 5 + 8 + 16);

        // Rejected without touching the chip
        assert!(matches!(
            sensor.set_config(0, true, true),
            Err(ConfigError::AmplifierWithoutGain)
        ));
        assert_eq!(sensor.config().amp_gain, 5);
        assert_eq!(sensor.port().io().register(Register::Config), 5 + 8 + 16);
    }

    #[test]
    fn test_bias_presets() {
        let mut sensor = Sensor::begin(SimulatedChip::new(), SensorConfig::default()).unwrap();
        sensor.set_biases_5v();
        assert_eq!(sensor.port().io().register(Register::Nbias), 55);
        assert_eq!(sensor.port().io().register(Register::Aobias), 55);

        assert!(sensor.set_biases(10, 64, 10).is_err());
        sensor.set_biases(10, 20, 30).unwrap();
        assert_eq!(sensor.port().io().register(Register::Vref), 10);
        assert_eq!(sensor.config().aobias, 30);
    }
}
