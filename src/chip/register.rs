//! Stonyman system register map.

use serde::{Deserialize, Serialize};

/// Side length of the chip's square pixel array.
pub const GRID_SIZE: u8 = 112;

/// The eight system registers, in pointer order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Column select.
    ColSel = 0,
    /// Row select.
    RowSel = 1,
    /// Vertical switching (binning).
    Vsw = 2,
    /// Horizontal switching (binning).
    Hsw = 3,
    /// Voltage reference.
    Vref = 4,
    /// Configuration: `000csggg` (cvdda, amp select, gain).
    Config = 5,
    /// N-bias.
    Nbias = 6,
    /// Analog output bias.
    Aobias = 7,
}

impl Register {
    /// Every register, in pointer order.
    pub const ALL: [Register; 8] = [
        Register::ColSel,
        Register::RowSel,
        Register::Vsw,
        Register::Hsw,
        Register::Vref,
        Register::Config,
        Register::Nbias,
        Register::Aobias,
    ];

    /// Pointer position of the register.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a register by pointer position.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// CONFIG bit that connects the amplifier.
pub const CONFIG_AMP: u16 = 8;
/// CONFIG bit that connects VDDA. Always set in normal operation.
pub const CONFIG_CVDDA: u16 = 16;

/// Builds a CONFIG register value.
///
/// Out-of-range gains are masked to three bits.
pub fn config_value(gain: u8, amplifier: bool, cvdda: bool) -> u16 {
    let mut value = u16::from(gain & 0x07);
    if amplifier {
        value += CONFIG_AMP;
    }
    if cvdda {
        value += CONFIG_CVDDA;
    }
    value
}

/// On-chip binning factor for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Binning {
    /// Every pixel read separately.
    #[default]
    None,
    /// Pairs of pixels merged.
    By2,
    /// Groups of four merged.
    By4,
    /// Groups of eight merged.
    By8,
}

impl Binning {
    /// Switching pattern written to HSW/VSW.
    pub fn switch_pattern(self) -> u16 {
        match self {
            Binning::None => 0x00,
            Binning::By2 => 0xAA,
            Binning::By4 => 0xEE,
            Binning::By8 => 0xFE,
        }
    }

    /// Number of raw pixels merged along the axis.
    pub fn factor(self) -> u8 {
        match self {
            Binning::None => 1,
            Binning::By2 => 2,
            Binning::By4 => 4,
            Binning::By8 => 8,
        }
    }
}

impl TryFrom<u8> for Binning {
    type Error = String;

    fn try_from(factor: u8) -> Result<Self, Self::Error> {
        match factor {
            1 => Ok(Binning::None),
            2 => Ok(Binning::By2),
            4 => Ok(Binning::By4),
            8 => Ok(Binning::By8),
            other => Err(format!("binning factor must be 1, 2, 4 or 8, got {other}")),
        }
    }
}

impl From<Binning> for u8 {
    fn from(binning: Binning) -> u8 {
        binning.factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_indices_are_pointer_order() {
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.index() as usize, i);
            assert_eq!(Register::from_index(i as u8), Some(*reg));
        }
        assert_eq!(Register::from_index(8), None);
    }

    #[test]
    fn test_config_value_layout() {
        assert_eq!(config_value(0, false, true), 16);
        assert_eq!(config_value(4, true, true), 28);
        assert_eq!(config_value(7, true, false), 15);
    }

    #[test]
    fn test_binning_patterns() {
        assert_eq!(Binning::try_from(2).unwrap().switch_pattern(), 0xAA);
        assert_eq!(Binning::try_from(4).unwrap().switch_pattern(), 0xEE);
        assert_eq!(Binning::try_from(8).unwrap().switch_pattern(), 0xFE);
        assert_eq!(Binning::default().switch_pattern(), 0x00);
        assert!(Binning::try_from(3).is_err());
    }
}
