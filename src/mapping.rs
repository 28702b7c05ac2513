//! Control line to output bit mapping.
//!
//! The data nibble always occupies bits 0-3 of every output byte. The
//! remaining bits carry the control lines. The default mapping matches the
//! common FT232R wiring:
//!
//! | bit | line |
//! |-----|------|
//! | 0-3 | D4-D7 |
//! | 4   | E |
//! | 5   | R/W |
//! | 6   | RS |
//! | 7   | AUX (eg. backlight) |
//!
//! RS is not part of [PinMapping]: it belongs to the nibbles themselves and is
//! set by the instruction layer (see [crate::driver]).

use crate::ConfigurationError;

/// Mask of the data nibble bits.
pub const DATA_MASK: u8 = 0x0f;

/// Bit positions of the control lines driven by [crate::Bitbang].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMapping {
    /// Enable (clock) line.
    pub enable: u8,
    /// Read/write select line.
    pub read_write: u8,
    /// Auxiliary line, eg. backlight or the second E of a 40x4 module.
    pub aux: u8,
}

impl Default for PinMapping {
    fn default() -> Self {
        Self {
            enable: 4,
            read_write: 5,
            aux: 7,
        }
    }
}

impl PinMapping {
    pub const fn new(enable: u8, read_write: u8, aux: u8) -> Self {
        Self {
            enable,
            read_write,
            aux,
        }
    }

    pub const fn enable_mask(&self) -> u8 {
        1 << self.enable
    }

    pub const fn read_write_mask(&self) -> u8 {
        1 << self.read_write
    }

    pub const fn aux_mask(&self) -> u8 {
        1 << self.aux
    }

    /// All bits used by the control lines.
    pub const fn control_mask(&self) -> u8 {
        self.enable_mask() | self.read_write_mask() | self.aux_mask()
    }

    /// Checks that every line sits above the data nibble and that no two lines
    /// share a bit.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let positions = [self.enable, self.read_write, self.aux];
        if positions.iter().any(|&p| !(4..8).contains(&p)) {
            return Err(ConfigurationError::InvalidMapping);
        }
        if self.enable == self.read_write || self.enable == self.aux || self.read_write == self.aux
        {
            return Err(ConfigurationError::InvalidMapping);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_masks() {
        let m = PinMapping::default();
        assert_eq!(m.enable_mask(), 0x10);
        assert_eq!(m.read_write_mask(), 0x20);
        assert_eq!(m.aux_mask(), 0x80);
        assert_eq!(m.control_mask(), 0xb0);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn rejects_overlapping_lines() {
        let m = PinMapping::new(4, 4, 7);
        assert_eq!(m.validate(), Err(ConfigurationError::InvalidMapping));
    }

    #[test]
    fn rejects_lines_inside_data_nibble() {
        assert_eq!(
            PinMapping::new(3, 5, 7).validate(),
            Err(ConfigurationError::InvalidMapping)
        );
        assert_eq!(
            PinMapping::new(4, 5, 8).validate(),
            Err(ConfigurationError::InvalidMapping)
        );
    }
}
