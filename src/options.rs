//! Transmission strategy.

use crate::{frame::COMMAND_LEN, timing::FAST_SETTLE_US};

/// Filler bytes per command used by [Mode::default].
///
/// An FT232R in bitbang mode at 131072 B/s spends about 46 µs on 6 bytes,
/// which covers [FAST_SETTLE_US].
pub const DEFAULT_FILLER: usize = 6;

/// How commands are packed into channel writes.
///
/// Chosen once when the encoder is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// One channel write per command, with a blocking wait for the settle
    /// deadline before every command.
    Direct,
    /// As many commands per channel write as fit into the buffer.
    ///
    /// Every command is followed by `filler` zero bytes. Sending them takes
    /// time, which spaces out the enable pulses of consecutive commands
    /// without any explicit wait. Only a slow command (Clear Display, Return
    /// Home) ends a batch early and is followed by a blocking wait.
    ///
    /// With `filler == 0` nothing spaces the commands inside a batch, so the
    /// channel itself must be slow enough; a short deadline is still armed
    /// after each batch.
    Batched { filler: usize },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Batched {
            filler: DEFAULT_FILLER,
        }
    }
}

impl Mode {
    /// Batched mode with enough filler to cover [FAST_SETTLE_US] on a
    /// channel sending `bytes_per_second`.
    pub fn batched_for_rate(bytes_per_second: u32) -> Self {
        let scaled = u64::from(FAST_SETTLE_US) * u64::from(bytes_per_second);
        let filler = scaled.div_ceil(1_000_000);
        Mode::Batched {
            filler: usize::try_from(filler).unwrap_or(usize::MAX),
        }
    }

    /// Filler bytes following each command.
    pub const fn filler(&self) -> usize {
        match *self {
            Mode::Direct => 0,
            Mode::Batched { filler } => filler,
        }
    }

    /// Bytes one command occupies in the buffer.
    pub const fn slot_len(&self) -> usize {
        COMMAND_LEN.saturating_add(self.filler())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filler_from_rate() {
        assert_eq!(Mode::batched_for_rate(131_072), Mode::Batched { filler: 6 });
        assert_eq!(Mode::batched_for_rate(25_000), Mode::Batched { filler: 1 });
        assert_eq!(Mode::batched_for_rate(0), Mode::Batched { filler: 0 });
    }

    #[test]
    fn slot_len() {
        assert_eq!(Mode::Direct.slot_len(), 6);
        assert_eq!(Mode::default().slot_len(), 12);
    }
}
