//! [super::Bitbang] builder module

use embedded_hal::delay::DelayNs;

use crate::{
    batch::{BatchBuffer, BUFFER_LEN},
    interface::Channel,
    mapping::PinMapping,
    options::Mode,
    timing::{Clock, NoClock, Scheduler},
    Bitbang,
};

/// Builder for [Bitbang] instances.
pub struct Builder<CH, D, CLK>
where
    CH: Channel,
    D: DelayNs,
{
    channel: CH,
    delay: D,
    clock: CLK,
    mapping: PinMapping,
    mode: Mode,
}

impl<CH, D> Builder<CH, D, NoClock>
where
    CH: Channel,
    D: DelayNs,
{
    #[must_use]
    pub fn new(channel: CH, delay: D) -> Self {
        Self {
            channel,
            delay,
            clock: NoClock,
            mapping: PinMapping::default(),
            mode: Mode::default(),
        }
    }
}

impl<CH, D, CLK> Builder<CH, D, CLK>
where
    CH: Channel,
    D: DelayNs,
    CLK: Clock,
{
    #[must_use]
    pub fn mapping(mut self, mapping: PinMapping) -> Self {
        self.mapping = mapping;
        self
    }
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Measures settle deadlines with `clock` instead of always waiting the
    /// full settle time.
    #[must_use]
    pub fn clock<CLK2: Clock>(self, clock: CLK2) -> Builder<CH, D, CLK2> {
        Builder {
            channel: self.channel,
            delay: self.delay,
            clock,
            mapping: self.mapping,
            mode: self.mode,
        }
    }

    pub fn build(self) -> Result<Bitbang<CH, D, CLK>, ConfigurationError> {
        self.mapping.validate()?;
        if self.mode.slot_len() > BUFFER_LEN {
            return Err(ConfigurationError::FillerTooLarge);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "bitbang encoder: mapping {}, mode {}",
            self.mapping,
            self.mode
        );

        Ok(Bitbang {
            channel: self.channel,
            delay: self.delay,
            clock: self.clock,
            mapping: self.mapping,
            mode: self.mode,
            aux: 0,
            scheduler: Scheduler::new(),
            buffer: BatchBuffer::new(),
        })
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// A control line is inside the data nibble, above bit 7 or shares its
    /// bit with another line.
    InvalidMapping,
    /// One command plus its filler doesn't fit into the output buffer.
    FillerTooLarge,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::_mock::{MockChannel, MockTime};

    #[test]
    fn rejects_invalid_mapping() {
        let time = MockTime::new();
        let res = Builder::new(MockChannel::new(&time), time.delay())
            .mapping(PinMapping::new(4, 7, 7))
            .build();
        assert!(matches!(res, Err(ConfigurationError::InvalidMapping)));
    }

    #[test]
    fn rejects_oversized_filler() {
        let time = MockTime::new();
        let res = Builder::new(MockChannel::new(&time), time.delay())
            .mode(Mode::Batched {
                filler: BUFFER_LEN - 5,
            })
            .build();
        assert!(matches!(res, Err(ConfigurationError::FillerTooLarge)));

        let res = Builder::new(MockChannel::new(&time), time.delay())
            .mode(Mode::Batched {
                filler: BUFFER_LEN - 6,
            })
            .build();
        assert!(res.is_ok());
    }

    #[test]
    fn defaults() {
        let time = MockTime::new();
        let bb = Builder::new(MockChannel::new(&time), time.delay())
            .build()
            .unwrap();
        assert_eq!(bb.mapping(), PinMapping::default());
        assert_eq!(bb.mode(), Mode::default());
        assert!(!bb.aux());
        assert_eq!(bb.pending_deadline(), None);
    }
}
