#![no_std]

//! This crate drives HD44780 compatible character LCDs in 4-bit mode through
//! any byte channel that clocks received bytes out onto parallel lines, for
//! example an FTDI USB converter in bitbang mode.
//!
//! Every nibble becomes three bytes on the channel (stable, enable pulse,
//! stable). Between commands the controller needs settle time. [Bitbang]
//! either waits it out ([Mode::Direct]) or, in [Mode::Batched], packs many
//! commands into one write and pads each with filler bytes whose transfer
//! time spaces the pulses. Only Clear Display and Return Home still need a
//! blocking wait.
//!
//! ```ignore
//! let mut lcd = Builder::new(channel, delay)
//!     .mode(Mode::batched_for_rate(131_072))
//!     .build()?;
//! lcd.write(&[0, 1, 2, 8])?; // clear display, function set
//! ```
//!
//! [driver::Hd44780] builds on top of [Bitbang] and speaks the HD44780
//! instruction set.

#[cfg(test)]
extern crate std;

use embedded_hal::delay::DelayNs;

pub mod interface;
use interface::Channel;

pub mod options;
pub use options::{Mode, DEFAULT_FILLER};

mod builder;
pub use builder::*;

pub mod batch;
pub mod driver;
pub mod frame;
pub mod instruction;
pub mod mapping;
pub mod timing;

use batch::BatchBuffer;
use mapping::PinMapping;
use timing::{Clock, CommandClass, NoClock, Scheduler};

#[cfg(test)]
mod _mock;

/// Error returned by [Bitbang] transmissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Nibble stream was neither a single nibble nor a positive even number of
    /// nibbles. Nothing was sent.
    InvalidLength(usize),
    /// The channel failed.
    Channel {
        /// Nibbles of the input stream confirmed as sent.
        accepted: usize,
        error: E,
    },
    /// The channel accepted fewer bytes than given.
    ShortWrite {
        /// Nibbles of the input stream confirmed as sent.
        accepted: usize,
    },
}

impl<E> Error<E> {
    /// Nibbles of the failed stream that reached the controller as whole
    /// commands. Resubmitting `&stream[accepted..]` continues where the
    /// failure happened.
    pub fn accepted(&self) -> usize {
        match *self {
            Error::InvalidLength(_) => 0,
            Error::Channel { accepted, .. } | Error::ShortWrite { accepted } => accepted,
        }
    }
}

/// Bitbang encoder for one display.
///
/// Owns the channel, the delay source, the output buffer and the settle
/// deadline. Use [Builder] to create one.
pub struct Bitbang<CH, D, CLK = NoClock>
where
    CH: Channel,
    D: DelayNs,
    CLK: Clock,
{
    /// The output channel.
    channel: CH,
    /// Delay used to wait out settle deadlines.
    delay: D,
    /// Time source for settle deadlines.
    clock: CLK,
    /// Control line positions.
    mapping: PinMapping,
    /// Transmission strategy.
    mode: Mode,
    /// R/W and AUX bits OR'd into every output byte.
    aux: u8,
    scheduler: Scheduler,
    buffer: BatchBuffer,
}

impl<CH, D, CLK> Bitbang<CH, D, CLK>
where
    CH: Channel,
    D: DelayNs,
    CLK: Clock,
{
    /// Sends a nibble stream and returns the number of nibbles sent.
    ///
    /// `nibbles` is either one raw nibble of the power-on initialization
    /// sequence, followed by a fixed 5 ms settle time, or a positive even
    /// number of nibbles, each pair forming one instruction or data byte
    /// (high nibble first). RS must already be OR'd into the nibbles.
    ///
    /// On failure [Error::accepted] tells how many nibbles were delivered as
    /// whole commands.
    pub fn write(&mut self, nibbles: &[u8]) -> Result<usize, Error<CH::Error>> {
        match nibbles {
            [nibble] => self.write_nibble(*nibble),
            _ if !nibbles.is_empty() && nibbles.len() % 2 == 0 => self.write_commands(nibbles),
            _ => Err(Error::InvalidLength(nibbles.len())),
        }
    }

    /// Sets the R/W line and writes one byte carrying the new state.
    ///
    /// The byte is sent immediately, ignoring any pending settle deadline.
    pub fn set_read_write(&mut self, high: bool) -> Result<(), Error<CH::Error>> {
        self.set_control(self.mapping.read_write_mask(), high)
    }

    /// Sets the AUX line and writes one byte carrying the new state.
    ///
    /// The byte is sent immediately, ignoring any pending settle deadline.
    pub fn set_aux(&mut self, high: bool) -> Result<(), Error<CH::Error>> {
        self.set_control(self.mapping.aux_mask(), high)
    }

    /// Returns the current state of the R/W line.
    pub fn read_write(&self) -> bool {
        self.aux & self.mapping.read_write_mask() != 0
    }

    /// Returns the current state of the AUX line.
    pub fn aux(&self) -> bool {
        self.aux & self.mapping.aux_mask() != 0
    }

    pub fn mapping(&self) -> PinMapping {
        self.mapping
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the pending settle deadline on the encoder's clock, if any.
    pub fn pending_deadline(&self) -> Option<u64> {
        self.scheduler.deadline()
    }

    /// Releases the channel, delay and clock.
    pub fn release(self) -> (CH, D, CLK) {
        (self.channel, self.delay, self.clock)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<usize, Error<CH::Error>> {
        self.scheduler.wait(&mut self.clock, &mut self.delay);
        self.buffer.fill_nibble(nibble, self.aux, self.mapping.enable_mask());
        let sent = self.flush(0)?;
        if sent == 0 {
            return Err(Error::ShortWrite { accepted: 0 });
        }
        self.scheduler.arm(&mut self.clock, timing::INIT_SETTLE_US);
        Ok(1)
    }

    fn write_commands(&mut self, pairs: &[u8]) -> Result<usize, Error<CH::Error>> {
        let max_commands = match self.mode {
            Mode::Direct => 1,
            Mode::Batched { .. } => usize::MAX,
        };
        let filler = self.mode.filler();

        let mut done = 0;
        while done < pairs.len() {
            self.scheduler.wait(&mut self.clock, &mut self.delay);
            let batch = self.buffer.fill(
                &pairs[done..],
                self.aux,
                self.mapping.enable_mask(),
                filler,
                max_commands,
            );
            let sent = self.flush(done)?;
            if sent < batch.nibbles {
                return Err(Error::ShortWrite {
                    accepted: done + sent,
                });
            }
            done += batch.nibbles;

            match (batch.last, self.mode) {
                // filler already spaced the commands
                (CommandClass::Fast, Mode::Batched { filler }) if filler > 0 => {}
                (class, _) => self.scheduler.arm(&mut self.clock, class.settle_us()),
            }
        }
        Ok(done)
    }

    /// Writes the buffer in one channel call and returns the nibbles it
    /// confirmed. `done` is the count already confirmed by earlier calls.
    fn flush(&mut self, done: usize) -> Result<usize, Error<CH::Error>> {
        debug_assert!(!self.buffer.is_empty());
        #[cfg(feature = "defmt")]
        defmt::trace!("channel write: {=usize} bytes", self.buffer.len());
        match self.channel.write(self.buffer.as_slice()) {
            Ok(n) => {
                #[cfg(feature = "defmt")]
                if n < self.buffer.len() {
                    defmt::warn!("short write: {=usize} of {=usize}", n, self.buffer.len());
                }
                Ok(self.buffer.confirmed(n))
            }
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("channel write failed after {=usize} nibbles", done);
                Err(Error::Channel {
                    accepted: done,
                    error,
                })
            }
        }
    }

    fn set_control(&mut self, mask: u8, high: bool) -> Result<(), Error<CH::Error>> {
        if high {
            self.aux |= mask;
        } else {
            self.aux &= !mask;
        }
        match self.channel.write(&[self.aux]) {
            Ok(1) => Ok(()),
            Ok(_) => Err(Error::ShortWrite { accepted: 0 }),
            Err(error) => Err(Error::Channel { accepted: 0, error }),
        }
    }
}
