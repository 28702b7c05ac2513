//! HD44780 character display on top of [Bitbang].
//!
//! [Hd44780] turns instructions and data bytes into nibble pairs, queues them
//! and hands the queue to the encoder on [Hd44780::flush]. Nothing here knows
//! about timing.

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::{
    instruction::{
        ClearDisplay, DisplayControl, EntryMode, FunctionSet, Instruction, ReturnHome,
        SetCgramAddress, SetDdramAddress, Shift, INIT_4BIT,
    },
    interface::Channel,
    timing::Clock,
    Bitbang, Error,
};

/// Nibbles the queue holds: a Set DDRAM Address plus a full 4x20 screen,
/// with room to spare.
pub const QUEUE_LEN: usize = 2 * 84;

/// Error returned by [Hd44780].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// Error caused by the encoder or its channel.
    Bitbang(Error<E>),
    /// Rows must be 1, 2 or 4 and columns 1 to 40.
    InvalidSize,
    /// Cursor position outside the display.
    InvalidPosition,
    /// RS bit inside the data nibble, above bit 7 or used by a control line.
    InvalidRegisterSelect,
}

impl<E> From<Error<E>> for DriverError<E> {
    fn from(value: Error<E>) -> Self {
        Self::Bitbang(value)
    }
}

/// HD44780 display with `cols` x `rows` characters.
pub struct Hd44780<CH, D, CLK>
where
    CH: Channel,
    D: DelayNs,
    CLK: Clock,
{
    bitbang: Bitbang<CH, D, CLK>,
    cols: u8,
    rows: u8,
    /// RS bit mask.
    rs: u8,
    queue: Vec<u8, QUEUE_LEN>,
}

impl<CH, D, CLK> Hd44780<CH, D, CLK>
where
    CH: Channel,
    D: DelayNs,
    CLK: Clock,
{
    /// Wraps `bitbang` with RS on bit 6.
    pub fn new(
        bitbang: Bitbang<CH, D, CLK>,
        cols: u8,
        rows: u8,
    ) -> Result<Self, DriverError<CH::Error>> {
        Self::with_register_select(bitbang, cols, rows, 6)
    }

    /// Wraps `bitbang` with RS on bit `rs`.
    pub fn with_register_select(
        bitbang: Bitbang<CH, D, CLK>,
        cols: u8,
        rows: u8,
        rs: u8,
    ) -> Result<Self, DriverError<CH::Error>> {
        if !matches!(rows, 1 | 2 | 4) || !(1..=40).contains(&cols) {
            return Err(DriverError::InvalidSize);
        }
        if !(4..8).contains(&rs) || bitbang.mapping().control_mask() & (1 << rs) != 0 {
            return Err(DriverError::InvalidRegisterSelect);
        }
        Ok(Self {
            bitbang,
            cols,
            rows,
            rs: 1 << rs,
            queue: Vec::new(),
        })
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Initializes the controller. Queued, unsent data is dropped.
    ///
    /// Afterwards the controller is in 4-bit mode, has one line if `rows` is
    /// 1 and two otherwise, 5x8 font, display off, cursor off, blink off,
    /// increment mode and cursor at home.
    pub fn init(&mut self) -> Result<(), DriverError<CH::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("initializing {=u8}x{=u8} display", self.cols, self.rows);

        self.queue.clear();
        for nibble in INIT_4BIT {
            self.bitbang.write(&[nibble])?;
        }
        // some controller models need function set before anything else
        self.command(FunctionSet::for_rows(self.rows))?;
        self.command(DisplayControl::OFF)?;
        self.command(EntryMode::default())?;
        self.command(ReturnHome)?;
        self.flush()
    }

    /// Queues an instruction.
    pub fn command<I: Instruction>(
        &mut self,
        instruction: I,
    ) -> Result<(), DriverError<CH::Error>> {
        self.push(instruction.nibbles())
    }

    pub fn clear(&mut self) -> Result<(), DriverError<CH::Error>> {
        self.command(ClearDisplay)
    }

    pub fn home(&mut self) -> Result<(), DriverError<CH::Error>> {
        self.command(ReturnHome)
    }

    pub fn set_entry_mode(&mut self, mode: EntryMode) -> Result<(), DriverError<CH::Error>> {
        self.command(mode)
    }

    pub fn set_display(&mut self, control: DisplayControl) -> Result<(), DriverError<CH::Error>> {
        self.command(control)
    }

    pub fn shift(&mut self, shift: Shift) -> Result<(), DriverError<CH::Error>> {
        self.command(shift)
    }

    pub fn set_function(&mut self, function: FunctionSet) -> Result<(), DriverError<CH::Error>> {
        self.command(function)
    }

    pub fn set_cgram_address(&mut self, addr: u8) -> Result<(), DriverError<CH::Error>> {
        self.command(SetCgramAddress(addr))
    }

    pub fn set_ddram_address(&mut self, addr: u8) -> Result<(), DriverError<CH::Error>> {
        self.command(SetDdramAddress(addr))
    }

    /// Moves the cursor to `col`, `row`.
    ///
    /// Rows 2 and 3 of a 4 row display continue rows 0 and 1 in DDRAM.
    pub fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), DriverError<CH::Error>> {
        if col >= self.cols || row >= self.rows {
            return Err(DriverError::InvalidPosition);
        }
        let addr = match row {
            0 => col,
            1 => 0x40 + col,
            2 => self.cols + col,
            _ => 0x40 + self.cols + col,
        };
        self.set_ddram_address(addr)
    }

    /// Queues data bytes for the current CGRAM or DDRAM address.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), DriverError<CH::Error>> {
        for &b in data {
            self.push([self.rs | b >> 4, self.rs | b & 0x0f])?;
        }
        Ok(())
    }

    /// Queues `text`. Characters outside ASCII are written as `?`.
    pub fn print(&mut self, text: &str) -> Result<(), DriverError<CH::Error>> {
        for c in text.chars() {
            let b = if c.is_ascii() { c as u8 } else { b'?' };
            self.write_bytes(&[b])?;
        }
        Ok(())
    }

    /// Flushes the queue, then switches the AUX line.
    pub fn set_backlight(&mut self, on: bool) -> Result<(), DriverError<CH::Error>> {
        self.flush()?;
        self.bitbang.set_aux(on)?;
        Ok(())
    }

    /// Sends everything queued.
    ///
    /// On failure the nibbles not confirmed by the encoder stay queued, so
    /// calling `flush` again resumes without duplicates.
    pub fn flush(&mut self) -> Result<(), DriverError<CH::Error>> {
        if self.queue.is_empty() {
            return Ok(());
        }
        match self.bitbang.write(&self.queue) {
            Ok(_) => {
                self.queue.clear();
                Ok(())
            }
            Err(err) => {
                let accepted = err.accepted();
                let remaining = self.queue.len() - accepted;
                self.queue.copy_within(accepted.., 0);
                self.queue.truncate(remaining);
                Err(err.into())
            }
        }
    }

    /// Returns the encoder, for direct nibble access.
    pub fn bitbang_mut(&mut self) -> &mut Bitbang<CH, D, CLK> {
        &mut self.bitbang
    }

    /// Releases the encoder. Queued, unsent data is dropped.
    pub fn release(self) -> Bitbang<CH, D, CLK> {
        self.bitbang
    }

    fn push(&mut self, pair: [u8; 2]) -> Result<(), DriverError<CH::Error>> {
        if self.queue.len() + pair.len() > self.queue.capacity() {
            self.flush()?;
        }
        let pushed = self.queue.extend_from_slice(&pair);
        debug_assert!(pushed.is_ok());
        Ok(())
    }
}

/// Queues formatted text through [Hd44780::print].
///
/// [fmt::Error] carries no detail; call [Hd44780::flush] to get the
/// encoder error after a failed `write!`.
impl<CH, D, CLK> fmt::Write for Hd44780<CH, D, CLK>
where
    CH: Channel,
    D: DelayNs,
    CLK: Clock,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|_| fmt::Error)
    }
}
