//! HD44780 instruction set.

/// Nibbles of the power-on sequence that switches the controller to 4-bit
/// mode from any state.
///
/// The controller may be in 8-bit mode or in 4-bit mode, halfway through a
/// command or not. `3` is "function set, 8-bit" in both modes when only the
/// upper data pins are wired, so three of them always end in 8-bit mode.
/// `2` then selects 4-bit mode. Each has to be sent on its own.
pub const INIT_4BIT: [u8; 4] = [3, 3, 3, 2];

/// An instruction register command.
pub trait Instruction {
    /// The instruction byte.
    fn instruction(&self) -> u8;

    /// The instruction as (high, low) nibbles with RS clear.
    fn nibbles(&self) -> [u8; 2] {
        let b = self.instruction();
        [b >> 4, b & 0x0f]
    }
}

/// Clears the display and sets DDRAM address 0. Slow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearDisplay;

impl Instruction for ClearDisplay {
    fn instruction(&self) -> u8 {
        0x01
    }
}

/// Sets DDRAM address 0 and undoes display shift. Slow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnHome;

impl Instruction for ReturnHome {
    fn instruction(&self) -> u8 {
        0x02
    }
}

/// Cursor move direction and display shift on data writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryMode {
    pub increment: bool,
    pub shift: bool,
}

impl Default for EntryMode {
    fn default() -> Self {
        Self {
            increment: true,
            shift: false,
        }
    }
}

impl Instruction for EntryMode {
    fn instruction(&self) -> u8 {
        0x04 | u8::from(self.increment) << 1 | u8::from(self.shift)
    }
}

/// Display, cursor and blink on/off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayControl {
    pub display: bool,
    pub cursor: bool,
    pub blink: bool,
}

impl DisplayControl {
    pub const OFF: Self = Self {
        display: false,
        cursor: false,
        blink: false,
    };
    pub const ON: Self = Self {
        display: true,
        cursor: false,
        blink: false,
    };
}

impl Instruction for DisplayControl {
    fn instruction(&self) -> u8 {
        0x08 | u8::from(self.display) << 2 | u8::from(self.cursor) << 1 | u8::from(self.blink)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftTarget {
    Cursor,
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Left,
    Right,
}

/// Moves the cursor or shifts the display without writing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shift {
    pub target: ShiftTarget,
    pub direction: Direction,
}

impl Instruction for Shift {
    fn instruction(&self) -> u8 {
        let target = match self.target {
            ShiftTarget::Cursor => 0,
            ShiftTarget::Display => 1 << 3,
        };
        let direction = match self.direction {
            Direction::Left => 0,
            Direction::Right => 1 << 2,
        };
        0x10 | target | direction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lines {
    #[default]
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    #[default]
    Font5x8,
    Font5x10,
}

/// Function set. The data length bit is always 4-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FunctionSet {
    pub lines: Lines,
    pub font: Font,
}

impl FunctionSet {
    /// Function set matching a display with `rows` rows and the 5x8 font.
    pub fn for_rows(rows: u8) -> Self {
        Self {
            lines: if rows == 1 { Lines::One } else { Lines::Two },
            font: Font::Font5x8,
        }
    }
}

impl Instruction for FunctionSet {
    fn instruction(&self) -> u8 {
        let lines = match self.lines {
            Lines::One => 0,
            Lines::Two => 1 << 3,
        };
        let font = match self.font {
            Font::Font5x8 => 0,
            Font::Font5x10 => 1 << 2,
        };
        0x20 | lines | font
    }
}

/// Sets the CGRAM address (6 bits) for following data writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCgramAddress(pub u8);

impl Instruction for SetCgramAddress {
    fn instruction(&self) -> u8 {
        0x40 | self.0 & 0x3f
    }
}

/// Sets the DDRAM address (7 bits) for following data writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDdramAddress(pub u8);

impl Instruction for SetDdramAddress {
    fn instruction(&self) -> u8 {
        0x80 | self.0 & 0x7f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::CommandClass;

    #[test]
    fn instruction_bytes() {
        assert_eq!(ClearDisplay.instruction(), 0x01);
        assert_eq!(ReturnHome.instruction(), 0x02);
        assert_eq!(EntryMode::default().instruction(), 0x06);
        assert_eq!(DisplayControl::ON.instruction(), 0x0c);
        assert_eq!(
            DisplayControl {
                display: true,
                cursor: true,
                blink: true
            }
            .instruction(),
            0x0f
        );
        assert_eq!(
            Shift {
                target: ShiftTarget::Display,
                direction: Direction::Right
            }
            .instruction(),
            0x1c
        );
        assert_eq!(FunctionSet::for_rows(2).instruction(), 0x28);
        assert_eq!(FunctionSet::for_rows(1).instruction(), 0x20);
        assert_eq!(SetCgramAddress(0xff).instruction(), 0x7f);
        assert_eq!(SetDdramAddress(0x40).instruction(), 0xc0);
    }

    #[test]
    fn only_clear_and_home_are_slow() {
        let [hi, lo] = ClearDisplay.nibbles();
        assert_eq!(CommandClass::of(hi, lo), CommandClass::Slow);
        let [hi, lo] = ReturnHome.nibbles();
        assert_eq!(CommandClass::of(hi, lo), CommandClass::Slow);
        let [hi, lo] = EntryMode::default().nibbles();
        assert_eq!(CommandClass::of(hi, lo), CommandClass::Fast);
        let [hi, lo] = DisplayControl::OFF.nibbles();
        assert_eq!(CommandClass::of(hi, lo), CommandClass::Fast);
    }
}
