//! Nibble to signal word encoding.
//!
//! The controller samples D4-D7 and RS while E is high, so each nibble needs
//! setup time before the pulse and hold time after it. At the channel's byte
//! rate one byte time covers both, which gives the fixed three byte frame:
//!
//! ```text
//!        ____________________________
//! data  X____________________________X
//!                  _________
//! E     __________|         |__________
//!        stable     pulse     stable
//! ```

/// Bytes produced for one nibble.
pub const FRAME_LEN: usize = 3;

/// Bytes produced for one command (two nibbles).
pub const COMMAND_LEN: usize = 2 * FRAME_LEN;

/// Byte sent to burn channel time. E is never asserted.
///
/// Every line is low while filler goes out, AUX and R/W included. A
/// backlight on AUX dims during batched transfers.
pub const FILLER: u8 = 0x00;

/// Encodes `nibble` (with RS already OR'd in) into its three signal words.
///
/// `aux` holds the current R/W and AUX bits, `enable` the E bit mask.
pub const fn encode(nibble: u8, aux: u8, enable: u8) -> [u8; FRAME_LEN] {
    let b = nibble | aux;
    [b, b | enable, b]
}

/// Encodes both nibbles of a command into `out`.
pub fn encode_pair(hi: u8, lo: u8, aux: u8, enable: u8, out: &mut [u8; COMMAND_LEN]) {
    out[..FRAME_LEN].copy_from_slice(&encode(hi, aux, enable));
    out[FRAME_LEN..].copy_from_slice(&encode(lo, aux, enable));
}
