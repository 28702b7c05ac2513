//! Reusable output buffer shared by every transmission of an encoder.

use heapless::Vec;

use crate::{
    frame::{self, COMMAND_LEN, FILLER, FRAME_LEN},
    timing::CommandClass,
};

/// Capacity of the output buffer in bytes.
///
/// Holds 80 commands (a full 4x20 screen of data writes) without filler.
pub const BUFFER_LEN: usize = 480;

/// Summary of what [BatchBuffer::fill] packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// Nibbles of the input stream taken into the buffer.
    pub nibbles: usize,
    /// Class of the last command in the batch.
    pub last: CommandClass,
}

/// Fixed capacity byte buffer, filled with one batch at a time.
pub struct BatchBuffer {
    buf: Vec<u8, BUFFER_LEN>,
    slot: usize,
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchBuffer {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            slot: COMMAND_LEN,
        }
    }

    /// Encoded bytes of the current batch.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Replaces the buffer content with the single frame of a raw nibble.
    pub fn fill_nibble(&mut self, nibble: u8, aux: u8, enable: u8) {
        self.buf.clear();
        self.slot = FRAME_LEN;
        let pushed = self
            .buf
            .extend_from_slice(&frame::encode(nibble, aux, enable));
        debug_assert!(pushed.is_ok());
    }

    /// Replaces the buffer content with as many commands from `pairs` as fit,
    /// at most `max_commands`, each followed by `filler` filler bytes.
    ///
    /// A slow command is always the last one taken. `pairs` must hold a
    /// positive even number of nibbles and `COMMAND_LEN + filler` must not
    /// exceed [BUFFER_LEN].
    pub fn fill(
        &mut self,
        pairs: &[u8],
        aux: u8,
        enable: u8,
        filler: usize,
        max_commands: usize,
    ) -> Batch {
        self.buf.clear();
        self.slot = COMMAND_LEN + filler;

        let mut batch = Batch {
            nibbles: 0,
            last: CommandClass::Fast,
        };
        for pair in pairs.chunks_exact(2).take(max_commands) {
            if self.buf.len() + self.slot > self.buf.capacity() {
                break;
            }
            let mut encoded = [0; COMMAND_LEN];
            frame::encode_pair(pair[0], pair[1], aux, enable, &mut encoded);
            let pushed = self
                .buf
                .extend_from_slice(&encoded)
                .and_then(|()| self.buf.resize(self.buf.len() + filler, FILLER));
            debug_assert!(pushed.is_ok());

            batch.nibbles += 2;
            batch.last = CommandClass::of(pair[0], pair[1]);
            if batch.last == CommandClass::Slow {
                break;
            }
        }
        batch
    }

    /// Converts a count of bytes accepted by the channel into the number of
    /// input nibbles whose slots were delivered in full.
    pub fn confirmed(&self, accepted: usize) -> usize {
        let slots = accepted.min(self.buf.len()) / self.slot;
        if self.slot == FRAME_LEN {
            slots
        } else {
            slots * 2
        }
    }
}
