//! Output channel abstraction.

mod io;
pub use io::*;

/// Byte sink that clocks every received byte onto the output lines.
///
/// Typical implementations are USB bitbang adapters (FT232R, FT245R) or a
/// GPIO port driven by DMA. Bytes must be put on the lines in order, at a
/// bounded rate.
pub trait Channel {
    /// Error type
    type Error: core::fmt::Debug;

    /// Writes `bytes` and returns how many were accepted.
    ///
    /// Accepting fewer bytes than given means only that prefix reached the
    /// lines. Errors mean nothing from this call was delivered.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: Channel + ?Sized> Channel for &mut T {
    type Error = T::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        T::write(self, bytes)
    }
}
