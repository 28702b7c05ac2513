use super::Channel;

/// [Channel] over any [embedded_io::Write] byte stream.
///
/// `embedded_io` writers may take any non-empty prefix per call, so the
/// slice is written in a loop until all of it is taken, the writer accepts
/// nothing or it fails. Only then is the count reported as short.
pub struct IoChannel<W> {
    writer: W,
}

impl<W> IoChannel<W>
where
    W: embedded_io::Write,
{
    /// Create new channel
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Release the underlying writer
    pub fn release(self) -> W {
        self.writer
    }
}

impl<W> Channel for IoChannel<W>
where
    W: embedded_io::Write,
{
    type Error = W::Error;

    /// Writes and flushes `bytes`.
    ///
    /// Errors are returned only when nothing was accepted. Once bytes went
    /// out a failure, of `write` or `flush`, is reported as the count taken
    /// so far; the writer reports the error again on the next call.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        let mut written = 0;
        while written < bytes.len() {
            match self.writer.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(err) if written == 0 => return Err(err),
                Err(_) => break,
            }
        }
        if written == 0 {
            return Ok(0);
        }
        if self.writer.flush().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("flush failed after {=usize} bytes", written);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::ErrorKind;
    use std::vec::Vec;

    /// Writer taking at most `chunk` bytes per call.
    struct Trickle {
        chunk: usize,
        taken: Vec<u8>,
        calls: usize,
        fail_flush: bool,
    }

    impl Trickle {
        fn new(chunk: usize) -> Self {
            Self {
                chunk,
                taken: Vec::new(),
                calls: 0,
                fail_flush: false,
            }
        }
    }

    impl embedded_io::ErrorType for Trickle {
        type Error = ErrorKind;
    }

    impl embedded_io::Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
            self.calls += 1;
            let n = buf.len().min(self.chunk);
            self.taken.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), ErrorKind> {
            if self.fail_flush {
                Err(ErrorKind::Other)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn loops_over_partial_writes() {
        let mut ch = IoChannel::new(Trickle::new(5));
        let bytes: Vec<u8> = (0..18).collect();
        assert_eq!(ch.write(&bytes), Ok(18));
        let writer = ch.release();
        assert_eq!(writer.taken, bytes);
        assert_eq!(writer.calls, 4);
    }

    #[test]
    fn stops_when_writer_takes_nothing() {
        let mut ch = IoChannel::new(Trickle::new(0));
        assert_eq!(ch.write(&[1, 2, 3]), Ok(0));
        assert_eq!(ch.release().calls, 1);
    }

    #[test]
    fn flush_failure_keeps_written_count() {
        let mut writer = Trickle::new(4);
        writer.fail_flush = true;
        let mut ch = IoChannel::new(writer);
        assert_eq!(ch.write(&[1, 2, 3, 4, 5, 6]), Ok(6));
    }

    #[test]
    fn full_slice_reports_prefix() {
        let mut storage = [0u8; 4];
        let mut ch = IoChannel::new(&mut storage[..]);
        assert!(matches!(ch.write(&[1, 2, 3]), Ok(3)));
        assert!(matches!(ch.write(&[4, 5, 6]), Ok(1)));
        assert!(ch.write(&[7]).is_err());
        drop(ch);
        assert_eq!(storage, [1, 2, 3, 4]);
    }
}
