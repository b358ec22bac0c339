//! Hardware pulse channel abstraction.
//!
//! The channel is a byte-oriented serial-like sink owned exclusively by
//! the event marker. Real implementations wrap a serial port; tests use
//! an in-memory recorder.

use std::io;

/// A byte-oriented sink for TTL pulses.
///
/// Writes are synchronous one-byte operations assumed non-blocking at the
/// hardware layer.
pub trait PulseChannel: Send {
    /// Write one pulse byte.
    fn write_pulse(&mut self, byte: u8) -> io::Result<()>;

    /// Release the underlying resource. Called once at shutdown.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Factory that opens a channel by port name and baud rate.
///
/// The application supplies this (wrapping its serial library of choice);
/// the marker calls it once at startup, best-effort.
pub type ChannelOpener = dyn Fn(&str, u32) -> io::Result<Box<dyn PulseChannel>> + Send + Sync;


#[cfg(test)]
mod tests {
    use super::test_support::RecordingChannel;
    use super::*;

    #[test]
    fn recording_channel_captures_bytes() {
        let (mut channel, written) = RecordingChannel::new();
        channel.write_pulse(0x01).unwrap();
        channel.write_pulse(0x80).unwrap();
        assert_eq!(*written.lock().unwrap(), vec![0x01, 0x80]);
    }

    #[test]
    fn failing_channel_reports_io_error() {
        let mut channel = RecordingChannel::failing();
        assert!(channel.write_pulse(0x01).is_err());
    }
}
