//! TTL event marker: semantic event -> hardware pulse + audit line.
//!
//! The marker must never throw across a trial boundary: every failure
//! path degrades to a logged status and emission always completes.

use crate::config::TtlConfig;
use crate::ttl::channel::{ChannelOpener, PulseChannel};
use crate::ttl::log::EventLog;
use crate::ttl::table::EventTable;
use log::warn;
use serde::{Deserialize, Serialize};

/// How an emission was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitStatus {
    /// Hardware-enabled event, pulse byte written.
    Sent,
    /// Hardware-enabled event in test mode; no I/O attempted.
    TestOnly,
    /// Hardware-enabled event but the channel is unavailable.
    Failed,
    /// Event outside the hardware allow-list; audit line only.
    LogOnly,
}

impl EmitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::TestOnly => "TEST_ONLY",
            Self::Failed => "FAILED",
            Self::LogOnly => "LOG_ONLY",
        }
    }
}

impl std::fmt::Display for EmitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic event-to-pulse marker with an append-only audit log.
pub struct EventMarker {
    table: EventTable,
    channel: Option<Box<dyn PulseChannel>>,
    test_mode: bool,
    log: EventLog,
}

impl EventMarker {
    /// Assemble a marker from its parts.
    ///
    /// `channel` is `None` when the port could not be opened (or none is
    /// configured); hardware-enabled emissions then degrade to `Failed`.
    pub fn new(
        table: EventTable,
        channel: Option<Box<dyn PulseChannel>>,
        test_mode: bool,
        mut log: EventLog,
    ) -> Self {
        log.append(&format!(
            "INIT | test_mode={} | channel={}",
            test_mode,
            if channel.is_some() { "open" } else { "unavailable" }
        ));
        Self {
            table,
            channel,
            test_mode,
            log,
        }
    }

    /// Open the marker against a configured port, best-effort.
    ///
    /// In test mode no port is opened at all. An open failure is logged
    /// and leaves the marker in software-only mode; it is never fatal.
    pub fn open(config: &TtlConfig, opener: &ChannelOpener, log: EventLog) -> Self {
        let channel = if config.test_mode {
            None
        } else {
            match opener(&config.port_name, config.baud_rate) {
                Ok(channel) => Some(channel),
                Err(e) => {
                    warn!(
                        "failed to open pulse channel '{}': {e}; continuing software-only",
                        config.port_name
                    );
                    None
                }
            }
        };
        Self::new(EventTable::canonical(), channel, config.test_mode, log)
    }

    /// Emit the event with the given 1-indexed code.
    ///
    /// All paths append an audit line; none of them panic or return an
    /// error. The returned status tells the caller how the event was
    /// resolved.
    pub fn emit(&mut self, code: u8) -> EmitStatus {
        let label = self.table.label(code).into_owned();

        let (status, byte) = if self.table.is_hardware(code) {
            // Table validation guarantees hardware codes fit one byte.
            match EventTable::hardware_byte(code) {
                Some(byte) if self.test_mode => (EmitStatus::TestOnly, Some(byte)),
                Some(byte) => match self.channel.as_mut() {
                    Some(channel) => match channel.write_pulse(byte) {
                        Ok(()) => (EmitStatus::Sent, Some(byte)),
                        Err(e) => {
                            warn!("pulse write failed for event '{label}': {e}");
                            (EmitStatus::Failed, None)
                        }
                    },
                    None => {
                        warn!("pulse channel unavailable for event '{label}'");
                        (EmitStatus::Failed, None)
                    }
                },
                None => {
                    warn!("event '{label}' (code {code}) pulse does not fit one byte");
                    (EmitStatus::Failed, None)
                }
            }
        } else {
            (EmitStatus::LogOnly, None)
        };

        match (status, byte) {
            (EmitStatus::Sent, Some(byte)) => {
                self.log
                    .append(&format!("SENT | event={label} | byte={byte}"));
            }
            _ => {
                self.log
                    .append(&format!("{status} | event={label} | No Byte Sent"));
            }
        }

        status
    }

    /// Whether the marker currently holds an open channel.
    pub fn channel_open(&self) -> bool {
        self.channel.is_some()
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    /// Close the channel at process shutdown.
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close() {
                warn!("failed to close pulse channel: {e}");
            }
            self.log.append("SHUTDOWN | channel closed");
        }
    }
}

impl Drop for EventMarker {
    fn drop(&mut self) {
        self.close();
    }
}
