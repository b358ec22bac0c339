//! Session context: explicit per-run state shared by sequencer and marker.
//!
//! Replaces the global mutable session singleton of ancestral designs:
//! everything the trial machinery needs is passed in at construction and
//! scoped to one experiment run.

pub mod feed;

pub use feed::{FeedProducer, TickFeed};

use crate::config::SessionConfig;
use crate::ttl::channel::ChannelOpener;
use crate::ttl::{EventLog, EventMarker};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity and configuration for one experiment run.
pub struct SessionContext {
    id: Uuid,
    started_at: DateTime<Utc>,
    config: SessionConfig,
}

impl SessionContext {
    /// Start a new session now.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open the event marker for this session.
    ///
    /// The log file lands in the configured directory, named after the
    /// session start. Only log creation is fatal (the audit trail is a
    /// data-record requirement); the hardware channel itself opens
    /// best-effort inside the marker.
    pub fn open_marker(&self, opener: &ChannelOpener) -> std::io::Result<EventMarker> {
        let log = EventLog::create(&self.config.ttl.log_dir, self.started_at)?;
        Ok(EventMarker::open(&self.config.ttl, opener, log))
    }
}
