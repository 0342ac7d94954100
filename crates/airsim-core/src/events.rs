//! System event log for quality and ventilation notifications.
//!
//! Every air system records what it did during a cycle into an [`EventLog`].
//! Callers pull events with `drain_events()` after driving the system; there
//! are no callbacks and no background delivery.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use airsim_types::QualityLevel;

use crate::ventilation::VentilationMode;

/// Activity modes that systems switch on and off by themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMode {
    Cooking,
    Shower,
    Sleep,
}

/// Events recorded by air systems.
///
/// All events are serializable for logging and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum AirEvent {
    /// Quality classification changed.
    QualityChanged {
        from: QualityLevel,
        to: QualityLevel,
    },
    /// Ventilation turned on.
    VentilationStarted {
        mode: VentilationMode,
        air_change_rate: f64,
    },
    /// Ventilation turned off.
    VentilationStopped,
    /// A safety interlock forced emergency ventilation.
    EmergencyVentilation { reason: String },
    /// An activity mode turned on or off.
    ModeChanged { mode: ActivityMode, active: bool },
    RoomAdded { name: String },
    RoomRemoved { name: String },
}

/// Default number of events kept before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Bounded buffer of events, oldest first.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<AirEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventLog {
    /// Create a log holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: AirEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Take every buffered event.
    pub fn drain(&mut self) -> Vec<AirEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AirEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events discarded because the log was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AirEvent::QualityChanged {
            from: QualityLevel::Good,
            to: QualityLevel::Poor,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"quality_changed","from":"good","to":"poor"}"#);

        let event = AirEvent::VentilationStarted {
            mode: VentilationMode::HumidityControl,
            air_change_rate: 8.0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""mode":"humidity_control""#));
        let back: AirEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_log_drops_oldest_when_full() {
        let mut log = EventLog::with_capacity(2);
        log.push(AirEvent::VentilationStopped);
        log.push(AirEvent::RoomAdded { name: "a".into() });
        log.push(AirEvent::RoomAdded { name: "b".into() });
        assert_eq!(log.len(), 2);
        assert_eq!(log.dropped(), 1);
        let events = log.drain();
        assert_eq!(events[0], AirEvent::RoomAdded { name: "a".into() });
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut log = EventLog::with_capacity(0);
        log.push(AirEvent::VentilationStopped);
        assert_eq!(log.len(), 1);
    }
}
