//! Wall-clock source and message id generation

use chrono::{DateTime, FixedOffset, Local};

use crate::models::MessageId;

/// Source of the local wall-clock time
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The system clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Time-based message ids, strictly increasing per generator
///
/// Ids are the epoch milliseconds of creation, bumped past the previous id
/// when two messages are created within the same millisecond.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: Option<u64>,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: &DateTime<FixedOffset>) -> MessageId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let id = match self.last {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last = Some(id);
        MessageId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn test_id_is_epoch_millis() {
        let mut ids = MessageIdGenerator::new();
        let now = at("2024-03-01T09:05:00.250+00:00");

        assert_eq!(ids.next_id(&now), MessageId(now.timestamp_millis() as u64));
    }

    #[test]
    fn test_ids_strictly_increase_under_frozen_clock() {
        let mut ids = MessageIdGenerator::new();
        let now = at("2024-03-01T09:05:00+00:00");

        let a = ids.next_id(&now);
        let b = ids.next_id(&now);
        let c = ids.next_id(&now);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_clock_going_backwards_still_increases() {
        let mut ids = MessageIdGenerator::new();
        let a = ids.next_id(&at("2024-03-01T09:05:01+00:00"));
        let b = ids.next_id(&at("2024-03-01T09:05:00+00:00"));
        assert!(b > a);
    }

    #[test]
    fn test_fixed_clock() {
        let now = at("2024-03-01T09:05:00+02:00");
        assert_eq!(FixedClock(now).now(), now);
    }
}
