// Log records - observed protocol events fed into an analysis run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::DirectionTag;

/// One observed protocol event
///
/// Records are produced by an upstream log scanner. The analyzer consumes them
/// in the order given; the natural ordering key is `(timestamp, sequence_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Monotonic sequence number from the capture, used as tie-break
    #[serde(rename = "seq")]
    pub sequence_number: u64,

    /// When the message was captured
    pub timestamp: DateTime<Utc>,

    /// Protocol tag of the carrying layer (`nas`, `nrrrc`, `sip`, ...)
    #[serde(rename = "protocol")]
    pub protocol_tag: String,

    /// Raw direction tag as written by the capture tool
    pub direction: DirectionTag,

    /// Message text, lower-cased
    pub message: String,
}

impl LogRecord {
    /// Create a record, normalizing the message to lower case
    pub fn new<P, D, M>(
        sequence_number: u64,
        timestamp: DateTime<Utc>,
        protocol_tag: P,
        direction: D,
        message: M,
    ) -> Self
    where
        P: Into<String>,
        D: Into<DirectionTag>,
        M: AsRef<str>,
    {
        LogRecord {
            sequence_number,
            timestamp,
            protocol_tag: protocol_tag.into(),
            direction: direction.into(),
            message: message.as_ref().trim().to_lowercase(),
        }
    }

    /// Replay ordering key: timestamp first, sequence number as tie-break
    pub fn ordering_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_message_is_normalized() {
        let ts = Utc.with_ymd_and_hms(2025, 4, 7, 9, 42, 30).unwrap();
        let record = LogRecord::new(1, ts, "nrrrc", "U", "  rrcSetupRequest  ");
        assert_eq!(record.message, "rrcsetuprequest");
        assert_eq!(record.direction.as_str(), "U");
    }

    #[test]
    fn test_ordering_key_breaks_ties_by_sequence() {
        let ts = Utc.with_ymd_and_hms(2025, 4, 7, 9, 42, 30).unwrap();
        let first = LogRecord::new(7, ts, "nas", "u", "registration request");
        let second = LogRecord::new(8, ts, "nas", "d", "authentication request");
        assert!(first.ordering_key() < second.ordering_key());
    }

    #[test]
    fn test_wire_shape() {
        let ts = Utc.with_ymd_and_hms(2025, 4, 7, 9, 42, 30).unwrap();
        let record = LogRecord::new(3, ts, "nas", "u", "Registration request");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["seq"], 3);
        assert_eq!(json["protocol"], "nas");
        assert_eq!(json["direction"], "u");
        assert_eq!(json["message"], "registration request");
    }
}
