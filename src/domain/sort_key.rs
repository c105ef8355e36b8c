//! Composite sort key: zero-padded epoch + timestamp.
//!
//! Balance history is ordered by the string `"{epoch:0W}#{timestamp}"`.
//! The load-bearing invariant: lexicographic order on the encoding equals
//! chronological order across epoch boundaries, for every epoch below
//! `10^W`. The pad width `W` must match whatever was used to write the
//! existing data, or range queries silently misorder.

use crate::domain::{Epoch, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Separator between the padded epoch and the timestamp.
const SEPARATOR: char = '#';

/// Error parsing a stored composite sort key.
#[derive(Debug, Error)]
#[error("malformed sort key {input:?}: {reason}")]
pub struct SortKeyParseError {
    pub input: String,
    pub reason: String,
}

/// A composite sort key `(epoch, timestamp)`.
///
/// Field order matters: the derived `Ord` (epoch first, then timestamp)
/// agrees with lexicographic order on the encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub epoch: Epoch,
    pub timestamp: Timestamp,
}

impl SortKey {
    pub fn new(epoch: Epoch, timestamp: Timestamp) -> Self {
        SortKey { epoch, timestamp }
    }

    /// Encode as `"{epoch:0W}#{timestamp}"` with the given pad width.
    pub fn encode(&self, pad_width: usize) -> String {
        format!(
            "{:0>width$}{}{}",
            self.epoch.as_u64(),
            SEPARATOR,
            self.timestamp,
            width = pad_width
        )
    }

    /// Parse a stored sort key back into `(epoch, timestamp)`.
    ///
    /// Corrupt keys are a fatal condition for a run; callers must not guess.
    pub fn parse(raw: &str) -> Result<Self, SortKeyParseError> {
        let (epoch_part, ts_part) = raw.split_once(SEPARATOR).ok_or_else(|| SortKeyParseError {
            input: raw.to_string(),
            reason: "missing '#' separator".to_string(),
        })?;

        if epoch_part.is_empty() || !epoch_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SortKeyParseError {
                input: raw.to_string(),
                reason: "epoch segment is not a decimal number".to_string(),
            });
        }
        let epoch: u64 = epoch_part.parse().map_err(|_| SortKeyParseError {
            input: raw.to_string(),
            reason: "epoch segment overflows u64".to_string(),
        })?;

        let timestamp = Timestamp::parse(ts_part).map_err(|e| SortKeyParseError {
            input: raw.to_string(),
            reason: e.to_string(),
        })?;

        Ok(SortKey::new(Epoch::new(epoch), timestamp))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.epoch, SEPARATOR, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn key(epoch: u64, t: &str) -> SortKey {
        SortKey::new(Epoch::new(epoch), ts(t))
    }

    #[test]
    fn encode_zero_pads_epoch() {
        let k = key(2, "2023-01-10 00:00:00");
        assert_eq!(k.encode(5), "00002#2023-01-10 00:00:00");
    }

    #[test]
    fn parse_roundtrip() {
        let k = key(42, "2024-06-01 12:30:45");
        let parsed = SortKey::parse(&k.encode(5)).unwrap();
        assert_eq!(parsed, k);
        // Unpadded keys parse too; padding is an encoding concern only.
        assert_eq!(SortKey::parse("42#2024-06-01 12:30:45").unwrap(), k);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(SortKey::parse("no separator here").is_err());
        assert!(SortKey::parse("#2023-01-10 00:00:00").is_err());
        assert!(SortKey::parse("12x45#2023-01-10 00:00:00").is_err());
        assert!(SortKey::parse("00002#10-01-2023").is_err());
    }

    #[test]
    fn encoded_order_matches_chronological_order() {
        // Chronologically ordered keys spanning epoch boundaries, including
        // the 9 -> 10 digit-count rollover that requires the padding.
        let keys = [
            key(0, "2022-12-01 00:00:00"),
            key(3, "2023-01-09 23:59:59"),
            key(3, "2023-01-10 00:00:00"),
            key(4, "2023-01-10 00:00:00"),
            key(9, "2023-02-01 08:00:00"),
            key(10, "2023-02-01 08:00:01"),
            key(99999, "2099-12-31 23:59:59"),
        ];

        for pair in keys.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a < b, "{:?} should sort before {:?}", a, b);
            assert!(
                a.encode(5) < b.encode(5),
                "encoded {:?} should sort before {:?}",
                a.encode(5),
                b.encode(5)
            );
        }
    }

    #[test]
    fn unpadded_encoding_would_break_ordering() {
        // Demonstrates why the pad width exists: with width 1 the epoch
        // 9 -> 10 rollover misorders lexicographically.
        let e9 = key(9, "2023-02-01 08:00:00");
        let e10 = key(10, "2023-02-01 08:00:01");
        assert!(e9 < e10);
        assert!(e9.encode(1) > e10.encode(1));
        assert!(e9.encode(5) < e10.encode(5));
    }
}
