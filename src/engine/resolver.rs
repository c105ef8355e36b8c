//! Epoch resolution: time window -> composite sort-key bounds.

use crate::domain::{Epoch, EpochMarker, SortKey, Timestamp};
use crate::error::TwrError;

/// Resolves which epoch a timestamp falls in and builds query bounds.
///
/// Holds the full marker set for one run; the events partition is small
/// and slow-changing, so a per-run scan is the simplest correct thing.
pub struct EpochResolver {
    markers: Vec<EpochMarker>,
}

impl EpochResolver {
    /// Build a resolver from the full marker scan.
    ///
    /// # Errors
    /// `NoEpochData` when no markers exist; nothing can be resolved.
    pub fn new(markers: Vec<EpochMarker>) -> Result<Self, TwrError> {
        if markers.is_empty() {
            return Err(TwrError::NoEpochData);
        }
        Ok(EpochResolver { markers })
    }

    /// The greatest epoch whose marker timestamp is strictly before `t`.
    ///
    /// A marker exactly at `t` does not count: an epoch beginning at the
    /// window edge belongs to the records after the edge, not before it.
    /// Markers sharing a timestamp tie-break by epoch number.
    fn epoch_strictly_before(&self, t: Timestamp) -> Option<Epoch> {
        self.markers
            .iter()
            .filter(|m| m.timestamp < t)
            .map(|m| m.epoch)
            .max()
    }

    /// Lower query bound for a window starting at `t0`. Falls back to
    /// epoch 0 when no marker precedes the window.
    pub fn lower_bound(&self, t0: Timestamp) -> SortKey {
        let epoch = self.epoch_strictly_before(t0).unwrap_or_default();
        SortKey::new(epoch, t0)
    }

    /// Upper query bound for a window ending at `t1`. When no marker
    /// strictly precedes `t1`, the window does not cross an epoch boundary
    /// and the lower epoch is reused.
    pub fn upper_bound(&self, lower_epoch: Epoch, t1: Timestamp) -> SortKey {
        let epoch = self.epoch_strictly_before(t1).unwrap_or(lower_epoch);
        SortKey::new(epoch, t1)
    }
}
