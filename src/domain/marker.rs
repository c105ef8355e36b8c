//! Epoch lifecycle markers from the events store.

use crate::domain::{Epoch, Timestamp};
use serde::{Deserialize, Serialize};

/// Records when a new administrative epoch began.
///
/// Created and retired entirely by the external accounting process;
/// read-only from this engine's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochMarker {
    pub epoch: Epoch,
    pub timestamp: Timestamp,
}

impl EpochMarker {
    pub fn new(epoch: Epoch, timestamp: Timestamp) -> Self {
        EpochMarker { epoch, timestamp }
    }
}
