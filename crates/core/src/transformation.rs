//! Transformation lifecycle: status values, allowed transitions, and
//! processing-duration math.
//!
//! A transformation is created as `processing` and moves exactly once to
//! either `completed` or `failed`. Terminal states are never left.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status values
// ---------------------------------------------------------------------------

/// Record created, model call in flight.
pub const STATUS_PROCESSING: &str = "processing";
/// A final image (generated or fallback) was stored.
pub const STATUS_COMPLETED: &str = "completed";
/// The model could not be reached; no image was stored.
pub const STATUS_FAILED: &str = "failed";

/// All valid status values, in lifecycle order.
pub const VALID_STATUSES: &[&str] = &[STATUS_PROCESSING, STATUS_COMPLETED, STATUS_FAILED];

/// Lifecycle status of a transformation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationStatus {
    Processing,
    Completed,
    Failed,
}

impl TransformationStatus {
    /// The string stored in the `transformations.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => STATUS_PROCESSING,
            Self::Completed => STATUS_COMPLETED,
            Self::Failed => STATUS_FAILED,
        }
    }

    /// Only `processing -> completed` and `processing -> failed` are allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Completed) | (Self::Processing, Self::Failed)
        )
    }
}

impl fmt::Display for TransformationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PROCESSING => Ok(Self::Processing),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_FAILED => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Invalid transformation status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

/// Validate a status transition, returning `Conflict` when it is not allowed.
pub fn validate_transition(
    current: TransformationStatus,
    next: TransformationStatus,
) -> Result<(), CoreError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Transformation cannot move from '{current}' to '{next}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// Wall-clock milliseconds between record creation and completion.
///
/// Clamped at zero: `created_at` comes from the database clock and
/// `completed_at` from the application clock, so small skew can invert them.
pub fn processing_duration_ms(created_at: Timestamp, completed_at: Timestamp) -> i64 {
    (completed_at - created_at).num_milliseconds().max(0)
}
