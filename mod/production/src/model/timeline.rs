use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TimelineEvent
// ---------------------------------------------------------------------------

/// Status-changing events recorded in the timelines.
///
/// Timelines are append-only: one row per event, never mutated or
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineEvent {
    BatchCreated,
    CuttingAssigned,
    CuttingStarted,
    CuttingCompleted,
    CuttingConfirmed,
    SewingAssigned,
    SewingStarted,
    SewingCompleted,
    FinishingAssigned,
    FinishingStarted,
    FinishingCompleted,
    BatchCompleted,
    SubBatchCreated,
    ItemsRecorded,
    WarehouseVerified,
}

impl TimelineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchCreated => "BATCH_CREATED",
            Self::CuttingAssigned => "CUTTING_ASSIGNED",
            Self::CuttingStarted => "CUTTING_STARTED",
            Self::CuttingCompleted => "CUTTING_COMPLETED",
            Self::CuttingConfirmed => "CUTTING_CONFIRMED",
            Self::SewingAssigned => "SEWING_ASSIGNED",
            Self::SewingStarted => "SEWING_STARTED",
            Self::SewingCompleted => "SEWING_COMPLETED",
            Self::FinishingAssigned => "FINISHING_ASSIGNED",
            Self::FinishingStarted => "FINISHING_STARTED",
            Self::FinishingCompleted => "FINISHING_COMPLETED",
            Self::BatchCompleted => "BATCH_COMPLETED",
            Self::SubBatchCreated => "SUB_BATCH_CREATED",
            Self::ItemsRecorded => "ITEMS_RECORDED",
            Self::WarehouseVerified => "WAREHOUSE_VERIFIED",
        }
    }
}

impl std::fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Timeline entries
// ---------------------------------------------------------------------------

/// One audit entry in a batch's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTimelineEntry {
    pub id: String,
    pub batch_id: String,
    pub event: String,
    /// Human-readable summary of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Who caused the event.
    pub actor_id: String,
    pub create_at: String,
}

/// One audit entry in a sub-batch's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubBatchTimelineEntry {
    pub id: String,
    pub sub_batch_id: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub actor_id: String,
    pub create_at: String,
}
