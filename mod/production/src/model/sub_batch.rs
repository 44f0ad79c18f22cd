use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SubBatchStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a sub-batch.
///
/// ```text
/// CREATED → IN_PROGRESS → (back to CREATED) → SUBMITTED_TO_WAREHOUSE → WAREHOUSE_VERIFIED
/// ```
///
/// IN_PROGRESS means a finishing task attached to the sub-batch is
/// running; completing that task records the item counts and returns the
/// sub-batch to CREATED. Submission is only legal from CREATED, so a
/// sub-batch cannot be sent to the warehouse while finishing work on it
/// is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubBatchStatus {
    Created,
    InProgress,
    SubmittedToWarehouse,
    WarehouseVerified,
}

impl SubBatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::InProgress => "IN_PROGRESS",
            Self::SubmittedToWarehouse => "SUBMITTED_TO_WAREHOUSE",
            Self::WarehouseVerified => "WAREHOUSE_VERIFIED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(Self::Created),
            "IN_PROGRESS" => Some(Self::InProgress),
            "SUBMITTED_TO_WAREHOUSE" => Some(Self::SubmittedToWarehouse),
            "WAREHOUSE_VERIFIED" => Some(Self::WarehouseVerified),
            _ => None,
        }
    }

    /// Whether the sub-batch has left the finishing floor.
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::SubmittedToWarehouse | Self::WarehouseVerified)
    }
}

impl std::fmt::Display for SubBatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Rejected-piece counts by defect category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBreakdown {
    #[serde(default)]
    pub stain: u32,
    #[serde(default)]
    pub sewing_defect: u32,
    #[serde(default)]
    pub fabric_defect: u32,
    #[serde(default)]
    pub other: u32,
}

impl RejectBreakdown {
    pub fn total(&self) -> u32 {
        self.stain + self.sewing_defect + self.fabric_defect + self.other
    }
}

/// Per-size/color item counts within a sub-batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubBatchItem {
    pub size: String,
    pub color: String,
    /// Pieces received from sewing into this sub-batch.
    pub received: u32,
    /// Pieces that passed finishing inspection.
    #[serde(default)]
    pub good: u32,
    /// Rejected pieces, by category.
    #[serde(default)]
    pub rejected: RejectBreakdown,
}

// ---------------------------------------------------------------------------
// SubBatch
// ---------------------------------------------------------------------------

/// A partial slice of a batch's finishing output, shipped independently
/// to the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubBatch {
    pub id: String,

    pub batch_id: String,

    /// Sequence number within the batch (1, 2, 3, ...).
    pub code: u32,

    pub status: SubBatchStatus,

    pub items: Vec<SubBatchItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub created_by: String,

    pub create_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
}

impl SubBatch {
    /// Total pieces that passed finishing.
    pub fn good_total(&self) -> u32 {
        self.items.iter().map(|i| i.good).sum()
    }

    /// Total rejected pieces across all categories.
    pub fn rejected_total(&self) -> u32 {
        self.items.iter().map(|i| i.rejected.total()).sum()
    }

    /// Summed reject counts by category.
    pub fn rejected_breakdown(&self) -> RejectBreakdown {
        let mut sum = RejectBreakdown::default();
        for item in &self.items {
            sum.stain += item.rejected.stain;
            sum.sewing_defect += item.rejected.sewing_defect;
            sum.fabric_defect += item.rejected.fabric_defect;
            sum.other += item.rejected.other;
        }
        sum
    }
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /production/batches/{id}/sub-batches`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubBatchRequest {
    pub items: Vec<SubBatchItem>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Body for `POST /production/sub-batches/{id}/@complete`.
///
/// Optionally replaces the item counts at submission time; omitted means
/// the counts recorded so far stand.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSubBatchRequest {
    #[serde(default)]
    pub items: Option<Vec<SubBatchItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(size: &str, received: u32, good: u32, stain: u32) -> SubBatchItem {
        SubBatchItem {
            size: size.into(),
            color: "Merah".into(),
            received,
            good,
            rejected: RejectBreakdown {
                stain,
                ..Default::default()
            },
        }
    }

    #[test]
    fn status_roundtrip() {
        for s in &[
            SubBatchStatus::Created,
            SubBatchStatus::InProgress,
            SubBatchStatus::SubmittedToWarehouse,
            SubBatchStatus::WarehouseVerified,
        ] {
            let json = serde_json::to_string(s).unwrap();
            let back: SubBatchStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(SubBatchStatus::from_str(s.as_str()), Some(*s));
        }
    }

    #[test]
    fn submitted_states() {
        assert!(!SubBatchStatus::Created.is_submitted());
        assert!(!SubBatchStatus::InProgress.is_submitted());
        assert!(SubBatchStatus::SubmittedToWarehouse.is_submitted());
        assert!(SubBatchStatus::WarehouseVerified.is_submitted());
    }

    #[test]
    fn totals() {
        let sb = SubBatch {
            id: "sb1".into(),
            batch_id: "b1".into(),
            code: 1,
            status: SubBatchStatus::Created,
            items: vec![item("M", 30, 27, 3), item("L", 20, 19, 1)],
            note: None,
            created_by: "f1".into(),
            create_at: "2026-08-01T00:00:00Z".into(),
            submitted_at: None,
            verified_at: None,
        };
        assert_eq!(sb.good_total(), 46);
        assert_eq!(sb.rejected_total(), 4);
        assert_eq!(sb.rejected_breakdown().stain, 4);
        assert_eq!(sb.rejected_breakdown().other, 0);
    }

    #[test]
    fn reject_breakdown_defaults_in_json() {
        let json = r#"{"size":"M","color":"Biru","received":10}"#;
        let it: SubBatchItem = serde_json::from_str(json).unwrap();
        assert_eq!(it.good, 0);
        assert_eq!(it.rejected.total(), 0);
    }
}
