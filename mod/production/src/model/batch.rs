use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BatchStatus
// ---------------------------------------------------------------------------

/// Lifecycle stage of a production batch.
///
/// ```text
/// PENDING → IN_CUTTING → IN_SEWING → ASSIGNED_TO_FINISHING → IN_FINISHING → COMPLETED
/// ```
///
/// Stage advances are driven by task transitions: starting the cutting
/// task moves PENDING → IN_CUTTING, starting the sewing task moves
/// IN_CUTTING → IN_SEWING, assigning finishing moves IN_SEWING →
/// ASSIGNED_TO_FINISHING, starting finishing moves to IN_FINISHING, and
/// the supervisor closes the batch once every sub-batch is in the
/// warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Pending,
    InCutting,
    InSewing,
    AssignedToFinishing,
    InFinishing,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InCutting => "IN_CUTTING",
            Self::InSewing => "IN_SEWING",
            Self::AssignedToFinishing => "ASSIGNED_TO_FINISHING",
            Self::InFinishing => "IN_FINISHING",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "IN_CUTTING" => Some(Self::InCutting),
            "IN_SEWING" => Some(Self::InSewing),
            "ASSIGNED_TO_FINISHING" => Some(Self::AssignedToFinishing),
            "IN_FINISHING" => Some(Self::InFinishing),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether the batch has reached its terminal stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Batch — the core data model
// ---------------------------------------------------------------------------

/// Quantity of one size within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeQuantity {
    /// Size label (e.g. "S", "M", "XL").
    pub size: String,
    pub quantity: u32,
}

/// A production run of one garment product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,

    /// Batch name (e.g. "KMJ-2026-08-A").
    pub name: String,

    /// Product description (e.g. "Kemeja flanel lengan panjang").
    pub product: String,

    /// Fabric color.
    pub color: String,

    /// Per-size quantities. Non-empty; quantities positive.
    pub size_breakdown: Vec<SizeQuantity>,

    /// Total pieces (sum of the size breakdown).
    pub quantity: u32,

    pub status: BatchStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Who created this batch.
    pub created_by: String,

    pub create_at: String,
    pub update_at: String,
}

/// Body for `POST /production/batches`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub name: String,
    pub product: String,
    pub color: String,
    pub size_breakdown: Vec<SizeQuantity>,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for s in &[
            BatchStatus::Pending,
            BatchStatus::InCutting,
            BatchStatus::InSewing,
            BatchStatus::AssignedToFinishing,
            BatchStatus::InFinishing,
            BatchStatus::Completed,
        ] {
            let json = serde_json::to_string(s).unwrap();
            let back: BatchStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(BatchStatus::from_str(s.as_str()), Some(*s));
        }
        assert_eq!(BatchStatus::from_str("SHIPPED"), None);
    }

    #[test]
    fn status_terminal() {
        assert!(!BatchStatus::Pending.is_terminal());
        assert!(!BatchStatus::InFinishing.is_terminal());
        assert!(BatchStatus::Completed.is_terminal());
    }

    #[test]
    fn batch_json_roundtrip() {
        let b = Batch {
            id: "b1".into(),
            name: "KMJ-2026-08-A".into(),
            product: "Kemeja flanel".into(),
            color: "Merah".into(),
            size_breakdown: vec![
                SizeQuantity { size: "M".into(), quantity: 60 },
                SizeQuantity { size: "L".into(), quantity: 40 },
            ],
            quantity: 100,
            status: BatchStatus::Pending,
            note: None,
            created_by: "u1".into(),
            create_at: "2026-08-01T00:00:00Z".into(),
            update_at: "2026-08-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"sizeBreakdown\""));
        assert!(json.contains("\"PENDING\""));
        // None note should not appear in JSON.
        assert!(!json.contains("\"note\""));
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quantity, 100);
        assert_eq!(back.size_breakdown.len(), 2);
    }

    #[test]
    fn create_request_deserialize() {
        let json = r#"{"name":"B","product":"Kaos","color":"Hitam",
            "sizeBreakdown":[{"size":"M","quantity":10}]}"#;
        let req: CreateBatchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.size_breakdown[0].quantity, 10);
        assert!(req.note.is_none());
    }
}
